//! Planner calendar: career years, months, halves and slot addressing.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of half-month slots in one planner year.
pub const SLOTS_PER_YEAR: usize = 24;

/// Total planner slots across the three career years.
pub const TOTAL_SLOTS: usize = SLOTS_PER_YEAR * 3;

/// Career year a race can be scheduled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Year {
    #[default]
    Junior,
    #[serde(alias = "classics")]
    Classic,
    Senior,
}

impl Year {
    pub const ALL: [Self; 3] = [Self::Junior, Self::Classic, Self::Senior];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Classic => "classic",
            Self::Senior => "senior",
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Junior => 0,
            Self::Classic => 1,
            Self::Senior => 2,
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Year {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "junior" => Ok(Self::Junior),
            "classic" | "classics" => Ok(Self::Classic),
            "senior" => Ok(Self::Senior),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Self; 12] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
        }
    }

    /// Zero-based calendar position.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn season(self) -> Season {
        match self {
            Self::December | Self::January | Self::February => Season::Winter,
            Self::March | Self::April | Self::May => Season::Spring,
            Self::June | Self::July | Self::August => Season::Summer,
            Self::September | Self::October | Self::November => Season::Autumn,
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Month {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|month| month.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Half {
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
}

impl Half {
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "1st",
            Self::Second => "2nd",
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Half {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1st" => Ok(Self::First),
            "2nd" => Ok(Self::Second),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Self; 4] = [Self::Spring, Self::Summer, Self::Autumn, Self::Winter];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Month/half position within a single planner year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarSlot {
    pub month: Month,
    pub half: Half,
}

impl CalendarSlot {
    #[must_use]
    pub const fn new(month: Month, half: Half) -> Self {
        Self { month, half }
    }

    /// Position within the year, `0..SLOTS_PER_YEAR`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.month.index() * 2 + self.half.index()
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index >= SLOTS_PER_YEAR {
            return None;
        }
        let month = Month::ALL[index / 2];
        let half = Half::ALL[index % 2];
        Some(Self { month, half })
    }

    /// Neighbouring half-month, clamped to the year boundaries.
    #[must_use]
    pub fn adjacent(self, step: isize) -> Self {
        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let target = (self.index() as isize + step).clamp(0, SLOTS_PER_YEAR as isize - 1) as usize;
        Self::from_index(target).unwrap_or(self)
    }

    /// Storage key, e.g. `January|1st`.
    #[must_use]
    pub fn key(self) -> String {
        format!("{}|{}", self.month, self.half)
    }

    #[must_use]
    pub fn parse_key(key: &str) -> Option<Self> {
        let (month, half) = key.split_once('|')?;
        Some(Self {
            month: month.trim().parse().ok()?,
            half: half.trim().parse().ok()?,
        })
    }
}

impl fmt::Display for CalendarSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.half)
    }
}

/// One planner cell: a career year plus a half-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub year: Year,
    pub month: Month,
    pub half: Half,
}

impl SlotKey {
    #[must_use]
    pub const fn new(year: Year, month: Month, half: Half) -> Self {
        Self { year, month, half }
    }

    #[must_use]
    pub const fn calendar(self) -> CalendarSlot {
        CalendarSlot::new(self.month, self.half)
    }

    /// Chronological position across all three years, `0..TOTAL_SLOTS`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.year.index() * SLOTS_PER_YEAR + self.calendar().index()
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index >= TOTAL_SLOTS {
            return None;
        }
        let year = Year::ALL[index / SLOTS_PER_YEAR];
        match CalendarSlot::from_index(index % SLOTS_PER_YEAR) {
            Some(slot) => Some(Self::new(year, slot.month, slot.half)),
            None => None,
        }
    }

    /// Previous/next half-month within the same year, clamped at January 1st
    /// and December 2nd.
    #[must_use]
    pub fn adjacent(self, step: isize) -> Self {
        let slot = self.calendar().adjacent(step);
        Self::new(self.year, slot.month, slot.half)
    }

    /// Every slot in chronological order: junior to senior, January 1st
    /// through December 2nd.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..TOTAL_SLOTS).filter_map(Self::from_index)
    }

    pub fn in_year(year: Year) -> impl Iterator<Item = Self> {
        (0..SLOTS_PER_YEAR)
            .filter_map(CalendarSlot::from_index)
            .map(move |slot| Self::new(year, slot.month, slot.half))
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.month, self.half)
    }
}
