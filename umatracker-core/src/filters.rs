//! Race list filters.
//!
//! Grades combine with OR; every other active group narrows the list further.
//! Surface, distance, year and summer series are exclusive within their group,
//! and picking a summer series drops every other filter.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::calendar::Year;
use crate::catalog::{DistanceCategory, Grade, Race, RaceId, Surface, SummerSeries};
use crate::session::TrackerSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Grade(Grade),
    Surface(Surface),
    Distance(DistanceCategory),
    Year(Year),
    Summer(SummerSeries),
    Participated,
    Tracked,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grade(grade) => f.write_str(grade.as_str()),
            Self::Surface(surface) => f.write_str(surface.as_str()),
            Self::Distance(distance) => f.write_str(distance.as_str()),
            Self::Year(year) => f.write_str(year.as_str()),
            Self::Summer(series) => f.write_str(series.label()),
            Self::Participated => f.write_str("selected"),
            Self::Tracked => f.write_str("tracked"),
        }
    }
}

impl FromStr for Filter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(grade) = Grade::parse(s) {
            return Ok(Self::Grade(grade));
        }
        if let Ok(year) = s.parse::<Year>() {
            return Ok(Self::Year(year));
        }
        let filter = match s.to_ascii_lowercase().as_str() {
            "turf" => Self::Surface(Surface::Turf),
            "dirt" => Self::Surface(Surface::Dirt),
            "short" => Self::Distance(DistanceCategory::Short),
            "mile" => Self::Distance(DistanceCategory::Mile),
            "medium" => Self::Distance(DistanceCategory::Medium),
            "long" => Self::Distance(DistanceCategory::Long),
            "sss" => Self::Summer(SummerSeries::Sprint),
            "sms" => Self::Summer(SummerSeries::Mile),
            "s2000" => Self::Summer(SummerSeries::S2000),
            "selected" | "participated" => Self::Participated,
            "tracked" => Self::Tracked,
            _ => return Err(()),
        };
        Ok(filter)
    }
}

/// Active filters, one slot per exclusive group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    grades: BTreeSet<Grade>,
    surface: Option<Surface>,
    distance: Option<DistanceCategory>,
    year: Option<Year>,
    summer: Option<SummerSeries>,
    participated: bool,
    tracked: bool,
}

fn toggle_exclusive<T: PartialEq>(slot: &mut Option<T>, value: T) {
    if slot.as_ref() == Some(&value) {
        *slot = None;
    } else {
        *slot = Some(value);
    }
}

impl FilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch one filter on or off following its group's rules.
    pub fn toggle(&mut self, filter: Filter) {
        match filter {
            Filter::Grade(grade) => {
                if !self.grades.remove(&grade) {
                    self.grades.insert(grade);
                }
            }
            Filter::Surface(surface) => toggle_exclusive(&mut self.surface, surface),
            Filter::Distance(distance) => toggle_exclusive(&mut self.distance, distance),
            Filter::Year(year) => toggle_exclusive(&mut self.year, year),
            Filter::Summer(series) => {
                let next = if self.summer == Some(series) {
                    None
                } else {
                    Some(series)
                };
                self.clear();
                self.summer = next;
            }
            Filter::Participated => self.participated = !self.participated,
            Filter::Tracked => self.tracked = !self.tracked,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    #[must_use]
    pub fn is_active(&self, filter: Filter) -> bool {
        match filter {
            Filter::Grade(grade) => self.grades.contains(&grade),
            Filter::Surface(surface) => self.surface == Some(surface),
            Filter::Distance(distance) => self.distance == Some(distance),
            Filter::Year(year) => self.year == Some(year),
            Filter::Summer(series) => self.summer == Some(series),
            Filter::Participated => self.participated,
            Filter::Tracked => self.tracked,
        }
    }

    #[must_use]
    pub fn matches(&self, race: &Race, session: &TrackerSession) -> bool {
        let tracked = self.tracked.then(|| session.tracked_race_ids().unwrap_or_default());
        self.matches_with(race, session, tracked.as_ref())
    }

    fn matches_with(
        &self,
        race: &Race,
        session: &TrackerSession,
        tracked: Option<&BTreeSet<RaceId>>,
    ) -> bool {
        (self.grades.is_empty() || self.grades.contains(&race.grade))
            && self.surface.is_none_or(|surface| race.surface == surface)
            && self
                .distance
                .is_none_or(|distance| race.distance_category() == distance)
            && self.year.is_none_or(|year| race.is_eligible(year))
            && self.summer.is_none_or(|series| race.series == Some(series))
            && (!self.participated || session.state().selection().is_participating(race.id))
            && tracked.is_none_or(|ids| ids.contains(&race.id))
    }

    /// Matching races, sorted for display.
    #[must_use]
    pub fn apply<'a>(&self, races: &'a [Race], session: &TrackerSession) -> Vec<&'a Race> {
        let tracked = self.tracked.then(|| session.tracked_race_ids().unwrap_or_default());
        let mut list: Vec<&Race> = races
            .iter()
            .filter(|race| self.matches_with(race, session, tracked.as_ref()))
            .collect();
        sort_races(&mut list);
        list
    }
}

/// Grade, then calendar position, then name.
pub fn sort_races(races: &mut [&Race]) {
    races.sort_by(|a, b| {
        a.grade
            .cmp(&b.grade)
            .then_with(|| a.calendar_slot().cmp(&b.calendar_slot()))
            .then_with(|| a.name.cmp(&b.name))
    });
}
