//! Race catalog: static race definitions plus the lookup indices every rule
//! and mutation goes through.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::calendar::{CalendarSlot, Half, Month, Season, SlotKey, Year};

const DEFAULT_CATALOG_DATA: &str = include_str!("../data/races.json");

/// Stable race identifier; the join key between catalog, selection and planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaceId(pub u32);

impl fmt::Display for RaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raised when a grade string matches none of the known encodings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised race grade `{0}`")]
pub struct UnknownGrade(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grade {
    G1,
    G2,
    G3,
    Open,
    PreOpen,
}

impl Grade {
    pub const ALL: [Self; 5] = [Self::G1, Self::G2, Self::G3, Self::Open, Self::PreOpen];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::G1 => "G1",
            Self::G2 => "G2",
            Self::G3 => "G3",
            Self::Open => "OP",
            Self::PreOpen => "Pre-OP",
        }
    }

    /// Normalise any of the grade spellings found in race data
    /// (`G1`, `GI`, `GⅠ`, full-width digits, `OP`, `Pre-OP`, ...).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut key = String::with_capacity(raw.len());
        for c in raw.trim().chars() {
            match c {
                ' ' | '-' | '_' | '.' => {}
                'Ⅰ' => key.push('I'),
                'Ⅱ' => key.push_str("II"),
                'Ⅲ' => key.push_str("III"),
                'Ｇ' | 'ｇ' => key.push('G'),
                '０'..='９' => {
                    if let Some(digit) = char::from_digit(u32::from(c) - u32::from('０'), 10) {
                        key.push(digit);
                    }
                }
                other => key.extend(other.to_uppercase()),
            }
        }
        match key.as_str() {
            "G1" | "GI" => Some(Self::G1),
            "G2" | "GII" => Some(Self::G2),
            "G3" | "GIII" => Some(Self::G3),
            "OP" | "OPEN" => Some(Self::Open),
            "PREOP" | "PREOPEN" => Some(Self::PreOpen),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Grade {
    type Error = UnknownGrade;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(UnknownGrade(value))
    }
}

impl From<Grade> for String {
    fn from(value: Grade) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Turf,
    Dirt,
}

impl Surface {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Turf => "turf",
            Self::Dirt => "dirt",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Right,
    Left,
    #[serde(rename = "none", alias = "straight")]
    Straight,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Straight => "none",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceCategory {
    Short,
    Mile,
    Medium,
    Long,
}

impl DistanceCategory {
    pub const ALL: [Self; 4] = [Self::Short, Self::Mile, Self::Medium, Self::Long];

    /// short ≤1400, mile 1401–1800, medium 1801–2400, long ≥2401
    #[must_use]
    pub const fn from_meters(meters: u32) -> Self {
        match meters {
            0..=1400 => Self::Short,
            1401..=1800 => Self::Mile,
            1801..=2400 => Self::Medium,
            _ => Self::Long,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Mile => "mile",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for DistanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Eastern,
    Western,
}

impl Region {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eastern => "eastern",
            Self::Western => "western",
        }
    }
}

/// Summer series a race belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummerSeries {
    Sprint,
    Mile,
    S2000,
}

impl SummerSeries {
    pub const ALL: [Self; 3] = [Self::Sprint, Self::Mile, Self::S2000];

    /// Short label used on filter buttons.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sprint => "SSS",
            Self::Mile => "SMS",
            Self::S2000 => "S2000",
        }
    }
}

/// A racecourse and the region it is classified under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub name: String,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub name: String,
    #[serde(default)]
    pub name_jp: String,
    pub grade: Grade,
    pub surface: Surface,
    pub track: String,
    /// Distance in meters.
    pub distance: u32,
    pub direction: Direction,
    pub month: Month,
    pub half: Half,
    /// Career years this race may be scheduled under.
    pub years: SmallVec<[Year; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<SummerSeries>,
    /// Marquee race this one is a trial for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_for: Option<String>,
}

impl Race {
    #[must_use]
    pub const fn season(&self) -> Season {
        self.month.season()
    }

    #[must_use]
    pub const fn distance_category(&self) -> DistanceCategory {
        DistanceCategory::from_meters(self.distance)
    }

    #[must_use]
    pub const fn calendar_slot(&self) -> CalendarSlot {
        CalendarSlot::new(self.month, self.half)
    }

    #[must_use]
    pub fn is_eligible(&self, year: Year) -> bool {
        self.years.contains(&year)
    }

    /// Whether this race may legitimately occupy the given planner cell.
    #[must_use]
    pub fn fits_slot(&self, slot: SlotKey) -> bool {
        self.month == slot.month && self.half == slot.half && self.is_eligible(slot.year)
    }

    /// Year the race lands in when it is selected from the race list: the
    /// preferred (active) year when eligible, otherwise the earliest eligible
    /// year.
    #[must_use]
    pub fn natural_year(&self, prefer: Year) -> Option<Year> {
        if self.is_eligible(prefer) {
            return Some(prefer);
        }
        Year::ALL.into_iter().find(|year| self.is_eligible(*year))
    }

    #[must_use]
    pub fn natural_slot(&self, prefer: Year) -> Option<SlotKey> {
        self.natural_year(prefer)
            .map(|year| SlotKey::new(year, self.month, self.half))
    }
}

/// Raw catalog document as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CatalogData {
    #[serde(default)]
    pub tracks: Vec<TrackInfo>,
    #[serde(default)]
    pub races: Vec<Race>,
}

/// Errors raised while loading or validating catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("race id {0} appears more than once")]
    DuplicateRace(RaceId),
    #[error("track `{0}` is declared more than once")]
    DuplicateTrack(String),
    #[error("race {id} runs at undeclared track `{track}`")]
    UnknownTrack { id: RaceId, track: String },
    #[error("race {0} is not eligible for any planner year")]
    NoEligibleYear(RaceId),
    #[error("race {id} is a trial for unknown race `{target}`")]
    UnknownTrialTarget { id: RaceId, target: String },
}

type IdList = SmallVec<[RaceId; 2]>;

/// Immutable race catalog with id, name and track indices built once at load.
#[derive(Debug, Clone, Default)]
pub struct RaceCatalog {
    races: Vec<Race>,
    tracks: Vec<TrackInfo>,
    by_id: HashMap<RaceId, usize>,
    ids_by_name: HashMap<String, IdList>,
    regions: HashMap<String, Region>,
}

impl RaceCatalog {
    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the data breaks a catalog
    /// invariant (duplicate ids, unknown tracks, races with no eligible year).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// Build lookup indices over already-parsed catalog data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data breaks a catalog invariant.
    pub fn from_data(data: CatalogData) -> Result<Self, CatalogError> {
        let mut regions = HashMap::with_capacity(data.tracks.len());
        for track in &data.tracks {
            if regions.insert(track.name.clone(), track.region).is_some() {
                return Err(CatalogError::DuplicateTrack(track.name.clone()));
            }
        }

        let mut by_id = HashMap::with_capacity(data.races.len());
        let mut ids_by_name: HashMap<String, IdList> = HashMap::new();
        for (idx, race) in data.races.iter().enumerate() {
            if by_id.insert(race.id, idx).is_some() {
                return Err(CatalogError::DuplicateRace(race.id));
            }
            if !regions.contains_key(&race.track) {
                return Err(CatalogError::UnknownTrack {
                    id: race.id,
                    track: race.track.clone(),
                });
            }
            if race.years.is_empty() {
                return Err(CatalogError::NoEligibleYear(race.id));
            }
            ids_by_name
                .entry(race.name.clone())
                .or_default()
                .push(race.id);
        }

        for race in &data.races {
            if let Some(target) = &race.trial_for
                && !ids_by_name.contains_key(target)
            {
                return Err(CatalogError::UnknownTrialTarget {
                    id: race.id,
                    target: target.clone(),
                });
            }
        }

        log::info!(
            "loaded race catalog: {} races, {} distinct names, {} tracks",
            data.races.len(),
            ids_by_name.len(),
            data.tracks.len()
        );

        Ok(Self {
            races: data.races,
            tracks: data.tracks,
            by_id,
            ids_by_name,
            regions,
        })
    }

    /// Parse the catalog bundled with the crate, falling back to an empty
    /// catalog if the bundled data is unreadable.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_CATALOG_DATA).unwrap_or_else(|err| {
            log::error!("bundled race catalog failed to load: {err}");
            Self::default()
        })
    }

    /// Shared instance of the bundled catalog, parsed on first use.
    #[must_use]
    pub fn builtin() -> &'static Self {
        static CATALOG: OnceLock<RaceCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    #[must_use]
    pub fn races(&self) -> &[Race] {
        &self.races
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Race> {
        self.races.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.races.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    #[must_use]
    pub fn tracks(&self) -> &[TrackInfo] {
        &self.tracks
    }

    #[must_use]
    pub fn get(&self, id: RaceId) -> Option<&Race> {
        self.by_id.get(&id).map(|idx| &self.races[*idx])
    }

    #[must_use]
    pub fn contains(&self, id: RaceId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Every id carrying this race name. Names are not unique, so callers
    /// must treat the answer as a set.
    #[must_use]
    pub fn ids_for_name(&self, name: &str) -> &[RaceId] {
        match self.ids_by_name.get(name) {
            Some(ids) => ids.as_slice(),
            None => &[],
        }
    }

    #[must_use]
    pub fn ids_for_names<'a, I>(&self, names: I) -> BTreeSet<RaceId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .flat_map(|name| self.ids_for_name(name).iter().copied())
            .collect()
    }

    #[must_use]
    pub fn region_of(&self, track: &str) -> Option<Region> {
        self.regions.get(track).copied()
    }

    /// Races a picker offers for one planner cell.
    pub fn races_for_slot(&self, slot: SlotKey) -> impl Iterator<Item = &Race> {
        self.races.iter().filter(move |race| race.fits_slot(slot))
    }

    /// Distinct race names tagged with the given summer series.
    #[must_use]
    pub fn series_names(&self, series: SummerSeries) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.races
            .iter()
            .filter(|race| race.series == Some(series))
            .map(|race| race.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RaceCatalog {
    type Item = &'a Race;
    type IntoIter = std::slice::Iter<'a, Race>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
