//! Serializable snapshot of a tracker state, plus the named save-slot payload.
//!
//! Restoring validates the whole document against the catalog before any
//! state is built, so a bad snapshot is rejected wholesale.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::calendar::{CalendarSlot, SlotKey, Year};
use crate::catalog::{RaceCatalog, RaceId};
use crate::constants::SAVE_SLOT_COUNT;
use crate::planner::PlannerGrid;
use crate::rules::RuleId;
use crate::selection::{Outcome, Selection};
use crate::state::TrackerState;

/// Planner cells per year, keyed `Month|Half`; empty cells are `null`.
pub type PlannerSnapshot = BTreeMap<Year, BTreeMap<String, Option<RaceId>>>;

/// Parsing goes through `SnapshotDocument` so unknown keys are rejected even
/// when the snapshot is flattened into a save slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(
    rename_all = "camelCase",
    try_from = "serde_json::Map<String, serde_json::Value>"
)]
pub struct Snapshot {
    pub participated: Vec<RaceId>,
    pub won: Vec<RaceId>,
    pub lost: Vec<RaceId>,
    pub planner_grid: PlannerSnapshot,
    pub active_year: Year,
    pub tracked_rule_id: Option<RuleId>,
}

/// Accepted key set, including the short keys of shared links
/// (`selected`, `planner`, `year`, `tracked`).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SnapshotDocument {
    #[serde(default, alias = "selected")]
    participated: Vec<RaceId>,
    #[serde(default)]
    won: Vec<RaceId>,
    #[serde(default)]
    lost: Vec<RaceId>,
    #[serde(default, alias = "planner", alias = "plannerData")]
    planner_grid: PlannerSnapshot,
    #[serde(default, alias = "year", alias = "plannerYear")]
    active_year: Year,
    #[serde(default, alias = "tracked", alias = "trackedFactorId")]
    tracked_rule_id: Option<RuleId>,
}

impl TryFrom<serde_json::Map<String, serde_json::Value>> for Snapshot {
    type Error = serde_json::Error;

    fn try_from(fields: serde_json::Map<String, serde_json::Value>) -> Result<Self, Self::Error> {
        let doc: SnapshotDocument = serde_json::from_value(serde_json::Value::Object(fields))?;
        Ok(Self {
            participated: doc.participated,
            won: doc.won,
            lost: doc.lost,
            planner_grid: doc.planner_grid,
            active_year: doc.active_year,
            tracked_rule_id: doc.tracked_rule_id,
        })
    }
}

/// Rejected snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot references unknown race {0}")]
    UnknownRace(RaceId),
    #[error("race {0} is marked both won and lost")]
    WonAndLost(RaceId),
    #[error("race {0} has a result but was never entered")]
    ResultWithoutEntry(RaceId),
    #[error("planner key `{0}` is not a valid month/half")]
    BadSlotKey(String),
    #[error("race {race} cannot be scheduled in {slot}")]
    SlotMismatch { race: RaceId, slot: SlotKey },
    #[error("race {0} is planned in more than one cell")]
    DuplicatePlacement(RaceId),
    #[error("planned race {0} was never entered")]
    PlannedNotEntered(RaceId),
}

impl Snapshot {
    /// Capture the full state. Every planner cell is written, empty ones as
    /// `null`.
    #[must_use]
    pub fn capture(state: &TrackerState) -> Self {
        let selection = state.selection();
        let mut planner_grid = PlannerSnapshot::new();
        for (slot, race) in state.planner().iter() {
            planner_grid
                .entry(slot.year)
                .or_default()
                .insert(slot.calendar().key(), race);
        }
        Self {
            participated: selection.participated().collect(),
            won: selection.won().collect(),
            lost: selection.lost().collect(),
            planner_grid,
            active_year: state.active_year(),
            tracked_rule_id: state.tracked_rule(),
        }
    }

    /// Validate against `catalog` and build the state it describes.
    ///
    /// An entered race with neither result is restored as won, matching the
    /// default applied when a race is entered.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found; nothing is built in that case.
    pub fn restore(&self, catalog: &RaceCatalog) -> Result<TrackerState, SnapshotError> {
        let known = |id: RaceId| {
            if catalog.contains(id) {
                Ok(id)
            } else {
                Err(SnapshotError::UnknownRace(id))
            }
        };

        let participated: HashSet<RaceId> =
            self.participated.iter().map(|id| known(*id)).collect::<Result<_, _>>()?;
        let won: HashSet<RaceId> = self.won.iter().map(|id| known(*id)).collect::<Result<_, _>>()?;
        let lost: HashSet<RaceId> =
            self.lost.iter().map(|id| known(*id)).collect::<Result<_, _>>()?;

        if let Some(id) = won.intersection(&lost).min() {
            return Err(SnapshotError::WonAndLost(*id));
        }
        if let Some(id) = won.union(&lost).find(|id| !participated.contains(id)) {
            return Err(SnapshotError::ResultWithoutEntry(*id));
        }

        let mut selection = Selection::new();
        for id in &participated {
            let outcome = if lost.contains(id) {
                Outcome::Lost
            } else {
                Outcome::Won
            };
            selection.set_outcome(*id, outcome);
        }

        let mut planner = PlannerGrid::new();
        for (year, cells) in &self.planner_grid {
            for (key, race) in cells {
                let calendar = CalendarSlot::parse_key(key)
                    .ok_or_else(|| SnapshotError::BadSlotKey(key.clone()))?;
                let Some(id) = race else { continue };
                let slot = SlotKey::new(*year, calendar.month, calendar.half);
                let entry = catalog.get(*id).ok_or(SnapshotError::UnknownRace(*id))?;
                if !entry.fits_slot(slot) {
                    return Err(SnapshotError::SlotMismatch { race: *id, slot });
                }
                if planner.is_planned(*id) {
                    return Err(SnapshotError::DuplicatePlacement(*id));
                }
                if !participated.contains(id) {
                    return Err(SnapshotError::PlannedNotEntered(*id));
                }
                planner.place(slot, *id);
            }
        }

        Ok(TrackerState::from_parts(
            selection,
            planner,
            self.active_year,
            self.tracked_rule_id,
        ))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a snapshot.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Save slot number, always within `1..=SAVE_SLOT_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotNumber(u8);

impl SlotNumber {
    #[must_use]
    pub const fn new(n: u8) -> Option<Self> {
        if n >= 1 && n <= SAVE_SLOT_COUNT {
            Some(Self(n))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=SAVE_SLOT_COUNT).map(Self)
    }
}

impl std::fmt::Display for SlotNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for SlotNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("save slot {value} is outside 1..={SAVE_SLOT_COUNT}"))
    }
}

impl From<SlotNumber> for u8 {
    fn from(value: SlotNumber) -> Self {
        value.0
    }
}

/// Stored contents of one save slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

/// Listing entry for the slot picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSummary {
    pub slot: SlotNumber,
    pub name: Option<String>,
    pub occupied: bool,
    pub races: usize,
}

impl SlotSummary {
    /// Name shown for the slot, falling back to its number.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Slot {}", self.slot),
        }
    }
}
