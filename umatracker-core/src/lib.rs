//! Uma Musume hidden-factor tracker core
//!
//! Platform-agnostic race planning and hidden-factor evaluation. This crate
//! holds the race catalog, selection and planner state, the chronological
//! timeline and the rule engine, without UI or storage dependencies.

pub mod calendar;
pub mod catalog;
pub mod constants;
pub mod filters;
pub mod planner;
pub mod rules;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod timeline;
pub mod tracking;

use std::convert::Infallible;
use std::sync::Arc;

// Re-export commonly used types
pub use calendar::{CalendarSlot, Half, Month, SLOTS_PER_YEAR, Season, SlotKey, TOTAL_SLOTS, Year};
pub use catalog::{
    CatalogData, CatalogError, Direction, DistanceCategory, Grade, Race, RaceCatalog, RaceId,
    Region, Surface, SummerSeries, TrackInfo,
};
pub use filters::{Filter, FilterSet, sort_races};
pub use planner::{Placement, PlannerGrid};
pub use rules::{EvalContext, RULES, RuleId, RuleInfo, RuleResult, evaluate, evaluate_all};
pub use selection::{Outcome, Selection};
pub use session::TrackerSession;
pub use snapshot::{SavedSlot, SlotNumber, SlotSummary, Snapshot, SnapshotError};
pub use state::{StateError, TrackerState};
pub use timeline::{Timeline, TimelineCell};
pub use tracking::{is_race_tracked, is_slot_tracked, relevant_race_ids};

/// Trait for abstracting where race catalog data comes from
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the race catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or fails validation.
    fn load_catalog(&self) -> Result<RaceCatalog, Self::Error>;
}

/// Loader for the catalog bundled with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl CatalogLoader for BuiltinCatalog {
    type Error = Infallible;

    fn load_catalog(&self) -> Result<RaceCatalog, Self::Error> {
        Ok(RaceCatalog::builtin().clone())
    }
}

/// Trait for abstracting save slot persistence
/// Platform-specific implementations should provide this
pub trait SnapshotStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write a slot, replacing any previous contents
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be written.
    fn save_slot(&self, slot: SlotNumber, saved: &SavedSlot) -> Result<(), Self::Error>;

    /// Read a slot; `None` when it is empty
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read.
    fn load_slot(&self, slot: SlotNumber) -> Result<Option<SavedSlot>, Self::Error>;

    /// Empty a slot
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be removed.
    fn delete_slot(&self, slot: SlotNumber) -> Result<(), Self::Error>;
}

/// Entry point tying a catalog source to slot storage
pub struct Tracker<L, S>
where
    L: CatalogLoader,
    S: SnapshotStorage,
{
    loader: L,
    storage: S,
}

impl<L, S> Tracker<L, S>
where
    L: CatalogLoader,
    S: SnapshotStorage,
{
    pub const fn new(loader: L, storage: S) -> Self {
        Self { loader, storage }
    }

    /// Start an empty session over a freshly loaded catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn open_session(&self) -> Result<TrackerSession, L::Error> {
        let catalog = self.loader.load_catalog()?;
        Ok(TrackerSession::new(Arc::new(catalog)))
    }

    /// Save the session into a slot, keeping the slot's existing name
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or written.
    pub fn save_slot(&self, slot: SlotNumber, session: &TrackerSession) -> Result<(), S::Error> {
        let name = self.storage.load_slot(slot)?.and_then(|saved| saved.name);
        let saved = SavedSlot {
            name,
            snapshot: session.serialize(),
        };
        self.storage.save_slot(slot, &saved)?;
        log::info!("saved session to slot {slot}");
        Ok(())
    }

    /// Load a slot into a new session, validated against the current catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read, the catalog cannot be
    /// loaded, or the stored snapshot no longer fits the catalog.
    pub fn load_slot(&self, slot: SlotNumber) -> Result<Option<TrackerSession>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(saved) = self.storage.load_slot(slot).map_err(Into::into)? else {
            return Ok(None);
        };
        let catalog = Arc::new(self.loader.load_catalog().map_err(Into::into)?);
        let session = TrackerSession::from_snapshot(catalog, &saved.snapshot)?;
        Ok(Some(session))
    }

    /// Name an occupied slot. Returns `false` when the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or written.
    pub fn rename_slot(&self, slot: SlotNumber, name: &str) -> Result<bool, S::Error> {
        let Some(mut saved) = self.storage.load_slot(slot)? else {
            return Ok(false);
        };
        let name = name.trim();
        saved.name = (!name.is_empty()).then(|| name.to_string());
        self.storage.save_slot(slot, &saved)?;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns an error if the slot cannot be removed.
    pub fn delete_slot(&self, slot: SlotNumber) -> Result<(), S::Error> {
        self.storage.delete_slot(slot)
    }

    /// Summaries of every slot, occupied or not
    ///
    /// # Errors
    ///
    /// Returns an error if any slot cannot be read.
    pub fn list_slots(&self) -> Result<Vec<SlotSummary>, S::Error> {
        SlotNumber::all()
            .map(|slot| {
                let saved = self.storage.load_slot(slot)?;
                Ok(SlotSummary {
                    slot,
                    occupied: saved.is_some(),
                    races: saved
                        .as_ref()
                        .map_or(0, |saved| saved.snapshot.participated.len()),
                    name: saved.and_then(|saved| saved.name),
                })
            })
            .collect()
    }
}
