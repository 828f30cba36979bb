//! Catalog-bound tracker session: mutations, rule queries and snapshots.
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::calendar::{SlotKey, Year};
use crate::catalog::{Race, RaceCatalog, RaceId};
use crate::planner::Placement;
use crate::rules::{self, RuleId, RuleResult};
use crate::selection::Outcome;
use crate::snapshot::{Snapshot, SnapshotError};
use crate::state::{StateError, TrackerState};
use crate::timeline::Timeline;
use crate::tracking;

/// High-level session binding a race catalog to a mutable tracker state.
#[derive(Debug, Clone)]
pub struct TrackerSession {
    catalog: Arc<RaceCatalog>,
    state: TrackerState,
}

impl TrackerSession {
    /// Start an empty session over `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<RaceCatalog>) -> Self {
        Self::from_state(catalog, TrackerState::new())
    }

    /// Session over the bundled catalog.
    #[must_use]
    pub fn with_builtin_catalog() -> Self {
        Self::new(Arc::new(RaceCatalog::builtin().clone()))
    }

    #[must_use]
    pub const fn from_state(catalog: Arc<RaceCatalog>, state: TrackerState) -> Self {
        Self { catalog, state }
    }

    /// Rebuild a session from a snapshot, validating it against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot does not fit the catalog.
    pub fn from_snapshot(
        catalog: Arc<RaceCatalog>,
        snapshot: &Snapshot,
    ) -> Result<Self, SnapshotError> {
        let state = snapshot.restore(&catalog)?;
        Ok(Self::from_state(catalog, state))
    }

    #[must_use]
    pub fn catalog(&self) -> &RaceCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn shared_catalog(&self) -> Arc<RaceCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn races(&self) -> &[Race] {
        self.catalog.races()
    }

    /// Borrow the underlying tracker state.
    #[must_use]
    pub const fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Consume the session, returning the underlying state.
    #[must_use]
    pub fn into_state(self) -> TrackerState {
        self.state
    }

    /// # Errors
    ///
    /// See [`TrackerState::toggle_participation`].
    pub fn toggle_participation(&mut self, id: RaceId) -> Result<bool, StateError> {
        self.state.toggle_participation(&self.catalog, id)
    }

    /// # Errors
    ///
    /// See [`TrackerState::toggle_win_loss`].
    pub fn toggle_win_loss(&mut self, id: RaceId) -> Result<Outcome, StateError> {
        self.state.toggle_win_loss(&self.catalog, id)
    }

    /// # Errors
    ///
    /// See [`TrackerState::place_in_slot`].
    pub fn place_in_slot(&mut self, id: RaceId, slot: SlotKey) -> Result<Placement, StateError> {
        self.state.place_in_slot(&self.catalog, id, slot)
    }

    pub fn clear_slot(&mut self, slot: SlotKey) -> Option<RaceId> {
        self.state.clear_slot(slot)
    }

    pub fn clear_year(&mut self, year: Year) -> Vec<RaceId> {
        self.state.clear_year(year)
    }

    pub fn clear_active_year(&mut self) -> Vec<RaceId> {
        self.state.clear_active_year()
    }

    pub fn clear_all(&mut self) {
        self.state.clear_all();
    }

    pub fn set_tracked_rule(&mut self, rule: Option<RuleId>) -> Option<RuleId> {
        self.state.set_tracked_rule(rule)
    }

    /// Toggle tracking by rule id string.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownRule`] when the id names no rule.
    pub fn track_rule_by_id(&mut self, id: &str) -> Result<Option<RuleId>, StateError> {
        let rule = id
            .parse::<RuleId>()
            .map_err(|()| StateError::UnknownRule(id.to_string()))?;
        Ok(self.set_tracked_rule(Some(rule)))
    }

    pub const fn set_active_year(&mut self, year: Year) {
        self.state.set_active_year(year);
    }

    #[must_use]
    pub fn timeline(&self) -> Timeline {
        Timeline::build(self.state.planner(), self.state.selection())
    }

    #[must_use]
    pub fn evaluate_all_rules(&self) -> Vec<RuleResult> {
        rules::evaluate_all(&self.catalog, self.state.selection(), self.state.planner())
    }

    #[must_use]
    pub fn evaluate_rule(&self, rule: RuleId) -> RuleResult {
        let ctx = rules::EvalContext::new(&self.catalog, self.state.selection(), self.state.planner());
        rules::evaluate(rule, &ctx)
    }

    #[must_use]
    pub fn relevant_race_ids(&self, rule: RuleId) -> Option<BTreeSet<RaceId>> {
        tracking::relevant_race_ids(&self.catalog, rule)
    }

    /// Races relevant to the tracked rule, if one is tracked and trackable.
    #[must_use]
    pub fn tracked_race_ids(&self) -> Option<BTreeSet<RaceId>> {
        self.state
            .tracked_rule()
            .and_then(|rule| self.relevant_race_ids(rule))
    }

    #[must_use]
    pub fn is_race_tracked(&self, id: RaceId) -> bool {
        tracking::is_race_tracked(&self.catalog, self.state.tracked_rule(), id)
    }

    #[must_use]
    pub fn is_slot_tracked(&self, slot: SlotKey) -> bool {
        tracking::is_slot_tracked(&self.catalog, self.state.tracked_rule(), slot)
    }

    #[must_use]
    pub fn serialize(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Replace the whole state with `snapshot`. On error the current state is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot does not fit the catalog.
    pub fn deserialize(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        match snapshot.restore(&self.catalog) {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(err) => {
                log::warn!("rejected snapshot: {err}");
                Err(err)
            }
        }
    }
}
