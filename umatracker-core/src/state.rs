//! Tracker state and the mutation operations that keep selection and planner
//! in step with each other.
//!
//! Every mutation validates the race id against the catalog first and either
//! applies fully or returns an error without touching anything.
use std::collections::BTreeSet;
use thiserror::Error;

use crate::calendar::{SlotKey, Year};
use crate::catalog::{Race, RaceCatalog, RaceId};
use crate::planner::{Placement, PlannerGrid};
use crate::rules::RuleId;
use crate::selection::{Outcome, Selection};

/// Rejected mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("race {0} is not in the catalog")]
    UnknownRace(RaceId),
    #[error("race {0} has not been entered")]
    NotParticipating(RaceId),
    #[error("race {race} cannot be scheduled in {slot}")]
    SlotMismatch { race: RaceId, slot: SlotKey },
    #[error("unknown hidden factor `{0}`")]
    UnknownRule(String),
}

/// Selection, planner and view settings for one tracking session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerState {
    selection: Selection,
    planner: PlannerGrid,
    active_year: Year,
    tracked_rule: Option<RuleId>,
}

impl TrackerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        selection: Selection,
        planner: PlannerGrid,
        active_year: Year,
        tracked_rule: Option<RuleId>,
    ) -> Self {
        Self {
            selection,
            planner,
            active_year,
            tracked_rule,
        }
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub const fn planner(&self) -> &PlannerGrid {
        &self.planner
    }

    #[must_use]
    pub const fn active_year(&self) -> Year {
        self.active_year
    }

    #[must_use]
    pub const fn tracked_rule(&self) -> Option<RuleId> {
        self.tracked_rule
    }

    fn lookup<'c>(catalog: &'c RaceCatalog, id: RaceId) -> Result<&'c Race, StateError> {
        catalog.get(id).ok_or_else(|| {
            log::warn!("rejected operation on unknown race {id}");
            StateError::UnknownRace(id)
        })
    }

    /// Enter or withdraw a race.
    ///
    /// Entering marks it won and places it in its natural slot, evicting the
    /// previous occupant. Withdrawing removes it from the selection and from
    /// the planner. Returns whether the race is now entered.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownRace`] when the id is not in the catalog.
    pub fn toggle_participation(
        &mut self,
        catalog: &RaceCatalog,
        id: RaceId,
    ) -> Result<bool, StateError> {
        let race = Self::lookup(catalog, id)?;
        if self.selection.is_participating(id) {
            self.selection.retract(id);
            if let Some(slot) = self.planner.remove_race(id) {
                log::debug!("withdrew race {id}, cleared {slot}");
            }
            return Ok(false);
        }

        self.selection.enter(id);
        if let Some(slot) = race.natural_slot(self.active_year) {
            self.place_unchecked(slot, id);
        }
        Ok(true)
    }

    /// Flip an entered race between won and lost.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownRace`] for ids outside the catalog and
    /// [`StateError::NotParticipating`] when the race was never entered.
    pub fn toggle_win_loss(
        &mut self,
        catalog: &RaceCatalog,
        id: RaceId,
    ) -> Result<Outcome, StateError> {
        Self::lookup(catalog, id)?;
        self.selection.toggle(id).ok_or_else(|| {
            log::warn!("cannot toggle result of race {id}: not entered");
            StateError::NotParticipating(id)
        })
    }

    /// Put a race into a planner cell, entering it as won if needed. An
    /// already entered race keeps its result and moves out of its old cell.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownRace`] for ids outside the catalog and
    /// [`StateError::SlotMismatch`] when the race does not run in that cell.
    pub fn place_in_slot(
        &mut self,
        catalog: &RaceCatalog,
        id: RaceId,
        slot: SlotKey,
    ) -> Result<Placement, StateError> {
        let race = Self::lookup(catalog, id)?;
        if !race.fits_slot(slot) {
            log::warn!("race {id} ({}) does not run in {slot}", race.name);
            return Err(StateError::SlotMismatch { race: id, slot });
        }
        self.selection.enter(id);
        Ok(self.place_unchecked(slot, id))
    }

    fn place_unchecked(&mut self, slot: SlotKey, id: RaceId) -> Placement {
        let placement = self.planner.place(slot, id);
        if let Some(from) = placement.moved_from {
            log::debug!("moved race {id} from {from} to {slot}");
        }
        if let Some(evicted) = placement.evicted {
            log::debug!("race {evicted} evicted from {slot} by race {id}");
            self.retract_if_orphaned(evicted);
        }
        placement
    }

    fn retract_if_orphaned(&mut self, id: RaceId) {
        if !self.planner.is_planned(id) && self.selection.retract(id).is_some() {
            log::debug!("retracted orphaned race {id}");
        }
    }

    /// Empty one cell. The vacated race leaves the selection as well.
    pub fn clear_slot(&mut self, slot: SlotKey) -> Option<RaceId> {
        let vacated = self.planner.vacate(slot)?;
        self.retract_if_orphaned(vacated);
        Some(vacated)
    }

    /// Empty every cell of `year`, then drop every entered race that is no
    /// longer planned anywhere. Returns the races removed from the selection.
    pub fn clear_year(&mut self, year: Year) -> Vec<RaceId> {
        let vacated = self.planner.clear_year(year);
        log::debug!("cleared {} planner cells in {year}", vacated.len());
        self.sync_with_planner()
    }

    pub fn clear_active_year(&mut self) -> Vec<RaceId> {
        self.clear_year(self.active_year)
    }

    fn sync_with_planner(&mut self) -> Vec<RaceId> {
        let orphans: Vec<RaceId> = self
            .selection
            .participated()
            .filter(|id| !self.planner.is_planned(*id))
            .collect();
        for id in &orphans {
            self.selection.retract(*id);
        }
        if !orphans.is_empty() {
            log::debug!("retracted {} races no longer in the planner", orphans.len());
        }
        orphans
    }

    /// Drop every selection and planner entry.
    pub fn clear_all(&mut self) {
        self.selection.clear();
        self.planner.clear();
    }

    /// Track `rule`, or stop tracking when it is already tracked. Returns the
    /// rule tracked afterwards.
    pub fn set_tracked_rule(&mut self, rule: Option<RuleId>) -> Option<RuleId> {
        self.tracked_rule = if rule.is_some() && rule == self.tracked_rule {
            None
        } else {
            rule
        };
        self.tracked_rule
    }

    pub const fn set_active_year(&mut self, year: Year) {
        self.active_year = year;
    }

    /// Every planned race is entered and the planner index agrees with its
    /// cells.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.planner.is_indexed()
            && self
                .planner
                .filled()
                .all(|(_, id)| self.selection.is_participating(id))
    }

    /// Entered races that currently have no planner cell.
    #[must_use]
    pub fn unplanned(&self) -> BTreeSet<RaceId> {
        self.selection
            .participated()
            .filter(|id| !self.planner.is_planned(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Half, Month};

    fn catalog() -> &'static RaceCatalog {
        RaceCatalog::builtin()
    }

    fn id_named(name: &str) -> RaceId {
        catalog().ids_for_name(name)[0]
    }

    #[test]
    fn entering_places_race_in_natural_slot_as_won() {
        let mut state = TrackerState::new();
        let derby = id_named("Japan Derby");
        assert!(state.toggle_participation(catalog(), derby).unwrap());
        assert!(state.selection().is_won(derby));
        assert_eq!(
            state.planner().slot_of(derby),
            Some(SlotKey::new(Year::Classic, Month::May, Half::Second))
        );
        assert!(state.is_consistent());
    }

    #[test]
    fn withdrawing_cascades_out_of_planner() {
        let mut state = TrackerState::new();
        let derby = id_named("Japan Derby");
        state.toggle_participation(catalog(), derby).unwrap();
        state.toggle_win_loss(catalog(), derby).unwrap();
        assert!(!state.toggle_participation(catalog(), derby).unwrap());
        assert!(!state.selection().is_participating(derby));
        assert!(!state.planner().is_planned(derby));
        assert!(state.planner().is_empty());
    }

    #[test]
    fn entering_a_race_evicts_and_retracts_the_previous_occupant() {
        let mut state = TrackerState::new();
        let derby = id_named("Japan Derby");
        let oaks = id_named("Oaks");
        state.toggle_participation(catalog(), derby).unwrap();
        state.toggle_participation(catalog(), oaks).unwrap();
        assert!(!state.selection().is_participating(derby));
        assert!(state.selection().is_won(oaks));
        assert_eq!(state.planner().len(), 1);
    }

    #[test]
    fn active_year_breaks_natural_slot_ties() {
        let mut state = TrackerState::new();
        let arima = id_named("Arima Kinen");
        state.set_active_year(Year::Senior);
        state.toggle_participation(catalog(), arima).unwrap();
        assert_eq!(state.planner().slot_of(arima).map(|s| s.year), Some(Year::Senior));
    }

    #[test]
    fn unknown_race_is_rejected_without_mutation() {
        let mut state = TrackerState::new();
        let before = state.clone();
        assert_eq!(
            state.toggle_participation(catalog(), RaceId(9_999)),
            Err(StateError::UnknownRace(RaceId(9_999)))
        );
        assert_eq!(
            state.toggle_win_loss(catalog(), RaceId(9_999)),
            Err(StateError::UnknownRace(RaceId(9_999)))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn toggling_result_requires_participation() {
        let mut state = TrackerState::new();
        let derby = id_named("Japan Derby");
        assert_eq!(
            state.toggle_win_loss(catalog(), derby),
            Err(StateError::NotParticipating(derby))
        );
        state.toggle_participation(catalog(), derby).unwrap();
        assert_eq!(state.toggle_win_loss(catalog(), derby), Ok(Outcome::Lost));
        assert_eq!(state.toggle_win_loss(catalog(), derby), Ok(Outcome::Won));
    }

    #[test]
    fn place_in_slot_checks_calendar_and_year() {
        let mut state = TrackerState::new();
        let yasuda = id_named("Yasuda Kinen");
        let junior_june = SlotKey::new(Year::Junior, Month::June, Half::First);
        assert!(matches!(
            state.place_in_slot(catalog(), yasuda, junior_june),
            Err(StateError::SlotMismatch { .. })
        ));
        let wrong_month = SlotKey::new(Year::Senior, Month::July, Half::First);
        assert!(state.place_in_slot(catalog(), yasuda, wrong_month).is_err());
        assert!(state.selection().is_empty());
    }

    #[test]
    fn moving_a_race_keeps_its_result() {
        let mut state = TrackerState::new();
        let yasuda = id_named("Yasuda Kinen");
        let classic = SlotKey::new(Year::Classic, Month::June, Half::First);
        let senior = SlotKey::new(Year::Senior, Month::June, Half::First);
        state.place_in_slot(catalog(), yasuda, classic).unwrap();
        state.toggle_win_loss(catalog(), yasuda).unwrap();

        let placement = state.place_in_slot(catalog(), yasuda, senior).unwrap();
        assert_eq!(placement.moved_from, Some(classic));
        assert!(state.selection().is_lost(yasuda));
        assert_eq!(state.planner().get(classic), None);
        assert!(state.is_consistent());
    }

    #[test]
    fn clear_slot_retracts_the_race() {
        let mut state = TrackerState::new();
        let derby = id_named("Japan Derby");
        state.toggle_participation(catalog(), derby).unwrap();
        let slot = state.planner().slot_of(derby).unwrap();
        assert_eq!(state.clear_slot(slot), Some(derby));
        assert!(state.selection().is_empty());
        assert_eq!(state.clear_slot(slot), None);
    }

    #[test]
    fn clear_year_syncs_selection_with_planner() {
        let mut state = TrackerState::new();
        let hopeful = id_named("Hopeful Stakes");
        let derby = id_named("Japan Derby");
        state.toggle_participation(catalog(), hopeful).unwrap();
        state.toggle_participation(catalog(), derby).unwrap();

        state.set_active_year(Year::Junior);
        let removed = state.clear_active_year();
        assert_eq!(removed, vec![hopeful]);
        assert!(state.selection().is_participating(derby));
        assert!(state.is_consistent());
        assert!(state.unplanned().is_empty());
    }

    #[test]
    fn clear_all_is_idempotent() {
        let mut state = TrackerState::new();
        state
            .toggle_participation(catalog(), id_named("Japan Derby"))
            .unwrap();
        state.clear_all();
        let once = state.clone();
        state.clear_all();
        assert_eq!(state, once);
        assert!(state.selection().is_empty() && state.planner().is_empty());
    }

    #[test]
    fn tracking_the_same_rule_twice_clears_it() {
        let mut state = TrackerState::new();
        assert_eq!(state.set_tracked_rule(Some(RuleId::Jewelry)), Some(RuleId::Jewelry));
        assert_eq!(
            state.set_tracked_rule(Some(RuleId::ChampionEast)),
            Some(RuleId::ChampionEast)
        );
        assert_eq!(state.set_tracked_rule(Some(RuleId::ChampionEast)), None);
        assert_eq!(state.set_tracked_rule(None), None);
    }
}
