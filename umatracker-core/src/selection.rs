//! Selection state: which races were entered and how each one finished.
//!
//! Participation and result live in one map, so a race can never be both won
//! and lost, and a result can never exist without participation.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::RaceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    /// Two-state cycle: won → lost → won.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Won => Self::Lost,
            Self::Lost => Self::Won,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    entries: BTreeMap<RaceId, Outcome>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_participating(&self, id: RaceId) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn outcome(&self, id: RaceId) -> Option<Outcome> {
        self.entries.get(&id).copied()
    }

    #[must_use]
    pub fn is_won(&self, id: RaceId) -> bool {
        self.outcome(id) == Some(Outcome::Won)
    }

    #[must_use]
    pub fn is_lost(&self, id: RaceId) -> bool {
        self.outcome(id) == Some(Outcome::Lost)
    }

    /// Entered races in id order.
    pub fn participated(&self) -> impl Iterator<Item = RaceId> + '_ {
        self.entries.keys().copied()
    }

    pub fn won(&self) -> impl Iterator<Item = RaceId> + '_ {
        self.with_outcome(Outcome::Won)
    }

    pub fn lost(&self) -> impl Iterator<Item = RaceId> + '_ {
        self.with_outcome(Outcome::Lost)
    }

    fn with_outcome(&self, outcome: Outcome) -> impl Iterator<Item = RaceId> + '_ {
        self.entries
            .iter()
            .filter(move |(_, o)| **o == outcome)
            .map(|(id, _)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RaceId, Outcome)> + '_ {
        self.entries.iter().map(|(id, outcome)| (*id, *outcome))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enter a race with the default result (won). Returns `false` when the
    /// race was already entered, leaving its result alone.
    pub(crate) fn enter(&mut self, id: RaceId) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, Outcome::Won);
        true
    }

    pub(crate) fn set_outcome(&mut self, id: RaceId, outcome: Outcome) {
        self.entries.insert(id, outcome);
    }

    /// Flip the result of an entered race; `None` when not entered.
    pub(crate) fn toggle(&mut self, id: RaceId) -> Option<Outcome> {
        let outcome = self.entries.get_mut(&id)?;
        *outcome = outcome.toggled();
        Some(*outcome)
    }

    pub(crate) fn retract(&mut self, id: RaceId) -> Option<Outcome> {
        self.entries.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
