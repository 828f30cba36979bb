//! Planner grid: three career years of half-month slots, each holding at most
//! one race, with a reverse index so "where is this race planned" never needs
//! a scan.
use std::collections::{BTreeSet, HashMap};

use crate::calendar::{SlotKey, TOTAL_SLOTS, Year};
use crate::catalog::RaceId;

/// Result of writing a race into a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    /// Race that previously occupied the target slot.
    pub evicted: Option<RaceId>,
    /// Slot the placed race moved out of, if it was planned elsewhere.
    pub moved_from: Option<SlotKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerGrid {
    cells: [Option<RaceId>; TOTAL_SLOTS],
    placements: HashMap<RaceId, SlotKey>,
}

impl Default for PlannerGrid {
    fn default() -> Self {
        Self {
            cells: [None; TOTAL_SLOTS],
            placements: HashMap::new(),
        }
    }
}

impl PlannerGrid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, slot: SlotKey) -> Option<RaceId> {
        self.cells[slot.index()]
    }

    /// Slot currently holding the race.
    #[must_use]
    pub fn slot_of(&self, id: RaceId) -> Option<SlotKey> {
        self.placements.get(&id).copied()
    }

    #[must_use]
    pub fn is_planned(&self, id: RaceId) -> bool {
        self.placements.contains_key(&id)
    }

    /// Every slot in chronological order with its occupant.
    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, Option<RaceId>)> + '_ {
        SlotKey::all().map(|slot| (slot, self.get(slot)))
    }

    /// Occupied slots in chronological order.
    pub fn filled(&self) -> impl Iterator<Item = (SlotKey, RaceId)> + '_ {
        self.iter().filter_map(|(slot, id)| id.map(|id| (slot, id)))
    }

    pub fn year(&self, year: Year) -> impl Iterator<Item = (SlotKey, Option<RaceId>)> + '_ {
        SlotKey::in_year(year).map(|slot| (slot, self.get(slot)))
    }

    #[must_use]
    pub fn planned_ids(&self) -> BTreeSet<RaceId> {
        self.placements.keys().copied().collect()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Put a race into a slot. The previous occupant is evicted and the race
    /// leaves any slot it held before.
    pub(crate) fn place(&mut self, slot: SlotKey, id: RaceId) -> Placement {
        if self.get(slot) == Some(id) {
            return Placement::default();
        }
        let moved_from = self.remove_race(id);
        let evicted = self.vacate(slot);
        self.cells[slot.index()] = Some(id);
        self.placements.insert(id, slot);
        Placement { evicted, moved_from }
    }

    pub(crate) fn vacate(&mut self, slot: SlotKey) -> Option<RaceId> {
        let previous = self.cells[slot.index()].take()?;
        self.placements.remove(&previous);
        Some(previous)
    }

    pub(crate) fn remove_race(&mut self, id: RaceId) -> Option<SlotKey> {
        let slot = self.placements.remove(&id)?;
        self.cells[slot.index()] = None;
        Some(slot)
    }

    /// Empty every slot of one year, returning the races that were removed.
    pub(crate) fn clear_year(&mut self, year: Year) -> Vec<RaceId> {
        SlotKey::in_year(year)
            .filter_map(|slot| self.vacate(slot))
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.cells = [None; TOTAL_SLOTS];
        self.placements.clear();
    }

    /// Cells and reverse index agree with each other.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        let forward = self.filled().count();
        forward == self.placements.len()
            && self
                .placements
                .iter()
                .all(|(id, slot)| self.get(*slot) == Some(*id))
    }
}
