//! Chronological view of the planner used by the order-sensitive rules.
//!
//! "Before" and "after" mean planner position: junior through senior, January
//! 1st half through December 2nd half. The order in which the user filled the
//! slots plays no part.
use serde::Serialize;

use crate::calendar::SlotKey;
use crate::catalog::RaceId;
use crate::planner::PlannerGrid;
use crate::selection::{Outcome, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineCell {
    pub slot: SlotKey,
    pub race: Option<RaceId>,
    pub outcome: Option<Outcome>,
}

impl TimelineCell {
    #[must_use]
    pub const fn filled(&self) -> bool {
        self.race.is_some()
    }

    #[must_use]
    pub fn won(&self) -> bool {
        self.outcome == Some(Outcome::Won)
    }

    #[must_use]
    pub fn lost(&self) -> bool {
        self.outcome == Some(Outcome::Lost)
    }
}

/// All 72 planner cells in order, annotated with selection results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    cells: Vec<TimelineCell>,
}

impl Timeline {
    #[must_use]
    pub fn build(planner: &PlannerGrid, selection: &Selection) -> Self {
        let cells = planner
            .iter()
            .map(|(slot, race)| TimelineCell {
                slot,
                race,
                outcome: race.and_then(|id| selection.outcome(id)),
            })
            .collect();
        Self { cells }
    }

    #[must_use]
    pub fn cells(&self) -> &[TimelineCell] {
        &self.cells
    }

    /// Longest run of adjacent filled cells.
    #[must_use]
    pub fn max_consecutive_filled(&self) -> usize {
        self.longest_run(TimelineCell::filled)
    }

    /// Longest run of adjacent won cells. A lost or empty cell breaks it.
    #[must_use]
    pub fn max_consecutive_won(&self) -> usize {
        self.longest_run(TimelineCell::won)
    }

    /// Whether some lost cell is followed by a won cell later on.
    #[must_use]
    pub fn has_loss_then_win(&self) -> bool {
        let mut seen_loss = false;
        for cell in &self.cells {
            if seen_loss && cell.won() {
                return true;
            }
            seen_loss |= cell.lost();
        }
        false
    }

    #[must_use]
    pub fn any_won(&self) -> bool {
        self.cells.iter().any(TimelineCell::won)
    }

    #[must_use]
    pub fn any_lost(&self) -> bool {
        self.cells.iter().any(TimelineCell::lost)
    }

    fn longest_run(&self, pred: impl Fn(&TimelineCell) -> bool) -> usize {
        let mut best = 0;
        let mut current = 0;
        for cell in &self.cells {
            if pred(cell) {
                current += 1;
                best = best.max(current);
            } else {
                current = 0;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Half, Month, Year};

    fn grid_with(entries: &[(SlotKey, RaceId, Outcome)]) -> (PlannerGrid, Selection) {
        let mut planner = PlannerGrid::new();
        let mut selection = Selection::new();
        for (slot, id, outcome) in entries {
            planner.place(*slot, *id);
            selection.set_outcome(*id, *outcome);
        }
        (planner, selection)
    }

    fn junior(month: Month, half: Half) -> SlotKey {
        SlotKey::new(Year::Junior, month, half)
    }

    #[test]
    fn empty_timeline_has_every_slot_and_no_runs() {
        let timeline = Timeline::build(&PlannerGrid::new(), &Selection::new());
        assert_eq!(timeline.cells().len(), 72);
        assert_eq!(timeline.max_consecutive_filled(), 0);
        assert_eq!(timeline.max_consecutive_won(), 0);
        assert!(!timeline.has_loss_then_win());
    }

    #[test]
    fn filled_run_resets_on_gap() {
        let (planner, selection) = grid_with(&[
            (junior(Month::January, Half::First), RaceId(1), Outcome::Won),
            (junior(Month::January, Half::Second), RaceId(2), Outcome::Won),
            (junior(Month::March, Half::First), RaceId(3), Outcome::Won),
        ]);
        let timeline = Timeline::build(&planner, &selection);
        assert_eq!(timeline.max_consecutive_filled(), 2);
        assert_eq!(timeline.max_consecutive_won(), 2);
    }

    #[test]
    fn lost_cell_breaks_win_streak_but_not_run() {
        let (planner, selection) = grid_with(&[
            (junior(Month::May, Half::First), RaceId(1), Outcome::Won),
            (junior(Month::May, Half::Second), RaceId(2), Outcome::Lost),
            (junior(Month::June, Half::First), RaceId(3), Outcome::Won),
        ]);
        let timeline = Timeline::build(&planner, &selection);
        assert_eq!(timeline.max_consecutive_filled(), 3);
        assert_eq!(timeline.max_consecutive_won(), 1);
    }

    #[test]
    fn runs_continue_across_year_boundary() {
        let (planner, selection) = grid_with(&[
            (junior(Month::December, Half::Second), RaceId(1), Outcome::Won),
            (
                SlotKey::new(Year::Classic, Month::January, Half::First),
                RaceId(2),
                Outcome::Won,
            ),
        ]);
        let timeline = Timeline::build(&planner, &selection);
        assert_eq!(timeline.max_consecutive_won(), 2);
    }

    #[test]
    fn loss_must_come_before_win() {
        let (planner, selection) = grid_with(&[
            (junior(Month::March, Half::First), RaceId(1), Outcome::Lost),
            (junior(Month::March, Half::Second), RaceId(2), Outcome::Won),
        ]);
        assert!(Timeline::build(&planner, &selection).has_loss_then_win());

        let (planner, selection) = grid_with(&[
            (junior(Month::March, Half::First), RaceId(1), Outcome::Won),
            (junior(Month::March, Half::Second), RaceId(2), Outcome::Lost),
        ]);
        let timeline = Timeline::build(&planner, &selection);
        assert!(!timeline.has_loss_then_win());
        assert!(timeline.any_won() && timeline.any_lost());
    }

    #[test]
    fn cell_without_selection_result_is_filled_only() {
        let mut planner = PlannerGrid::new();
        planner.place(junior(Month::April, Half::First), RaceId(8));
        let timeline = Timeline::build(&planner, &Selection::new());
        let cell = timeline.cells()[junior(Month::April, Half::First).index()];
        assert!(cell.filled());
        assert!(!cell.won() && !cell.lost());
    }
}
