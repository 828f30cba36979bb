//! Timeline-driven rules plus the simplified aptitude placeholder.
use super::{EvalContext, RuleId, RuleResult, count};
use crate::constants::{
    CONSECUTIVE_RUNS_REQUIRED, CONSECUTIVE_WINS_REQUIRED, IMPROVES_WITH_RACING_REQUIRED,
    NEVER_GIVE_UP_REQUIRED,
};

/// Streak rules cap `current` at `required`; the raw streak goes in the detail.
fn streak(rule: RuleId, raw: usize, required: u32, detail: String) -> RuleResult {
    RuleResult::from_counts(rule, count(raw).min(required), required, detail)
}

pub(super) fn consecutive_run(ctx: &EvalContext<'_>) -> RuleResult {
    let raw = ctx.timeline.max_consecutive_filled();
    streak(
        RuleId::ConsecutiveRun,
        raw,
        CONSECUTIVE_RUNS_REQUIRED,
        format!("Max planned consecutive runs: {raw}"),
    )
}

pub(super) fn consecutive_wins(ctx: &EvalContext<'_>) -> RuleResult {
    let raw = ctx.timeline.max_consecutive_won();
    streak(
        RuleId::ConsecutiveWins,
        raw,
        CONSECUTIVE_WINS_REQUIRED,
        format!("Max planned consecutive wins: {raw}"),
    )
}

pub(super) fn improves_with_racing(ctx: &EvalContext<'_>) -> RuleResult {
    let raw = ctx.timeline.max_consecutive_filled();
    streak(
        RuleId::ImprovesWithRacing,
        raw,
        IMPROVES_WITH_RACING_REQUIRED,
        format!("Max planned consecutive runs: {raw} (reporter event not modeled)"),
    )
}

/// 2 when a loss precedes a later win, 1 with any decided race, else 0.
pub(super) fn never_give_up(ctx: &EvalContext<'_>) -> RuleResult {
    let timeline = &ctx.timeline;
    let completed = timeline.has_loss_then_win();
    let current = if completed {
        NEVER_GIVE_UP_REQUIRED
    } else if timeline.any_lost() || timeline.any_won() {
        1
    } else {
        0
    };
    let detail = if completed {
        "Loss occurs before a later win (planner order)"
    } else {
        "Need a loss followed by a later win (planner order)"
    };
    RuleResult::from_counts(
        RuleId::NeverGiveUp,
        current,
        NEVER_GIVE_UP_REQUIRED,
        detail.to_string(),
    )
}

pub(super) fn rebellious_spirit(ctx: &EvalContext<'_>) -> RuleResult {
    let any_win = ctx.selection.won().next().is_some();
    RuleResult::from_counts(
        RuleId::RebelliousSpirit,
        u32::from(any_win),
        1,
        "Simplified: any win counts (aptitude not modeled)".to_string(),
    )
}
