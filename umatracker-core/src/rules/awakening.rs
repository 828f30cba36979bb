//! Directional and seasonal awakenings: six wins sharing one attribute.
use super::{EvalContext, RuleId, RuleResult, count};
use crate::calendar::Season;
use crate::catalog::{Direction, Race};
use crate::constants::AWAKENING_WINS_REQUIRED;

fn matching_wins(
    ctx: &EvalContext<'_>,
    rule: RuleId,
    label: &str,
    pred: impl Fn(&Race) -> bool,
) -> RuleResult {
    let names: Vec<&str> = ctx
        .won_races()
        .filter(|race| pred(*race))
        .map(|race| race.name.as_str())
        .collect();
    RuleResult::from_counts(
        rule,
        count(names.len()),
        AWAKENING_WINS_REQUIRED,
        format!("{label} wins: {}", names.join(", ")),
    )
}

pub(super) fn directional(ctx: &EvalContext<'_>, rule: RuleId, direction: Direction) -> RuleResult {
    let label = format!("{direction}-handed");
    matching_wins(ctx, rule, &label, |race| race.direction == direction)
}

pub(super) fn seasonal(ctx: &EvalContext<'_>, rule: RuleId, season: Season) -> RuleResult {
    matching_wins(ctx, rule, season.as_str(), |race| race.season() == season)
}
