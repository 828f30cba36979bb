//! Rules that count won or entered races by attribute or by name.
use std::collections::{BTreeSet, HashSet};

use super::{EvalContext, RuleId, RuleResult, count};
use crate::calendar::{Half, Month, Year};
use crate::catalog::{DistanceCategory, Grade, Race, RaceCatalog, Region, Surface, SummerSeries};
use crate::constants::{
    DISTINCT_TRACKS_REQUIRED, JEWELRY_RACES, JEWELRY_WINS_REQUIRED, NEW_YEAR_RACES,
    NEWSPAPER_CUPS, PERFECT_CROWN, PERFECT_SERIES_REQUIRED, PERFECT_TIARA, PerfectSeries,
    REGIONAL_G1_WINS_REQUIRED, STAR_RACE_WINS_REQUIRED, STAR_RACES, SUMMER_SERIES_WINS_REQUIRED,
};

pub(crate) fn is_regional_g1(catalog: &RaceCatalog, race: &Race, region: Region) -> bool {
    race.grade == Grade::G1 && catalog.region_of(&race.track) == Some(region)
}

/// The senior-year January 1st-half running of a New Year race.
pub(crate) fn is_new_year_instance(race: &Race) -> bool {
    NEW_YEAR_RACES.contains(&race.name.as_str())
        && race.is_eligible(Year::Senior)
        && race.month == Month::January
        && race.half == Half::First
}

pub(super) fn regional_g1(ctx: &EvalContext<'_>, rule: RuleId, region: Region) -> RuleResult {
    let names: Vec<&str> = ctx
        .won_races()
        .filter(|race| is_regional_g1(ctx.catalog, race, region))
        .map(|race| race.name.as_str())
        .collect();
    let label = match region {
        Region::Eastern => "Eastern",
        Region::Western => "Western",
    };
    RuleResult::from_counts(
        rule,
        count(names.len()),
        REGIONAL_G1_WINS_REQUIRED,
        format!("{label} G1 wins: {}", names.join(", ")),
    )
}

pub(super) fn traveler(ctx: &EvalContext<'_>) -> RuleResult {
    let tracks: BTreeSet<&str> = ctx
        .participated_races()
        .map(|race| race.track.as_str())
        .collect();
    RuleResult::from_counts(
        RuleId::Traveler,
        count(tracks.len()),
        DISTINCT_TRACKS_REQUIRED,
        format!(
            "Racecourses: {}",
            tracks.into_iter().collect::<Vec<_>>().join(", ")
        ),
    )
}

pub(super) fn all_ranks(ctx: &EvalContext<'_>) -> RuleResult {
    let won: HashSet<DistanceCategory> = ctx.won_races().map(Race::distance_category).collect();
    let categories: Vec<&str> = DistanceCategory::ALL
        .into_iter()
        .filter(|category| won.contains(category))
        .map(DistanceCategory::as_str)
        .collect();
    RuleResult::from_counts(
        RuleId::AllRanksConquered,
        count(categories.len()),
        count(DistanceCategory::ALL.len()),
        format!("Categories won: {}", categories.join(", ")),
    )
}

fn named_wins<'n>(
    ctx: &EvalContext<'_>,
    rule: RuleId,
    names: impl IntoIterator<Item = &'n str>,
    required: u32,
) -> RuleResult {
    let won = ctx.won_names(names);
    RuleResult::from_counts(
        rule,
        count(won.len()),
        required,
        format!("Won: {}", won.join(", ")),
    )
}

pub(super) fn newspaper_cups(ctx: &EvalContext<'_>) -> RuleResult {
    named_wins(
        ctx,
        RuleId::NewspaperBoy,
        NEWSPAPER_CUPS,
        count(NEWSPAPER_CUPS.len()),
    )
}

pub(super) fn summer_series(ctx: &EvalContext<'_>, rule: RuleId, series: SummerSeries) -> RuleResult {
    named_wins(
        ctx,
        rule,
        ctx.catalog.series_names(series),
        SUMMER_SERIES_WINS_REQUIRED,
    )
}

pub(super) fn star_races(ctx: &EvalContext<'_>) -> RuleResult {
    named_wins(ctx, RuleId::WishUponStar, STAR_RACES, STAR_RACE_WINS_REQUIRED)
}

pub(super) fn jewelry(ctx: &EvalContext<'_>) -> RuleResult {
    named_wins(ctx, RuleId::Jewelry, JEWELRY_RACES, JEWELRY_WINS_REQUIRED)
}

pub(super) fn years_plan(ctx: &EvalContext<'_>) -> RuleResult {
    let qualified: BTreeSet<&str> = ctx
        .won_races()
        .filter(|race| is_new_year_instance(race))
        .map(|race| race.name.as_str())
        .collect();
    RuleResult::from_counts(
        RuleId::YearsPlan,
        count(qualified.len()),
        1,
        format!(
            "Qualified wins: {}",
            qualified.into_iter().collect::<Vec<_>>().join(", ")
        ),
    )
}

pub(super) fn dual_wielder(ctx: &EvalContext<'_>) -> RuleResult {
    let surfaces: HashSet<Surface> = ctx.won_races().map(|race| race.surface).collect();
    let labels: Vec<&str> = [Surface::Turf, Surface::Dirt]
        .into_iter()
        .filter(|surface| surfaces.contains(surface))
        .map(Surface::as_str)
        .collect();
    RuleResult::from_counts(
        RuleId::DualWielder,
        count(labels.len()),
        2,
        format!("Surfaces: {}", labels.join(", ")),
    )
}

/// Triple wins plus one point per trial group with at least one win.
fn perfect_series(ctx: &EvalContext<'_>, rule: RuleId, series: &PerfectSeries, label: &str) -> RuleResult {
    let triple = ctx.won_names(series.triple);
    let groups: Vec<Vec<&str>> = series
        .trial_groups
        .iter()
        .map(|group| ctx.won_names(group.iter().copied()))
        .collect();
    let groups_hit = groups.iter().filter(|won| !won.is_empty()).count();

    let trials = groups
        .iter()
        .zip(['A', 'B', 'C'])
        .map(|(won, tag)| format!("{tag}:{}", won.join("/")))
        .collect::<Vec<_>>()
        .join(" ");

    RuleResult::from_counts(
        rule,
        count(triple.len() + groups_hit),
        PERFECT_SERIES_REQUIRED,
        format!("{label}: {} | Trials {trials}", triple.join(", ")),
    )
}

pub(super) fn perfect_crown(ctx: &EvalContext<'_>) -> RuleResult {
    perfect_series(ctx, RuleId::PerfectCrown, &PERFECT_CROWN, "Crown")
}

pub(super) fn perfect_tiara(ctx: &EvalContext<'_>) -> RuleResult {
    perfect_series(ctx, RuleId::PerfectTiara, &PERFECT_TIARA, "Tiara")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerGrid;
    use crate::selection::Selection;

    fn won_by_name(catalog: &RaceCatalog, names: &[&str]) -> Selection {
        let mut selection = Selection::new();
        for name in names {
            let id = catalog.ids_for_name(name)[0];
            selection.enter(id);
        }
        selection
    }

    #[test]
    fn either_kyoto_kinen_satisfies_the_name() {
        let catalog = RaceCatalog::builtin();
        let ids = catalog.ids_for_name("Kyoto Kinen");
        assert!(ids.len() >= 2);
        for id in ids {
            let mut selection = Selection::new();
            selection.enter(*id);
            let ctx = EvalContext::new(catalog, &selection, &PlannerGrid::new());
            assert!(ctx.name_won("Kyoto Kinen"));
        }
    }

    #[test]
    fn years_plan_requires_the_january_senior_instance() {
        let catalog = RaceCatalog::builtin();
        let january = catalog
            .ids_for_name("Kyoto Kinen")
            .iter()
            .copied()
            .find(|id| catalog.get(*id).is_some_and(is_new_year_instance))
            .unwrap();
        let february = catalog
            .ids_for_name("Kyoto Kinen")
            .iter()
            .copied()
            .find(|id| *id != january)
            .unwrap();

        let mut selection = Selection::new();
        selection.enter(february);
        let ctx = EvalContext::new(catalog, &selection, &PlannerGrid::new());
        assert!(!years_plan(&ctx).completed);

        selection.enter(january);
        let ctx = EvalContext::new(catalog, &selection, &PlannerGrid::new());
        let result = years_plan(&ctx);
        assert!(result.completed);
        assert_eq!(result.current, 1);
    }

    #[test]
    fn lost_races_do_not_count_toward_named_groups() {
        let catalog = RaceCatalog::builtin();
        let mut selection = won_by_name(catalog, &["Diamond Stakes", "Opal Stakes"]);
        let turquoise = catalog.ids_for_name("Turquoise Stakes")[0];
        selection.enter(turquoise);
        selection.toggle(turquoise);

        let ctx = EvalContext::new(catalog, &selection, &PlannerGrid::new());
        let result = jewelry(&ctx);
        assert_eq!(result.current, 2);
        assert!(!result.completed);
    }

    #[test]
    fn perfect_crown_counts_groups_not_trials() {
        let catalog = RaceCatalog::builtin();
        let selection = won_by_name(
            catalog,
            &[
                "Satsuki Sho",
                "Japan Derby",
                "Yayoi Sho",
                "Spring Stakes",
                "Wakaba Stakes",
                "Principal Stakes",
            ],
        );
        let ctx = EvalContext::new(catalog, &selection, &PlannerGrid::new());
        let partial = perfect_crown(&ctx);
        assert_eq!(partial.current, 4);
        assert!(!partial.completed);

        let selection = won_by_name(
            catalog,
            &[
                "Satsuki Sho",
                "Japan Derby",
                "Kikka Sho",
                "Wakaba Stakes",
                "Aoba Sho",
                "Saint Lite Kinen",
            ],
        );
        let ctx = EvalContext::new(catalog, &selection, &PlannerGrid::new());
        let complete = perfect_crown(&ctx);
        assert_eq!(complete.current, 6);
        assert!(complete.completed);
    }

    #[test]
    fn traveler_counts_entered_tracks_regardless_of_result() {
        let catalog = RaceCatalog::builtin();
        let mut selection = Selection::new();
        let mut tracks = HashSet::new();
        for race in catalog.iter() {
            if tracks.insert(race.track.clone()) {
                selection.enter(race.id);
                selection.toggle(race.id);
            }
            if tracks.len() == 7 {
                break;
            }
        }
        let ctx = EvalContext::new(catalog, &selection, &PlannerGrid::new());
        let result = traveler(&ctx);
        assert_eq!(result.current, 7);
        assert!(result.completed);
    }

    #[test]
    fn dual_wielder_needs_both_surfaces() {
        let catalog = RaceCatalog::builtin();
        let turf = catalog.iter().find(|r| r.surface == Surface::Turf).unwrap().id;
        let dirt = catalog.iter().find(|r| r.surface == Surface::Dirt).unwrap().id;
        let mut selection = Selection::new();
        selection.enter(turf);
        let ctx = EvalContext::new(catalog, &selection, &PlannerGrid::new());
        assert_eq!(dual_wielder(&ctx).current, 1);

        selection.enter(dirt);
        let ctx = EvalContext::new(catalog, &selection, &PlannerGrid::new());
        assert!(dual_wielder(&ctx).completed);
    }
}
