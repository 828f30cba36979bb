//! Race projections for trackable rules, used to highlight races and planner
//! cells that can contribute to the tracked factor.
use std::collections::BTreeSet;

use crate::calendar::{Season, SlotKey};
use crate::catalog::{Direction, Race, RaceCatalog, RaceId, Region, SummerSeries};
use crate::constants::{JEWELRY_RACES, NEWSPAPER_CUPS, PERFECT_CROWN, PERFECT_TIARA, STAR_RACES};
use crate::rules::{RuleId, is_new_year_instance, is_regional_g1};

fn ids_where(catalog: &RaceCatalog, pred: impl Fn(&Race) -> bool) -> BTreeSet<RaceId> {
    catalog
        .iter()
        .filter(|race| pred(*race))
        .map(|race| race.id)
        .collect()
}

/// Every catalog race that can count toward `rule`, or `None` when the rule
/// has no race projection.
#[must_use]
pub fn relevant_race_ids(catalog: &RaceCatalog, rule: RuleId) -> Option<BTreeSet<RaceId>> {
    let ids = match rule {
        RuleId::ChampionEast => ids_where(catalog, |r| is_regional_g1(catalog, r, Region::Eastern)),
        RuleId::ChampionWest => ids_where(catalog, |r| is_regional_g1(catalog, r, Region::Western)),
        RuleId::NewspaperBoy => catalog.ids_for_names(NEWSPAPER_CUPS),
        RuleId::SummerSprintSeries => series_ids(catalog, SummerSeries::Sprint),
        RuleId::SummerMileSeries => series_ids(catalog, SummerSeries::Mile),
        RuleId::Summer2000Series => series_ids(catalog, SummerSeries::S2000),
        RuleId::YearsPlan => ids_where(catalog, is_new_year_instance),
        RuleId::WishUponStar => catalog.ids_for_names(STAR_RACES),
        RuleId::Jewelry => catalog.ids_for_names(JEWELRY_RACES),
        RuleId::DualWielder => ids_where(catalog, |_| true),
        RuleId::PerfectCrown => catalog.ids_for_names(PERFECT_CROWN.all_names()),
        RuleId::PerfectTiara => catalog.ids_for_names(PERFECT_TIARA.all_names()),
        RuleId::RightAwakening => ids_where(catalog, |r| r.direction == Direction::Right),
        RuleId::LeftAwakening => ids_where(catalog, |r| r.direction == Direction::Left),
        RuleId::SpringAwakening => ids_where(catalog, |r| r.season() == Season::Spring),
        RuleId::SummerAwakening => ids_where(catalog, |r| r.season() == Season::Summer),
        RuleId::AutumnAwakening => ids_where(catalog, |r| r.season() == Season::Autumn),
        RuleId::WinterAwakening => ids_where(catalog, |r| r.season() == Season::Winter),
        RuleId::ConsecutiveRun
        | RuleId::ConsecutiveWins
        | RuleId::ImprovesWithRacing
        | RuleId::NeverGiveUp
        | RuleId::Traveler
        | RuleId::AllRanksConquered
        | RuleId::RebelliousSpirit => return None,
    };
    Some(ids)
}

fn series_ids(catalog: &RaceCatalog, series: SummerSeries) -> BTreeSet<RaceId> {
    catalog.ids_for_names(catalog.series_names(series))
}

#[must_use]
pub fn is_race_tracked(catalog: &RaceCatalog, tracked: Option<RuleId>, id: RaceId) -> bool {
    tracked
        .and_then(|rule| relevant_race_ids(catalog, rule))
        .is_some_and(|ids| ids.contains(&id))
}

/// A planner cell is tracked when some relevant race may be scheduled there.
#[must_use]
pub fn is_slot_tracked(catalog: &RaceCatalog, tracked: Option<RuleId>, slot: SlotKey) -> bool {
    let Some(ids) = tracked.and_then(|rule| relevant_race_ids(catalog, rule)) else {
        return false;
    };
    ids.iter()
        .filter_map(|id| catalog.get(*id))
        .any(|race| race.fits_slot(slot))
}
