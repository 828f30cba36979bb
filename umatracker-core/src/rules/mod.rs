//! Hidden-factor rule catalog and evaluation.
//!
//! Every rule is a pure function of the catalog, the selection and the planner
//! timeline. Results are recomputed from scratch on each call.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::Season;
use crate::catalog::{Direction, Race, RaceCatalog, Region, SummerSeries};
use crate::planner::PlannerGrid;
use crate::selection::Selection;
use crate::timeline::Timeline;

mod awakening;
mod race_based;
mod special;

pub(crate) use race_based::{is_new_year_instance, is_regional_g1};

/// Stable identifier of a hidden factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    ConsecutiveRun,
    ChampionEast,
    ChampionWest,
    Traveler,
    AllRanksConquered,
    NewspaperBoy,
    SummerSprintSeries,
    SummerMileSeries,
    #[serde(rename = "summer_2000_series")]
    Summer2000Series,
    YearsPlan,
    WishUponStar,
    Jewelry,
    DualWielder,
    PerfectCrown,
    PerfectTiara,
    ImprovesWithRacing,
    NeverGiveUp,
    ConsecutiveWins,
    RightAwakening,
    LeftAwakening,
    SpringAwakening,
    SummerAwakening,
    AutumnAwakening,
    WinterAwakening,
    RebelliousSpirit,
}

impl RuleId {
    pub const ALL: [Self; 25] = [
        Self::ConsecutiveRun,
        Self::ChampionEast,
        Self::ChampionWest,
        Self::Traveler,
        Self::AllRanksConquered,
        Self::NewspaperBoy,
        Self::SummerSprintSeries,
        Self::SummerMileSeries,
        Self::Summer2000Series,
        Self::YearsPlan,
        Self::WishUponStar,
        Self::Jewelry,
        Self::DualWielder,
        Self::PerfectCrown,
        Self::PerfectTiara,
        Self::ImprovesWithRacing,
        Self::NeverGiveUp,
        Self::ConsecutiveWins,
        Self::RightAwakening,
        Self::LeftAwakening,
        Self::SpringAwakening,
        Self::SummerAwakening,
        Self::AutumnAwakening,
        Self::WinterAwakening,
        Self::RebelliousSpirit,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.info().id
    }

    /// Static metadata for this rule.
    #[must_use]
    pub fn info(self) -> &'static RuleInfo {
        &RULES[self as usize]
    }

    #[must_use]
    pub fn is_trackable(self) -> bool {
        self.info().trackable
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s.trim())
            .ok_or(())
    }
}

/// Display metadata for one hidden factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub name_jp: &'static str,
    pub condition: &'static str,
    /// Whether a race projection exists for highlighting.
    pub trackable: bool,
}

const fn info(
    id: &'static str,
    name: &'static str,
    name_jp: &'static str,
    condition: &'static str,
    trackable: bool,
) -> RuleInfo {
    RuleInfo {
        id,
        name,
        name_jp,
        condition,
        trackable,
    }
}

/// Indexed by `RuleId as usize`.
pub static RULES: [RuleInfo; 25] = [
    info("consecutive_run", "Consecutive Runs", "連戦連勝", "Race 2 races in a row.", false),
    info(
        "champion_east",
        "Champion of the East",
        "東の雄",
        "Win 7 or more G1 races held at tracks in eastern Japan (e.g., Tokyo, Nakayama).",
        true,
    ),
    info(
        "champion_west",
        "Champion of the West",
        "西の雄",
        "Win 7 or more G1 races held at tracks in western Japan (e.g., Kyoto, Hanshin).",
        true,
    ),
    info(
        "traveler",
        "Traveler",
        "旅人",
        "Compete at 7 or more different racecourses. Winning is not a requirement.",
        false,
    ),
    info(
        "all_ranks_conquered",
        "All Ranks Conquered",
        "全階級制覇",
        "Win at least one race in each distance category: Short, Mile, Medium, and Long.",
        false,
    ),
    info(
        "newspaper_boy",
        "Newspaper Boy/Girl",
        "新聞屋さん",
        "Win the four \"Shimbun Hai\" races: Kyoto, Kobe, Chunichi, and Tokyo Shimbun Hai.",
        true,
    ),
    info(
        "summer_sprint_series",
        "Summer Sprint Series",
        "SSS",
        "Win 3 races from the Summer Sprint Series.",
        true,
    ),
    info(
        "summer_mile_series",
        "Summer Mile Series",
        "SMS",
        "Win 3 races from the Summer Mile Series.",
        true,
    ),
    info(
        "summer_2000_series",
        "Summer 2000 Series",
        "S2000",
        "Win 3 races from the Summer 2000 Series.",
        true,
    ),
    info(
        "years_plan",
        "The Year's Plan",
        "一年の計は",
        "During the Senior year, win either the Nakayama Kinen or the Kyoto Kinen in January.",
        true,
    ),
    info(
        "wish_upon_star",
        "Wish Upon a Star",
        "星に願いを",
        "Win 3 or more races from the designated list of star or constellation-themed races.",
        true,
    ),
    info(
        "jewelry",
        "Jewelry",
        "ジュエリー",
        "Win 3 or more races from the designated list of jewelry-themed races.",
        true,
    ),
    info(
        "dual_wielder",
        "Dual Wielder",
        "二刀流",
        "Win on both turf and dirt.",
        true,
    ),
    info(
        "perfect_crown",
        "Perfect Crown",
        "パーフェクトクラウン",
        "Win the three Triple Crown races (Satsuki Sho, Japan Derby, Kikka Sho) and one trial race for each.",
        true,
    ),
    info(
        "perfect_tiara",
        "Perfect Tiara",
        "パーフェクトティアラ",
        "Win the three Triple Tiara races (Oka Sho, Oaks, Akika Sho) and one trial race for each.",
        true,
    ),
    info(
        "improves_with_racing",
        "Improves with Racing",
        "叩き良化型",
        "Run 3 consecutive races (reporter event not modeled).",
        false,
    ),
    info(
        "never_give_up",
        "Never-Give-Up Spirit",
        "諦めない心",
        "Lose a race, then win a later race in planner order.",
        false,
    ),
    info("consecutive_wins", "Consecutive Wins", "連勝", "Win 2 races in a row.", false),
    info(
        "right_awakening",
        "Right Awakening",
        "右の目覚め",
        "Win 6 or more races on right-handed tracks.",
        true,
    ),
    info(
        "left_awakening",
        "Left Awakening",
        "左の目覚め",
        "Win 6 or more races on left-handed tracks.",
        true,
    ),
    info(
        "spring_awakening",
        "Spring Awakening",
        "春の目覚め",
        "Win 6 or more races during spring.",
        true,
    ),
    info(
        "summer_awakening",
        "Summer Awakening",
        "夏の目覚め",
        "Win 6 or more races during summer.",
        true,
    ),
    info(
        "autumn_awakening",
        "Autumn Awakening",
        "秋の目覚め",
        "Win 6 or more races during autumn.",
        true,
    ),
    info(
        "winter_awakening",
        "Winter Awakening",
        "冬の目覚め",
        "Win 6 or more races during winter.",
        true,
    ),
    info(
        "rebellious_spirit",
        "Rebellious Spirit",
        "反骨精神",
        "Win a race with low aptitude (simplified: any win counts).",
        false,
    ),
];

/// Progress of one rule against the current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleResult {
    pub rule: RuleId,
    pub completed: bool,
    pub current: u32,
    pub required: u32,
    /// Display convenience, always within `0.0..=100.0`.
    pub progress_percent: f64,
    pub detail: String,
}

impl RuleResult {
    /// Build a result whose completion is derived from the counts.
    #[must_use]
    pub fn from_counts(rule: RuleId, current: u32, required: u32, detail: String) -> Self {
        let progress_percent = if required == 0 {
            100.0
        } else {
            (f64::from(current) / f64::from(required) * 100.0).clamp(0.0, 100.0)
        };
        Self {
            rule,
            completed: current >= required,
            current,
            required,
            progress_percent,
            detail,
        }
    }
}

/// Everything a rule may look at, with the timeline built once per pass.
#[derive(Debug, Clone)]
pub struct EvalContext<'a> {
    pub catalog: &'a RaceCatalog,
    pub selection: &'a Selection,
    pub timeline: Timeline,
}

impl<'a> EvalContext<'a> {
    #[must_use]
    pub fn new(catalog: &'a RaceCatalog, selection: &'a Selection, planner: &PlannerGrid) -> Self {
        Self {
            catalog,
            selection,
            timeline: Timeline::build(planner, selection),
        }
    }

    /// Won races that resolve in the catalog, in id order.
    pub fn won_races(&self) -> impl Iterator<Item = &'a Race> {
        let catalog = self.catalog;
        self.selection.won().filter_map(move |id| catalog.get(id))
    }

    pub fn participated_races(&self) -> impl Iterator<Item = &'a Race> {
        let catalog = self.catalog;
        self.selection
            .participated()
            .filter_map(move |id| catalog.get(id))
    }

    /// A name counts as won when any id carrying it was won.
    #[must_use]
    pub fn name_won(&self, name: &str) -> bool {
        self.catalog
            .ids_for_name(name)
            .iter()
            .any(|id| self.selection.is_won(*id))
    }

    /// Subset of `names` that has been won, in list order.
    pub fn won_names<'n, I>(&self, names: I) -> Vec<&'n str>
    where
        I: IntoIterator<Item = &'n str>,
    {
        names.into_iter().filter(|name| self.name_won(name)).collect()
    }
}

pub(crate) fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Evaluate a single rule.
#[must_use]
pub fn evaluate(rule: RuleId, ctx: &EvalContext<'_>) -> RuleResult {
    match rule {
        RuleId::ConsecutiveRun => special::consecutive_run(ctx),
        RuleId::ConsecutiveWins => special::consecutive_wins(ctx),
        RuleId::ImprovesWithRacing => special::improves_with_racing(ctx),
        RuleId::NeverGiveUp => special::never_give_up(ctx),
        RuleId::RebelliousSpirit => special::rebellious_spirit(ctx),
        RuleId::ChampionEast => race_based::regional_g1(ctx, rule, Region::Eastern),
        RuleId::ChampionWest => race_based::regional_g1(ctx, rule, Region::Western),
        RuleId::Traveler => race_based::traveler(ctx),
        RuleId::AllRanksConquered => race_based::all_ranks(ctx),
        RuleId::NewspaperBoy => race_based::newspaper_cups(ctx),
        RuleId::SummerSprintSeries => race_based::summer_series(ctx, rule, SummerSeries::Sprint),
        RuleId::SummerMileSeries => race_based::summer_series(ctx, rule, SummerSeries::Mile),
        RuleId::Summer2000Series => race_based::summer_series(ctx, rule, SummerSeries::S2000),
        RuleId::YearsPlan => race_based::years_plan(ctx),
        RuleId::WishUponStar => race_based::star_races(ctx),
        RuleId::Jewelry => race_based::jewelry(ctx),
        RuleId::DualWielder => race_based::dual_wielder(ctx),
        RuleId::PerfectCrown => race_based::perfect_crown(ctx),
        RuleId::PerfectTiara => race_based::perfect_tiara(ctx),
        RuleId::RightAwakening => awakening::directional(ctx, rule, Direction::Right),
        RuleId::LeftAwakening => awakening::directional(ctx, rule, Direction::Left),
        RuleId::SpringAwakening => awakening::seasonal(ctx, rule, Season::Spring),
        RuleId::SummerAwakening => awakening::seasonal(ctx, rule, Season::Summer),
        RuleId::AutumnAwakening => awakening::seasonal(ctx, rule, Season::Autumn),
        RuleId::WinterAwakening => awakening::seasonal(ctx, rule, Season::Winter),
    }
}

/// Evaluate every rule in catalog order.
#[must_use]
pub fn evaluate_all(
    catalog: &RaceCatalog,
    selection: &Selection,
    planner: &PlannerGrid,
) -> Vec<RuleResult> {
    let ctx = EvalContext::new(catalog, selection, planner);
    RuleId::ALL
        .into_iter()
        .map(|rule| evaluate(rule, &ctx))
        .collect()
}
