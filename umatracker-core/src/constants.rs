//! Hidden-factor thresholds and the named race groups the rules count.

pub const REGIONAL_G1_WINS_REQUIRED: u32 = 7;
pub const DISTINCT_TRACKS_REQUIRED: u32 = 7;
pub const AWAKENING_WINS_REQUIRED: u32 = 6;
pub const SUMMER_SERIES_WINS_REQUIRED: u32 = 3;
pub const STAR_RACE_WINS_REQUIRED: u32 = 3;
pub const JEWELRY_WINS_REQUIRED: u32 = 3;
pub const CONSECUTIVE_RUNS_REQUIRED: u32 = 2;
pub const CONSECUTIVE_WINS_REQUIRED: u32 = 2;
pub const IMPROVES_WITH_RACING_REQUIRED: u32 = 3;
pub const NEVER_GIVE_UP_REQUIRED: u32 = 2;
pub const PERFECT_SERIES_REQUIRED: u32 = 6;

pub const NEWSPAPER_CUPS: [&str; 4] = [
    "Kyoto Shimbun Hai",
    "Kobe Shimbun Hai",
    "Chunichi Shimbun Hai",
    "Tokyo Shimbun Hai",
];

pub const STAR_RACES: [&str; 8] = [
    "Procyon Stakes",
    "Capella Stakes",
    "Centaur Stakes",
    "Aldebaran Stakes",
    "Rigel Stakes",
    "Betelgeuse Stakes",
    "Cassiopeia Stakes",
    "Sirius Stakes",
];

pub const JEWELRY_RACES: [&str; 3] = ["Diamond Stakes", "Turquoise Stakes", "Opal Stakes"];

/// Races that count toward "The Year's Plan" when won as a senior-eligible
/// January 1st-half instance.
pub const NEW_YEAR_RACES: [&str; 2] = ["Nakayama Kinen", "Kyoto Kinen"];

/// Marquee triple plus three disjoint trial groups.
#[derive(Debug, Clone, Copy)]
pub struct PerfectSeries {
    pub triple: [&'static str; 3],
    pub trial_groups: [&'static [&'static str]; 3],
}

pub const PERFECT_CROWN: PerfectSeries = PerfectSeries {
    triple: ["Satsuki Sho", "Japan Derby", "Kikka Sho"],
    trial_groups: [
        &["Yayoi Sho", "Spring Stakes", "Wakaba Stakes"],
        &["Aoba Sho", "Principal Stakes"],
        &["Kobe Shimbun Hai", "Saint Lite Kinen"],
    ],
};

pub const PERFECT_TIARA: PerfectSeries = PerfectSeries {
    triple: ["Oka Sho", "Oaks", "Akika Sho"],
    trial_groups: [
        &["Fillies Review", "Tulip Sho", "Anemone Stakes"],
        &["Flora Stakes", "Sweet Pea Stakes"],
        &["Rose Stakes", "Shion Stakes"],
    ],
};

impl PerfectSeries {
    /// Every race name the series counts, triple first.
    pub fn all_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.triple
            .iter()
            .copied()
            .chain(self.trial_groups.iter().flat_map(|group| group.iter().copied()))
    }
}

/// Number of save slots offered to the storage layer.
pub const SAVE_SLOT_COUNT: u8 = 6;
