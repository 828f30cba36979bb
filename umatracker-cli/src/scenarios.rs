//! Scripted planning scenarios with expected hidden-factor outcomes.
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use umatracker_core::{RaceCatalog, RaceId, RuleId, TrackerSession, Year};

pub struct Scenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub active_year: Year,
    pub plan: fn(&mut TrackerSession) -> Result<()>,
    /// Rules and whether each must end up completed.
    pub expect: &'static [(RuleId, bool)],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub key: String,
    pub scenario_name: String,
    pub passed: bool,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

fn race(session: &TrackerSession, name: &str) -> Result<RaceId> {
    session
        .catalog()
        .ids_for_name(name)
        .first()
        .copied()
        .with_context(|| format!("race `{name}` is not in the catalog"))
}

fn enter(session: &mut TrackerSession, names: &[&str]) -> Result<()> {
    for name in names {
        let id = race(session, name)?;
        let entered = session.toggle_participation(id)?;
        ensure!(entered, "{name} was already entered");
    }
    Ok(())
}

fn plan_consecutive_runs(session: &mut TrackerSession) -> Result<()> {
    enter(session, &["NHK Mile Cup", "Japan Derby"])
}

fn plan_never_give_up(session: &mut TrackerSession) -> Result<()> {
    enter(session, &["NHK Mile Cup", "Japan Derby"])?;
    let nhk = race(session, "NHK Mile Cup")?;
    session.toggle_win_loss(nhk)?;
    Ok(())
}

fn plan_eastern_champion(session: &mut TrackerSession) -> Result<()> {
    enter(
        session,
        &[
            "Satsuki Sho",
            "NHK Mile Cup",
            "Japan Derby",
            "Yasuda Kinen",
            "Tenno Sho (Autumn)",
            "Japan Cup",
        ],
    )?;
    ensure!(
        !session.evaluate_rule(RuleId::ChampionEast).completed,
        "six eastern G1 wins should not be enough"
    );
    enter(session, &["Arima Kinen"])
}

fn plan_perfect_crown(session: &mut TrackerSession) -> Result<()> {
    enter(
        session,
        &[
            "Yayoi Sho",
            "Satsuki Sho",
            "Aoba Sho",
            "Japan Derby",
            "Kobe Shimbun Hai",
            "Kikka Sho",
        ],
    )
}

fn plan_jewelry(session: &mut TrackerSession) -> Result<()> {
    enter(session, &["Diamond Stakes", "Opal Stakes", "Turquoise Stakes"])
}

fn plan_new_year(session: &mut TrackerSession) -> Result<()> {
    let february_kyoto = session
        .races()
        .iter()
        .find(|r| r.name == "Kyoto Kinen" && r.month != umatracker_core::Month::January)
        .map(|r| r.id)
        .context("February Kyoto Kinen missing")?;
    session.toggle_participation(february_kyoto)?;
    ensure!(
        !session.evaluate_rule(RuleId::YearsPlan).completed,
        "the February running must not count"
    );
    enter(session, &["Nakayama Kinen"])
}

fn plan_dual_wielder(session: &mut TrackerSession) -> Result<()> {
    enter(session, &["February Stakes", "Japan Cup"])
}

fn plan_withdraw(session: &mut TrackerSession) -> Result<()> {
    enter(session, &["Japan Derby"])?;
    let derby = race(session, "Japan Derby")?;
    session.toggle_participation(derby)?;
    ensure!(session.state().selection().is_empty(), "selection not emptied");
    ensure!(session.state().planner().is_empty(), "planner not emptied");
    Ok(())
}

static SCENARIOS: [Scenario; 8] = [
    Scenario {
        key: "consecutive-runs",
        name: "Consecutive Runs",
        description: "Two back-to-back classic races in May",
        active_year: Year::Classic,
        plan: plan_consecutive_runs,
        expect: &[
            (RuleId::ConsecutiveRun, true),
            (RuleId::ConsecutiveWins, true),
            (RuleId::ImprovesWithRacing, false),
        ],
    },
    Scenario {
        key: "never-give-up",
        name: "Never Give Up",
        description: "Lose the NHK Mile Cup, then win the Derby",
        active_year: Year::Classic,
        plan: plan_never_give_up,
        expect: &[
            (RuleId::NeverGiveUp, true),
            (RuleId::ConsecutiveWins, false),
        ],
    },
    Scenario {
        key: "eastern-champion",
        name: "Eastern Champion",
        description: "Seven eastern G1 wins in the classic year",
        active_year: Year::Classic,
        plan: plan_eastern_champion,
        expect: &[
            (RuleId::ChampionEast, true),
            (RuleId::ChampionWest, false),
            (RuleId::LeftAwakening, false),
        ],
    },
    Scenario {
        key: "perfect-crown",
        name: "Perfect Crown",
        description: "Triple Crown plus one trial from each group",
        active_year: Year::Classic,
        plan: plan_perfect_crown,
        expect: &[
            (RuleId::PerfectCrown, true),
            (RuleId::PerfectTiara, false),
            (RuleId::NewspaperBoy, false),
        ],
    },
    Scenario {
        key: "jewelry",
        name: "Jewelry",
        description: "Diamond, Opal and Turquoise Stakes in the senior year",
        active_year: Year::Senior,
        plan: plan_jewelry,
        expect: &[(RuleId::Jewelry, true), (RuleId::WishUponStar, false)],
    },
    Scenario {
        key: "new-year-plan",
        name: "The Year's Plan",
        description: "Only the senior January New Year races count",
        active_year: Year::Senior,
        plan: plan_new_year,
        expect: &[(RuleId::YearsPlan, true)],
    },
    Scenario {
        key: "dual-wielder",
        name: "Dual Wielder",
        description: "Win on dirt and on turf",
        active_year: Year::Senior,
        plan: plan_dual_wielder,
        expect: &[(RuleId::DualWielder, true), (RuleId::Traveler, false)],
    },
    Scenario {
        key: "withdraw-cascade",
        name: "Withdraw Cascade",
        description: "Entering then withdrawing leaves no trace",
        active_year: Year::Classic,
        plan: plan_withdraw,
        expect: &[
            (RuleId::RebelliousSpirit, false),
            (RuleId::ConsecutiveRun, false),
        ],
    },
];

pub fn all_scenarios() -> &'static [Scenario] {
    &SCENARIOS
}

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    SCENARIOS.iter().map(|s| (s.key, s.description))
}

pub fn get_scenario(key: &str) -> Option<&'static Scenario> {
    let key = key.trim().to_lowercase();
    SCENARIOS.iter().find(|s| s.key == key)
}

/// Run `scenario` on a fresh session and compare every expected outcome.
pub fn run_scenario(scenario: &Scenario, catalog: Arc<RaceCatalog>) -> ScenarioResult {
    let start = Instant::now();
    let mut session = TrackerSession::new(catalog);
    session.set_active_year(scenario.active_year);

    let mut failures = Vec::new();
    match (scenario.plan)(&mut session) {
        Ok(()) => {
            for (rule, expected) in scenario.expect {
                let result = session.evaluate_rule(*rule);
                if result.completed != *expected {
                    failures.push(format!(
                        "{rule}: expected completed={expected}, got {}/{} ({})",
                        result.current, result.required, result.detail
                    ));
                }
            }
        }
        Err(err) => failures.push(format!("plan failed: {err:#}")),
    }
    if !session.state().is_consistent() {
        failures.push("planner references races outside the selection".to_string());
    }

    log::debug!("scenario {} finished with {} failures", scenario.key, failures.len());
    ScenarioResult {
        key: scenario.key.to_string(),
        scenario_name: scenario.name.to_string(),
        passed: failures.is_empty(),
        failures,
        duration: start.elapsed(),
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> Arc<RaceCatalog> {
        Arc::new(RaceCatalog::builtin().clone())
    }

    #[test]
    fn every_builtin_scenario_passes() {
        for scenario in all_scenarios() {
            let result = run_scenario(scenario, builtin());
            assert!(result.passed, "{}: {:?}", scenario.key, result.failures);
        }
    }

    #[test]
    fn scenario_keys_are_unique_and_case_insensitive() {
        let mut keys: Vec<_> = list_scenarios().map(|(key, _)| key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), all_scenarios().len());
        assert!(get_scenario(" Jewelry ").is_some());
        assert!(get_scenario("smoke").is_none());
    }

    #[test]
    fn missing_races_fail_the_plan() {
        let empty = Arc::new(RaceCatalog::default());
        let result = run_scenario(&SCENARIOS[0], empty);
        assert!(!result.passed);
        assert!(result.failures[0].contains("not in the catalog"));
    }
}
