use std::sync::Arc;

use serde_json::json;
use umatracker_core::{
    EvalContext, Half, Month, RaceCatalog, RaceId, RuleId, SlotKey, Snapshot, TrackerSession, Year,
};

/// Every half-month gets one Pre-OP maiden race open to all three years.
fn maiden_catalog() -> Arc<RaceCatalog> {
    let races: Vec<_> = SlotKey::in_year(Year::Junior)
        .map(|slot| {
            json!({
                "id": 1000 + slot.calendar().index(),
                "name": format!("Maiden {}", slot.calendar()),
                "grade": "Pre-OP",
                "surface": "turf",
                "track": "Tokyo",
                "distance": 1600,
                "direction": "left",
                "month": slot.month,
                "half": slot.half,
                "years": ["junior", "classic", "senior"],
            })
        })
        .collect();
    let doc = json!({
        "tracks": [{ "name": "Tokyo", "region": "eastern" }],
        "races": races,
    });
    Arc::new(RaceCatalog::from_json(&doc.to_string()).unwrap())
}

fn maiden(month: Month, half: Half) -> RaceId {
    let index = SlotKey::new(Year::Junior, month, half).calendar().index();
    RaceId(1000 + u32::try_from(index).unwrap())
}

fn builtin_id(session: &TrackerSession, name: &str) -> RaceId {
    session.catalog().ids_for_name(name)[0]
}

#[test]
fn two_adjacent_runs_complete_the_consecutive_run_factor() {
    let mut session = TrackerSession::new(maiden_catalog());
    let jan_first = SlotKey::new(Year::Junior, Month::January, Half::First);
    let jan_second = SlotKey::new(Year::Junior, Month::January, Half::Second);
    session
        .place_in_slot(maiden(Month::January, Half::First), jan_first)
        .unwrap();
    session
        .place_in_slot(maiden(Month::January, Half::Second), jan_second)
        .unwrap();

    let timeline = session.timeline();
    assert_eq!(timeline.max_consecutive_filled(), 2);
    let result = session.evaluate_rule(RuleId::ConsecutiveRun);
    assert!(result.completed);
    assert_eq!(result.current, 2);
    assert!(!session.evaluate_rule(RuleId::ImprovesWithRacing).completed);
}

#[test]
fn loss_before_win_in_planner_order_means_never_give_up() {
    let mut session = TrackerSession::new(maiden_catalog());
    let march_first = SlotKey::new(Year::Junior, Month::March, Half::First);
    let march_second = SlotKey::new(Year::Junior, Month::March, Half::Second);
    let early = maiden(Month::March, Half::First);
    let late = maiden(Month::March, Half::Second);
    session.place_in_slot(early, march_first).unwrap();
    session.place_in_slot(late, march_second).unwrap();
    session.toggle_win_loss(early).unwrap();

    assert!(session.timeline().has_loss_then_win());
    let result = session.evaluate_rule(RuleId::NeverGiveUp);
    assert!(result.completed);
    assert_eq!(result.current, 2);

    // Swap results so the win comes first.
    session.toggle_win_loss(early).unwrap();
    session.toggle_win_loss(late).unwrap();
    assert!(!session.timeline().has_loss_then_win());
    let result = session.evaluate_rule(RuleId::NeverGiveUp);
    assert!(!result.completed);
    assert_eq!(result.current, 1);
}

#[test]
fn duplicate_race_names_resolve_through_every_id() {
    let session = TrackerSession::with_builtin_catalog();
    let kyoto = session.catalog().ids_for_name("Kyoto Kinen").to_vec();
    assert_eq!(kyoto.len(), 2);

    for id in &kyoto {
        let mut session = session.clone();
        session.toggle_participation(*id).unwrap();
        let state = session.state();
        let ctx = EvalContext::new(session.catalog(), state.selection(), state.planner());
        assert!(ctx.name_won("Kyoto Kinen"), "winning {id} should count");
    }

    // Either running of the Tokyo Shimbun Hai counts for the newspaper cups.
    for id in session.catalog().ids_for_name("Tokyo Shimbun Hai") {
        let mut session = session.clone();
        session.toggle_participation(*id).unwrap();
        assert_eq!(session.evaluate_rule(RuleId::NewspaperBoy).current, 1);
    }
}

#[test]
fn seventh_eastern_g1_win_completes_champion_east() {
    let mut session = TrackerSession::with_builtin_catalog();
    session.set_active_year(Year::Classic);
    let six = [
        "Satsuki Sho",
        "NHK Mile Cup",
        "Japan Derby",
        "Yasuda Kinen",
        "Tenno Sho (Autumn)",
        "Japan Cup",
    ];
    for name in six {
        let id = builtin_id(&session, name);
        assert!(session.toggle_participation(id).unwrap());
    }
    let result = session.evaluate_rule(RuleId::ChampionEast);
    assert_eq!(result.current, 6);
    assert!(!result.completed);

    let arima = builtin_id(&session, "Arima Kinen");
    session.toggle_participation(arima).unwrap();
    let result = session.evaluate_rule(RuleId::ChampionEast);
    assert_eq!(result.current, 7);
    assert!(result.completed);
    assert!((result.progress_percent - 100.0).abs() < f64::EPSILON);

    // A lost eastern G1 does not count.
    let hopeful = builtin_id(&session, "Hopeful Stakes");
    session.toggle_participation(hopeful).unwrap();
    session.toggle_win_loss(hopeful).unwrap();
    assert_eq!(session.evaluate_rule(RuleId::ChampionEast).current, 7);
}

const COUNT_RULES: [RuleId; 20] = [
    RuleId::ChampionEast,
    RuleId::ChampionWest,
    RuleId::Traveler,
    RuleId::AllRanksConquered,
    RuleId::NewspaperBoy,
    RuleId::SummerSprintSeries,
    RuleId::SummerMileSeries,
    RuleId::Summer2000Series,
    RuleId::YearsPlan,
    RuleId::WishUponStar,
    RuleId::Jewelry,
    RuleId::DualWielder,
    RuleId::PerfectCrown,
    RuleId::PerfectTiara,
    RuleId::RightAwakening,
    RuleId::LeftAwakening,
    RuleId::SpringAwakening,
    RuleId::SummerAwakening,
    RuleId::AutumnAwakening,
    RuleId::WinterAwakening,
];

/// Wins every catalog race that still has a free cell, so no earlier win is
/// evicted. Returns the final `current` of each count rule.
fn accumulate_wins(reversed: bool) -> Vec<u32> {
    let mut session = TrackerSession::with_builtin_catalog();
    let catalog = session.shared_catalog();
    let mut races: Vec<_> = catalog.races().iter().collect();
    if reversed {
        races.reverse();
    }

    let mut previous: Vec<_> = COUNT_RULES
        .iter()
        .map(|rule| session.evaluate_rule(*rule))
        .collect();
    for race in races {
        let free = race
            .years
            .iter()
            .map(|year| SlotKey::new(*year, race.month, race.half))
            .find(|slot| session.state().planner().get(*slot).is_none());
        let Some(slot) = free else { continue };
        session.place_in_slot(race.id, slot).unwrap();

        for (rule, before) in COUNT_RULES.iter().zip(previous.iter_mut()) {
            let after = session.evaluate_rule(*rule);
            assert!(after.current >= before.current, "{} lowered {rule}", race.name);
            assert!(!before.completed || after.completed, "{} undid {rule}", race.name);
            *before = after;
        }
    }
    previous.into_iter().map(|result| result.current).collect()
}

#[test]
fn count_rules_never_regress_as_wins_accumulate() {
    let forward = accumulate_wins(false);
    let backward = accumulate_wins(true);
    for (index, rule) in COUNT_RULES.iter().enumerate() {
        assert!(forward[index] > 0 || backward[index] > 0, "{rule} never moved");
    }
}

#[test]
fn withdrawing_a_race_removes_every_trace() {
    let mut session = TrackerSession::with_builtin_catalog();
    let derby = builtin_id(&session, "Japan Derby");
    session.toggle_participation(derby).unwrap();
    let slot = SlotKey::new(Year::Classic, Month::May, Half::Second);
    assert_eq!(session.state().planner().get(slot), Some(derby));
    assert!(session.state().selection().is_won(derby));

    session.toggle_participation(derby).unwrap();
    let selection = session.state().selection();
    assert!(!selection.is_participating(derby));
    assert!(!selection.is_won(derby) && !selection.is_lost(derby));
    assert!(session.state().planner().filled().all(|(_, id)| id != derby));
}

#[test]
fn clear_all_twice_matches_clear_all_once() {
    let mut session = TrackerSession::with_builtin_catalog();
    for name in ["Japan Derby", "Arima Kinen", "Hopeful Stakes"] {
        session.toggle_participation(builtin_id(&session, name)).unwrap();
    }
    session.clear_all();
    let once = session.state().clone();
    session.clear_all();
    assert_eq!(session.state(), &once);
    assert!(once.selection().is_empty());
    assert!(once.planner().is_empty());
}

#[test]
fn snapshot_json_round_trip_reproduces_the_session() {
    let mut session = TrackerSession::with_builtin_catalog();
    session.set_active_year(Year::Senior);
    for name in ["Yasuda Kinen", "Arima Kinen", "Kyoto Kinen"] {
        session.toggle_participation(builtin_id(&session, name)).unwrap();
    }
    session
        .toggle_win_loss(builtin_id(&session, "Arima Kinen"))
        .unwrap();
    session.set_tracked_rule(Some(RuleId::YearsPlan));

    let json = session.serialize().to_json().unwrap();
    let mut restored = TrackerSession::new(session.shared_catalog());
    restored.deserialize(&Snapshot::from_json(&json).unwrap()).unwrap();
    assert_eq!(restored.state(), session.state());
    assert_eq!(restored.evaluate_all_rules(), session.evaluate_all_rules());
}

#[test]
fn timeline_is_stable_between_mutations() {
    let mut session = TrackerSession::with_builtin_catalog();
    for name in ["Japan Derby", "Hopeful Stakes", "Arima Kinen"] {
        session.toggle_participation(builtin_id(&session, name)).unwrap();
    }
    let first = session.timeline();
    let second = session.timeline();
    assert_eq!(first, second);
    assert_eq!(first.cells().len(), 72);
    assert!(first.cells().windows(2).all(|pair| pair[0].slot < pair[1].slot));
}
