use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use umatracker_core::{RaceId, RuleId, SlotKey, Snapshot, TrackerSession, TrackerState, Year};

const STEPS: usize = 600;

fn assert_invariants(state: &TrackerState, step: usize) {
    let selection = state.selection();
    for id in selection.won().chain(selection.lost()) {
        assert!(selection.is_participating(id), "step {step}: {id} has a result but no entry");
    }
    assert!(
        selection.won().all(|id| !selection.is_lost(id)),
        "step {step}: race both won and lost"
    );
    assert!(state.is_consistent(), "step {step}: planner references an unentered race");
}

fn random_slot(rng: &mut ChaCha8Rng) -> SlotKey {
    let index = rng.gen_range(0..72);
    SlotKey::all().nth(index).unwrap()
}

fn random_year(rng: &mut ChaCha8Rng) -> Year {
    Year::ALL[rng.gen_range(0..Year::ALL.len())]
}

fn run_sweep(seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut session = TrackerSession::with_builtin_catalog();
    let ids: Vec<RaceId> = session.races().iter().map(|race| race.id).collect();

    for step in 0..STEPS {
        let before = session.state().clone();
        let id = if rng.gen_bool(0.05) {
            RaceId(50_000 + rng.gen_range(0..100))
        } else {
            ids[rng.gen_range(0..ids.len())]
        };

        let rejected = match rng.gen_range(0..100) {
            0..=34 => session.toggle_participation(id).is_err(),
            35..=54 => session.toggle_win_loss(id).is_err(),
            55..=74 => {
                let slot = random_slot(&mut rng);
                session.place_in_slot(id, slot).is_err()
            }
            75..=84 => {
                session.clear_slot(random_slot(&mut rng));
                false
            }
            85..=89 => {
                session.clear_year(random_year(&mut rng));
                false
            }
            90..=94 => {
                session.set_active_year(random_year(&mut rng));
                false
            }
            95..=98 => {
                let rule = RuleId::ALL[rng.gen_range(0..RuleId::ALL.len())];
                session.set_tracked_rule(Some(rule));
                false
            }
            _ => {
                session.clear_all();
                false
            }
        };

        if rejected {
            assert_eq!(session.state(), &before, "step {step}: rejected call mutated state");
        }
        assert_invariants(session.state(), step);

        if step % 50 == 0 {
            let json = session.serialize().to_json().unwrap();
            let snapshot = Snapshot::from_json(&json).unwrap();
            let restored = TrackerSession::from_snapshot(session.shared_catalog(), &snapshot)
                .unwrap_or_else(|err| panic!("step {step}: round trip failed: {err}"));
            assert_eq!(restored.state(), session.state());
        }

        for result in session.evaluate_all_rules() {
            assert_eq!(result.completed, result.current >= result.required);
            assert!((0.0..=100.0).contains(&result.progress_percent));
        }
    }
}

#[test]
fn random_mutations_preserve_selection_invariants() {
    for seed in [0xBEEF, 0x5EED_1234, 7] {
        run_sweep(seed);
    }
}
