// CLASSIFICATION: COMMUNITY
// Filename: morph_atomicity.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use std::sync::Arc;
use std::thread;

use cerberus::profile::builtin_profiles;
use cerberus::utils::clock::ManualClock;
use cerberus::{SharedState, StateModel};

const NOW: i64 = 1_760_000_000;

/// Every snapshot must be exactly what its own profile, seed and morph time
/// generate: no processes from one morph next to the boot time of another.
#[test]
fn readers_never_see_partial_morph() {
    let _ = env_logger::builder().is_test(true).try_init();
    let profiles = builtin_profiles().to_vec();
    let state = StateModel::init_with(profiles[0].clone(), 1, NOW).unwrap();
    let shared = Arc::new(SharedState::with_clock(state, Arc::new(ManualClock::new(NOW))));

    let writer = {
        let shared = Arc::clone(&shared);
        let profiles = profiles.clone();
        thread::spawn(move || {
            for i in 0..60u32 {
                let profile = profiles[i as usize % profiles.len()].clone();
                shared.morph_to_profile(profile, Some(1000 + i)).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for _ in 0..40 {
                    let snap = shared.snapshot().unwrap();
                    let expected =
                        StateModel::init_with(snap.profile.clone(), snap.state_seed, snap.last_morph_time).unwrap();
                    assert_eq!(snap.boot_time, expected.boot_time);
                    assert_eq!(snap.hostname, expected.hostname);
                    let got: Vec<(u32, &str)> = snap.processes.iter().map(|p| (p.pid, p.name.as_str())).collect();
                    let want: Vec<(u32, &str)> =
                        expected.processes.iter().map(|p| (p.pid, p.name.as_str())).collect();
                    assert_eq!(got, want);
                    snap.check_invariants().unwrap();
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
}

#[test]
fn failed_morph_keeps_old_state() {
    let state = StateModel::init_with(builtin_profiles()[1].clone(), 4, NOW).unwrap();
    let shared = SharedState::with_clock(state, Arc::new(ManualClock::new(NOW)));
    let before = shared.snapshot().unwrap();
    let mut broken = builtin_profiles()[0].clone();
    broken.total_ram_kb = 0;
    assert!(shared.morph_to_profile(broken, Some(5)).is_err());
    assert_eq!(shared.snapshot().unwrap(), before);
}
