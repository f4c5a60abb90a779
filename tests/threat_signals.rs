// CLASSIFICATION: COMMUNITY
// Filename: threat_signals.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use std::sync::Arc;
use std::{env, fs};

use cerberus::config::EngineConfig;
use cerberus::driver::MorphDriver;
use cerberus::signals;
use cerberus::threat::adapt::AdaptiveResponder;
use cerberus::threat::patterns::PatternLibrary;
use cerberus::threat::{self, AttackerProfile, ResponseAction};
use cerberus::utils::clock::ManualClock;
use cerberus::{SharedState, StateModel};
use serial_test::serial;
use tempfile::tempdir;

const NOW: i64 = 1_760_000_000;

/// Config rooted in a temp dir through the environment overrides.
fn env_config(root: &std::path::Path) -> EngineConfig {
    env::set_var("CERBERUS_SIGNAL_DIR", root.join("signals"));
    env::set_var("CERBERUS_STATE_FILE", root.join("morph_state.conf"));
    let cfg = EngineConfig::load(None).unwrap();
    env::remove_var("CERBERUS_SIGNAL_DIR");
    env::remove_var("CERBERUS_STATE_FILE");
    cfg
}

fn attackers_from_logs(lines: &[(&str, &str, i64)]) -> Vec<AttackerProfile> {
    let mut library = PatternLibrary::builtin(NOW);
    let mut out: Vec<AttackerProfile> = Vec::new();
    for (ip, line, at) in lines {
        let hits = library.observe(line, *at);
        let idx = match out.iter().position(|a| a.ip == *ip) {
            Some(i) => i,
            None => {
                out.push(AttackerProfile::new(ip, *at));
                out.len() - 1
            }
        };
        out[idx].record_attempt(line.contains("Failed"), *at);
        for name in hits {
            out[idx].record_pattern(&name, *at);
        }
    }
    out
}

#[test]
#[serial]
fn coordinated_attack_drives_emergency_morph() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();
    let cfg = env_config(dir.path());

    let mut attackers = attackers_from_logs(&[
        ("198.51.100.7", "Failed password for root from 198.51.100.7", NOW),
        ("198.51.100.7", "Failed password for admin from 198.51.100.7", NOW + 2),
        ("203.0.113.3", "masscan sweep on port 23", NOW + 90),
    ]);
    threat::detect_coordination(&mut attackers, &cfg.threat);
    let assessment = threat::assess_threat_level(&attackers, &cfg.threat, NOW + 100);
    let action = threat::get_appropriate_response(&assessment, &cfg.threat);
    assert_eq!(action, ResponseAction::IncreaseMorphFrequency);

    let mut responder = AdaptiveResponder::new(cfg.signals(), cfg.adapt.clone());
    responder.apply(action, &attackers, NOW + 100).unwrap();
    assert!(responder.in_emergency_mode());

    let mut driver = MorphDriver::from_config(&cfg).unwrap();
    let clock = ManualClock::new(NOW + 110);
    let state = StateModel::init_with(driver.current_profile().clone(), 21, NOW).unwrap();
    let before = state.profile.name.clone();
    let shared = SharedState::with_clock(state, Arc::new(clock));

    let report = driver.poll(&shared).unwrap();
    assert!(report.emergency.is_some());
    assert_eq!(report.requested_frequency, Some(cfg.adapt.elevated_morph_frequency_minutes));
    let after = shared.read(|s| s.profile.name.clone()).unwrap();
    assert_ne!(before, after);
    assert!(!cfg.signals().emergency_morph.exists());
    assert_eq!(
        fs::read_to_string(&cfg.state_file).unwrap().trim(),
        "current_profile=1"
    );

    // A restarted driver resumes on the persisted profile.
    let resumed = MorphDriver::from_config(&cfg).unwrap();
    assert_eq!(resumed.current_profile().name, after);
}

#[test]
#[serial]
fn fake_errors_fill_blocklist() {
    let dir = tempdir().unwrap();
    let cfg = env_config(dir.path());
    let mut heavy = AttackerProfile::new("192.0.2.10", NOW);
    heavy.total_attempts = 90;
    let mut heavier = AttackerProfile::new("192.0.2.11", NOW + 4000);
    heavier.total_attempts = 100;
    let attackers = vec![heavy, heavier];

    let mut strict = cfg.threat.clone();
    strict.rapid_morph_threshold = 0.99;
    let assessment = threat::assess_threat_level(&attackers, &strict, NOW + 4000);
    let action = threat::get_appropriate_response(&assessment, &strict);
    assert_eq!(action, ResponseAction::FakeErrors);

    let mut responder = AdaptiveResponder::new(cfg.signals(), cfg.adapt.clone());
    responder.apply(action, &attackers, NOW + 4000).unwrap();
    let list = signals::read_blocklist(&cfg.signals().attacker_blocklist).unwrap();
    let ips: Vec<&str> = list.iter().map(|e| e.ip.as_str()).collect();
    assert_eq!(ips, vec!["192.0.2.10", "192.0.2.11"]);

    let mut driver = MorphDriver::from_config(&cfg).unwrap();
    let state = StateModel::init_with(driver.current_profile().clone(), 2, NOW).unwrap();
    let shared = SharedState::with_clock(state, Arc::new(ManualClock::new(NOW + 60)));
    let report = driver.poll(&shared).unwrap();
    assert_eq!(report.blocklist_size, 2);
    assert!(report.morphed_to.is_none());
}

#[test]
#[serial]
fn delays_recorded_in_behavior_file() {
    let dir = tempdir().unwrap();
    let cfg = env_config(dir.path());
    let mut responder = AdaptiveResponder::new(cfg.signals(), cfg.adapt.clone());
    responder.apply(ResponseAction::AddDelays, &[], NOW).unwrap();
    assert_eq!(responder.command_delay_ms(), 1500);
    assert_eq!(signals::read_command_delay(&cfg.signals().command_delay).unwrap(), Some(1500));
    responder.reset();
    assert_eq!(responder.command_delay_ms(), 0);
}
