// CLASSIFICATION: COMMUNITY
// Filename: adapt.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Adaptive responder. Turns a [`ResponseAction`] into signal files for the
//! morph driver and the shell front-end, and tracks the adaptive mode.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use log::{info, warn};

use crate::config::{AdaptConfig, SignalPaths};
use crate::error::StateResult;
use crate::signals::{self, BlocklistEntry, EmergencySignal};

use super::patterns::AttackPattern;
use super::{AttackerProfile, ResponseAction};

pub const MIN_MORPH_FREQUENCY: u32 = 1;
pub const MAX_MORPH_FREQUENCY: u32 = 24 * 60;
const HIGH_ALERT_MINUTES: u32 = 30;

#[derive(Debug)]
pub struct AdaptiveResponder {
    paths: SignalPaths,
    settings: AdaptConfig,
    morph_frequency_minutes: u32,
    command_delay_ms: u32,
    emergency_mode: bool,
}

impl AdaptiveResponder {
    pub fn new(paths: SignalPaths, settings: AdaptConfig) -> Self {
        let morph_frequency_minutes = settings
            .default_morph_frequency_minutes
            .clamp(MIN_MORPH_FREQUENCY, MAX_MORPH_FREQUENCY);
        Self {
            paths,
            settings,
            morph_frequency_minutes,
            command_delay_ms: 0,
            emergency_mode: false,
        }
    }

    pub fn morph_frequency_minutes(&self) -> u32 {
        self.morph_frequency_minutes
    }

    pub fn command_delay_ms(&self) -> u32 {
        self.command_delay_ms
    }

    pub fn in_emergency_mode(&self) -> bool {
        self.emergency_mode
    }

    /// Request an immediate morph from the driver.
    pub fn trigger_emergency_morph(&mut self, now: i64) -> StateResult<()> {
        warn!("coordinated attack detected, requesting emergency morph");
        signals::write_emergency_signal(&self.paths.emergency_morph, &EmergencySignal::coordinated(now))?;
        self.emergency_mode = true;
        Ok(())
    }

    /// Set the scheduled morph cadence, clamped to one minute .. one day.
    pub fn increase_morphing_frequency(&mut self, minutes: u32, now: i64) -> StateResult<u32> {
        let minutes = minutes.clamp(MIN_MORPH_FREQUENCY, MAX_MORPH_FREQUENCY);
        warn!("morphing frequency changed to every {} minutes", minutes);
        signals::write_morph_frequency(&self.paths.morph_frequency, minutes, now)?;
        self.morph_frequency_minutes = minutes;
        if minutes <= HIGH_ALERT_MINUTES {
            warn!("HIGH ALERT: morphing every {} minutes due to active threat", minutes);
        }
        Ok(minutes)
    }

    pub fn add_command_delays(&mut self, delay_ms: u32, now: i64) -> StateResult<()> {
        warn!("adding {} ms delays to command responses", delay_ms);
        signals::append_command_delay(&self.paths.command_delay, delay_ms, now)?;
        self.command_delay_ms = delay_ms;
        Ok(())
    }

    /// Put `ip` on the blocklist read by the shell front-end.
    pub fn simulate_errors_for_attacker(&mut self, ip: &str, now: i64) -> StateResult<()> {
        warn!("adding attacker {} to error simulation list", ip);
        signals::append_blocklist(
            &self.paths.attacker_blocklist,
            &BlocklistEntry {
                ip: ip.into(),
                timestamp: now,
                reason: "coordinated_attack".into(),
            },
        )
    }

    /// Append an intelligence record to `intel_dir/attack-intel-<now>.log`.
    pub fn log_attack_intelligence(
        &self,
        pattern: &AttackPattern,
        attacker: &AttackerProfile,
        now: i64,
    ) -> StateResult<PathBuf> {
        fs::create_dir_all(&self.paths.intel_dir)?;
        let path = self.paths.intel_dir.join(format!("attack-intel-{now}.log"));
        let record = format!(
            "=== Attack Intelligence ===\n\
             Timestamp: {now}\n\
             Attacker IP: {}\n\
             Pattern: {}\n\
             Severity: {}/10\n\
             Occurrences: {}\n\
             Attacker Attempts: {}\n\
             Successful Exploits: {}\n\
             Coordinated: {}\n\n",
            attacker.ip,
            pattern.name,
            pattern.severity,
            pattern.occurrence_count,
            attacker.total_attempts,
            attacker.successful_exploits,
            if attacker.is_coordinated { "YES" } else { "NO" },
        );
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        f.write_all(record.as_bytes())?;
        Ok(path)
    }

    /// Back to normal cadence with no delay. Signal files are left alone.
    pub fn reset(&mut self) {
        self.emergency_mode = false;
        self.morph_frequency_minutes = self
            .settings
            .default_morph_frequency_minutes
            .clamp(MIN_MORPH_FREQUENCY, MAX_MORPH_FREQUENCY);
        self.command_delay_ms = 0;
        info!("emergency mode disabled, returning to normal operation");
    }

    /// Carry out `action` against the attackers that produced it.
    pub fn apply(&mut self, action: ResponseAction, attackers: &[AttackerProfile], now: i64) -> StateResult<()> {
        match action {
            ResponseAction::None => {}
            ResponseAction::IncreaseMorphFrequency => {
                self.increase_morphing_frequency(self.settings.elevated_morph_frequency_minutes, now)?;
                if attackers.iter().any(|a| a.is_coordinated) {
                    self.trigger_emergency_morph(now)?;
                }
            }
            ResponseAction::AddDelays => {
                self.add_command_delays(self.settings.command_delay_ms, now)?;
            }
            ResponseAction::FakeErrors => {
                for a in attackers {
                    self.simulate_errors_for_attacker(&a.ip, now)?;
                }
            }
            ResponseAction::Disconnect => {
                for a in attackers.iter().filter(|a| a.is_coordinated) {
                    self.simulate_errors_for_attacker(&a.ip, now)?;
                }
            }
            ResponseAction::HoneypotLock => {
                self.trigger_emergency_morph(now)?;
                for a in attackers {
                    self.simulate_errors_for_attacker(&a.ip, now)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn responder(dir: &std::path::Path) -> AdaptiveResponder {
        AdaptiveResponder::new(SignalPaths::in_dir(dir), AdaptConfig::default())
    }

    #[test]
    fn frequency_is_clamped() {
        let dir = tempdir().unwrap();
        let mut r = responder(dir.path());
        assert_eq!(r.increase_morphing_frequency(0, 1).unwrap(), 1);
        assert_eq!(r.increase_morphing_frequency(5000, 2).unwrap(), 1440);
        let paths = SignalPaths::in_dir(dir.path());
        assert_eq!(signals::read_morph_frequency(&paths.morph_frequency).unwrap(), Some(1440));
    }

    #[test]
    fn rapid_morph_with_coordination_sets_emergency() {
        let dir = tempdir().unwrap();
        let mut r = responder(dir.path());
        let mut a = AttackerProfile::new("10.1.1.1", 100);
        a.is_coordinated = true;
        r.apply(ResponseAction::IncreaseMorphFrequency, &[a], 100).unwrap();
        assert!(r.in_emergency_mode());
        assert_eq!(r.morph_frequency_minutes(), 15);
        assert!(SignalPaths::in_dir(dir.path()).emergency_morph.exists());
        r.reset();
        assert!(!r.in_emergency_mode());
        assert_eq!(r.morph_frequency_minutes(), 360);
        assert_eq!(r.command_delay_ms(), 0);
    }

    #[test]
    fn disconnect_blocks_only_coordinated() {
        let dir = tempdir().unwrap();
        let mut r = responder(dir.path());
        let mut a = AttackerProfile::new("10.1.1.1", 0);
        a.is_coordinated = true;
        let b = AttackerProfile::new("10.1.1.2", 0);
        r.apply(ResponseAction::Disconnect, &[a, b], 5).unwrap();
        let list = signals::read_blocklist(&SignalPaths::in_dir(dir.path()).attacker_blocklist).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].ip, "10.1.1.1");
    }

    #[test]
    fn intel_record_written() {
        let dir = tempdir().unwrap();
        let r = responder(dir.path());
        let pattern = AttackPattern::new("brute_force", &["Invalid user"], 0);
        let attacker = AttackerProfile::new("192.0.2.7", 0);
        let path = r.log_attack_intelligence(&pattern, &attacker, 77).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.starts_with("=== Attack Intelligence ===\n"));
        assert!(text.contains("Attacker IP: 192.0.2.7\n"));
        assert!(text.contains("Severity: 5/10\n"));
        assert!(text.contains("Coordinated: NO\n"));
    }
}
