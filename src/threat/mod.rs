// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Threat assessment over externally tracked attacker telemetry.
//!
//! This module scores attackers, flags coordinated pairs and maps the
//! resulting assessment to a [`ResponseAction`]. It performs no I/O; side
//! effects are applied by [`adapt::AdaptiveResponder`].

pub mod adapt;
pub mod patterns;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::ThreatConfig;

/// Patterns kept per attacker.
pub const MAX_ATTACKER_PATTERNS: usize = 10;

/// Telemetry for one source address.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackerProfile {
    pub ip: String,
    pub total_attempts: u32,
    pub failed_attempts: u32,
    pub successful_exploits: u32,
    pub first_contact: i64,
    pub last_contact: i64,
    pub is_coordinated: bool,
    /// Names of attack patterns attributed to this attacker.
    pub patterns: Vec<String>,
}

impl AttackerProfile {
    pub fn new(ip: &str, now: i64) -> Self {
        Self {
            ip: ip.into(),
            first_contact: now,
            last_contact: now,
            ..Self::default()
        }
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Attribute a pattern; duplicates and overflow are ignored.
    pub fn record_pattern(&mut self, name: &str, now: i64) {
        self.last_contact = self.last_contact.max(now);
        if self.patterns.len() < MAX_ATTACKER_PATTERNS && !self.patterns.iter().any(|p| p == name) {
            self.patterns.push(name.into());
        }
    }

    /// Count one attempt at `now`.
    pub fn record_attempt(&mut self, failed: bool, now: i64) {
        self.total_attempts = self.total_attempts.saturating_add(1);
        if failed {
            self.failed_attempts = self.failed_attempts.saturating_add(1);
        }
        self.last_contact = self.last_contact.max(now);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThreatAssessment {
    pub total_unique_attackers: usize,
    /// Coordinated attackers divided by two.
    pub coordinated_pairs: usize,
    /// Mean attacker score in `[0, 1]`.
    pub overall_level: f32,
    pub assessment_time: i64,
    pub should_trigger_rapid_morph: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseAction {
    None,
    IncreaseMorphFrequency,
    AddDelays,
    FakeErrors,
    Disconnect,
    HoneypotLock,
}

/// Weighted score in `[0, 1]`: attempt volume, exploits and coordination.
pub fn calculate_threat_score(attacker: &AttackerProfile, cfg: &ThreatConfig) -> f32 {
    let mut score = 0.0f32;
    if attacker.total_attempts > 0 {
        score += cfg.attempt_weight * attacker.total_attempts.min(100) as f32 / 100.0;
    }
    score += cfg.exploit_weight * attacker.successful_exploits as f32;
    if attacker.is_coordinated {
        score += cfg.coordination_bonus;
    }
    score.clamp(0.0, 1.0)
}

/// Flag attacker pairs whose last contacts fall inside the coordination
/// window and who both have attributed patterns. Flags only ever get set.
pub fn detect_coordination(attackers: &mut [AttackerProfile], cfg: &ThreatConfig) {
    for i in 0..attackers.len() {
        for j in (i + 1)..attackers.len() {
            let (a, b) = (&attackers[i], &attackers[j]);
            let close = (a.last_contact - b.last_contact).abs() < cfg.coordination_window_secs;
            if close && a.pattern_count() > 0 && b.pattern_count() > 0 {
                warn!("coordinated attack detected: {} and {}", a.ip, b.ip);
                attackers[i].is_coordinated = true;
                attackers[j].is_coordinated = true;
            }
        }
    }
}

pub fn is_coordinated_attack(attackers: &[AttackerProfile], cfg: &ThreatConfig) -> bool {
    attackers.iter().filter(|a| a.is_coordinated).count() >= cfg.min_coordinated_attackers
}

pub fn assess_threat_level(attackers: &[AttackerProfile], cfg: &ThreatConfig, now: i64) -> ThreatAssessment {
    if attackers.is_empty() {
        return ThreatAssessment {
            total_unique_attackers: 0,
            coordinated_pairs: 0,
            overall_level: 0.0,
            assessment_time: now,
            should_trigger_rapid_morph: false,
        };
    }
    let total: f32 = attackers.iter().map(|a| calculate_threat_score(a, cfg)).sum();
    let coordinated = attackers.iter().filter(|a| a.is_coordinated).count();
    let overall_level = total / attackers.len() as f32;
    let assessment = ThreatAssessment {
        total_unique_attackers: attackers.len(),
        coordinated_pairs: coordinated / 2,
        overall_level,
        assessment_time: now,
        should_trigger_rapid_morph: overall_level > cfg.rapid_morph_threshold
            || is_coordinated_attack(attackers, cfg),
    };
    info!(
        "threat assessment: {} attackers, {} pairs, level {:.2}, rapid morph {}",
        assessment.total_unique_attackers,
        assessment.coordinated_pairs,
        assessment.overall_level,
        assessment.should_trigger_rapid_morph
    );
    assessment
}

/// Highest-priority response for `assessment`.
pub fn get_appropriate_response(assessment: &ThreatAssessment, cfg: &ThreatConfig) -> ResponseAction {
    if assessment.should_trigger_rapid_morph {
        ResponseAction::IncreaseMorphFrequency
    } else if assessment.overall_level > cfg.fake_errors_threshold {
        ResponseAction::FakeErrors
    } else if assessment.overall_level > cfg.add_delays_threshold {
        ResponseAction::AddDelays
    } else if assessment.coordinated_pairs > 0 {
        ResponseAction::Disconnect
    } else {
        ResponseAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attacker(ip: &str, attempts: u32, last: i64, patterns: usize) -> AttackerProfile {
        let mut a = AttackerProfile::new(ip, last);
        a.total_attempts = attempts;
        for i in 0..patterns {
            a.record_pattern(&format!("p{i}"), last);
        }
        a
    }

    #[test]
    fn score_caps_attempts() {
        let cfg = ThreatConfig::default();
        let a = attacker("1.1.1.1", 250, 0, 0);
        assert!((calculate_threat_score(&a, &cfg) - 1.0).abs() < f32::EPSILON);
        let b = attacker("1.1.1.2", 50, 0, 0);
        assert!((calculate_threat_score(&b, &cfg) - 0.5).abs() < 1e-6);
        let mut c = attacker("1.1.1.3", 10, 0, 0);
        c.successful_exploits = 2;
        c.is_coordinated = true;
        assert!((calculate_threat_score(&c, &cfg) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn coordination_needs_window_and_patterns() {
        let cfg = ThreatConfig::default();
        let mut list = vec![
            attacker("10.0.0.1", 5, 1_000, 1),
            attacker("10.0.0.2", 5, 1_100, 1),
            attacker("10.0.0.3", 5, 5_000, 1),
            attacker("10.0.0.4", 5, 1_050, 0),
        ];
        detect_coordination(&mut list, &cfg);
        let flags: Vec<bool> = list.iter().map(|a| a.is_coordinated).collect();
        assert_eq!(flags, vec![true, true, false, false]);
        assert!(is_coordinated_attack(&list, &cfg));
    }

    #[test]
    fn empty_assessment_is_calm() {
        let cfg = ThreatConfig::default();
        let a = assess_threat_level(&[], &cfg, 7);
        assert_eq!(a.total_unique_attackers, 0);
        assert_eq!(get_appropriate_response(&a, &cfg), ResponseAction::None);
    }

    #[test]
    fn response_priority() {
        let cfg = ThreatConfig::default();
        let mut a = ThreatAssessment {
            total_unique_attackers: 3,
            coordinated_pairs: 1,
            overall_level: 0.9,
            assessment_time: 0,
            should_trigger_rapid_morph: true,
        };
        assert_eq!(get_appropriate_response(&a, &cfg), ResponseAction::IncreaseMorphFrequency);
        a.should_trigger_rapid_morph = false;
        assert_eq!(get_appropriate_response(&a, &cfg), ResponseAction::FakeErrors);
        a.overall_level = 0.55;
        assert_eq!(get_appropriate_response(&a, &cfg), ResponseAction::AddDelays);
        a.overall_level = 0.2;
        assert_eq!(get_appropriate_response(&a, &cfg), ResponseAction::Disconnect);
        a.coordinated_pairs = 0;
        assert_eq!(get_appropriate_response(&a, &cfg), ResponseAction::None);
    }

    #[test]
    fn window_is_configurable() {
        let cfg = ThreatConfig {
            coordination_window_secs: 30,
            ..ThreatConfig::default()
        };
        let mut list = vec![attacker("a", 1, 0, 1), attacker("b", 1, 100, 1)];
        detect_coordination(&mut list, &cfg);
        assert!(!list[0].is_coordinated);
    }
}
