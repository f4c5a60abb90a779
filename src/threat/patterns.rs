// CLASSIFICATION: COMMUNITY
// Filename: patterns.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Attack signature library.

use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEVERITY: u32 = 5;
pub const MAX_PATTERNS: usize = 50;

const BRUTE_FORCE: [&str; 4] = [
    "Failed password for",
    "Invalid user",
    "Received disconnect",
    "Connection refused",
];

const EXPLOITATION: [&str; 5] = [
    "buffer overflow",
    "injection",
    "shellcode",
    "ROP gadget",
    "privilege escalation",
];

const RECONNAISSANCE: [&str; 6] = [
    "nmap",
    "masscan",
    "shodan",
    "censys",
    "port scan",
    "service discovery",
];

/// A named set of log signatures with occurrence tracking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackPattern {
    pub name: String,
    pub signatures: Vec<String>,
    /// 1 to 10.
    pub severity: u32,
    pub occurrence_count: u32,
    pub first_seen: i64,
    pub last_seen: i64,
}

impl AttackPattern {
    pub fn new(name: &str, signatures: &[&str], now: i64) -> Self {
        Self {
            name: name.into(),
            signatures: signatures.iter().map(|s| s.to_string()).collect(),
            severity: DEFAULT_SEVERITY,
            occurrence_count: 0,
            first_seen: now,
            last_seen: now,
        }
    }

    /// Case-insensitive signature match.
    pub fn matches(&self, line: &str) -> bool {
        let line = line.to_lowercase();
        self.signatures
            .iter()
            .any(|sig| line.contains(&sig.to_lowercase()))
    }

    /// Count one occurrence and escalate severity with volume.
    pub fn update(&mut self, now: i64) {
        self.occurrence_count = self.occurrence_count.saturating_add(1);
        self.last_seen = now;
        let escalated = match self.occurrence_count {
            n if n > 100 => 9,
            n if n > 50 => 8,
            n if n > 20 => 7,
            n if n > 10 => 6,
            _ => self.severity,
        };
        self.severity = self.severity.max(escalated);
    }
}

/// Ordered collection of patterns matched against log lines.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternLibrary {
    pub patterns: Vec<AttackPattern>,
}

impl PatternLibrary {
    /// Brute force, exploitation and reconnaissance signatures.
    pub fn builtin(now: i64) -> Self {
        Self {
            patterns: vec![
                AttackPattern::new("brute_force", &BRUTE_FORCE, now),
                AttackPattern::new("exploitation", &EXPLOITATION, now),
                AttackPattern::new("reconnaissance", &RECONNAISSANCE, now),
            ],
        }
    }

    /// Add a pattern; returns false when the library is full.
    pub fn add(&mut self, pattern: AttackPattern) -> bool {
        if self.patterns.len() >= MAX_PATTERNS {
            return false;
        }
        self.patterns.push(pattern);
        true
    }

    pub fn get(&self, name: &str) -> Option<&AttackPattern> {
        self.patterns.iter().find(|p| p.name == name)
    }

    /// Update every pattern matching `line`; returns their names.
    pub fn observe(&mut self, line: &str, now: i64) -> Vec<String> {
        let mut hits = Vec::new();
        for pattern in self.patterns.iter_mut().filter(|p| p.matches(line)) {
            pattern.update(now);
            hits.push(pattern.name.clone());
        }
        if !hits.is_empty() {
            debug!("log line matched {:?}", hits);
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_escalates() {
        let mut p = AttackPattern::new("x", &["boom"], 0);
        for t in 1..=10 {
            p.update(t);
        }
        assert_eq!(p.severity, 5);
        p.update(11);
        assert_eq!(p.severity, 6);
        for t in 12..=101 {
            p.update(t);
        }
        assert_eq!(p.severity, 9);
        assert_eq!(p.last_seen, 101);
    }

    #[test]
    fn library_matches_lines() {
        let mut lib = PatternLibrary::builtin(0);
        let hits = lib.observe("sshd[12]: Failed password for root from 1.2.3.4", 5);
        assert_eq!(hits, vec!["brute_force".to_string()]);
        assert!(lib.observe("GET /index.html", 6).is_empty());
        assert_eq!(lib.get("brute_force").unwrap().occurrence_count, 1);
        assert!(!lib.observe("Nmap scan report", 7).is_empty());
    }
}
