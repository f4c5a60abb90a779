// CLASSIFICATION: COMMUNITY
// Filename: signals.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Signal artifacts: small `key=value` or line-oriented files through which
//! the threat responder, the morph driver and the shell front-end talk.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use log::{debug, info, warn};

use crate::error::{StateError, StateResult};

fn ensure_parent(path: &Path) -> StateResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn append(path: &Path, text: &str) -> StateResult<()> {
    ensure_parent(path)?;
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    f.write_all(text.as_bytes())?;
    Ok(())
}

/// Read a file, mapping "missing" to `None`.
fn read_optional(path: &Path) -> StateResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Last value of `key` in `key=value` text; `#` lines are comments.
pub fn config_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.starts_with('#'))
        .filter_map(|l| l.split_once('='))
        .filter(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim())
        .last()
}

/// Contents of an emergency-morph request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmergencySignal {
    pub timestamp: i64,
    pub reason: String,
    pub requested_by: String,
    pub priority: String,
}

impl EmergencySignal {
    pub fn coordinated(now: i64) -> Self {
        Self {
            timestamp: now,
            reason: "coordinated_attack_detected".into(),
            requested_by: "quorum_engine".into(),
            priority: "CRITICAL".into(),
        }
    }

    fn render(&self) -> String {
        format!(
            "# EMERGENCY MORPH SIGNAL\n\
             # This file triggers an immediate device profile change\n\
             timestamp={}\nreason={}\nrequested_by={}\npriority={}\n",
            self.timestamp, self.reason, self.requested_by, self.priority
        )
    }

    fn parse(text: &str) -> Self {
        let field = |key: &str| config_value(text, key).unwrap_or_default().to_string();
        Self {
            timestamp: config_value(text, "timestamp")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            reason: field("reason"),
            requested_by: field("requested_by"),
            priority: field("priority"),
        }
    }
}

pub fn write_emergency_signal(path: &Path, signal: &EmergencySignal) -> StateResult<()> {
    ensure_parent(path)?;
    fs::write(path, signal.render())?;
    info!("emergency morph signal written to {}", path.display());
    Ok(())
}

/// Consume the emergency signal if present. The file is removed before
/// returning, so each signal is acted on at most once.
pub fn take_emergency_signal(path: &Path) -> StateResult<Option<EmergencySignal>> {
    let Some(text) = read_optional(path)? else {
        return Ok(None);
    };
    match fs::remove_file(path) {
        Ok(()) => {}
        // Another poller won the race.
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let signal = EmergencySignal::parse(&text);
    if !signal.reason.contains("coordinated_attack") {
        warn!("emergency signal with unexpected reason {:?}", signal.reason);
    }
    debug!("emergency signal consumed from {}", path.display());
    Ok(Some(signal))
}

pub fn write_morph_frequency(path: &Path, minutes: u32, now: i64) -> StateResult<()> {
    ensure_parent(path)?;
    let reason = if minutes < 60 { "elevated_threat" } else { "normal_operation" };
    fs::write(
        path,
        format!(
            "# Morph frequency configuration\n# Generated at {now}\nfrequency_minutes={minutes}\nreason={reason}\n"
        ),
    )?;
    Ok(())
}

pub fn read_morph_frequency(path: &Path) -> StateResult<Option<u32>> {
    let Some(text) = read_optional(path)? else {
        return Ok(None);
    };
    match config_value(&text, "frequency_minutes") {
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| StateError::invalid(format!("bad frequency_minutes {v:?}"))),
        None => Ok(None),
    }
}

pub fn append_command_delay(path: &Path, delay_ms: u32, now: i64) -> StateResult<()> {
    append(
        path,
        &format!("# Command delay configuration\ncommand_delay_ms={delay_ms}\nupdated_at={now}\n"),
    )
}

/// Most recent delay appended to the behavior file.
pub fn read_command_delay(path: &Path) -> StateResult<Option<u32>> {
    Ok(read_optional(path)?
        .as_deref()
        .and_then(|t| config_value(t, "command_delay_ms"))
        .and_then(|v| v.parse().ok()))
}

/// One `ip|timestamp|reason` blocklist line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlocklistEntry {
    pub ip: String,
    pub timestamp: i64,
    pub reason: String,
}

pub fn append_blocklist(path: &Path, entry: &BlocklistEntry) -> StateResult<()> {
    if entry.ip.contains('|') || entry.ip.contains('\n') {
        return Err(StateError::invalid(format!("bad blocklist ip {:?}", entry.ip)));
    }
    append(path, &format!("{}|{}|{}\n", entry.ip, entry.timestamp, entry.reason))
}

/// Parse the blocklist; malformed lines are skipped.
pub fn read_blocklist(path: &Path) -> StateResult<Vec<BlocklistEntry>> {
    let Some(text) = read_optional(path)? else {
        return Ok(Vec::new());
    };
    Ok(text
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '|');
            let ip = parts.next()?.trim();
            let timestamp = parts.next()?.trim().parse().ok()?;
            let reason = parts.next().unwrap_or("").trim();
            (!ip.is_empty()).then(|| BlocklistEntry {
                ip: ip.into(),
                timestamp,
                reason: reason.into(),
            })
        })
        .collect())
}

/// Persist the active profile index as `current_profile=<n>`.
pub fn write_profile_index(path: &Path, index: usize) -> StateResult<()> {
    ensure_parent(path)?;
    fs::write(path, format!("current_profile={index}\n"))?;
    Ok(())
}

pub fn read_profile_index(path: &Path) -> StateResult<Option<usize>> {
    Ok(read_optional(path)?
        .as_deref()
        .and_then(|t| config_value(t, "current_profile"))
        .and_then(|v| v.parse().ok()))
}
