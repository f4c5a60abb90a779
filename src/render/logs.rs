// CLASSIFICATION: COMMUNITY
// Filename: logs.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Syslog and kernel ring renderers over the state's log ring.

use std::fmt::Write;

use crate::state::model::{Facility, LogEntry, StateModel};

use super::format_time;

fn syslog_line(out: &mut String, s: &StateModel, e: &LogEntry) {
    let stamp = format_time(s.boot_time + e.time_offset, "%b %e %H:%M:%S");
    let tag = match e.pid {
        Some(pid) => format!("{}[{}]", e.service, pid),
        None => e.service.clone(),
    };
    let _ = writeln!(
        out,
        "{} {} {}.{} {}: {}",
        stamp,
        s.hostname,
        e.facility.as_str(),
        e.level.as_str(),
        tag,
        e.message
    );
}

/// `/var/log/messages`: every entry.
pub fn messages(s: &StateModel) -> String {
    let mut out = String::new();
    for e in s.logs.iter() {
        syslog_line(&mut out, s, e);
    }
    out
}

/// Authentication entries only.
pub fn auth(s: &StateModel) -> String {
    let mut out = String::new();
    for e in s.logs.iter().filter(|e| e.facility == Facility::Auth) {
        syslog_line(&mut out, s, e);
    }
    out
}

/// Kernel ring buffer with monotonic `[secs.micros]` stamps.
pub fn dmesg(s: &StateModel) -> String {
    let mut out = String::new();
    let kernel = s.logs.iter().filter(|e| e.facility == Facility::Kern);
    let mut last: Option<u64> = None;
    for (idx, e) in kernel.enumerate() {
        let base = e.time_offset.max(0) as u64 * 1_000_000 + (idx as u64 * 137_911) % 1_000_000;
        let micros = last.map_or(base, |prev| base.max(prev + 1));
        last = Some(micros);
        let _ = writeln!(
            out,
            "[{:5}.{:06}] {}",
            micros / 1_000_000,
            micros % 1_000_000,
            e.message
        );
    }
    out
}
