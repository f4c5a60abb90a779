// CLASSIFICATION: COMMUNITY
// Filename: aging.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Background activity between observations.
//!
//! While uptime advances the device keeps living: cron runs and scanner
//! noise accumulate in the log ring, the kernel complains now and then, and
//! occasionally init respawns a daemon under a new PID. Activity is replayed
//! in hourly steps from [`StateModel::aged_until`] and draws only from the
//! state RNG, so two equal states aged to the same uptime stay equal.

use log::debug;

use super::model::{ConnState, Facility, LogEntry, LogLevel, ProcessFlags, StateModel};
use crate::utils::tiny_rng::IpKind;

/// Seconds of uptime per simulated step.
pub const AGING_STEP: u64 = 3600;
/// Steps replayed per refresh; older gaps are skipped.
pub const MAX_AGING_STEPS: u64 = 48;

const KERNEL_CHATTER: [&str; 4] = [
    "nf_conntrack: table full, dropping packet",
    "net_ratelimit: 14 callbacks suppressed",
    "TCP: request_sock_TCP: Possible SYN flooding on port 23. Sending cookies.",
    "eth0: link up (100Mbps/Full duplex)",
];

impl StateModel {
    /// Replay background activity up to the current uptime.
    pub fn age(&mut self) {
        if !self.is_initialized || self.uptime_seconds <= self.aged_until {
            return;
        }
        let steps = (self.uptime_seconds - self.aged_until) / AGING_STEP;
        if steps == 0 {
            return;
        }
        let skipped = steps.saturating_sub(MAX_AGING_STEPS);
        let mut cursor = self.aged_until + skipped * AGING_STEP;
        let logs_before = self.logs.len();
        for _ in skipped..steps {
            cursor += AGING_STEP;
            self.age_step(cursor as i64);
        }
        self.aged_until = cursor;
        self.needs_recalculation = true;
        debug!(
            "aged {} steps to uptime {} ({} skipped, {} log lines)",
            steps - skipped,
            cursor,
            skipped,
            self.logs.len().saturating_sub(logs_before)
        );
    }

    fn age_step(&mut self, end: i64) {
        let last_logged = self.logs.iter().last().map_or(0, |e| e.time_offset);
        let at = (end - self.rng.between(0, AGING_STEP as u32 - 1) as i64).max(last_logged);
        if self.rng.chance(15) {
            self.push_noise(at);
        }
        if self.rng.chance(5) {
            let msg = *self.rng.pick(&KERNEL_CHATTER);
            self.log_at(at, LogLevel::Warning, Facility::Kern, "kernel", None, msg.into());
        }
        if self.rng.chance(2) {
            self.respawn_service(at);
        }
    }

    /// Append a log line stamped `offset` seconds after boot.
    pub(crate) fn log_at(
        &mut self,
        offset: i64,
        level: LogLevel,
        facility: Facility,
        service: &str,
        pid: Option<u32>,
        message: String,
    ) {
        self.logs.push(LogEntry {
            time_offset: offset,
            level,
            facility,
            service: service.into(),
            pid,
            message,
        });
    }

    /// One round of routine noise: a cron run or a scanner dropping off the
    /// SSH daemon before authenticating.
    pub(crate) fn push_noise(&mut self, offset: i64) {
        let cron = self.process_by_name("crond").map(|p| p.pid);
        let sshd = self.process_by_name("dropbear").map(|p| p.pid);
        if self.rng.chance(50) {
            if let Some(pid) = cron {
                self.log_at(
                    offset,
                    LogLevel::Info,
                    Facility::Cron,
                    "crond",
                    Some(pid),
                    "USER root pid 0 cmd /sbin/logrotate".into(),
                );
                return;
            }
        }
        if let Some(pid) = sshd {
            let ip = self.rng.ip(IpKind::Attacker);
            let port = self.rng.between(30_000, 65_000);
            let child = pid + self.rng.between(1, 3000);
            let connect = format!("Child connection from {}:{}", ip, port);
            let exit = format!("Exit before auth from <{}:{}>: Exited normally", ip, port);
            self.log_at(offset, LogLevel::Info, Facility::Auth, "dropbear", Some(child), connect);
            self.log_at(offset, LogLevel::Info, Facility::Auth, "dropbear", Some(child), exit);
        }
    }

    /// Restart one idle daemon under a fresh PID. Daemons with children or
    /// live connections are left alone; listeners follow the new PID.
    fn respawn_service(&mut self, at: i64) {
        let candidates: Vec<u32> = self
            .processes
            .iter()
            .filter(|p| {
                p.pid != 1
                    && p.flags.contains(ProcessFlags::SERVICE)
                    && !p.flags.intersects(ProcessFlags::KERNEL_THREAD | ProcessFlags::ATTACKER)
            })
            .map(|p| p.pid)
            .filter(|pid| {
                !self.processes.iter().any(|c| c.ppid == *pid)
                    && !self
                        .connections
                        .iter()
                        .any(|c| c.owner_pid == Some(*pid) && c.state != ConnState::Listen)
            })
            .collect();
        if candidates.is_empty() {
            return;
        }
        let old = *self.rng.pick(&candidates);
        let new = self.allocate_pid();
        let Some(daemon) = self.processes.iter_mut().find(|p| p.pid == old) else {
            return;
        };
        daemon.pid = new;
        daemon.start_offset = at;
        let name = daemon.name.clone();
        let cmdline = daemon.cmdline.clone();
        for conn in self.connections.iter_mut().filter(|c| c.owner_pid == Some(old)) {
            conn.owner_pid = Some(new);
        }
        self.log_at(
            at,
            LogLevel::Warning,
            Facility::Daemon,
            "init",
            Some(1),
            format!("process '{}' (pid {}) exited. Scheduling for restart.", cmdline, old),
        );
        self.log_at(at, LogLevel::Info, Facility::Daemon, &name, Some(new), "started".into());
        debug!("respawned {} pid {} -> {}", name, old, new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin_profile;
    use crate::state::Protocol;

    const NOW: i64 = 1_760_000_000;
    const DAY: i64 = 86_400;

    fn state() -> StateModel {
        StateModel::init_with(builtin_profile("TP-Link_Archer_C7").unwrap(), 17, NOW).unwrap()
    }

    fn listening(s: &StateModel) -> Vec<(Protocol, u16)> {
        let mut ports: Vec<(Protocol, u16)> = s
            .connections
            .iter()
            .filter(|c| c.state == ConnState::Listen)
            .map(|c| (c.protocol, c.local_port))
            .collect();
        ports.sort_by_key(|(_, port)| *port);
        ports
    }

    #[test]
    fn aging_is_reproducible() {
        let mut a = state();
        let mut b = a.clone();
        a.update_time_at(NOW + 3 * DAY);
        b.update_time_at(NOW + 3 * DAY);
        assert_eq!(a, b);
    }

    #[test]
    fn logs_grow_with_uptime() {
        let mut s = state();
        let boot_uptime = s.uptime_seconds as i64;
        for day in 1..=10 {
            s.recalculate_at(NOW + day * DAY);
        }
        assert!(s.logs.iter().any(|e| e.time_offset > boot_uptime));
        let offsets: Vec<i64> = s.logs.iter().map(|e| e.time_offset).collect();
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        assert!(offsets.iter().all(|o| *o <= s.uptime_seconds as i64));
        s.check_invariants().unwrap();
    }

    #[test]
    fn short_refresh_does_nothing() {
        let mut s = state();
        let before = s.clone();
        s.update_time_at(NOW + AGING_STEP as i64 - 1);
        assert_eq!(s.logs, before.logs);
        assert_eq!(s.aged_until, before.aged_until);
    }

    #[test]
    fn respawned_daemons_keep_listeners() {
        let mut s = state();
        let ports = listening(&s);
        let boot_uptime = s.uptime_seconds as i64;
        for step in 1..=60 {
            s.recalculate_at(NOW + step * 2 * DAY);
        }
        assert!(s
            .processes
            .iter()
            .any(|p| !p.is_kernel_thread() && p.start_offset > boot_uptime));
        assert_eq!(listening(&s), ports);
        assert!(s.logs.iter().any(|e| e.message.contains("Scheduling for restart")));
        s.check_invariants().unwrap();
    }

    #[test]
    fn long_gap_is_bounded() {
        let mut s = state();
        let logs_before = s.logs.len();
        s.update_time_at(NOW + 3650 * DAY);
        assert!(s.uptime_seconds - s.aged_until < AGING_STEP);
        assert!(s.logs.len() <= logs_before + MAX_AGING_STEPS as usize * 5);
    }
}
