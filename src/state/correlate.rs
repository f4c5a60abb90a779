// CLASSIFICATION: COMMUNITY
// Filename: correlate.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Correlation pass.
//!
//! Derived fields are recomputed here and nowhere else:
//!
//! * memory totals from the process list plus fixed kernel overhead,
//! * load averages from the running-process count over CPU cores,
//! * CPU usage from per-process CPU shares,
//! * interface counters from uptime and stored daily rates,
//! * background activity since the last refresh (see [`super::aging`]),
//! * sizes of generator-backed files and tmpfs usage.

use std::collections::HashSet;

use log::{error, trace, warn};

use super::model::{ProcessState, StateModel};
use crate::error::{StateError, StateResult};
use crate::render::render_artifact;
use crate::utils::clock::unix_now;

const DAY: u64 = 86_400;

impl StateModel {
    /// Refresh `uptime_seconds` and time-derived counters from the clock.
    pub fn update_time(&mut self) {
        self.update_time_at(unix_now());
    }

    /// Refresh `uptime_seconds` as `now - boot_time` and replay background
    /// activity. Uptime never decreases: when the host clock steps back the
    /// device clock holds until the host catches up.
    pub fn update_time_at(&mut self, now: i64) {
        if !self.is_initialized {
            return;
        }
        let uptime = (now - self.boot_time).max(0) as u64;
        if uptime < self.uptime_seconds {
            warn!(
                "clock moved backwards by {}s, holding uptime at {}",
                self.uptime_seconds - uptime,
                self.uptime_seconds
            );
            return;
        }
        self.uptime_seconds = uptime;
        self.age();
        for iface in self.interfaces.iter_mut() {
            let pkt = iface.avg_packet_bytes.max(1) as u64;
            iface.rx_bytes = iface.rx_bytes_per_day.saturating_mul(uptime) / DAY;
            iface.tx_bytes = iface.tx_bytes_per_day.saturating_mul(uptime) / DAY;
            iface.rx_packets = iface.rx_bytes / pkt;
            iface.tx_packets = iface.tx_bytes / pkt;
        }
    }

    /// Recompute every derived field using the clock.
    pub fn recalculate(&mut self) {
        self.recalculate_at(unix_now());
    }

    /// Recompute every derived field at `now`.
    pub fn recalculate_at(&mut self, now: i64) {
        if !self.is_initialized {
            return;
        }
        self.update_time_at(now);
        self.sync_dynamic_sizes();
        self.sync_tmpfs_usage();
        self.calculate_memory();
        self.calculate_load();
        self.calculate_cpu();
        self.needs_recalculation = false;
        trace!(
            "recalculated: used={}kB load={:?} cpu={}",
            self.used_memory_kb,
            self.load_avg,
            self.cpu_usage_percent
        );
        if let Err(err) = self.check_invariants() {
            debug_assert!(false, "{}", err);
            error!("{}", err);
        }
    }

    fn sync_dynamic_sizes(&mut self) {
        let sizes: Vec<(usize, u64)> = self
            .files
            .iter()
            .enumerate()
            .filter_map(|(idx, f)| {
                let artifact = f.dynamic?;
                render_artifact(self, artifact)
                    .ok()
                    .map(|body| (idx, body.len() as u64))
            })
            .collect();
        for (idx, size) in sizes {
            self.files[idx].size = size;
        }
    }

    fn sync_tmpfs_usage(&mut self) {
        let tmp_bytes: u64 = self
            .files
            .iter()
            .filter(|f| !f.is_deleted() && !f.is_dir() && f.path.starts_with("/tmp/"))
            .map(|f| f.size)
            .sum();
        for m in self.mounts.iter_mut() {
            let extra = if m.fs_type == "tmpfs" && m.mount_point == "/tmp" {
                tmp_bytes.div_ceil(1024)
            } else {
                0
            };
            m.used_kb = (m.base_used_kb + extra).min(m.total_kb);
            m.available_kb = m.total_kb - m.used_kb;
        }
    }

    fn calculate_memory(&mut self) {
        let total = self.profile.total_ram_kb;
        self.total_memory_kb = total;
        let process_kb: u32 = self.processes.iter().map(|p| p.memory_kb).sum();
        let ceiling = total / 100 * 95;
        let clamped = process_kb.saturating_add(self.kernel_memory_kb).min(ceiling);
        self.used_memory_kb = process_kb.max(clamped).min(total);
        let free = total - self.used_memory_kb;
        let cached_pct = self.rng.between(15, 30);
        let buffer_pct = self.rng.between(5, 15);
        self.cached_memory_kb = free / 100 * cached_pct;
        self.buffer_memory_kb = free / 100 * buffer_pct;
        self.free_memory_kb = free - self.cached_memory_kb - self.buffer_memory_kb;
    }

    fn calculate_load(&mut self) {
        let base = self.running_count() as u32 * 100 / self.profile.cpu_cores.max(1);
        let mut load = [
            base + self.rng.between(0, 50),
            base + self.rng.between(0, 30),
            base + self.rng.between(0, 20),
        ];
        if load[0] > 500 {
            load[0] = self.rng.between(10, 100);
        }
        if load[1] > 400 {
            load[1] = self.rng.between(10, 80);
        }
        if load[2] > 300 {
            load[2] = self.rng.between(5, 60);
        }
        self.load_avg = load;
    }

    fn calculate_cpu(&mut self) {
        let total: u32 = self
            .processes
            .iter()
            .filter(|p| p.state != ProcessState::Zombie)
            .map(|p| p.cpu_percent)
            .sum();
        self.cpu_usage_percent = if total > 1000 {
            self.rng.between(50, 300)
        } else {
            total
        };
    }

    /// Verify cross-field invariants of the current snapshot.
    pub fn check_invariants(&self) -> StateResult<()> {
        for c in self.connections.iter() {
            if let Some(pid) = c.owner_pid {
                if self.process(pid).is_none() {
                    return Err(StateError::InconsistentState(format!(
                        "connection on port {} owned by missing pid {}",
                        c.local_port, pid
                    )));
                }
            }
        }

        let process_kb: u64 = self.processes.iter().map(|p| p.memory_kb as u64).sum();
        if self.total_memory_kb != self.profile.total_ram_kb
            || process_kb > self.used_memory_kb as u64
            || self.used_memory_kb > self.total_memory_kb
        {
            return Err(StateError::InconsistentState(format!(
                "memory: processes={}kB used={}kB total={}kB",
                process_kb, self.used_memory_kb, self.total_memory_kb
            )));
        }

        let uptime = self.uptime_seconds as i64;
        if let Some(f) = self
            .files
            .iter()
            .find(|f| f.mtime_offset > uptime || f.ctime_offset > uptime || f.atime_offset > uptime)
        {
            return Err(StateError::InconsistentState(format!(
                "file {} timestamped after now",
                f.path
            )));
        }

        let mut seen = HashSet::with_capacity(self.processes.len());
        if let Some(p) = self.processes.iter().find(|p| !seen.insert(p.pid)) {
            return Err(StateError::InconsistentState(format!(
                "duplicate pid {}",
                p.pid
            )));
        }
        Ok(())
    }
}
