// CLASSIFICATION: COMMUNITY
// Filename: procfs.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! `/proc` generators.

use std::fmt::Write;

use crate::error::{StateError, StateResult};
use crate::profile::CpuArch;
use crate::state::model::{ProcessState, StateModel};
use crate::utils::format::fixed2;

use super::format_time;

/// Kernel build stamp as shown by `/proc/version` and `uname -v`.
pub fn build_stamp(s: &StateModel) -> String {
    let offset = s.file("/bin/busybox").map(|f| f.mtime_offset).unwrap_or(0);
    let smp = if s.profile.cpu_cores > 1 { "SMP " } else { "" };
    format!(
        "#1 {}{}",
        smp,
        format_time(s.boot_time + offset, "%a %b %e %H:%M:%S UTC %Y")
    )
}

fn tmpfs_used_kb(s: &StateModel) -> u64 {
    s.mount("/tmp").map(|m| m.used_kb).unwrap_or(0)
}

pub fn uptime(s: &StateModel) -> String {
    let cores = s.profile.cpu_cores.max(1) as u64;
    let busy = s.cpu_usage_percent.min(1000) as u64;
    let idle_cs = s.uptime_seconds * 100 * cores * (1000 - busy) / 1000;
    format!("{}.00 {}.{:02}\n", s.uptime_seconds, idle_cs / 100, idle_cs % 100)
}

pub fn meminfo(s: &StateModel) -> String {
    let used = s.used_memory_kb as u64;
    let free = s.free_memory_kb as u64;
    let buffers = s.buffer_memory_kb as u64;
    let cached = s.cached_memory_kb as u64;
    let mapped: u64 = s.processes.iter().map(|p| p.memory_kb as u64).sum::<u64>() * 3 / 10;
    let rows: [(&str, u64); 16] = [
        ("MemTotal", s.total_memory_kb as u64),
        ("MemFree", free),
        ("MemAvailable", free + buffers + cached),
        ("Buffers", buffers),
        ("Cached", cached),
        ("SwapCached", 0),
        ("Active", used * 60 / 100),
        ("Inactive", used * 40 / 100),
        ("SwapTotal", 0),
        ("SwapFree", 0),
        ("Dirty", buffers / 50),
        ("Writeback", 0),
        ("AnonPages", used * 50 / 100),
        ("Mapped", mapped),
        ("Shmem", tmpfs_used_kb(s)),
        ("Slab", s.kernel_memory_kb as u64 / 4),
    ];
    let mut out = String::new();
    for (key, value) in rows {
        let label = format!("{key}:");
        let _ = writeln!(out, "{:<16}{:>8} kB", label, value);
    }
    out
}

pub fn loadavg(s: &StateModel) -> String {
    let running = s.running_count().max(1);
    let last_pid = s.processes.iter().map(|p| p.pid).max().unwrap_or(1);
    format!(
        "{} {} {} {}/{} {}\n",
        fixed2(s.load_avg[0]),
        fixed2(s.load_avg[1]),
        fixed2(s.load_avg[2]),
        running,
        s.processes.len(),
        last_pid
    )
}

pub fn cpuinfo(s: &StateModel) -> String {
    let p = &s.profile;
    let bogo = format!("{}.{:02}", p.bogomips / 100, p.bogomips % 100);
    let mut out = String::new();
    for cpu in 0..p.cpu_cores {
        if p.arch.is_mips() {
            let _ = write!(
                out,
                "system type\t\t: {model}\n\
                 machine\t\t\t: {vendor} {product}\n\
                 processor\t\t: {cpu}\n\
                 cpu model\t\t: {model}\n\
                 BogoMIPS\t\t: {bogo}\n\
                 wait instruction\t: yes\n\
                 microsecond timers\t: yes\n\
                 tlb_entries\t\t: 32\n\
                 extra interrupt vector\t: yes\n\
                 hardware watchpoint\t: yes\n\
                 isa\t\t\t: mips1 mips2 mips32r1 mips32r2\n\
                 ASEs implemented\t: mips16 dsp dsp2\n\n",
                model = p.cpu_model,
                vendor = p.vendor,
                product = p.model,
            );
        } else if p.arch.is_arm() {
            let features = if p.arch == CpuArch::Armv7 || p.arch == CpuArch::Aarch64 {
                "half thumb fastmult vfp edsp neon vfpv3 tls vfpv4"
            } else {
                "half thumb fastmult vfp edsp"
            };
            let arch = if p.arch == CpuArch::Aarch64 { 8 } else { 7 };
            let _ = write!(
                out,
                "processor\t: {cpu}\n\
                 model name\t: {}\n\
                 BogoMIPS\t: {bogo}\n\
                 Features\t: {features}\n\
                 CPU implementer\t: 0x41\n\
                 CPU architecture: {arch}\n\
                 CPU variant\t: 0x0\n\
                 CPU part\t: 0xc07\n\
                 CPU revision\t: 5\n\n",
                p.cpu_model,
            );
        } else {
            let _ = write!(
                out,
                "processor\t: {cpu}\n\
                 vendor_id\t: GenuineIntel\n\
                 model name\t: {}\n\
                 cpu MHz\t\t: {}.000\n\
                 cache size\t: 512 KB\n\
                 cpu cores\t: {}\n\
                 bogomips\t: {bogo}\n\n",
                p.cpu_model, p.cpu_mhz, p.cpu_cores,
            );
        }
    }
    if p.arch.is_arm() {
        let serial: String = s
            .primary_interface()
            .map(|i| i.mac.replace(':', "").to_lowercase())
            .unwrap_or_default();
        let _ = write!(
            out,
            "Hardware\t: {} {}\nRevision\t: 0000\nSerial\t\t: {:0>16}\n",
            p.vendor, p.model, serial
        );
    }
    out
}

pub fn version(s: &StateModel) -> String {
    let kernel = &s.profile.kernel_version;
    let gcc = if kernel.starts_with("2.") { "4.3.3" } else { "4.8.3" };
    format!(
        "Linux version {} (root@{}) (gcc version {}) {}\n",
        kernel,
        s.hostname,
        gcc,
        build_stamp(s)
    )
}

pub fn mounts(s: &StateModel) -> String {
    s.mounts
        .iter()
        .map(|m| format!("{} {} {} {} 0 0\n", m.device, m.mount_point, m.fs_type, m.options))
        .collect()
}

pub fn stat(s: &StateModel) -> String {
    let cores = s.profile.cpu_cores.max(1) as u64;
    let busy_per_mille = s.cpu_usage_percent.min(1000) as u64;
    let per_core = s.uptime_seconds * 100;
    let cpu_line = |label: &str, total: u64| {
        let busy = total * busy_per_mille / 1000;
        let user = busy * 6 / 10;
        let system = busy - user;
        let iowait = total / 500;
        let idle = total.saturating_sub(busy + iowait);
        format!("{label} {user} 0 {system} {idle} {iowait} 0 {} 0 0 0\n", busy / 100)
    };
    let mut out = cpu_line("cpu ", per_core * cores);
    for cpu in 0..cores {
        out.push_str(&cpu_line(&format!("cpu{cpu}"), per_core));
    }
    let blocked = s
        .processes
        .iter()
        .filter(|p| p.state == ProcessState::DiskWait)
        .count();
    let _ = write!(
        out,
        "intr {}\nctxt {}\nbtime {}\nprocesses {}\nprocs_running {}\nprocs_blocked {}\n",
        s.uptime_seconds * 120 * cores,
        s.uptime_seconds * 350 * cores,
        s.boot_time,
        s.next_pid.saturating_sub(1),
        s.running_count().max(1),
        blocked
    );
    out
}

pub fn net_dev(s: &StateModel) -> String {
    let mut out = String::from(
        "Inter-|   Receive                                                |  Transmit\n \
         face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n",
    );
    for i in s.interfaces.iter() {
        let _ = writeln!(
            out,
            "{:>6}:{:>8} {:>7}    0    0    0     0          0         0 {:>8} {:>7}    0    0    0     0       0          0",
            i.name, i.rx_bytes, i.rx_packets, i.tx_bytes, i.tx_packets
        );
    }
    out
}

pub fn pid_cmdline(s: &StateModel, pid: u32) -> StateResult<String> {
    let p = s.process(pid).ok_or_else(|| StateError::not_found("process", pid))?;
    if p.is_kernel_thread() {
        return Ok(String::new());
    }
    let mut out = String::new();
    for arg in p.cmdline.split_whitespace() {
        out.push_str(arg);
        out.push('\0');
    }
    Ok(out)
}

pub fn pid_status(s: &StateModel, pid: u32) -> StateResult<String> {
    let p = s.process(pid).ok_or_else(|| StateError::not_found("process", pid))?;
    let gid = s.user_by_uid(p.uid).map(|u| u.gid).unwrap_or(p.uid);
    let mut out = format!(
        "Name:\t{}\nState:\t{}\nTgid:\t{pid}\nPid:\t{pid}\nPPid:\t{}\nTracerPid:\t0\n\
         Uid:\t{uid}\t{uid}\t{uid}\t{uid}\nGid:\t{gid}\t{gid}\t{gid}\t{gid}\n",
        p.name,
        p.state.label(),
        p.ppid,
        uid = p.uid,
    );
    if !p.is_kernel_thread() {
        let _ = write!(
            out,
            "VmSize:\t{:>8} kB\nVmRSS:\t{:>8} kB\n",
            p.virtual_kb, p.memory_kb
        );
    }
    out.push_str("Threads:\t1\n");
    Ok(out)
}
