// CLASSIFICATION: COMMUNITY
// Filename: commands.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Generators for shell commands whose output depends on flags.
//!
//! Layouts follow the BusyBox applets shipped on the emulated devices, with
//! procps-style `ps aux` and `w` since attackers expect those columns.

use std::fmt::Write;
use std::net::Ipv4Addr;

use crate::state::model::{ConnState, Interface, Protocol, StateModel};
use crate::utils::format::{fixed1, fixed2, uptime_phrase};

use super::{format_time, procfs, UnameFields};

/// BusyBox `ps`.
pub fn ps(s: &StateModel) -> String {
    let mut out = String::from("  PID USER       VSZ STAT COMMAND\n");
    for p in s.processes.iter().filter(|p| p.is_visible()) {
        let vsz = if p.is_kernel_thread() { String::new() } else { p.virtual_kb.to_string() };
        let _ = writeln!(
            out,
            "{:>5} {:<8} {:>6} {:<4} {}",
            p.pid,
            s.username_for(p.uid),
            vsz,
            p.state.code(),
            p.cmdline
        );
    }
    out
}

/// Cumulative CPU seconds implied by a process's share and runtime.
fn cpu_seconds(s: &StateModel, cpu_percent: u32, start_offset: i64) -> u64 {
    let runtime = (s.uptime_seconds as i64 - start_offset).max(0) as u64;
    runtime * cpu_percent as u64 / 1000
}

/// procps `ps aux`.
pub fn ps_aux(s: &StateModel) -> String {
    let mut out =
        String::from("USER       PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND\n");
    let total = s.total_memory_kb.max(1) as u64;
    for p in s.processes.iter().filter(|p| p.is_visible()) {
        let mem = (p.memory_kb as u64 * 1000 / total) as u32;
        let cpu_secs = cpu_seconds(s, p.cpu_percent, p.start_offset);
        let _ = writeln!(
            out,
            "{:<8} {:>5} {:>4} {:>4} {:>6} {:>5} {:<8} {:<4} {:>5} {:>6} {}",
            s.username_for(p.uid),
            p.pid,
            fixed1(p.cpu_percent),
            fixed1(mem),
            p.virtual_kb,
            p.memory_kb,
            p.tty.as_deref().unwrap_or("?"),
            p.state.code(),
            format_time(s.boot_time + p.start_offset, "%H:%M"),
            format!("{}:{:02}", cpu_secs / 60, cpu_secs % 60),
            p.cmdline
        );
    }
    out
}

/// BusyBox `top`, single iteration.
pub fn top(s: &StateModel) -> String {
    let total = s.total_memory_kb.max(1);
    let cpu = s.cpu_usage_percent.min(1000);
    let usr = cpu * 6 / 100;
    let sys = cpu / 10 - usr;
    let shared = s.mount("/tmp").map(|m| m.used_kb).unwrap_or(0);
    let mut out = format!(
        "Mem: {}K used, {}K free, {}K shrd, {}K buff, {}K cached\n\
         CPU: {:>3}% usr {:>3}% sys   0% nic {:>3}% idle   0% io   0% irq   0% sirq\n\
         Load average: {}",
        total - s.free_memory_kb,
        s.free_memory_kb,
        shared,
        s.buffer_memory_kb,
        s.cached_memory_kb,
        usr,
        sys,
        100 - cpu / 10,
        procfs::loadavg(s)
    );
    out.push_str("  PID  PPID USER     STAT   VSZ %VSZ CPU %CPU COMMAND\n");
    let mut rows: Vec<_> = s.processes.iter().filter(|p| p.is_visible()).collect();
    rows.sort_by(|a, b| b.cpu_percent.cmp(&a.cpu_percent));
    let cores = s.profile.cpu_cores.max(1);
    for p in rows {
        let _ = writeln!(
            out,
            "{:>5} {:>5} {:<8} {:<4} {:>5} {:>3}% {:>3} {:>4}% {}",
            p.pid,
            p.ppid,
            s.username_for(p.uid),
            p.state.code(),
            p.virtual_kb,
            p.virtual_kb as u64 * 100 / total as u64,
            p.pid % cores,
            fixed1(p.cpu_percent),
            p.cmdline
        );
    }
    out
}

/// net-tools style `(12.3 MiB)` annotation.
fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut idx = 0;
    while value >= 1024.0 && idx < UNITS.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }
    format!("{:.1} {}", value, UNITS[idx])
}

pub fn ifconfig(s: &StateModel) -> String {
    let mut out = String::new();
    for i in s.interfaces.iter() {
        if i.is_loopback() {
            let _ = write!(
                out,
                "{:<10}Link encap:Local Loopback  \n          inet addr:{}  Mask:{}\n          \
                 UP LOOPBACK RUNNING  MTU:{}  Metric:1\n",
                i.name, i.ip, i.netmask, i.mtu
            );
        } else {
            let flags = if i.is_up() { "UP BROADCAST RUNNING MULTICAST" } else { "BROADCAST MULTICAST" };
            let _ = write!(
                out,
                "{:<10}Link encap:Ethernet  HWaddr {}  \n          inet addr:{}  Bcast:{}  Mask:{}\n          \
                 {}  MTU:{}  Metric:1\n",
                i.name, i.mac, i.ip, i.broadcast, i.netmask, flags, i.mtu
            );
        }
        let _ = write!(
            out,
            "          RX packets:{} errors:0 dropped:0 overruns:0 frame:0\n          \
             TX packets:{} errors:0 dropped:0 overruns:0 carrier:0\n          \
             collisions:0 txqueuelen:{}\n          \
             RX bytes:{} ({})  TX bytes:{} ({})\n\n",
            i.rx_packets,
            i.tx_packets,
            if i.is_loopback() { 0 } else { 1000 },
            i.rx_bytes,
            human_bytes(i.rx_bytes),
            i.tx_bytes,
            human_bytes(i.tx_bytes)
        );
    }
    out
}

/// `netstat -an`, with `-p` adding the owning process.
pub fn netstat(s: &StateModel, programs: bool) -> String {
    let mut out = String::from(
        "Active Internet connections (servers and established)\n\
         Proto Recv-Q Send-Q Local Address           Foreign Address         State",
    );
    out.push_str(if programs { "       PID/Program name\n" } else { "\n" });
    for c in s.connections.iter() {
        let local = format!("{}:{}", c.local_ip, c.local_port);
        let remote = if c.state == ConnState::Listen {
            "0.0.0.0:*".to_string()
        } else {
            format!("{}:{}", c.remote_ip, c.remote_port)
        };
        let state = if c.protocol == Protocol::Udp { "" } else { c.state.as_str() };
        let _ = write!(
            out,
            "{:<5} {:>6} {:>6} {:<23} {:<23} {:<11}",
            c.protocol.as_str(),
            0,
            0,
            local,
            remote,
            state
        );
        if programs {
            let owner = c
                .owner_pid
                .and_then(|pid| s.process(pid))
                .map(|p| format!("{}/{}", p.pid, p.name))
                .unwrap_or_else(|| "-".into());
            let _ = write!(out, " {}", owner);
        }
        out.push('\n');
    }
    out
}

/// Network address of `ip` under `netmask`.
fn network_of(ip: &str, netmask: &str) -> Option<Ipv4Addr> {
    let ip: Ipv4Addr = ip.parse().ok()?;
    let mask: Ipv4Addr = netmask.parse().ok()?;
    Some(Ipv4Addr::from(u32::from(ip) & u32::from(mask)))
}

/// `route [-n]`. The last interface with a gateway carries the default
/// route; every interface gets its connected network.
pub fn route(s: &StateModel, numeric: bool) -> String {
    let mut out = String::from(
        "Kernel IP routing table\n\
         Destination     Gateway         Genmask         Flags Metric Ref    Use Iface\n",
    );
    let ifaces: Vec<&Interface> = s
        .interfaces
        .iter()
        .filter(|i| i.is_up() && !i.is_loopback())
        .collect();
    let any = |name: &'static str| if numeric { "0.0.0.0" } else { name };
    if let Some((uplink, gateway)) = ifaces
        .iter()
        .rev()
        .find_map(|i| i.gateway.as_deref().map(|gw| (i, gw)))
    {
        let _ = writeln!(
            out,
            "{:<15} {:<15} {:<15} {:<5} {:<6} {:<6} {:>3} {}",
            any("default"),
            gateway,
            "0.0.0.0",
            "UG",
            0,
            0,
            0,
            uplink.name
        );
    }
    for iface in &ifaces {
        let Some(net) = network_of(&iface.ip, &iface.netmask) else {
            continue;
        };
        let _ = writeln!(
            out,
            "{:<15} {:<15} {:<15} {:<5} {:<6} {:<6} {:>3} {}",
            net.to_string(),
            any("*"),
            iface.netmask,
            "U",
            0,
            0,
            0,
            iface.name
        );
    }
    out
}

/// `arp`. With `-a` the one-line-per-host form, otherwise the table.
pub fn arp(s: &StateModel, all: bool) -> String {
    let mut out = String::new();
    if all {
        for n in s.neighbors.iter() {
            let _ = writeln!(
                out,
                "? ({}) at {} [ether] {}on {}",
                n.ip,
                n.mac.to_ascii_lowercase(),
                if n.permanent { "PERM " } else { "" },
                n.iface
            );
        }
        return out;
    }
    out.push_str("Address                  HWtype  HWaddress           Flags Mask            Iface\n");
    for n in s.neighbors.iter() {
        let _ = writeln!(
            out,
            "{:<24} {:<7} {:<19} {:<5} {:<15} {}",
            n.ip,
            "ether",
            n.mac.to_ascii_lowercase(),
            if n.permanent { "CM" } else { "C" },
            "",
            n.iface
        );
    }
    out
}

pub fn df(s: &StateModel) -> String {
    let mut out = String::from("Filesystem           1K-blocks      Used Available Use% Mounted on\n");
    for m in s.mounts.iter().filter(|m| m.total_kb > 0) {
        let pct = (m.used_kb * 100).div_ceil(m.total_kb);
        let _ = writeln!(
            out,
            "{:<20} {:>9} {:>9} {:>9} {:>3}% {}",
            m.device, m.total_kb, m.used_kb, m.available_kb, pct, m.mount_point
        );
    }
    out
}

/// BusyBox `free` (pre-1.30 layout with the buffers/cache line).
pub fn free(s: &StateModel) -> String {
    let total = s.total_memory_kb;
    let shared = s.mount("/tmp").map(|m| m.used_kb).unwrap_or(0);
    let used_incl_cache = total - s.free_memory_kb;
    format!(
        "{:<7}{:>11}{:>11}{:>11}{:>11}{:>11}{:>11}\n\
         {:<7}{:>11}{:>11}{:>11}{:>11}{:>11}{:>11}\n\
         -/+ buffers/cache:{:>11}{:>11}\n\
         {:<7}{:>11}{:>11}{:>11}\n",
        "", "total", "used", "free", "shared", "buffers", "cached",
        "Mem:", total, used_incl_cache, s.free_memory_kb, shared, s.buffer_memory_kb, s.cached_memory_kb,
        s.used_memory_kb, total - s.used_memory_kb,
        "Swap:", 0, 0, 0
    )
}

fn users_phrase(s: &StateModel) -> String {
    match s.session.as_ref().map_or(0, |_| 1) {
        1 => "1 user".into(),
        n => format!("{n} users"),
    }
}

fn uptime_line(s: &StateModel) -> String {
    format!(
        " {} {},  {},  load average: {}, {}, {}\n",
        format_time(s.now(), "%H:%M:%S"),
        uptime_phrase(s.uptime_seconds),
        users_phrase(s),
        fixed2(s.load_avg[0]),
        fixed2(s.load_avg[1]),
        fixed2(s.load_avg[2])
    )
}

pub fn uptime(s: &StateModel) -> String {
    uptime_line(s)
}

pub fn uname(s: &StateModel, fields: UnameFields) -> String {
    let mut parts: Vec<String> = Vec::new();
    if fields.contains(UnameFields::KERNEL_NAME) {
        parts.push("Linux".into());
    }
    if fields.contains(UnameFields::NODENAME) {
        parts.push(s.hostname.clone());
    }
    if fields.contains(UnameFields::RELEASE) {
        parts.push(s.profile.kernel_version.clone());
    }
    if fields.contains(UnameFields::VERSION) {
        parts.push(procfs::build_stamp(s));
    }
    if fields.contains(UnameFields::MACHINE) {
        parts.push(s.profile.arch.uname().into());
    }
    if fields.contains(UnameFields::OS) {
        parts.push("GNU/Linux".into());
    }
    format!("{}\n", parts.join(" "))
}

/// procps `w`.
pub fn w(s: &StateModel) -> String {
    let mut out = uptime_line(s);
    out.push_str("USER     TTY      FROM             LOGIN@   IDLE   JCPU   PCPU WHAT\n");
    if let Some(session) = &s.session {
        let last = if session.last_command_time > 0 {
            session.last_command_time
        } else {
            session.connect_time
        };
        let idle = (s.now() - last).max(0);
        let idle = if idle < 60 {
            format!("{idle}.00s")
        } else {
            format!("{}:{:02}m", idle / 60, idle % 60)
        };
        let _ = writeln!(
            out,
            "{:<8} {:<8} {:<16} {:<8} {:>6} {:>6} {:>6} {}",
            session.username,
            "pts/0",
            session.source_ip,
            format_time(session.connect_time, "%H:%M"),
            idle,
            "0.01s",
            "0.00s",
            session.last_command.as_deref().unwrap_or("-sh")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin_profile;

    const NOW: i64 = 1_760_000_000;

    fn state() -> StateModel {
        StateModel::init_with(builtin_profile("TP-Link_Archer_C7").unwrap(), 12, NOW).unwrap()
    }

    #[test]
    fn ps_lists_visible_processes() {
        let s = state();
        let text = ps(&s);
        assert_eq!(text.lines().count(), s.processes.len() + 1);
        assert!(text.lines().nth(1).unwrap().trim_start().starts_with("1 root"));
    }

    #[test]
    fn ps_shows_new_process() {
        let mut s = state();
        let pid = s.add_process("bot", "/tmp/bot -s", 0, 1, 120).unwrap();
        s.recalculate_at(NOW);
        assert!(ps_aux(&s).lines().any(|l| l.contains("/tmp/bot -s") && l.contains(&pid.to_string())));
    }

    #[test]
    fn free_matches_meminfo() {
        let s = state();
        let text = free(&s);
        let mem: Vec<u32> = text
            .lines()
            .nth(1)
            .unwrap()
            .split_whitespace()
            .skip(1)
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(mem[0], s.total_memory_kb);
        assert_eq!(mem[2], s.free_memory_kb);
        assert_eq!(mem[1] + mem[2], mem[0]);
    }

    #[test]
    fn netstat_lists_listeners() {
        let s = state();
        let text = netstat(&s, true);
        assert!(text.contains("0.0.0.0:22"));
        assert!(text.contains("/dropbear"));
    }

    #[test]
    fn df_skips_virtual_mounts() {
        let s = state();
        let text = df(&s);
        assert!(!text.contains("/proc"));
        assert!(text.contains("/dev/root"));
    }

    #[test]
    fn uname_all() {
        let s = state();
        let text = uname(&s, UnameFields::all());
        assert!(text.starts_with(&format!("Linux {} 3.10.49 #1 ", s.hostname)));
        assert!(text.ends_with("mips GNU/Linux\n"));
        assert_eq!(uname(&s, UnameFields::MACHINE), "mips\n");
    }

    #[test]
    fn uptime_counts_session() {
        let mut s = state();
        assert!(uptime(&s).contains("0 users"));
        s.start_session("45.33.1.2", 40000, "root", 22).unwrap();
        assert!(uptime(&s).contains("1 user,"));
        assert!(w(&s).contains("45.33.1.2"));
    }

    #[test]
    fn route_follows_interfaces() {
        for seed in 1..20 {
            let s = StateModel::init_with(builtin_profile("TP-Link_Archer_C7").unwrap(), seed, NOW).unwrap();
            let text = route(&s, true);
            let default = text.lines().find(|l| l.starts_with("0.0.0.0 ")).unwrap();
            let dev = default.split_whitespace().last().unwrap();
            let uplink = s.interfaces.iter().find(|i| i.name == dev).unwrap();
            assert!(default.contains(uplink.gateway.as_deref().unwrap()));
            let eth = s.primary_interface().unwrap();
            let net = network_of(&eth.ip, &eth.netmask).unwrap().to_string();
            assert!(text.lines().any(|l| l.starts_with(&net) && l.ends_with(" eth0")));
            assert!(!text.contains(" lo\n"));
        }
        assert!(route(&state(), false).lines().nth(2).unwrap().starts_with("default "));
    }

    #[test]
    fn arp_lists_neighbor_cache() {
        let s = state();
        assert!(!s.neighbors.is_empty());
        let table = arp(&s, false);
        assert_eq!(table.lines().count(), s.neighbors.len() + 1);
        let short = arp(&s, true);
        for n in s.neighbors.iter() {
            assert!(short.contains(&format!("({}) at {}", n.ip, n.mac.to_ascii_lowercase())));
            if n.permanent {
                assert!(s.interfaces.iter().any(|i| i.gateway.as_deref() == Some(n.ip.as_str())));
            }
        }
    }

    #[test]
    fn ifconfig_matches_counters() {
        let s = state();
        let eth = s.primary_interface().unwrap();
        let text = ifconfig(&s);
        assert!(text.contains(&format!("RX bytes:{} ", eth.rx_bytes)));
        assert!(text.contains(&format!("HWaddr {}", eth.mac)));
    }
}
