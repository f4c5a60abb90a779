// CLASSIFICATION: COMMUNITY
// Filename: state_properties.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use cerberus::profile::builtin_profiles;
use cerberus::render::{self, artifact_paths, Command};
use cerberus::state::{ConnState, Connection, FileType, Protocol};
use cerberus::StateModel;
use std::collections::HashSet;

const NOW: i64 = 1_760_000_000;

fn memory_holds(s: &StateModel) {
    let procs: u64 = s.processes.iter().map(|p| p.memory_kb as u64).sum();
    assert!(procs <= s.used_memory_kb as u64, "{}: processes exceed used", s.profile.name);
    assert!(s.used_memory_kb <= s.total_memory_kb);
    assert_eq!(s.total_memory_kb, s.profile.total_ram_kb);
}

fn owners_exist(s: &StateModel) {
    for c in s.connections.iter() {
        if let Some(pid) = c.owner_pid {
            assert!(s.process(pid).is_some(), "connection owner {pid} missing");
        }
    }
}

fn pids_unique(s: &StateModel) {
    let mut seen = HashSet::new();
    for p in s.processes.iter() {
        assert!(seen.insert(p.pid), "duplicate pid {}", p.pid);
    }
}

fn no_future_files(s: &StateModel) {
    for f in s.files.iter() {
        assert!(s.boot_time + f.mtime_offset <= s.now(), "{} is in the future", f.path);
    }
}

#[test]
fn same_seed_reproduces_state() {
    let _ = env_logger::builder().is_test(true).try_init();
    for profile in builtin_profiles() {
        for seed in [1u32, 42, 0xdead_beef] {
            let mut a = StateModel::init_with(profile.clone(), 7, NOW).unwrap();
            let mut b = StateModel::init_with(profile.clone(), 99, NOW).unwrap();
            a.morph_at(Some(seed), NOW + 30).unwrap();
            b.morph_at(Some(seed), NOW + 30).unwrap();
            assert_eq!(a.boot_time, b.boot_time);
            assert_eq!(a.hostname, b.hostname);
            assert_eq!(a.processes, b.processes);
            assert_eq!(a.users, b.users);
            assert_eq!(a.files, b.files);
            assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        }
    }
}

#[test]
fn invariants_hold_after_init() {
    for profile in builtin_profiles() {
        for seed in 1..20 {
            let s = StateModel::init_with(profile.clone(), seed, NOW).unwrap();
            memory_holds(&s);
            owners_exist(&s);
            pids_unique(&s);
            no_future_files(&s);
            s.check_invariants().unwrap();
        }
    }
}

#[test]
fn invariants_hold_across_mutations() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut s = StateModel::init_with(builtin_profiles()[0].clone(), 11, NOW).unwrap();
    let shell = s.add_process("sh", "-sh", 0, 1, 300).unwrap();
    let miner = s.add_process("xmrig", "./xmrig -o pool:3333", 0, shell, 2048).unwrap();
    s.add_connection(Connection {
        protocol: Protocol::Tcp,
        local_ip: "192.168.1.1".into(),
        local_port: 40112,
        remote_ip: "203.0.113.9".into(),
        remote_port: 3333,
        state: ConnState::Established,
        owner_pid: Some(miner),
    })
    .unwrap();
    s.add_file("/tmp/xmrig", FileType::Regular, "root", 0o755).unwrap();
    s.modify_file("/tmp/xmrig", 1_800_000).unwrap();
    s.recalculate_at(NOW + 60);
    memory_holds(&s);
    owners_exist(&s);

    s.kill_process(shell).unwrap();
    assert_eq!(s.process(miner).unwrap().ppid, 1);
    s.kill_process(miner).unwrap();
    s.recalculate_at(NOW + 120);
    owners_exist(&s);
    pids_unique(&s);
    no_future_files(&s);
    assert!(!s.connections.iter().any(|c| c.remote_port == 3333));

    // A huge allocation is refused rather than breaking the memory bound.
    assert!(s.add_process("hog", "hog", 0, 1, s.total_memory_kb).is_err());
    memory_holds(&s);
}

#[test]
fn rendering_is_idempotent() {
    let mut s = StateModel::init_with(builtin_profiles()[2].clone(), 5, NOW).unwrap();
    s.add_file("/tmp/.x", FileType::Regular, "root", 0o644).unwrap();
    s.recalculate_at(NOW + 10);
    for path in artifact_paths() {
        let first = render::generate_file_content(&s, path).unwrap();
        let second = render::generate_file_content(&s, path).unwrap();
        assert_eq!(first, second, "{path} changed between renders");
    }
    for line in ["ps", "ps aux", "top", "ifconfig", "netstat -anp", "df", "free", "uptime", "uname -a", "w", "ls -la /", "find /etc", "dmesg", "route -n", "arp -a", "du /etc"] {
        let cmd = Command::parse(line, "/root").unwrap();
        let first = render::render_command(&s, &cmd).unwrap();
        assert_eq!(first, render::render_command(&s, &cmd).unwrap(), "{line} changed");
    }
}

#[test]
fn dynamic_sizes_match_content() {
    let mut s = StateModel::init_with(builtin_profiles()[0].clone(), 3, NOW).unwrap();
    s.add_user("backdoor", None, "/home/backdoor", "/bin/sh", "$1$x$y").unwrap();
    s.recalculate_at(NOW + 5);
    let body = render::generate_file_content(&s, "/etc/passwd").unwrap();
    assert!(body.contains("backdoor:x:"));
    assert_eq!(s.file("/etc/passwd").unwrap().size, body.len() as u64);
}
