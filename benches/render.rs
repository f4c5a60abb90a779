// CLASSIFICATION: COMMUNITY
// Filename: render.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use cerberus::profile::builtin_profile;
use cerberus::render::{self, Artifact, Command};
use cerberus::StateModel;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const NOW: i64 = 1_760_000_000;

fn make_state() -> StateModel {
    StateModel::init_with(builtin_profile("Netgear_R7000").unwrap(), 42, NOW).unwrap()
}

fn bench_init(c: &mut Criterion) {
    let profile = builtin_profile("Netgear_R7000").unwrap();
    c.bench_function("init_with", |b| {
        b.iter(|| StateModel::init_with(black_box(profile.clone()), 42, NOW).unwrap());
    });
}

fn bench_generators(c: &mut Criterion) {
    let state = make_state();
    c.bench_function("proc_meminfo", |b| {
        b.iter(|| render::render_artifact(black_box(&state), Artifact::ProcMeminfo).unwrap());
    });
    c.bench_function("etc_passwd", |b| {
        b.iter(|| render::generate_file_content(black_box(&state), "/etc/passwd").unwrap());
    });
    let ps = Command::parse("ps aux", "/root").unwrap();
    c.bench_function("ps_aux", |b| {
        b.iter(|| render::render_command(black_box(&state), &ps).unwrap());
    });
    let mut buf = vec![0u8; 16 * 1024];
    let netstat = Command::parse("netstat -anp", "/root").unwrap();
    c.bench_function("netstat_into", |b| {
        b.iter(|| render::render_command_into(black_box(&state), &netstat, &mut buf).unwrap());
    });
}

criterion_group!(benches, bench_init, bench_generators);
criterion_main!(benches);
