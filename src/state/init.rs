// CLASSIFICATION: COMMUNITY
// Filename: init.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! State initializer and morph engine.
//!
//! Every generation step is a pure function of `(profile, rng, now)`. A fresh
//! [`StateModel`] is built off to the side and only then swapped into place,
//! so a morph is never observable half done.

use log::{debug, info, warn};
use zeroize::Zeroize;

use super::model::{
    parent_of, ArpEntry, Connection, ConnState, Facility, FileEntry, FileFlags, FileType,
    IfaceFlags, Interface, LogLevel, Mount, Process, ProcessFlags, ProcessState, Protocol,
    StateModel, User, MAX_LOGS,
};
use crate::error::{StateError, StateResult};
use crate::profile::{default_profile, DeviceProfile, DeviceType, MIN_RAM_KB};
use crate::render::Artifact;
use crate::utils::clock::unix_now;
use crate::utils::tiny_rng::{IpKind, TinyRng};

const DAY: i64 = 86_400;
const PID_WRAP: u32 = 32_000;

/// OUIs of the upstream gear a device usually sits behind.
const GATEWAY_OUIS: [&str; 5] = ["14:CC:20", "C0:4A:00", "A0:F3:C1", "00:1E:58", "E4:8D:8C"];

const KERNEL_THREADS: [&str; 7] = [
    "init",
    "kthreadd",
    "ksoftirqd/0",
    "kworker/0:0",
    "kswapd0",
    "watchdog/0",
    "kdevtmpfs",
];

/// Catalog entry for a userspace service.
struct ServiceDef {
    name: &'static str,
    cmdline: &'static str,
    min_kb: u32,
    max_kb: u32,
}

const fn svc(name: &'static str, cmdline: &'static str, min_kb: u32, max_kb: u32) -> ServiceDef {
    ServiceDef {
        name,
        cmdline,
        min_kb,
        max_kb,
    }
}

const ROUTER_SERVICES: [ServiceDef; 6] = [
    svc("dropbear", "/usr/sbin/dropbear -F -R", 500, 2000),
    svc("dnsmasq", "/usr/sbin/dnsmasq -C /etc/dnsmasq.conf", 1000, 4000),
    svc("httpd", "/usr/sbin/httpd -p 80 -h /www", 500, 2000),
    svc("telnetd", "/usr/sbin/telnetd -F", 300, 1000),
    svc("syslogd", "/sbin/syslogd -C16", 200, 800),
    svc("crond", "/usr/sbin/crond -f", 200, 500),
];

const CAMERA_SERVICES: [ServiceDef; 6] = [
    svc("dropbear", "/usr/sbin/dropbear -F", 500, 2000),
    svc("rtsp_srv", "/usr/bin/rtsp_server", 2000, 8000),
    svc("encoder", "/usr/bin/video_encoder", 5000, 15000),
    svc("httpd", "/usr/sbin/httpd -p 80", 500, 2000),
    svc("telnetd", "/usr/sbin/telnetd", 300, 1000),
    svc("onvif", "/usr/bin/onvif_srvd", 1000, 3000),
];

const DVR_SERVICES: [ServiceDef; 5] = [
    svc("dropbear", "/usr/sbin/dropbear -F", 500, 2000),
    svc("Sofia", "/var/Sofia", 8000, 20000),
    svc("httpd", "/usr/sbin/httpd -p 80", 500, 2000),
    svc("telnetd", "/usr/sbin/telnetd", 300, 1000),
    svc("upgraded", "/usr/bin/upgraded", 200, 600),
];

const NAS_SERVICES: [ServiceDef; 5] = [
    svc("dropbear", "/usr/sbin/dropbear -F", 500, 2000),
    svc("smbd", "/usr/sbin/smbd -D", 3000, 9000),
    svc("httpd", "/usr/sbin/httpd -p 80", 500, 2000),
    svc("nmbd", "/usr/sbin/nmbd -D", 1000, 3000),
    svc("crond", "/usr/sbin/crond -f", 200, 500),
];

const PRINTER_SERVICES: [ServiceDef; 5] = [
    svc("dropbear", "/usr/sbin/dropbear -F", 500, 2000),
    svc("lpd", "/usr/sbin/lpd -F", 400, 1200),
    svc("httpd", "/usr/sbin/httpd -p 80", 500, 2000),
    svc("snmpd", "/usr/sbin/snmpd -f", 800, 2500),
    svc("telnetd", "/usr/sbin/telnetd", 300, 1000),
];

fn service_catalog(device_type: DeviceType) -> &'static [ServiceDef] {
    match device_type {
        DeviceType::Camera => &CAMERA_SERVICES,
        DeviceType::Dvr => &DVR_SERVICES,
        DeviceType::Nas => &NAS_SERVICES,
        DeviceType::Printer => &PRINTER_SERVICES,
        DeviceType::Router | DeviceType::GenericIot => &ROUTER_SERVICES,
    }
}

/// Standard listeners per device type: `(protocol, port, owning service)`.
fn listeners(device_type: DeviceType) -> Vec<(Protocol, u16, &'static str)> {
    let mut out = vec![
        (Protocol::Tcp, 22, "dropbear"),
        (Protocol::Tcp, 23, "telnetd"),
        (Protocol::Tcp, 80, "httpd"),
    ];
    match device_type {
        DeviceType::Camera => out.push((Protocol::Tcp, 554, "rtsp_srv")),
        DeviceType::Dvr => {
            out.push((Protocol::Tcp, 554, "Sofia"));
            out.push((Protocol::Tcp, 34567, "Sofia"));
        }
        DeviceType::Router | DeviceType::GenericIot => out.push((Protocol::Udp, 53, "dnsmasq")),
        DeviceType::Nas => out.push((Protocol::Tcp, 445, "smbd")),
        DeviceType::Printer => out.push((Protocol::Tcp, 515, "lpd")),
    }
    out
}

fn validate_profile(profile: &DeviceProfile) -> StateResult<()> {
    if profile.cpu_cores == 0 {
        return Err(StateError::invalid("profile declares zero CPU cores"));
    }
    if profile.total_ram_kb == 0 || profile.total_flash_kb == 0 {
        return Err(StateError::invalid("profile declares no RAM or flash"));
    }
    if profile.total_ram_kb < MIN_RAM_KB {
        return Err(StateError::invalid(format!(
            "profile RAM {} kB below the {} kB minimum",
            profile.total_ram_kb, MIN_RAM_KB
        )));
    }
    let octets: Vec<&str> = profile.mac_prefix.split(':').collect();
    if octets.len() != 3 || octets.iter().any(|o| u8::from_str_radix(o, 16).is_err()) {
        return Err(StateError::invalid(format!(
            "bad MAC prefix {:?}",
            profile.mac_prefix
        )));
    }
    Ok(())
}

fn generate_seed(now: i64) -> u32 {
    (now as u32) ^ std::process::id().rotate_left(16)
}

impl StateModel {
    /// Build a state for `profile` (or the default profile) with a seed
    /// derived from the clock and the process id.
    pub fn init(profile: Option<DeviceProfile>) -> StateResult<StateModel> {
        let now = unix_now();
        Self::init_with(profile.unwrap_or_else(default_profile), generate_seed(now), now)
    }

    /// Reproducible initialization: equal inputs give bit-identical state.
    pub fn init_with(profile: DeviceProfile, seed: u32, now: i64) -> StateResult<StateModel> {
        let state = generate(profile, seed, now)?;
        info!(
            "state initialized: profile={} host={} seed={:#010x} uptime={}s",
            state.profile.name, state.hostname, state.state_seed, state.uptime_seconds
        );
        Ok(state)
    }

    /// Regenerate everything but the profile.
    pub fn morph(&mut self, seed: Option<u32>) -> StateResult<()> {
        self.morph_at(seed, unix_now())
    }

    /// [`morph`](Self::morph) at an explicit time.
    pub fn morph_at(&mut self, seed: Option<u32>, now: i64) -> StateResult<()> {
        let profile = self.profile.clone();
        self.replace_with(profile, seed, now)
    }

    /// Regenerate everything and switch device identity.
    pub fn morph_to_profile(&mut self, profile: DeviceProfile) -> StateResult<()> {
        self.morph_to_profile_at(profile, None, unix_now())
    }

    /// [`morph_to_profile`](Self::morph_to_profile) with explicit seed and time.
    pub fn morph_to_profile_at(
        &mut self,
        profile: DeviceProfile,
        seed: Option<u32>,
        now: i64,
    ) -> StateResult<()> {
        self.replace_with(profile, seed, now)
    }

    fn replace_with(&mut self, profile: DeviceProfile, seed: Option<u32>, now: i64) -> StateResult<()> {
        if !self.is_initialized {
            return Err(StateError::NotInitialized);
        }
        let seed = seed.unwrap_or_else(|| (now as u32) ^ self.rng.next_u32());
        let old_profile = self.profile.name.clone();
        let fresh = generate(profile, seed, now)?;
        if self.session.is_some() {
            warn!("morph dropped live attacker session");
        }
        self.wipe_sensitive();
        *self = fresh;
        info!(
            "morph complete: {} -> {} host={} seed={:#010x}",
            old_profile, self.profile.name, self.hostname, seed
        );
        Ok(())
    }

    /// Zero sensitive fields and reset to an uninitialized model.
    pub fn destroy(&mut self) {
        self.wipe_sensitive();
        *self = StateModel::default();
        debug!("state destroyed");
    }

    fn wipe_sensitive(&mut self) {
        for user in self.users.iter_mut() {
            user.password_hash.zeroize();
        }
        if let Some(session) = self.session.as_mut() {
            session.session_id.zeroize();
            session.source_ip.zeroize();
            session.username.zeroize();
            if let Some(cmd) = session.last_command.as_mut() {
                cmd.zeroize();
            }
        }
        self.session = None;
    }

    /// Hand out the next free PID, advancing the counter by a random step and
    /// wrapping at 32000.
    pub(crate) fn allocate_pid(&mut self) -> u32 {
        loop {
            let pid = self.next_pid;
            self.next_pid = pid + self.rng.between(1, 100);
            if self.next_pid > PID_WRAP {
                self.next_pid = self.rng.between(1000, 2000);
            }
            if self.process(pid).is_none() {
                return pid;
            }
        }
    }
}

/// Build a complete, correlated state.
fn generate(profile: DeviceProfile, seed: u32, now: i64) -> StateResult<StateModel> {
    validate_profile(&profile)?;
    let mut s = StateModel {
        rng: TinyRng::new(seed),
        state_seed: seed,
        total_memory_kb: profile.total_ram_kb,
        profile,
        ..StateModel::default()
    };

    gen_time(&mut s, now);
    gen_hostname(&mut s);
    gen_users(&mut s)?;
    gen_processes(&mut s)?;
    gen_network(&mut s)?;
    gen_mounts(&mut s)?;
    gen_filesystem(&mut s)?;
    gen_logs(&mut s);

    let pct = s.rng.between(10, 20);
    s.kernel_memory_kb = s.total_memory_kb / 100 * pct;
    gen_neighbors(&mut s)?;
    s.last_morph_time = now;
    s.is_initialized = true;
    s.recalculate_at(now);
    debug!(
        "generated {} users, {} processes, {} files, {} connections",
        s.users.len(),
        s.processes.len(),
        s.files.len(),
        s.connections.len()
    );
    Ok(s)
}

fn gen_time(s: &mut StateModel, now: i64) {
    let uptime = if s.rng.chance(20) {
        let years = s.rng.between(1, 5) as i64;
        years * 365 * DAY + s.rng.between(0, 86_399) as i64
    } else {
        // Nested draw biases toward short uptimes.
        let cap = s.rng.between(1, 90);
        let days = s.rng.between(1, cap) as i64;
        days * DAY + s.rng.between(0, 23) as i64 * 3600 + s.rng.between(0, 59) as i64 * 60
    };
    s.boot_time = now - uptime;
    s.uptime_seconds = uptime as u64;
    s.aged_until = s.uptime_seconds;
}

fn gen_hostname(s: &mut StateModel) {
    let prefix = match s.profile.device_type.hostname_prefix() {
        Some(p) => p,
        None => *s.rng.pick(&["device", "iot"]),
    };
    s.hostname = format!("{}-{:04X}", prefix, s.rng.between(0, 0xFFFF));
}

fn user(name: &str, hash: String, uid: u32, gecos: &str, home: &str, shell: &str) -> User {
    User {
        username: name.into(),
        password_hash: hash,
        uid,
        gid: uid,
        gecos: gecos.into(),
        home: home.into(),
        shell: shell.into(),
        can_login: shell != "/bin/false",
    }
}

fn gen_users(s: &mut StateModel) -> StateResult<()> {
    let root_hash = s.rng.crypt_hash();
    s.users.push(user("root", root_hash, 0, "root", "/root", "/bin/sh"))?;
    let admin_hash = s.rng.crypt_hash();
    let admin_uid = s.rng.between(1000, 1005);
    s.users.push(user(
        "admin",
        admin_hash,
        admin_uid,
        "Administrator",
        "/home/admin",
        "/bin/sh",
    ))?;
    for (name, uid) in [("daemon", 1), ("bin", 2), ("sys", 3), ("nobody", 65534)] {
        s.users
            .push(user(name, "*".into(), uid, name, "/", "/bin/false"))?;
    }
    let extra = match s.profile.device_type {
        DeviceType::Camera if s.rng.chance(70) => Some(("rtsp", "/var/run/rtsp")),
        DeviceType::Router if s.rng.chance(60) => Some(("dnsmasq", "/var/lib/misc")),
        _ => None,
    };
    if let Some((name, home)) = extra {
        let uid = admin_uid + s.rng.between(1, 5);
        s.users
            .push(user(name, "*".into(), uid, name, home, "/bin/false"))?;
    }
    Ok(())
}

fn gen_processes(s: &mut StateModel) -> StateResult<()> {
    let count = s.rng.between(5, KERNEL_THREADS.len() as u32) as usize;
    let mut pid = 1;
    for (i, name) in KERNEL_THREADS.iter().take(count).enumerate() {
        if i > 0 {
            pid += s.rng.between(1, 8);
        }
        let is_init = i == 0;
        let memory_kb = if is_init { s.rng.between(200, 600) } else { 0 };
        let virtual_kb = memory_kb * s.rng.between(2, 4);
        let cpu_percent = s.rng.between(0, 3);
        let mut flags = ProcessFlags::VISIBLE | ProcessFlags::SERVICE;
        if !is_init {
            flags |= ProcessFlags::KERNEL_THREAD;
        }
        s.processes.push(Process {
            pid,
            ppid: if i <= 1 { 0 } else { 2 },
            uid: 0,
            name: (*name).into(),
            cmdline: if is_init {
                "init".into()
            } else {
                format!("[{}]", name)
            },
            state: ProcessState::Sleeping,
            memory_kb,
            virtual_kb,
            cpu_percent,
            start_offset: i as i64,
            tty: None,
            flags,
        })?;
    }

    s.next_pid = pid + s.rng.between(1, 500);
    let catalog = service_catalog(s.profile.device_type);
    let wanted = s.rng.between(3, catalog.len() as u32) as usize;
    // Services share half of RAM; catalog sizes shrink to fit small devices.
    let resident: u64 = s.processes.iter().map(|p| u64::from(p.memory_kb)).sum();
    let budget = (u64::from(s.profile.total_ram_kb) / 2).saturating_sub(resident);
    let catalog_max: u64 = catalog.iter().take(wanted).map(|d| u64::from(d.max_kb)).sum();
    let mut start = 5i64;
    for def in catalog.iter().take(wanted) {
        let pid = s.allocate_pid();
        let uid = match def.name {
            "dnsmasq" => s.user("dnsmasq").map(|u| u.uid).unwrap_or(65534),
            "rtsp_srv" => s.user("rtsp").map(|u| u.uid).unwrap_or(0),
            _ => 0,
        };
        let mut memory_kb = s.rng.between(def.min_kb, def.max_kb);
        if catalog_max > budget {
            memory_kb = (u64::from(memory_kb) * budget / catalog_max) as u32;
        }
        let virtual_kb = memory_kb * s.rng.between(2, 4);
        let cpu_percent = s.rng.between(0, 30);
        let state = if s.rng.chance(15) {
            ProcessState::Running
        } else {
            ProcessState::Sleeping
        };
        s.processes.push(Process {
            pid,
            ppid: 1,
            uid,
            name: def.name.into(),
            cmdline: def.cmdline.into(),
            state,
            memory_kb,
            virtual_kb,
            cpu_percent,
            start_offset: start,
            tty: None,
            flags: ProcessFlags::VISIBLE | ProcessFlags::SERVICE,
        })?;
        start += s.rng.between(1, 20) as i64;
    }
    Ok(())
}

fn iface(name: &str, ip: String, netmask: &str, mac: String, mtu: u32) -> Interface {
    let octets: Vec<&str> = ip.split('.').collect();
    let (broadcast, gateway) = if octets.len() == 4 && netmask == "255.255.255.0" {
        (
            format!("{}.{}.{}.255", octets[0], octets[1], octets[2]),
            Some(format!("{}.{}.{}.1", octets[0], octets[1], octets[2])),
        )
    } else {
        ("127.255.255.255".to_string(), None)
    };
    Interface {
        name: name.into(),
        ip,
        netmask: netmask.into(),
        broadcast,
        gateway,
        mac,
        mtu,
        rx_bytes_per_day: 0,
        tx_bytes_per_day: 0,
        avg_packet_bytes: 1000,
        rx_bytes: 0,
        tx_bytes: 0,
        rx_packets: 0,
        tx_packets: 0,
        flags: IfaceFlags::UP,
    }
}

fn gen_network(s: &mut StateModel) -> StateResult<()> {
    let mut lo = iface(
        "lo",
        "127.0.0.1".into(),
        "255.0.0.0",
        "00:00:00:00:00:00".into(),
        65536,
    );
    lo.flags |= IfaceFlags::LOOPBACK;
    lo.rx_bytes_per_day = s.rng.between(5_000, 50_000) as u64;
    lo.tx_bytes_per_day = lo.rx_bytes_per_day;
    lo.avg_packet_bytes = 100;
    s.interfaces.push(lo)?;

    let ip = s.rng.ip(IpKind::Lan);
    let mac = s.rng.mac(Some(&s.profile.mac_prefix));
    let mut eth = iface("eth0", ip, "255.255.255.0", mac, 1500);
    eth.rx_bytes_per_day = s.rng.between(1_000_000, 10_000_000) as u64;
    eth.tx_bytes_per_day = s.rng.between(500_000, 5_000_000) as u64;
    eth.avg_packet_bytes = s.rng.between(500, 1500);
    s.interfaces.push(eth)?;

    if s.profile.device_type == DeviceType::Router && s.rng.chance(70) {
        let ip = s.rng.ip(IpKind::Wan);
        let mac = s.rng.mac(Some(&s.profile.mac_prefix));
        let mut wan = iface("eth1", ip, "255.255.255.0", mac, 1500);
        wan.rx_bytes_per_day = s.rng.between(10_000_000, 100_000_000) as u64;
        wan.tx_bytes_per_day = s.rng.between(5_000_000, 50_000_000) as u64;
        wan.avg_packet_bytes = 1000;
        s.interfaces.push(wan)?;
    }

    for (protocol, port, owner) in listeners(s.profile.device_type) {
        let Some(pid) = s.process_by_name(owner).map(|p| p.pid) else {
            continue;
        };
        if port == 23 && s.rng.chance(30) {
            continue;
        }
        if s.connections
            .iter()
            .any(|c| c.protocol == protocol && c.local_port == port)
        {
            continue;
        }
        s.connections.push(Connection {
            protocol,
            local_ip: "0.0.0.0".into(),
            local_port: port,
            remote_ip: "0.0.0.0".into(),
            remote_port: 0,
            state: ConnState::Listen,
            owner_pid: Some(pid),
        })?;
    }
    Ok(())
}

/// Neighbour cache: each gateway as a permanent entry, then a few LAN hosts
/// on the primary subnet.
fn gen_neighbors(s: &mut StateModel) -> StateResult<()> {
    let gateways: Vec<(String, String)> = s
        .interfaces
        .iter()
        .filter(|i| !i.is_loopback())
        .filter_map(|i| {
            let gw = i.gateway.clone()?;
            (gw != i.ip).then(|| (gw, i.name.clone()))
        })
        .collect();
    for (ip, iface) in &gateways {
        let oui = *s.rng.pick(&GATEWAY_OUIS);
        let mac = s.rng.mac(Some(oui));
        s.neighbors.push(ArpEntry {
            ip: ip.clone(),
            mac,
            iface: iface.clone(),
            permanent: true,
        })?;
    }

    let Some(primary) = s.primary_interface().map(|i| (i.name.clone(), i.ip.clone())) else {
        return Ok(());
    };
    let (iface, own_ip) = primary;
    let Some((net, _)) = own_ip.rsplit_once('.') else {
        return Ok(());
    };
    let net = net.to_string();
    let hosts = s.rng.between(2, 6);
    for _ in 0..hosts {
        let ip = format!("{}.{}", net, s.rng.between(2, 254));
        let mac = s.rng.mac(None);
        if ip == own_ip || s.neighbors.iter().any(|n| n.ip == ip) {
            continue;
        }
        s.neighbors.push(ArpEntry {
            ip,
            mac,
            iface: iface.clone(),
            permanent: false,
        })?;
    }
    Ok(())
}

fn mount(device: &str, point: &str, fs_type: &str, options: &str, total: u64, used: u64) -> Mount {
    Mount {
        device: device.into(),
        mount_point: point.into(),
        fs_type: fs_type.into(),
        options: options.into(),
        total_kb: total,
        base_used_kb: used,
        used_kb: used,
        available_kb: total.saturating_sub(used),
    }
}

fn gen_mounts(s: &mut StateModel) -> StateResult<()> {
    let flash = s.profile.total_flash_kb;
    let root_used = s.rng.between(flash / 100 * 60, flash / 100 * 80) as u64;
    s.mounts.push(mount(
        "/dev/root",
        "/",
        "squashfs",
        "ro,relatime",
        flash as u64,
        root_used,
    ))?;
    let tmp_total = s.profile.total_ram_kb / 2;
    let tmp_used = s.rng.between(100, (tmp_total / 10).max(100)) as u64;
    s.mounts.push(mount(
        "tmpfs",
        "/tmp",
        "tmpfs",
        "rw,nosuid,nodev",
        tmp_total as u64,
        tmp_used,
    ))?;
    let virt = "rw,nosuid,nodev,noexec,relatime";
    s.mounts.push(mount("proc", "/proc", "proc", virt, 0, 0))?;
    s.mounts.push(mount("sysfs", "/sys", "sysfs", virt, 0, 0))?;
    Ok(())
}

/// Collects filesystem entries with shared defaults.
struct TreeBuilder<'a> {
    s: &'a mut StateModel,
}

impl TreeBuilder<'_> {
    fn entry(&mut self, path: &str, file_type: FileType, mode: u32, owner: &str, offset: i64) -> FileEntry {
        let group = self
            .s
            .user(owner)
            .map(|u| self.s.group_name(u.gid))
            .unwrap_or_else(|| "root".into());
        FileEntry {
            path: path.into(),
            file_type,
            mode,
            owner: owner.into(),
            group,
            size: if file_type == FileType::Directory { 4096 } else { 0 },
            atime_offset: offset,
            mtime_offset: offset,
            ctime_offset: offset,
            target: None,
            rdev: None,
            dynamic: None,
            flags: FileFlags::empty(),
        }
    }

    fn dir(&mut self, path: &str, mode: u32, owner: &str, offset: i64) -> StateResult<()> {
        let e = self.entry(path, FileType::Directory, mode, owner, offset);
        self.push(e)
    }

    fn file(&mut self, path: &str, mode: u32, size: u64, offset: i64) -> StateResult<()> {
        let mut e = self.entry(path, FileType::Regular, mode, "root", offset);
        e.size = size;
        self.push(e)
    }

    fn dynamic(&mut self, path: &str, mode: u32, artifact: Artifact, offset: i64) -> StateResult<()> {
        let mut e = self.entry(path, FileType::Regular, mode, "root", offset);
        e.dynamic = Some(artifact);
        self.push(e)
    }

    fn link(&mut self, path: &str, target: &str, offset: i64) -> StateResult<()> {
        let mut e = self.entry(path, FileType::Symlink, 0o777, "root", offset);
        e.size = target.len() as u64;
        e.target = Some(target.into());
        self.push(e)
    }

    fn device(&mut self, path: &str, mode: u32, rdev: (u32, u32), offset: i64) -> StateResult<()> {
        let mut e = self.entry(path, FileType::Device, mode, "root", offset);
        e.rdev = Some(rdev);
        self.push(e)
    }

    fn push(&mut self, entry: FileEntry) -> StateResult<()> {
        if self.s.file(&entry.path).is_some() {
            return Ok(());
        }
        self.s.files.push(entry)
    }
}

fn gen_filesystem(s: &mut StateModel) -> StateResult<()> {
    let uptime = s.uptime_seconds as i64;
    let firmware = -(s.rng.between(30, 400) as i64 * DAY + s.rng.between(0, 86_399) as i64);
    let config = s.rng.between(1, 30) as i64;
    let recent = (uptime - s.rng.between(0, 600) as i64).max(config);
    let busybox_kb = s.rng.between(400, 900) as u64;
    let libc_kb = s.rng.between(300, 600) as u64;
    let device_type = s.profile.device_type;
    let home_dirs: Vec<(String, String)> = s
        .users
        .iter()
        .filter(|u| u.home != "/" && u.home != "/root")
        .map(|u| (u.home.clone(), u.username.clone()))
        .collect();
    let binaries: Vec<String> = s
        .processes
        .iter()
        .filter(|p| !p.is_kernel_thread() && p.cmdline.starts_with('/'))
        .filter_map(|p| p.cmdline.split_whitespace().next().map(str::to_string))
        .collect();
    let binary_sizes: Vec<u64> = binaries
        .iter()
        .map(|_| s.rng.between(40, 900) as u64 * 1024)
        .collect();

    let mut t = TreeBuilder { s };
    t.dir("/", 0o755, "root", firmware)?;
    for dir in ["/bin", "/sbin", "/lib", "/usr", "/usr/bin", "/usr/sbin", "/mnt", "/home"] {
        t.dir(dir, 0o755, "root", firmware)?;
    }
    for dir in ["/proc", "/sys", "/dev"] {
        t.dir(dir, 0o555, "root", 0)?;
    }
    t.dir("/etc", 0o755, "root", config)?;
    t.dir("/var", 0o755, "root", 1)?;
    t.dir("/var/log", 0o755, "root", recent)?;
    t.dir("/var/run", 0o755, "root", config)?;
    t.dir("/var/lib", 0o755, "root", 1)?;
    t.dir("/tmp", 0o1777, "root", recent)?;
    t.dir("/root", 0o700, "root", config)?;

    t.file("/bin/busybox", 0o755, busybox_kb * 1024, firmware)?;
    for applet in ["sh", "ls", "cat", "ps", "echo", "mount", "grep", "kill", "vi", "wget"] {
        t.link(&format!("/bin/{}", applet), "busybox", firmware)?;
    }
    for applet in ["ifconfig", "reboot", "route"] {
        t.link(&format!("/sbin/{}", applet), "../bin/busybox", firmware)?;
    }
    t.link("/sbin/init", "../bin/busybox", firmware)?;
    t.file("/lib/libc.so.0", 0o755, libc_kb * 1024, firmware)?;
    t.link("/lib/ld-uClibc.so.0", "libc.so.0", firmware)?;
    for (bin, size) in binaries.iter().zip(binary_sizes) {
        let parent = parent_of(bin).to_string();
        if parent != "/" {
            t.dir(&parent, 0o755, "root", firmware)?;
        }
        if bin.starts_with("/sbin/") && bin != "/sbin/init" {
            t.link(bin, "../bin/busybox", firmware)?;
        } else {
            t.file(bin, 0o755, size, firmware)?;
        }
    }

    t.dynamic("/etc/passwd", 0o644, Artifact::EtcPasswd, config)?;
    t.dynamic("/etc/shadow", 0o600, Artifact::EtcShadow, config)?;
    t.dynamic("/etc/group", 0o644, Artifact::EtcGroup, config)?;
    t.dynamic("/etc/hostname", 0o644, Artifact::EtcHostname, config)?;
    t.dynamic("/etc/banner", 0o644, Artifact::EtcBanner, firmware)?;
    t.file("/etc/inittab", 0o644, 412, firmware)?;
    t.file("/etc/fstab", 0o644, 186, firmware)?;
    t.file("/etc/profile", 0o644, 548, firmware)?;
    t.link("/etc/mtab", "/proc/mounts", firmware)?;
    t.dynamic("/var/log/messages", 0o644, Artifact::VarLogMessages, recent)?;

    match device_type {
        DeviceType::Router | DeviceType::GenericIot => {
            t.dir("/www", 0o755, "root", firmware)?;
            t.file("/www/index.html", 0o644, 2_317, firmware)?;
            t.file("/etc/dnsmasq.conf", 0o644, 823, config)?;
            t.dir("/etc/config", 0o755, "root", config)?;
            t.file("/etc/config/network", 0o644, 611, config)?;
            t.file("/etc/config/wireless", 0o600, 402, config)?;
        }
        DeviceType::Camera | DeviceType::Dvr => {
            t.dir("/mnt/mtd", 0o755, "root", config)?;
            t.dir("/mnt/mtd/Config", 0o755, "root", config)?;
            t.file("/mnt/mtd/Config/Account1", 0o644, 1_274, config)?;
            t.file("/mnt/mtd/Config/network", 0o644, 356, config)?;
        }
        DeviceType::Nas | DeviceType::Printer => {
            t.dir("/mnt/data", 0o755, "root", config)?;
        }
    }

    for (home, owner) in home_dirs {
        let mut chain = Vec::new();
        let mut cur = parent_of(&home).to_string();
        while cur != "/" {
            chain.push(cur.clone());
            cur = parent_of(&cur).to_string();
        }
        for dir in chain.iter().rev() {
            t.dir(dir, 0o755, "root", config)?;
        }
        t.dir(&home, 0o755, &owner, config)?;
    }

    for (path, rdev) in [
        ("/dev/null", (1, 3)),
        ("/dev/zero", (1, 5)),
        ("/dev/urandom", (1, 9)),
        ("/dev/console", (5, 1)),
        ("/dev/ttyS0", (4, 64)),
        ("/dev/mtdblock0", (31, 0)),
    ] {
        let mode = if path == "/dev/console" { 0o600 } else { 0o666 };
        t.device(path, mode, rdev, 0)?;
    }
    Ok(())
}

fn gen_logs(s: &mut StateModel) {
    let kern = |s: &mut StateModel, offset: i64, msg: String| {
        s.log_at(offset, LogLevel::Info, Facility::Kern, "kernel", None, msg);
    };
    let banner = format!("Linux version {}", s.profile.kernel_version);
    let cpu = format!("CPU revision is: {}", s.profile.cpu_model);
    let ram = s.profile.total_ram_kb;
    let memory = format!("Memory: {}k/{}k available", ram - ram / 16, ram);
    kern(s, 0, banner);
    kern(s, 0, cpu);
    kern(s, 0, memory);
    kern(s, 1, "VFS: Mounted root (squashfs filesystem) readonly on device 31:2.".into());
    kern(s, 2, "eth0: link up (100Mbps/Full duplex)".into());

    let services: Vec<(u32, String, i64)> = s
        .processes
        .iter()
        .filter(|p| !p.is_kernel_thread() && p.pid != 1)
        .map(|p| (p.pid, p.name.clone(), p.start_offset))
        .collect();
    for (pid, name, offset) in &services {
        let msg = match name.as_str() {
            "dropbear" => "Running in background".to_string(),
            "dnsmasq" => "started, version 2.80 cachesize 150".to_string(),
            "syslogd" => format!("syslogd started: BusyBox v{}", s.profile.busybox_version),
            "crond" => format!("crond (busybox {}) started, log level 8", s.profile.busybox_version),
            _ => "started".to_string(),
        };
        s.log_at(*offset, LogLevel::Info, Facility::Daemon, name, Some(*pid), msg);
    }

    let uptime = s.uptime_seconds as i64;
    let interval = s.rng.between(1800, 7200) as i64;
    // Keep boot lines in the ring: noise adds at most two entries per round.
    let room = (MAX_LOGS.saturating_sub(s.logs.len()) / 2).min(200) as i64;
    let count = (uptime / interval).clamp(0, room);
    for k in (1..=count).rev() {
        let offset = (uptime - k * interval + s.rng.between(0, 300) as i64).max(130).min(uptime);
        s.push_noise(offset);
    }
    s.logs.sort_by_key(|e| e.time_offset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin_profile;

    const NOW: i64 = 1_760_000_000;

    fn archer() -> DeviceProfile {
        builtin_profile("TP-Link_Archer_C7").unwrap()
    }

    #[test]
    fn same_seed_same_state() {
        let a = StateModel::init_with(archer(), 42, NOW).unwrap();
        let b = StateModel::init_with(archer(), 42, NOW).unwrap();
        assert_eq!(a, b);
        let c = StateModel::init_with(archer(), 43, NOW).unwrap();
        assert!(a.hostname != c.hostname || a.boot_time != c.boot_time);
    }

    #[test]
    fn morph_equals_fresh_init() {
        let mut s = StateModel::init_with(archer(), 1, NOW).unwrap();
        s.morph_at(Some(77), NOW + 10).unwrap();
        let fresh = StateModel::init_with(archer(), 77, NOW + 10).unwrap();
        assert_eq!(s, fresh);
    }

    #[test]
    fn hostname_matches_type() {
        let s = StateModel::init_with(archer(), 5, NOW).unwrap();
        assert!(s.hostname.starts_with("router-"));
        assert_eq!(s.hostname.len(), "router-".len() + 4);
    }

    #[test]
    fn pids_unique_and_init_first() {
        for seed in 1..50 {
            let s = StateModel::init_with(archer(), seed, NOW).unwrap();
            assert_eq!(s.processes[0].pid, 1);
            let mut pids: Vec<u32> = s.processes.iter().map(|p| p.pid).collect();
            pids.sort_unstable();
            pids.dedup();
            assert_eq!(pids.len(), s.processes.len());
        }
    }

    #[test]
    fn listeners_have_owners() {
        for seed in 1..50 {
            let s = StateModel::init_with(archer(), seed, NOW).unwrap();
            assert!(s.connections.iter().any(|c| c.local_port == 22));
            for c in s.connections.iter() {
                assert!(s.process(c.owner_pid.unwrap()).is_some());
            }
        }
    }

    #[test]
    fn morph_requires_init() {
        let mut s = StateModel::default();
        assert!(matches!(s.morph_at(Some(1), NOW), Err(StateError::NotInitialized)));
    }

    #[test]
    fn destroy_resets() {
        let mut s = StateModel::init_with(archer(), 9, NOW).unwrap();
        s.destroy();
        assert!(!s.is_initialized);
        assert!(s.users.is_empty());
    }

    #[test]
    fn rejects_bad_profile() {
        let mut p = archer();
        p.cpu_cores = 0;
        assert!(StateModel::init_with(p, 1, NOW).is_err());
        let mut tiny = archer();
        tiny.total_ram_kb = MIN_RAM_KB - 1;
        assert!(matches!(
            StateModel::init_with(tiny, 1, NOW),
            Err(StateError::InvalidInput(_))
        ));
    }

    #[test]
    fn small_ram_devices_stay_consistent() {
        for name in ["Hikvision_DS-2CD2", "XiongMai_NBD80", "Dahua_IPC-HDW"] {
            for ram in [MIN_RAM_KB, 8 * 1024, 16 * 1024] {
                let mut p = builtin_profile(name).unwrap();
                p.total_ram_kb = ram;
                for seed in 1..40 {
                    let s = StateModel::init_with(p.clone(), seed, NOW).unwrap();
                    s.check_invariants().unwrap();
                    let process_kb: u32 = s.processes.iter().map(|p| p.memory_kb).sum();
                    assert!(process_kb <= ram / 2, "{} {}kB seed {}", name, ram, seed);
                }
            }
        }
    }
}
