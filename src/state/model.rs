// CLASSIFICATION: COMMUNITY
// Filename: model.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! State model aggregate and record types.
//!
//! [`StateModel`] is the single source of truth for a fake device. Every
//! rendered artifact is computed from these fields. Derived fields (memory
//! totals, load averages, CPU usage) are written only by the correlation pass
//! in [`super::correlate`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::bounded::{BoundedVec, LogRing, Record};
use crate::profile::{default_profile, DeviceProfile};
use crate::render::Artifact;
use crate::utils::tiny_rng::TinyRng;

pub const MAX_PROCESSES: usize = 128;
pub const MAX_FILES: usize = 512;
pub const MAX_USERS: usize = 32;
pub const MAX_CONNECTIONS: usize = 64;
pub const MAX_LOGS: usize = 256;
pub const MAX_INTERFACES: usize = 8;
pub const MAX_MOUNTS: usize = 16;
pub const MAX_NEIGHBORS: usize = 16;

/// Account entry backing `/etc/passwd` and `/etc/shadow`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub uid: u32,
    pub gid: u32,
    pub gecos: String,
    pub home: String,
    pub shell: String,
    pub can_login: bool,
}

impl Record for User {
    const COLLECTION: &'static str = "users";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    Running,
    Sleeping,
    DiskWait,
    Zombie,
    Stopped,
}

impl ProcessState {
    /// Single letter used by `ps` and `/proc/<pid>/status`.
    pub fn code(&self) -> char {
        match self {
            ProcessState::Running => 'R',
            ProcessState::Sleeping => 'S',
            ProcessState::DiskWait => 'D',
            ProcessState::Zombie => 'Z',
            ProcessState::Stopped => 'T',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcessState::Running => "R (running)",
            ProcessState::Sleeping => "S (sleeping)",
            ProcessState::DiskWait => "D (disk sleep)",
            ProcessState::Zombie => "Z (zombie)",
            ProcessState::Stopped => "T (stopped)",
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ProcessFlags: u8 {
        const KERNEL_THREAD = 0b0001;
        const SERVICE = 0b0010;
        const VISIBLE = 0b0100;
        const ATTACKER = 0b1000;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub pid: u32,
    pub ppid: u32,
    pub uid: u32,
    pub name: String,
    pub cmdline: String,
    pub state: ProcessState,
    pub memory_kb: u32,
    pub virtual_kb: u32,
    /// Percent ×10.
    pub cpu_percent: u32,
    /// Seconds after boot.
    pub start_offset: i64,
    pub tty: Option<String>,
    pub flags: ProcessFlags,
}

impl Record for Process {
    const COLLECTION: &'static str = "processes";
}

impl Process {
    pub fn is_kernel_thread(&self) -> bool {
        self.flags.contains(ProcessFlags::KERNEL_THREAD)
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(ProcessFlags::VISIBLE)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
    Device,
    Fifo,
    Socket,
}

impl FileType {
    /// Leading character of an `ls -l` mode string.
    pub fn type_char(&self) -> char {
        match self {
            FileType::Regular => '-',
            FileType::Directory => 'd',
            FileType::Symlink => 'l',
            FileType::Device => 'c',
            FileType::Fifo => 'p',
            FileType::Socket => 's',
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FileFlags: u8 {
        const ATTACKER = 0b01;
        const DELETED = 0b10;
    }
}

/// Filesystem entry. Timestamps are offsets from `boot_time` and may be
/// negative for files older than the current boot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub file_type: FileType,
    pub mode: u32,
    pub owner: String,
    pub group: String,
    pub size: u64,
    pub atime_offset: i64,
    pub mtime_offset: i64,
    pub ctime_offset: i64,
    pub target: Option<String>,
    pub rdev: Option<(u32, u32)>,
    /// Generator whose output is this file's content.
    pub dynamic: Option<Artifact>,
    pub flags: FileFlags,
}

impl Record for FileEntry {
    const COLLECTION: &'static str = "files";
}

impl FileEntry {
    pub fn is_deleted(&self) -> bool {
        self.flags.contains(FileFlags::DELETED)
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Final path component.
    pub fn name(&self) -> &str {
        if self.path == "/" {
            return "/";
        }
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct IfaceFlags: u8 {
        const UP = 0b001;
        const LOOPBACK = 0b010;
        const WIRELESS = 0b100;
    }
}

/// Network interface. Counters are recomputed from uptime and the stored
/// daily rates, so they grow monotonically with uptime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub ip: String,
    pub netmask: String,
    pub broadcast: String,
    pub gateway: Option<String>,
    pub mac: String,
    pub mtu: u32,
    pub rx_bytes_per_day: u64,
    pub tx_bytes_per_day: u64,
    pub avg_packet_bytes: u32,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub flags: IfaceFlags,
}

impl Record for Interface {
    const COLLECTION: &'static str = "interfaces";
}

impl Interface {
    pub fn is_loopback(&self) -> bool {
        self.flags.contains(IfaceFlags::LOOPBACK)
    }

    pub fn is_up(&self) -> bool {
        self.flags.contains(IfaceFlags::UP)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnState {
    Listen,
    Established,
    TimeWait,
    CloseWait,
    SynSent,
    SynRecv,
}

impl ConnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnState::Listen => "LISTEN",
            ConnState::Established => "ESTABLISHED",
            ConnState::TimeWait => "TIME_WAIT",
            ConnState::CloseWait => "CLOSE_WAIT",
            ConnState::SynSent => "SYN_SENT",
            ConnState::SynRecv => "SYN_RECV",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub protocol: Protocol,
    pub local_ip: String,
    pub local_port: u16,
    pub remote_ip: String,
    pub remote_port: u16,
    pub state: ConnState,
    pub owner_pid: Option<u32>,
}

impl Record for Connection {
    const COLLECTION: &'static str = "connections";
}

/// Neighbour cache entry shown by `arp`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArpEntry {
    pub ip: String,
    pub mac: String,
    pub iface: String,
    /// Statically configured (the gateway) rather than learned.
    pub permanent: bool,
}

impl Record for ArpEntry {
    const COLLECTION: &'static str = "neighbors";
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mount {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
    pub options: String,
    pub total_kb: u64,
    /// Usage not attributable to tracked files.
    pub base_used_kb: u64,
    pub used_kb: u64,
    pub available_kb: u64,
}

impl Record for Mount {
    const COLLECTION: &'static str = "mounts";
}

/// Syslog severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Emerg,
    Alert,
    Crit,
    Err,
    Warning,
    Notice,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Emerg => "emerg",
            LogLevel::Alert => "alert",
            LogLevel::Crit => "crit",
            LogLevel::Err => "err",
            LogLevel::Warning => "warn",
            LogLevel::Notice => "notice",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facility {
    Kern,
    User,
    Daemon,
    Auth,
    Cron,
    Syslog,
}

impl Facility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facility::Kern => "kern",
            Facility::User => "user",
            Facility::Daemon => "daemon",
            Facility::Auth => "authpriv",
            Facility::Cron => "cron",
            Facility::Syslog => "syslog",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Seconds after boot.
    pub time_offset: i64,
    pub level: LogLevel,
    pub facility: Facility,
    pub service: String,
    pub pid: Option<u32>,
    pub message: String,
}

/// The one live attacker session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackerSession {
    pub session_id: String,
    pub connect_time: i64,
    pub source_ip: String,
    pub source_port: u16,
    pub local_port: u16,
    pub username: String,
    pub cwd: String,
    pub commands_executed: u32,
    pub files_created: u32,
    pub files_deleted: u32,
    pub processes_started: u32,
    pub last_command: Option<String>,
    pub last_command_time: i64,
    pub suspicious: bool,
}

/// Aggregate device state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateModel {
    pub profile: DeviceProfile,
    pub hostname: String,
    pub state_seed: u32,
    pub(crate) rng: TinyRng,

    pub boot_time: i64,
    pub uptime_seconds: u64,
    pub last_morph_time: i64,
    /// Uptime up to which background activity has been simulated.
    #[serde(default)]
    pub aged_until: u64,

    pub users: BoundedVec<User, MAX_USERS>,
    pub processes: BoundedVec<Process, MAX_PROCESSES>,
    pub files: BoundedVec<FileEntry, MAX_FILES>,
    pub interfaces: BoundedVec<Interface, MAX_INTERFACES>,
    pub connections: BoundedVec<Connection, MAX_CONNECTIONS>,
    pub mounts: BoundedVec<Mount, MAX_MOUNTS>,
    #[serde(default)]
    pub neighbors: BoundedVec<ArpEntry, MAX_NEIGHBORS>,
    pub logs: LogRing<LogEntry, MAX_LOGS>,

    pub total_memory_kb: u32,
    pub used_memory_kb: u32,
    pub free_memory_kb: u32,
    pub cached_memory_kb: u32,
    pub buffer_memory_kb: u32,
    /// Kernel and slab overhead, fixed per morph.
    pub kernel_memory_kb: u32,
    /// Percent ×10.
    pub cpu_usage_percent: u32,
    /// 1/5/15 minute load ×100.
    pub load_avg: [u32; 3],

    pub next_pid: u32,
    pub session: Option<AttackerSession>,
    pub(crate) session_counter: u32,

    pub is_initialized: bool,
    pub needs_recalculation: bool,
}

impl Default for StateModel {
    /// Empty, uninitialized model.
    fn default() -> Self {
        Self {
            profile: default_profile(),
            hostname: String::new(),
            state_seed: 0,
            rng: TinyRng::default(),
            boot_time: 0,
            uptime_seconds: 0,
            last_morph_time: 0,
            aged_until: 0,
            users: BoundedVec::new(),
            processes: BoundedVec::new(),
            files: BoundedVec::new(),
            interfaces: BoundedVec::new(),
            connections: BoundedVec::new(),
            mounts: BoundedVec::new(),
            neighbors: BoundedVec::new(),
            logs: LogRing::new(),
            total_memory_kb: 0,
            used_memory_kb: 0,
            free_memory_kb: 0,
            cached_memory_kb: 0,
            buffer_memory_kb: 0,
            kernel_memory_kb: 0,
            cpu_usage_percent: 0,
            load_avg: [0; 3],
            next_pid: 1,
            session: None,
            session_counter: 0,
            is_initialized: false,
            needs_recalculation: false,
        }
    }
}

impl StateModel {
    /// Absolute "now" as seen by the fake device.
    pub fn now(&self) -> i64 {
        self.boot_time + self.uptime_seconds as i64
    }

    pub fn user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == name)
    }

    pub fn user_by_uid(&self, uid: u32) -> Option<&User> {
        self.users.iter().find(|u| u.uid == uid)
    }

    /// Username for `uid`, or the numeric id when unknown.
    pub fn username_for(&self, uid: u32) -> String {
        self.user_by_uid(uid)
            .map(|u| u.username.clone())
            .unwrap_or_else(|| uid.to_string())
    }

    /// Group name for `gid`.
    pub fn group_name(&self, gid: u32) -> String {
        match gid {
            0 => "root".into(),
            65534 => "nogroup".into(),
            _ => self
                .users
                .iter()
                .find(|u| u.gid == gid)
                .map(|u| u.username.clone())
                .unwrap_or_else(|| gid.to_string()),
        }
    }

    pub fn process(&self, pid: u32) -> Option<&Process> {
        self.processes.iter().find(|p| p.pid == pid)
    }

    pub fn process_by_name(&self, name: &str) -> Option<&Process> {
        self.processes.iter().find(|p| p.name == name)
    }

    /// Live (non-deleted) file at `path`.
    pub fn file(&self, path: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.path == path && !f.is_deleted())
    }

    pub(crate) fn file_index(&self, path: &str) -> Option<usize> {
        self.files.iter().position(|f| f.path == path)
    }

    /// Live direct children of directory `dir`, in path order.
    pub fn children(&self, dir: &str) -> Vec<&FileEntry> {
        let mut out: Vec<&FileEntry> = self
            .files
            .iter()
            .filter(|f| !f.is_deleted() && f.path != "/" && parent_of(&f.path) == dir)
            .collect();
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }

    pub fn mount(&self, mount_point: &str) -> Option<&Mount> {
        self.mounts.iter().find(|m| m.mount_point == mount_point)
    }

    pub fn running_count(&self) -> usize {
        self.processes
            .iter()
            .filter(|p| p.state == ProcessState::Running)
            .count()
    }

    /// Primary non-loopback interface.
    pub fn primary_interface(&self) -> Option<&Interface> {
        self.interfaces.iter().find(|i| !i.is_loopback())
    }
}

/// Parent directory of an absolute path (`/` for top-level entries).
pub fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// Resolve `path` against `cwd`, folding `.` and `..` components.
pub fn resolve_path(cwd: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", cwd.trim_end_matches('/'), path)
    };
    let mut parts: Vec<&str> = Vec::new();
    for part in joined.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}
