// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Output generators.
//!
//! Every generator is a pure function of a [`StateModel`] snapshot: it reads
//! stored fields only and never draws from the RNG, so rendering the same
//! snapshot twice yields identical bytes. Path-backed artifacts are keyed by
//! [`Artifact`]; commands whose output depends on flags go through
//! [`Command`].

pub mod commands;
pub mod etc;
pub mod fs;
pub mod logs;
pub mod procfs;

use std::collections::HashMap;

use bitflags::bitflags;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};
use crate::state::model::{parent_of, resolve_path, FileType, StateModel};

/// Content kinds with a dedicated generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Artifact {
    ProcUptime,
    ProcMeminfo,
    ProcLoadavg,
    ProcCpuinfo,
    ProcVersion,
    ProcMounts,
    ProcStat,
    ProcNetDev,
    ProcPidCmdline(u32),
    ProcPidStatus(u32),
    EtcPasswd,
    EtcShadow,
    EtcGroup,
    EtcHostname,
    EtcBanner,
    VarLogMessages,
    VarLogAuth,
}

const FIXED_PATHS: [(&str, Artifact); 15] = [
    ("/proc/uptime", Artifact::ProcUptime),
    ("/proc/meminfo", Artifact::ProcMeminfo),
    ("/proc/loadavg", Artifact::ProcLoadavg),
    ("/proc/cpuinfo", Artifact::ProcCpuinfo),
    ("/proc/version", Artifact::ProcVersion),
    ("/proc/mounts", Artifact::ProcMounts),
    ("/proc/stat", Artifact::ProcStat),
    ("/proc/net/dev", Artifact::ProcNetDev),
    ("/etc/passwd", Artifact::EtcPasswd),
    ("/etc/shadow", Artifact::EtcShadow),
    ("/etc/group", Artifact::EtcGroup),
    ("/etc/hostname", Artifact::EtcHostname),
    ("/etc/banner", Artifact::EtcBanner),
    ("/var/log/messages", Artifact::VarLogMessages),
    ("/var/log/auth.log", Artifact::VarLogAuth),
];

static PATH_MAP: Lazy<HashMap<&'static str, Artifact>> =
    Lazy::new(|| FIXED_PATHS.iter().copied().collect());

impl Artifact {
    /// Map an absolute path to its generator.
    pub fn from_path(path: &str) -> StateResult<Artifact> {
        if let Some(artifact) = PATH_MAP.get(path) {
            return Ok(*artifact);
        }
        let pid_file = path
            .strip_prefix("/proc/")
            .and_then(|rest| rest.split_once('/'))
            .and_then(|(pid, leaf)| pid.parse::<u32>().ok().map(|pid| (pid, leaf)));
        match pid_file {
            Some((pid, "cmdline")) => Ok(Artifact::ProcPidCmdline(pid)),
            Some((pid, "status")) => Ok(Artifact::ProcPidStatus(pid)),
            _ => Err(StateError::invalid(format!("no generator for {path}"))),
        }
    }

    /// Canonical path of this artifact.
    pub fn path(&self) -> String {
        match self {
            Artifact::ProcPidCmdline(pid) => format!("/proc/{pid}/cmdline"),
            Artifact::ProcPidStatus(pid) => format!("/proc/{pid}/status"),
            other => FIXED_PATHS
                .iter()
                .find(|(_, a)| a == other)
                .map(|(p, _)| (*p).to_string())
                .unwrap_or_default(),
        }
    }
}

/// Paths served by fixed generators.
pub fn artifact_paths() -> impl Iterator<Item = &'static str> {
    FIXED_PATHS.iter().map(|(p, _)| *p)
}

/// Render `artifact` from `state`.
pub fn render_artifact(state: &StateModel, artifact: Artifact) -> StateResult<String> {
    let body = match artifact {
        Artifact::ProcUptime => procfs::uptime(state),
        Artifact::ProcMeminfo => procfs::meminfo(state),
        Artifact::ProcLoadavg => procfs::loadavg(state),
        Artifact::ProcCpuinfo => procfs::cpuinfo(state),
        Artifact::ProcVersion => procfs::version(state),
        Artifact::ProcMounts => procfs::mounts(state),
        Artifact::ProcStat => procfs::stat(state),
        Artifact::ProcNetDev => procfs::net_dev(state),
        Artifact::ProcPidCmdline(pid) => procfs::pid_cmdline(state, pid)?,
        Artifact::ProcPidStatus(pid) => procfs::pid_status(state, pid)?,
        Artifact::EtcPasswd => etc::passwd(state),
        Artifact::EtcShadow => etc::shadow(state),
        Artifact::EtcGroup => etc::group(state),
        Artifact::EtcHostname => etc::hostname(state),
        Artifact::EtcBanner => etc::banner(state),
        Artifact::VarLogMessages => logs::messages(state),
        Artifact::VarLogAuth => logs::auth(state),
    };
    Ok(body)
}

/// Content of the file at absolute `path`. Symlinks are followed; plain
/// files without a generator and directories are rejected.
pub fn generate_file_content(state: &StateModel, path: &str) -> StateResult<String> {
    let mut current = path.to_string();
    for _ in 0..8 {
        let Some(entry) = state.file(&current) else {
            // Tombstoned paths stay deleted even when a generator exists.
            if state.files.iter().any(|f| f.path == current) {
                return Err(StateError::not_found("file", current));
            }
            return match Artifact::from_path(&current) {
                Ok(artifact) => render_artifact(state, artifact),
                Err(_) => Err(StateError::not_found("file", current)),
            };
        };
        match (entry.file_type, entry.dynamic, entry.target.as_deref()) {
            (_, Some(artifact), _) => return render_artifact(state, artifact),
            (FileType::Directory, _, _) => {
                return Err(StateError::invalid(format!("{current}: Is a directory")));
            }
            (FileType::Symlink, _, Some(target)) => {
                current = resolve_path(parent_of(&current), target);
            }
            _ => {
                return Artifact::from_path(&current).and_then(|a| render_artifact(state, a));
            }
        }
    }
    Err(StateError::invalid(format!("{path}: Too many levels of symbolic links")))
}

/// Copy rendered output into `buf`; output that does not fit is an error,
/// never a truncation.
pub fn write_into(content: &str, buf: &mut [u8]) -> StateResult<usize> {
    let bytes = content.as_bytes();
    if bytes.len() > buf.len() {
        return Err(StateError::BufferTooSmall {
            required: bytes.len(),
            available: buf.len(),
        });
    }
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(bytes.len())
}

/// [`generate_file_content`] into a caller buffer.
pub fn render_path_into(state: &StateModel, path: &str, buf: &mut [u8]) -> StateResult<usize> {
    write_into(&generate_file_content(state, path)?, buf)
}

/// [`render_command`] into a caller buffer.
pub fn render_command_into(state: &StateModel, command: &Command, buf: &mut [u8]) -> StateResult<usize> {
    write_into(&render_command(state, command)?, buf)
}

bitflags! {
    /// Fields selected by `uname` flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct UnameFields: u8 {
        const KERNEL_NAME = 0b00_0001;
        const NODENAME = 0b00_0010;
        const RELEASE = 0b00_0100;
        const VERSION = 0b00_1000;
        const MACHINE = 0b01_0000;
        const OS = 0b10_0000;
    }
}

/// Shell commands with a generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Ps { aux: bool },
    Top,
    Ifconfig,
    Netstat { programs: bool },
    Route { numeric: bool },
    Arp { all: bool },
    Df,
    Free,
    Uptime,
    Uname(UnameFields),
    W,
    Ls { path: String, long: bool, all: bool },
    Find { root: String },
    Du { path: String, summary: bool },
    Dmesg,
    Hostname,
    Cat(String),
}

impl Command {
    /// Parse a command line typed in `cwd`. Relative paths are resolved.
    pub fn parse(line: &str, cwd: &str) -> StateResult<Command> {
        let mut words = line.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| StateError::invalid("empty command"))?;
        let name = program.rsplit('/').next().unwrap_or(program);
        let args: Vec<&str> = words.collect();
        let flags: String = args
            .iter()
            .filter(|a| a.starts_with('-'))
            .map(|a| a.trim_start_matches('-'))
            .collect();
        let operand = args.iter().find(|a| !a.starts_with('-')).copied();
        let resolve = |p: Option<&str>| match p {
            Some(p) => resolve_path(cwd, p),
            None => resolve_path(cwd, "."),
        };

        let cmd = match name {
            "ps" => Command::Ps { aux: !args.is_empty() },
            "top" => Command::Top,
            "ifconfig" => Command::Ifconfig,
            "netstat" => Command::Netstat {
                programs: flags.contains('p'),
            },
            "route" => Command::Route {
                numeric: flags.contains('n'),
            },
            "arp" => Command::Arp {
                all: flags.contains('a'),
            },
            "df" => Command::Df,
            "free" => Command::Free,
            "uptime" => Command::Uptime,
            "w" => Command::W,
            "dmesg" => Command::Dmesg,
            "hostname" => Command::Hostname,
            "uname" => Command::Uname(uname_fields(&flags)),
            "ls" => Command::Ls {
                path: resolve(operand),
                long: flags.contains('l'),
                all: flags.contains('a'),
            },
            "find" => Command::Find {
                root: resolve(operand),
            },
            "du" => Command::Du {
                path: resolve(operand),
                summary: flags.contains('s'),
            },
            "cat" => {
                let target = operand.ok_or_else(|| StateError::invalid("cat: missing operand"))?;
                Command::Cat(resolve(Some(target)))
            }
            other => return Err(StateError::invalid(format!("{other}: not found"))),
        };
        Ok(cmd)
    }
}

fn uname_fields(flags: &str) -> UnameFields {
    let mut fields = UnameFields::empty();
    for c in flags.chars() {
        fields |= match c {
            'a' => UnameFields::all(),
            's' => UnameFields::KERNEL_NAME,
            'n' => UnameFields::NODENAME,
            'r' => UnameFields::RELEASE,
            'v' => UnameFields::VERSION,
            'm' | 'p' => UnameFields::MACHINE,
            'o' => UnameFields::OS,
            _ => UnameFields::empty(),
        };
    }
    if fields.is_empty() {
        UnameFields::KERNEL_NAME
    } else {
        fields
    }
}

/// Render a parsed command.
pub fn render_command(state: &StateModel, command: &Command) -> StateResult<String> {
    let out = match command {
        Command::Ps { aux: false } => commands::ps(state),
        Command::Ps { aux: true } => commands::ps_aux(state),
        Command::Top => commands::top(state),
        Command::Ifconfig => commands::ifconfig(state),
        Command::Netstat { programs } => commands::netstat(state, *programs),
        Command::Route { numeric } => commands::route(state, *numeric),
        Command::Arp { all } => commands::arp(state, *all),
        Command::Df => commands::df(state),
        Command::Free => commands::free(state),
        Command::Uptime => commands::uptime(state),
        Command::Uname(fields) => commands::uname(state, *fields),
        Command::W => commands::w(state),
        Command::Hostname => etc::hostname(state),
        Command::Dmesg => logs::dmesg(state),
        Command::Ls { path, long, all } => fs::ls(state, path, *long, *all)?,
        Command::Find { root } => fs::find(state, root)?,
        Command::Du { path, summary } => fs::du(state, path, *summary)?,
        Command::Cat(path) => generate_file_content(state, path)?,
    };
    Ok(out)
}

/// Format a Unix timestamp in UTC with a chrono format string.
pub(crate) fn format_time(ts: i64, fmt: &str) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|t| t.format(fmt).to_string())
        .unwrap_or_else(|| ts.to_string())
}
