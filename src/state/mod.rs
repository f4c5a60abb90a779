// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Device state engine: model, generation, correlation and mutation.

pub mod aging;
pub mod bounded;
pub mod correlate;
pub mod init;
pub mod model;
pub mod mutate;
pub mod persist;
pub mod shared;

pub use bounded::{BoundedVec, LogRing, Record};
pub use model::{
    parent_of, resolve_path, ArpEntry, AttackerSession, ConnState, Connection, Facility,
    FileEntry, FileFlags, FileType, IfaceFlags, Interface, LogEntry, LogLevel, Mount, Process,
    ProcessFlags, ProcessState, Protocol, StateModel, User,
};
pub use shared::SharedState;
