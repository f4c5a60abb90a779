// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Error taxonomy shared by the state engine, generators and signal helpers.

use thiserror::Error;

/// Errors returned by state, render and signal operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },
    #[error("{kind} already exists: {key}")]
    AlreadyExists { kind: &'static str, key: String },
    #[error("{collection} is full (capacity {capacity})")]
    CapacityExceeded {
        collection: &'static str,
        capacity: usize,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("output needs {required} bytes but buffer holds {available}")]
    BufferTooSmall { required: usize, available: usize },
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
    #[error("state engine not initialized")]
    NotInitialized,
    #[error("state lock poisoned")]
    LockPoisoned,
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl StateError {
    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        StateError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn exists(kind: &'static str, key: impl ToString) -> Self {
        StateError::AlreadyExists {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        StateError::InvalidInput(msg.into())
    }
}

/// Result alias used across the crate.
pub type StateResult<T> = Result<T, StateError>;
