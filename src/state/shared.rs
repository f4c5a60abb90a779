// CLASSIFICATION: COMMUNITY
// Filename: shared.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Shared handle to the single live [`StateModel`].
//!
//! Writers (mutations, morphs) take the write lock for the whole operation,
//! so readers see the state either entirely before or entirely after it.
//! Reads refresh time under the write lock, then render from a clone.

use std::sync::{Arc, RwLock};

use log::trace;

use super::model::StateModel;
use crate::error::{StateError, StateResult};
use crate::profile::DeviceProfile;
use crate::render::{self, Artifact, Command};
use crate::utils::clock::{Clock, SystemClock};

pub struct SharedState {
    inner: RwLock<StateModel>,
    clock: Arc<dyn Clock>,
}

impl SharedState {
    pub fn new(state: StateModel) -> Self {
        Self::with_clock(state, Arc::new(SystemClock))
    }

    pub fn with_clock(state: StateModel, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(state),
            clock,
        }
    }

    /// Current time according to this handle's clock.
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Refresh time and derived fields, then return a consistent clone.
    pub fn snapshot(&self) -> StateResult<StateModel> {
        let now = self.clock.now();
        let mut guard = self.inner.write().map_err(|_| StateError::LockPoisoned)?;
        if !guard.is_initialized {
            return Err(StateError::NotInitialized);
        }
        guard.update_time_at(now);
        if guard.needs_recalculation {
            guard.recalculate_at(now);
        }
        Ok(guard.clone())
    }

    /// Run `f` against the current state without refreshing it.
    pub fn read<R>(&self, f: impl FnOnce(&StateModel) -> R) -> StateResult<R> {
        let guard = self.inner.read().map_err(|_| StateError::LockPoisoned)?;
        Ok(f(&guard))
    }

    /// Apply a mutation under the write lock. Time is refreshed first and
    /// derived fields are recalculated afterwards when `f` dirtied them,
    /// including when `f` fails after a partial change.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut StateModel) -> StateResult<R>) -> StateResult<R> {
        let now = self.clock.now();
        let mut guard = self.inner.write().map_err(|_| StateError::LockPoisoned)?;
        guard.update_time_at(now);
        let out = f(&mut guard);
        if guard.needs_recalculation {
            guard.recalculate_at(now);
        }
        trace!("mutation applied at {} (ok={})", now, out.is_ok());
        out
    }

    pub fn morph(&self, seed: Option<u32>) -> StateResult<()> {
        let now = self.clock.now();
        let mut guard = self.inner.write().map_err(|_| StateError::LockPoisoned)?;
        guard.morph_at(seed, now)
    }

    pub fn morph_to_profile(&self, profile: DeviceProfile, seed: Option<u32>) -> StateResult<()> {
        let now = self.clock.now();
        let mut guard = self.inner.write().map_err(|_| StateError::LockPoisoned)?;
        guard.morph_to_profile_at(profile, seed, now)
    }

    pub fn render(&self, artifact: Artifact) -> StateResult<String> {
        let state = self.snapshot()?;
        render::render_artifact(&state, artifact)
    }

    pub fn render_path(&self, path: &str) -> StateResult<String> {
        let state = self.snapshot()?;
        render::generate_file_content(&state, path)
    }

    pub fn render_command(&self, command: &Command) -> StateResult<String> {
        let state = self.snapshot()?;
        render::render_command(&state, command)
    }
}
