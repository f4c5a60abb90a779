// CLASSIFICATION: COMMUNITY
// Filename: driver.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Morph driver: owns the profile rotation and reacts to signal files.
//!
//! Each [`MorphDriver::poll`] consumes a pending emergency signal (rotating
//! to the next profile), otherwise performs a scheduled morph once the
//! configured frequency has elapsed since the last one.

use std::path::PathBuf;

use log::{debug, info, warn};

use crate::config::{EngineConfig, SignalPaths};
use crate::error::{StateError, StateResult};
use crate::profile::{builtin_profiles, loader, DeviceProfile};
use crate::signals::{self, EmergencySignal};
use crate::state::SharedState;

/// What one poll observed and did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollReport {
    pub emergency: Option<EmergencySignal>,
    /// Profile name after a morph, if one happened.
    pub morphed_to: Option<String>,
    pub scheduled: bool,
    pub blocklist_size: usize,
    /// Cadence requested through the frequency file.
    pub requested_frequency: Option<u32>,
}

pub struct MorphDriver {
    profiles: Vec<DeviceProfile>,
    index: usize,
    state_file: PathBuf,
    signals: SignalPaths,
    default_frequency_minutes: u32,
}

impl MorphDriver {
    /// Build a driver over `profiles`, restoring the saved index. A saved
    /// index outside the list falls back to the first profile.
    pub fn new(profiles: Vec<DeviceProfile>, cfg: &EngineConfig) -> StateResult<Self> {
        if profiles.is_empty() {
            return Err(StateError::invalid("morph driver needs at least one profile"));
        }
        let index = match signals::read_profile_index(&cfg.state_file)? {
            Some(i) if i < profiles.len() => i,
            Some(i) => {
                warn!("saved profile index {} out of range, using 0", i);
                0
            }
            None => 0,
        };
        debug!("morph driver: {} profiles, active {}", profiles.len(), profiles[index].name);
        Ok(Self {
            profiles,
            index,
            state_file: cfg.state_file.clone(),
            signals: cfg.signals(),
            default_frequency_minutes: cfg.adapt.default_morph_frequency_minutes.max(1),
        })
    }

    /// Profiles from `cfg.profiles_file`, or the built-in catalog.
    pub fn from_config(cfg: &EngineConfig) -> StateResult<Self> {
        let profiles = match &cfg.profiles_file {
            Some(path) => loader::load_profiles(path)?,
            None => builtin_profiles().to_vec(),
        };
        Self::new(profiles, cfg)
    }

    pub fn current_profile(&self) -> &DeviceProfile {
        &self.profiles[self.index]
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn profiles(&self) -> &[DeviceProfile] {
        &self.profiles
    }

    /// Morph `shared` to the next usable profile, then persist its index.
    /// Profiles the engine rejects are skipped; when none can be adopted the
    /// index and the state stay as they were.
    pub fn rotate(&mut self, shared: &SharedState) -> StateResult<&DeviceProfile> {
        let len = self.profiles.len();
        let mut last_err = StateError::invalid("no profile to rotate to");
        for step in 1..=len {
            let next = (self.index + step) % len;
            match shared.morph_to_profile(self.profiles[next].clone(), None) {
                Ok(()) => {
                    self.index = next;
                    signals::write_profile_index(&self.state_file, next)?;
                    return Ok(&self.profiles[next]);
                }
                Err(err) => {
                    warn!("skipping profile {}: {}", self.profiles[next].name, err);
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    pub fn poll(&mut self, shared: &SharedState) -> StateResult<PollReport> {
        self.poll_at(shared, shared.now())
    }

    /// One driver step evaluated at `now`.
    pub fn poll_at(&mut self, shared: &SharedState, now: i64) -> StateResult<PollReport> {
        let mut report = PollReport {
            blocklist_size: signals::read_blocklist(&self.signals.attacker_blocklist)?.len(),
            requested_frequency: signals::read_morph_frequency(&self.signals.morph_frequency)?,
            ..PollReport::default()
        };

        if let Some(signal) = signals::take_emergency_signal(&self.signals.emergency_morph)? {
            warn!(
                "emergency morph requested by {} ({}, {})",
                signal.requested_by, signal.reason, signal.priority
            );
            if let Err(err) = self.rotate(shared) {
                // Put the request back so the next poll retries it.
                signals::write_emergency_signal(&self.signals.emergency_morph, &signal)?;
                return Err(err);
            }
            info!("emergency morph to {}", self.current_profile().name);
            report.morphed_to = Some(self.current_profile().name.clone());
            report.emergency = Some(signal);
            return Ok(report);
        }

        let minutes = report
            .requested_frequency
            .unwrap_or(self.default_frequency_minutes)
            .max(1);
        let last = shared.read(|s| s.last_morph_time)?;
        if now - last >= i64::from(minutes) * 60 {
            shared.morph(None)?;
            info!("scheduled morph after {} minutes", minutes);
            report.scheduled = true;
            report.morphed_to = Some(self.current_profile().name.clone());
        }
        Ok(report)
    }
}
