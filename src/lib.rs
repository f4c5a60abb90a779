// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v1.1
// Date Modified: 2026-10-16
// Author: Lukas Bower

//! Root library for the Cerberus honeynet state engine.
//!
//! One [`state::StateModel`] holds the simulated device; every rendered
//! artifact is derived from it so that `/proc`, `/etc`, command output and
//! logs stay mutually consistent across mutations and morphs.

/// Engine configuration (TOML + environment).
pub mod config;

/// Morph driver polling signal files.
pub mod driver;

/// Error taxonomy.
pub mod error;

/// Device profiles and the profile config loader.
pub mod profile;

/// Output generators.
pub mod render;

/// Signal file readers and writers.
pub mod signals;

/// State model, initializer, correlation and mutation API.
pub mod state;

/// Threat assessment and adaptive response.
pub mod threat;

/// Utilities and common helpers used across modules
pub mod utils;

pub use error::{StateError, StateResult};
pub use profile::{DeviceProfile, DeviceType};
pub use state::{SharedState, StateModel};
