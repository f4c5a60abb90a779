// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v1.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Cerberus Utility Module
//!
//! Reusable helpers shared by the state engine and the output generators.

/// Wall clock seam.
pub mod clock;
/// Formatting helpers.
pub mod format;
/// Simple deterministic RNG.
pub mod tiny_rng;
