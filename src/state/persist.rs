// CLASSIFICATION: COMMUNITY
// Filename: persist.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! JSON save and load of a whole [`StateModel`].

use std::fs;
use std::path::Path;

use log::{debug, info};
use sha2::{Digest, Sha256};

use super::model::StateModel;
use crate::error::{StateError, StateResult};

impl StateModel {
    /// Serialize the model, including generator state, to pretty JSON.
    pub fn to_json(&self) -> StateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a model and verify its invariants before handing it out.
    pub fn from_json(text: &str) -> StateResult<StateModel> {
        let state: StateModel = serde_json::from_str(text)?;
        if !state.is_initialized {
            return Err(StateError::NotInitialized);
        }
        state.check_invariants()?;
        Ok(state)
    }

    /// Hex SHA-256 of the compact JSON encoding. Equal states hash equal.
    pub fn fingerprint(&self) -> StateResult<String> {
        let data = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&data)))
    }

    /// Save snapshot to a JSON file.
    pub fn save(&self, path: &Path) -> StateResult<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_json()?)?;
        info!("state saved to {} (host {})", path.display(), self.hostname);
        Ok(())
    }

    /// Load snapshot from a JSON file.
    pub fn load(path: &Path) -> StateResult<StateModel> {
        let data = fs::read_to_string(path)?;
        let state = Self::from_json(&data)?;
        debug!("state loaded from {}", path.display());
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin_profile;
    use tempfile::tempdir;

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/state.json");
        let state =
            StateModel::init_with(builtin_profile("Hikvision_DS-2CD2").unwrap(), 5, 1_760_000_000)
                .unwrap();
        state.save(&path).unwrap();
        let loaded = StateModel::load(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn rejects_broken_snapshot() {
        let mut state =
            StateModel::init_with(builtin_profile("Hikvision_DS-2CD2").unwrap(), 5, 1_760_000_000)
                .unwrap();
        state.connections[0].owner_pid = Some(999_999);
        let text = serde_json::to_string(&state).unwrap();
        assert!(matches!(
            StateModel::from_json(&text),
            Err(StateError::InconsistentState(_))
        ));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = StateModel::init_with(builtin_profile("Netgear_R7000").unwrap(), 8, 1_760_000_000).unwrap();
        let b = StateModel::init_with(builtin_profile("Netgear_R7000").unwrap(), 8, 1_760_000_000).unwrap();
        let c = StateModel::init_with(builtin_profile("Netgear_R7000").unwrap(), 9, 1_760_000_000).unwrap();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }

    #[test]
    fn uninitialized_snapshot_rejected() {
        let text = StateModel::default().to_json().unwrap();
        assert!(matches!(
            StateModel::from_json(&text),
            Err(StateError::NotInitialized)
        ));
    }
}
