//! Engine configuration.

use crate::core::Result;
use serde::{Deserialize, Serialize};

/// Bounds for the hex prefix length used in derived DIDs.
pub const MIN_DID_HASH_LEN: usize = 8;
pub const MAX_DID_HASH_LEN: usize = 64;

/// Credential engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// DID method name (`did:<method>:...`)
    pub did_method: String,
    /// Hex characters of the key hash kept in a DID
    pub did_hash_len: usize,
    /// Reject a second mint for the same holder and artifact hash
    pub reject_duplicate_mint: bool,
    /// Only mint for artifact hashes the holder actually submitted
    pub require_submission: bool,
    /// Maximum verification history entries kept
    pub verification_history_limit: usize,
}

impl EngineConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the DID method name.
    pub fn with_did_method(mut self, method: &str) -> Self {
        self.did_method = method.to_string();
        self
    }

    /// Set the DID hash prefix length.
    pub fn with_did_hash_len(mut self, len: usize) -> Self {
        self.did_hash_len = len;
        self
    }

    /// Allow re-minting for a holder and artifact hash that already has a credential.
    pub fn allow_duplicate_mint(mut self) -> Self {
        self.reject_duplicate_mint = false;
        self
    }

    /// Allow minting for artifact hashes with no matching submission.
    pub fn without_submission_check(mut self) -> Self {
        self.require_submission = false;
        self
    }

    /// Set the verification history limit.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.verification_history_limit = limit;
        self
    }

    /// DID hash length clamped to the supported range.
    pub fn effective_did_hash_len(&self) -> usize {
        self.did_hash_len.clamp(MIN_DID_HASH_LEN, MAX_DID_HASH_LEN)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            did_method: "consortium".to_string(),
            did_hash_len: 16,
            reject_duplicate_mint: true,
            require_submission: true,
            verification_history_limit: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.did_method, "consortium");
        assert_eq!(config.effective_did_hash_len(), 16);
        assert!(config.reject_duplicate_mint);
        assert!(config.require_submission);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"did_method": "uni", "reject_duplicate_mint": false}"#)
            .unwrap();
        assert_eq!(config.did_method, "uni");
        assert!(!config.reject_duplicate_mint);
        assert_eq!(config.did_hash_len, 16);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(EngineConfig::from_json("{\"did_hash_len\": \"long\"}").is_err());
    }

    #[test]
    fn test_hash_len_clamped() {
        assert_eq!(EngineConfig::default().with_did_hash_len(2).effective_did_hash_len(), 8);
        assert_eq!(EngineConfig::default().with_did_hash_len(200).effective_did_hash_len(), 64);
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_did_method("test")
            .allow_duplicate_mint()
            .without_submission_check()
            .with_history_limit(5);
        assert_eq!(config.did_method, "test");
        assert!(!config.reject_duplicate_mint);
        assert!(!config.require_submission);
        assert_eq!(config.verification_history_limit, 5);
    }
}
