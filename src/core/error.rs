//! Error types for the credential ledger.

use crate::core::types::Role;
use thiserror::Error;

/// Result type alias for ledger and engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ledger and engine operations.
///
/// Verification outcomes are not errors: a credential that fails to verify is
/// reported through [`crate::engine::VerificationResult`].
#[derive(Error, Debug)]
pub enum Error {
    // Identity errors
    #[error("{did} is not authorized for this operation (requires {required} role)")]
    Unauthorized { did: String, required: Role },

    #[error("DID not found: {0}")]
    DidNotFound(String),

    #[error("DID already registered: {0}")]
    DuplicateDid(String),

    // Credential errors
    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    #[error("No portfolio submission {artifact_hash} by {holder_did}")]
    SubmissionNotFound {
        holder_did: String,
        artifact_hash: String,
    },

    #[error("Credential already minted for {holder_did} / {artifact_hash}")]
    AlreadyMinted {
        holder_did: String,
        artifact_hash: String,
    },

    #[error("Portfolio submission contains no artifacts")]
    EmptyPortfolio,

    // Cryptography errors
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            Error::DeserializationError(err.to_string())
        } else {
            Error::SerializationError(err.to_string())
        }
    }
}

impl From<ed25519_dalek::SignatureError> for Error {
    fn from(_: ed25519_dalek::SignatureError) -> Self {
        Error::SignatureVerificationFailed
    }
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Error::InvalidKeyFormat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_message_names_role() {
        let err = Error::Unauthorized {
            did: "did:consortium:abc".into(),
            required: Role::Holder,
        };
        assert_eq!(
            err.to_string(),
            "did:consortium:abc is not authorized for this operation (requires HOLDER role)"
        );
    }

    #[test]
    fn test_json_syntax_error_is_deserialization() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::DeserializationError(_)));
    }
}
