//! Ledger transaction structure.
//!
//! Each transaction records one state-changing action and is hash-chained to
//! its predecessor.

use crate::core::{Artifact, Hash256, Role, Timestamp};
use crate::identity::crypto::sha3_256_multi;
use crate::identity::Credential;
use serde::{Deserialize, Serialize};

/// Kind of ledger transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    DidRegistration,
    PortfolioSubmission,
    VcIssuance,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::DidRegistration => write!(f, "DID_REGISTRATION"),
            TransactionType::PortfolioSubmission => write!(f, "PORTFOLIO_SUBMISSION"),
            TransactionType::VcIssuance => write!(f, "VC_ISSUANCE"),
        }
    }
}

/// Type-specific transaction details.
///
/// Serialized as `"type": ..., "details": {...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionPayload {
    /// A new identity joined the consortium.
    DidRegistration {
        role: Role,
        #[serde(rename = "publicKey")]
        public_key: String,
    },
    /// A holder submitted an ordered portfolio of artifacts.
    PortfolioSubmission {
        #[serde(rename = "artifactHash")]
        artifact_hash: Hash256,
        artifacts: Vec<Artifact>,
    },
    /// An issuer minted a credential.
    VcIssuance {
        #[serde(rename = "credentialId")]
        credential_id: String,
        #[serde(rename = "holderDid")]
        holder_did: String,
        credential: Credential,
    },
}

impl TransactionPayload {
    /// The transaction type this payload belongs to.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionPayload::DidRegistration { .. } => TransactionType::DidRegistration,
            TransactionPayload::PortfolioSubmission { .. } => TransactionType::PortfolioSubmission,
            TransactionPayload::VcIssuance { .. } => TransactionType::VcIssuance,
        }
    }
}

/// An immutable entry in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTransaction {
    /// Position in the ledger (0-based); the ordering key
    pub sequence: u64,
    /// Append time (informational only)
    pub timestamp: Timestamp,
    /// Hash of the recorded data
    pub data_hash: Hash256,
    /// DID that performed the action
    pub actor: String,
    /// Type tag and details
    #[serde(flatten)]
    pub payload: TransactionPayload,
    /// Hash of the previous transaction (zero for the first)
    pub parent_hash: Hash256,
    /// Content hash of this transaction
    pub tx_hash: Hash256,
}

impl LedgerTransaction {
    /// Create a transaction and compute its hash.
    pub fn new(
        sequence: u64,
        timestamp: Timestamp,
        actor: &str,
        data_hash: Hash256,
        payload: TransactionPayload,
        parent_hash: Hash256,
    ) -> Self {
        let mut tx = Self {
            sequence,
            timestamp,
            data_hash,
            actor: actor.to_string(),
            payload,
            parent_hash,
            tx_hash: Hash256::zero(),
        };
        tx.tx_hash = tx.compute_hash();
        tx
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.payload.transaction_type()
    }

    /// Compute content hash (SHA3-256) over every field except `tx_hash`.
    pub fn compute_hash(&self) -> Hash256 {
        let sequence_bytes = self.sequence.to_le_bytes();
        let timestamp_str = self.timestamp.to_rfc3339();
        // Payload fields are strings, byte vectors and hex hashes, none of which
        // can fail to serialize, so the empty fallback is unreachable.
        let payload_json = serde_json::to_string(&self.payload).unwrap_or_default();

        sha3_256_multi(&[
            &sequence_bytes,
            timestamp_str.as_bytes(),
            self.parent_hash.as_bytes(),
            self.actor.as_bytes(),
            self.data_hash.as_bytes(),
            payload_json.as_bytes(),
        ])
    }

    /// Whether the stored hash matches the content.
    pub fn is_intact(&self) -> bool {
        self.compute_hash() == self.tx_hash
    }

    /// The credential recorded by a `VC_ISSUANCE` transaction.
    pub fn credential(&self) -> Option<&Credential> {
        match &self.payload {
            TransactionPayload::VcIssuance { credential, .. } => Some(credential),
            _ => None,
        }
    }

    /// The artifacts recorded by a `PORTFOLIO_SUBMISSION` transaction.
    pub fn artifacts(&self) -> Option<&[Artifact]> {
        match &self.payload {
            TransactionPayload::PortfolioSubmission { artifacts, .. } => Some(artifacts),
            _ => None,
        }
    }
}
