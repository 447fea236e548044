//! Verifiable Credentials.
//!
//! A credential is an issuer's signed statement that a holder submitted an
//! artifact with a given content hash. Issuer attachments are bound into the
//! signed payload through their combined hash.

use crate::core::types::base64_bytes;
use crate::core::{now, Artifact, Hash256, Result, Timestamp};
use crate::identity::crypto::{sha3_256, sha3_256_multi};
use crate::identity::signer::IdentitySigner;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A file attached to a credential by its issuer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerAttachment {
    /// Raw content (base64 in JSON)
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    pub filename: String,
    pub timestamp: Timestamp,
}

/// A minted verifiable credential.
///
/// The camelCase JSON form is the interchange format presented to verifiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Credential ID ("vc:<hex>")
    pub id: String,
    /// Issuer DID
    pub issuer_did: String,
    /// Holder DID
    pub holder_did: String,
    /// Hash of the attested portfolio
    pub artifact_hash: Hash256,
    /// RFC 3339 UTC, millisecond precision
    pub issuance_date: String,
    /// Issuer signature over the signing payload (hex)
    pub signature: String,
    /// Issuer attachments, bound into the signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_attachments: Option<Vec<IssuerAttachment>>,
}

impl Credential {
    /// Build and sign a credential for `holder_did` over `artifact_hash`.
    ///
    /// An empty attachment list is treated as no attachments.
    pub fn mint(
        issuer: &IdentitySigner,
        holder_did: &str,
        artifact_hash: &Hash256,
        attachments: Option<Vec<Artifact>>,
    ) -> Result<Self> {
        let issued = now();
        let issuer_attachments = attachments.filter(|a| !a.is_empty()).map(|list| {
            list.into_iter()
                .map(|a| IssuerAttachment {
                    data: a.payload,
                    filename: a.filename,
                    timestamp: issued,
                })
                .collect()
        });

        let mut credential = Self {
            id: Self::generate_id(holder_did),
            issuer_did: issuer.did().to_string(),
            holder_did: holder_did.to_string(),
            artifact_hash: artifact_hash.clone(),
            issuance_date: issued.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            signature: String::new(),
            issuer_attachments,
        };

        let signature = issuer.sign(&credential.signing_payload())?;
        credential.signature = hex::encode(signature);
        Ok(credential)
    }

    /// Credential ID derived from the current time, the holder and a random nonce.
    fn generate_id(holder_did: &str) -> String {
        let nanos = now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes();
        let nonce = Uuid::new_v4();
        let hash = sha3_256_multi(&[&nanos, holder_did.as_bytes(), nonce.as_bytes()]);
        format!("vc:{}", hash.to_hex())
    }

    /// Combined hash of the attachment payloads, if any are present.
    pub fn attachments_hash(&self) -> Option<Hash256> {
        match &self.issuer_attachments {
            Some(list) if !list.is_empty() => {
                let chunks: Vec<&[u8]> = list.iter().map(|a| a.data.as_slice()).collect();
                Some(sha3_256_multi(&chunks))
            }
            _ => None,
        }
    }

    /// Canonical bytes covered by the issuer signature:
    /// `id ‖ issuerDid ‖ holderDid ‖ artifactHash ‖ issuanceDate [‖ attachmentsHash]`.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = String::with_capacity(256);
        payload.push_str(&self.id);
        payload.push_str(&self.issuer_did);
        payload.push_str(&self.holder_did);
        payload.push_str(&self.artifact_hash.to_hex());
        payload.push_str(&self.issuance_date);
        if let Some(hash) = self.attachments_hash() {
            payload.push_str(&hash.to_hex());
        }
        payload.into_bytes()
    }

    /// Hash of the serialized credential (the ledger `dataHash`).
    pub fn content_hash(&self) -> Result<Hash256> {
        let json = serde_json::to_vec(self)?;
        Ok(sha3_256(&json))
    }

    /// Serialize to the interchange JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the interchange JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Credentials minted by the engine, keyed by ID.
///
/// Also tracks which `(holder, artifact hash)` pairs already have a credential.
#[derive(Debug, Default)]
pub struct CredentialRegistry {
    credentials: HashMap<String, Credential>,
    minted: HashSet<(String, Hash256)>,
}

impl CredentialRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a minted credential.
    pub fn insert(&mut self, credential: Credential) {
        self.minted.insert((
            credential.holder_did.clone(),
            credential.artifact_hash.clone(),
        ));
        self.credentials.insert(credential.id.clone(), credential);
    }

    /// Get a stored credential by ID.
    pub fn get(&self, credential_id: &str) -> Option<&Credential> {
        self.credentials.get(credential_id)
    }

    pub fn contains(&self, credential_id: &str) -> bool {
        self.credentials.contains_key(credential_id)
    }

    /// Whether a credential exists for this holder and artifact hash.
    pub fn is_minted(&self, holder_did: &str, artifact_hash: &Hash256) -> bool {
        self.minted
            .contains(&(holder_did.to_string(), artifact_hash.clone()))
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}
