//! Decentralized Identifier (DID) derivation and registry.

use crate::core::{now, Error, Result, Role, Timestamp};
use crate::identity::crypto::sha3_256;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Derive a DID string from a public key.
///
/// The identifier is `did:<method>:` followed by the first `hash_len` hex
/// characters of the SHA3-256 of the key bytes.
pub fn derive_did(method: &str, public_key: &[u8], hash_len: usize) -> String {
    let hash = sha3_256(public_key).to_hex();
    let len = hash_len.min(hash.len());
    format!("did:{}:{}", method, &hash[..len])
}

/// Public view of a registered identity.
///
/// Carries no private key material; signing goes through
/// [`crate::identity::IdentitySigner`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The DID string (e.g. "did:consortium:abc123")
    pub did: String,
    /// Consortium role
    pub role: Role,
    /// Public key (hex)
    pub public_key: String,
}

#[derive(Clone, Debug)]
struct RegistryEntry {
    public_key: Vec<u8>,
    role: Role,
    registered: Timestamp,
}

/// Append-only mapping of DIDs to public keys and roles.
///
/// No rotation or deregistration: once registered, an entry is fixed for the
/// lifetime of the registry.
#[derive(Debug, Default)]
pub struct DidRegistry {
    entries: HashMap<String, RegistryEntry>,
    /// Registration order
    order: Vec<String>,
}

impl DidRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DID. Fails if the DID is already present.
    pub fn register(&mut self, did: &str, public_key: &[u8], role: Role) -> Result<()> {
        if self.entries.contains_key(did) {
            return Err(Error::DuplicateDid(did.to_string()));
        }
        self.entries.insert(
            did.to_string(),
            RegistryEntry {
                public_key: public_key.to_vec(),
                role,
                registered: now(),
            },
        );
        self.order.push(did.to_string());
        Ok(())
    }

    /// Resolve a DID to its public key bytes.
    pub fn resolve(&self, did: &str) -> Result<&[u8]> {
        self.entries
            .get(did)
            .map(|e| e.public_key.as_slice())
            .ok_or_else(|| Error::DidNotFound(did.to_string()))
    }

    /// Role registered for a DID.
    pub fn role_of(&self, did: &str) -> Option<Role> {
        self.entries.get(did).map(|e| e.role)
    }

    /// Registration time of a DID.
    pub fn registered_at(&self, did: &str) -> Option<Timestamp> {
        self.entries.get(did).map(|e| e.registered)
    }

    /// Public user record for a DID.
    pub fn user(&self, did: &str) -> Option<User> {
        self.entries.get(did).map(|e| User {
            did: did.to_string(),
            role: e.role,
            public_key: hex::encode(&e.public_key),
        })
    }

    /// All users in registration order.
    pub fn users(&self) -> Vec<User> {
        self.order.iter().filter_map(|did| self.user(did)).collect()
    }

    /// Whether the DID is registered.
    pub fn contains(&self, did: &str) -> bool {
        self.entries.contains_key(did)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Immutable copy of `did -> public key (hex)`.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(did, e)| (did.clone(), hex::encode(&e.public_key)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::crypto::{Ed25519Scheme, SignatureScheme};

    #[test]
    fn test_derive_did_shape() {
        let pair = Ed25519Scheme.generate_keypair();
        let did = derive_did("consortium", &pair.public_key, 16);
        assert!(did.starts_with("did:consortium:"));
        assert_eq!(did.len(), "did:consortium:".len() + 16);
    }

    #[test]
    fn test_derive_did_deterministic() {
        let pair = Ed25519Scheme.generate_keypair();
        assert_eq!(
            derive_did("consortium", &pair.public_key, 16),
            derive_did("consortium", &pair.public_key, 16)
        );
    }

    #[test]
    fn test_derive_did_distinct_keys() {
        let a = Ed25519Scheme.generate_keypair();
        let b = Ed25519Scheme.generate_keypair();
        assert_ne!(
            derive_did("consortium", &a.public_key, 16),
            derive_did("consortium", &b.public_key, 16)
        );
    }

    #[test]
    fn test_derive_did_clamps_length() {
        let did = derive_did("x", b"key", 500);
        assert_eq!(did.len(), "did:x:".len() + 64);
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = DidRegistry::new();
        registry.register("did:consortium:a", &[1u8; 32], Role::Issuer).unwrap();
        assert_eq!(registry.resolve("did:consortium:a").unwrap(), &[1u8; 32]);
        assert_eq!(registry.role_of("did:consortium:a"), Some(Role::Issuer));
        assert!(registry.registered_at("did:consortium:a").is_some());
    }

    #[test]
    fn test_duplicate_did_rejected() {
        let mut registry = DidRegistry::new();
        registry.register("did:consortium:a", &[1u8; 32], Role::Holder).unwrap();
        let result = registry.register("did:consortium:a", &[2u8; 32], Role::Issuer);
        assert!(matches!(result, Err(Error::DuplicateDid(_))));
        // original entry untouched
        assert_eq!(registry.resolve("did:consortium:a").unwrap(), &[1u8; 32]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_not_found() {
        let registry = DidRegistry::new();
        assert!(matches!(
            registry.resolve("did:consortium:none"),
            Err(Error::DidNotFound(_))
        ));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut registry = DidRegistry::new();
        registry.register("did:consortium:a", &[1u8; 32], Role::Holder).unwrap();
        let mut snapshot = registry.snapshot();
        snapshot.insert("did:consortium:b".into(), "00".into());
        assert!(!registry.contains("did:consortium:b"));
        assert_eq!(snapshot["did:consortium:a"], hex::encode([1u8; 32]));
    }

    #[test]
    fn test_users_in_registration_order() {
        let mut registry = DidRegistry::new();
        registry.register("did:consortium:z", &[1u8; 32], Role::Holder).unwrap();
        registry.register("did:consortium:a", &[2u8; 32], Role::Verifier).unwrap();
        let users = registry.users();
        assert_eq!(users[0].did, "did:consortium:z");
        assert_eq!(users[1].role, Role::Verifier);
    }
}
