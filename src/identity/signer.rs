//! Signing capability bound to one identity.

use crate::core::Result;
use crate::identity::crypto::{KeyPair, SecretKey, SignatureScheme};
use std::sync::Arc;

/// A handle that can sign on behalf of exactly one DID.
///
/// The private key never leaves the handle. Clones share the same key.
#[derive(Clone)]
pub struct IdentitySigner {
    did: String,
    public_key: Vec<u8>,
    secret_key: Arc<SecretKey>,
    scheme: Arc<dyn SignatureScheme>,
}

impl IdentitySigner {
    /// Bind a key pair to a DID.
    pub fn new(did: &str, key_pair: KeyPair, scheme: Arc<dyn SignatureScheme>) -> Self {
        Self {
            did: did.to_string(),
            public_key: key_pair.public_key,
            secret_key: Arc::new(key_pair.secret_key),
            scheme,
        }
    }

    /// The DID this signer acts for.
    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Name of the underlying signature scheme.
    pub fn scheme_name(&self) -> &'static str {
        self.scheme.name()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.scheme.sign(&self.secret_key, message)
    }
}

impl std::fmt::Debug for IdentitySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySigner")
            .field("did", &self.did)
            .field("public_key", &hex::encode(&self.public_key))
            .field("scheme", &self.scheme.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::crypto::Ed25519Scheme;

    fn create_signer() -> IdentitySigner {
        let scheme: Arc<dyn SignatureScheme> = Arc::new(Ed25519Scheme);
        let pair = scheme.generate_keypair();
        IdentitySigner::new("did:consortium:test", pair, scheme)
    }

    #[test]
    fn test_signer_signature_verifies() {
        let signer = create_signer();
        let signature = signer.sign(b"payload").unwrap();
        assert!(Ed25519Scheme
            .verify(signer.public_key(), b"payload", &signature)
            .is_ok());
    }

    #[test]
    fn test_clones_share_key() {
        let signer = create_signer();
        let clone = signer.clone();
        assert_eq!(signer.public_key(), clone.public_key());
        let signature = clone.sign(b"payload").unwrap();
        assert!(Ed25519Scheme
            .verify(signer.public_key(), b"payload", &signature)
            .is_ok());
    }

    #[test]
    fn test_debug_omits_private_key() {
        let signer = create_signer();
        let rendered = format!("{:?}", signer);
        assert!(rendered.contains("did:consortium:test"));
        assert!(!rendered.contains(&hex::encode(signer.secret_key.as_bytes())));
    }
}
