//! Hashing and signature services.
//!
//! SHA3-256 content hashing plus a pluggable [`SignatureScheme`]. The shipped
//! scheme is Ed25519; verification only ever needs the public key.

use crate::core::{Artifact, Error, Hash256, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha3::{Digest, Sha3_256};

/// Private key bytes. `Debug` never prints the material.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap raw private key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey(<redacted>)")
    }
}

/// A freshly generated key pair.
#[derive(Clone, Debug)]
pub struct KeyPair {
    /// Public key bytes
    pub public_key: Vec<u8>,
    /// Private key bytes
    pub secret_key: SecretKey,
}

/// Asymmetric signing capability.
///
/// Implementations must verify with the public key alone.
pub trait SignatureScheme: Send + Sync {
    /// Scheme identifier (e.g. "Ed25519").
    fn name(&self) -> &'static str;

    /// Generate a key pair from a cryptographically secure source.
    fn generate_keypair(&self) -> KeyPair;

    /// Sign a message with a private key.
    fn sign(&self, secret_key: &SecretKey, message: &[u8]) -> Result<Vec<u8>>;

    /// Verify a signature against a public key.
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<()>;
}

/// Ed25519 signatures via `ed25519-dalek`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Scheme;

impl Ed25519Scheme {
    fn signing_key(secret_key: &SecretKey) -> Result<SigningKey> {
        let bytes: [u8; 32] = secret_key
            .as_bytes()
            .try_into()
            .map_err(|_| Error::InvalidKeyFormat("Invalid private key length".into()))?;
        Ok(SigningKey::from_bytes(&bytes))
    }

    fn verifying_key(public_key: &[u8]) -> Result<VerifyingKey> {
        let bytes: [u8; 32] = public_key
            .try_into()
            .map_err(|_| Error::InvalidKeyFormat("Invalid public key length".into()))?;
        VerifyingKey::from_bytes(&bytes).map_err(|e| Error::InvalidKeyFormat(e.to_string()))
    }
}

impl SignatureScheme for Ed25519Scheme {
    fn name(&self) -> &'static str {
        "Ed25519"
    }

    fn generate_keypair(&self) -> KeyPair {
        use rand::RngCore;
        let mut csprng = rand::rngs::OsRng;
        let mut secret_key_bytes = [0u8; 32];
        csprng.fill_bytes(&mut secret_key_bytes);
        let signing_key = SigningKey::from_bytes(&secret_key_bytes);
        KeyPair {
            public_key: signing_key.verifying_key().to_bytes().to_vec(),
            secret_key: SecretKey::from_bytes(secret_key_bytes.to_vec()),
        }
    }

    fn sign(&self, secret_key: &SecretKey, message: &[u8]) -> Result<Vec<u8>> {
        let signing_key = Self::signing_key(secret_key)?;
        Ok(signing_key.sign(message).to_bytes().to_vec())
    }

    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
        let verifying_key = Self::verifying_key(public_key)?;
        let sig_bytes: [u8; 64] = signature
            .try_into()
            .map_err(|_| Error::InvalidKeyFormat("Invalid signature length".into()))?;
        let sig = Signature::from_bytes(&sig_bytes);
        verifying_key.verify(message, &sig)?;
        Ok(())
    }
}

/// Compute SHA3-256 hash of data.
pub fn sha3_256(data: &[u8]) -> Hash256 {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    Hash256::new(bytes)
}

/// Compute SHA3-256 hash of the concatenation of `chunks`, in order.
pub fn sha3_256_multi(chunks: &[&[u8]]) -> Hash256 {
    let mut hasher = Sha3_256::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    Hash256::new(bytes)
}

/// Combined hash of artifact payloads in slice order. Filenames are ignored.
pub fn hash_artifacts(artifacts: &[Artifact]) -> Hash256 {
    let chunks: Vec<&[u8]> = artifacts.iter().map(|a| a.payload.as_slice()).collect();
    sha3_256_multi(&chunks)
}
