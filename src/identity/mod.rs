//! Identity layer
//!
//! Provides the consortium's identity primitives:
//! - Content hashing and pluggable signatures
//! - DID derivation and the DID registry
//! - Signer capabilities bound to one identity
//! - Verifiable Credentials and the credential registry

pub mod credential;
pub mod crypto;
pub mod did;
pub mod signer;

pub use credential::{Credential, CredentialRegistry, IssuerAttachment};
pub use crypto::{
    hash_artifacts, sha3_256, sha3_256_multi, Ed25519Scheme, KeyPair, SecretKey, SignatureScheme,
};
pub use did::{derive_did, DidRegistry, User};
pub use signer::IdentitySigner;
