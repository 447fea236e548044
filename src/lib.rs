//! # vcledger - Consortium Credential Ledger
//!
//! A single-authority credentialing network providing:
//! - **Identity**: DID derivation and registry, Ed25519 signer capabilities
//! - **Ledger**: append-only, hash-chained transaction log
//! - **Engine**: portfolio submission, credential minting and verification
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vcledger::{Artifact, CredentialEngine, EngineConfig, Role};
//!
//! fn main() -> vcledger::Result<()> {
//!     let engine = CredentialEngine::new(EngineConfig::default());
//!     let holder = engine.register_identity(Role::Holder)?;
//!     let issuer = engine.register_identity(Role::Issuer)?;
//!
//!     let artifacts = vec![Artifact::new(b"report.pdf contents".to_vec(), "report.pdf")];
//!     let hash = engine.submit_portfolio(&holder.user.did, artifacts)?;
//!     let credential = engine.mint_credential(&issuer.signer, &holder.user.did, &hash, None)?;
//!
//!     let result = engine.verify_credential(&credential.to_json()?);
//!     println!("verified: {}", result.verified);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod engine;
pub mod identity;
pub mod ledger;

pub use crate::core::error::{Error, Result};
pub use crate::core::types::{Artifact, Hash256, Role};
pub use engine::{CredentialEngine, EngineConfig, Identity, VerificationFailure, VerificationResult};
pub use identity::{Credential, IdentitySigner, User};
pub use ledger::{LedgerTransaction, TransactionPayload, TransactionType};
