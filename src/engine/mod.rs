//! Credential engine
//!
//! Orchestrates the consortium workflow on top of the identity and ledger
//! layers:
//! - Identity registration and login
//! - Portfolio submission and credential minting
//! - Credential verification and its history

pub mod config;
pub mod service;
pub mod telemetry;
pub mod verification;

pub use config::EngineConfig;
pub use service::{CredentialEngine, Identity};
pub use telemetry::init_tracing;
pub use verification::{
    CredentialVerifier, VerificationFailure, VerificationRecord, VerificationResult,
    VerificationStage,
};
