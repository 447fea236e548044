//! Ledger
//!
//! The append-only transaction log shared by holders, issuers and verifiers:
//! - Typed, hash-chained transactions
//! - Lookup by data hash, type and actor
//! - Chain integrity verification

pub mod chain;
pub mod transaction;

pub use chain::{verify_chain, Ledger, LedgerVerification};
pub use transaction::{LedgerTransaction, TransactionPayload, TransactionType};
