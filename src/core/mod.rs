//! Core utilities and common types for the credential ledger.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
