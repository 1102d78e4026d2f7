//! Shared building blocks for endorsing and assembling ledger transactions:
//! wire messages, the hashing service, the signing identity capability and
//! the error type used across the workspace.

pub mod auth;
pub mod crypto;
pub mod errors;
pub mod protos;
pub mod utils;

pub use errors::{Result, TxError};
