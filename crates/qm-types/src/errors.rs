//! # Error Types
//!
//! Errors raised while parsing shared primitives.

use thiserror::Error;

/// A role string did not normalize to Normal, Premium or Admin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid role: {input:?} (expected normal, premium or admin)")]
pub struct ParseRoleError {
    /// The rejected input, verbatim.
    pub input: String,
}

/// An address string was not 20 bytes of hex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAddressError {
    /// Input was not valid hex.
    #[error("Invalid hex in address: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong number of bytes.
    #[error("Invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}
