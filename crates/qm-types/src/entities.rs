//! # Core Entities
//!
//! Identifiers and small value types shared across the workspace.

use crate::errors::{ParseAddressError, ParseRoleError};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// Serial number of an inventory unit. Valid ids are `0..max_mint_limit`.
pub type UnitId = u64;

/// Phase identifier. Monotonically increasing, never reused.
pub type PhaseId = u64;

/// Unix timestamp in milliseconds.
pub type Timestamp = u64;

/// The all-zero address.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Parse a `0x`-prefixed (or bare) hex string into an [`Address`].
pub fn parse_address(input: &str) -> Result<Address, ParseAddressError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let bytes = hex::decode(digits).map_err(|e| ParseAddressError::InvalidHex(e.to_string()))?;
    let address: Address = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ParseAddressError::InvalidLength(bytes.len()))?;
    Ok(address)
}

/// Format an address as `0x` + 40 lowercase hex digits.
#[must_use]
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Short `0xabcd..` form for log lines.
#[must_use]
pub fn short_address(address: &Address) -> String {
    format!("0x{:02x}{:02x}..", address[0], address[1])
}

/// Account role. Fixed for the lifetime of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Regular user with a per-identity global limit.
    Normal,
    /// User with a global limit that must be verified before minting.
    Premium,
    /// Platform operator drawing from the shared platform quota.
    Admin,
}

impl Role {
    /// Lowercase name, as used in metric labels and notifications.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Premium => "premium",
            Self::Admin => "admin",
        }
    }

    /// Roles that are charged against phase and user capacity.
    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self, Self::Normal | Self::Premium)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        if normalized.eq_ignore_ascii_case("normal") {
            Ok(Self::Normal)
        } else if normalized.eq_ignore_ascii_case("premium") {
            Ok(Self::Premium)
        } else if normalized.eq_ignore_ascii_case("admin") {
            Ok(Self::Admin)
        } else {
            Err(ParseRoleError {
                input: s.to_string(),
            })
        }
    }
}

/// Keccak-256 digest of a unit's metadata URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MetadataHash(pub [u8; 32]);

impl MetadataHash {
    /// Hash a metadata URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Self {
        let digest = Keccak256::digest(uri.as_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    /// Hex form without prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for MetadataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}
