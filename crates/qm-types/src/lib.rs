//! # Shared Types Crate
//!
//! Primitive identifiers used by every Quantum-Mint crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: addresses, unit ids and phase ids are defined
//!   once here and re-used by `qm-bus` and `qm-admission`.
//! - **Parse at the boundary**: `Role` is a closed enum. Free-form role strings
//!   are parsed exactly once via `FromStr`; nothing downstream compares strings.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
