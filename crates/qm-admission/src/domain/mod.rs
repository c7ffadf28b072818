//! # Domain Module
//!
//! Core domain types and rules for mint admission.

pub mod entities;
pub mod errors;
pub mod gates;
pub mod invariants;
pub mod phase;
pub mod quota;
pub mod registry;
pub mod state;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use gates::{PausableControl, TransferGate};
pub use invariants::*;
pub use phase::PhaseLifecycle;
pub use quota::{AdmissionPlan, QuotaEngine};
pub use registry::AccountRegistry;
pub use state::MintState;
pub use value_objects::*;
