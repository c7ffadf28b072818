//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for mint admission.
//!
//! - **Driving Ports (Inbound)**: `MintAdmissionApi`
//! - **Driven Ports (Outbound)**: `InventoryLedger`, `AccessControl`,
//!   `TimeSource`, `NotificationSink`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
