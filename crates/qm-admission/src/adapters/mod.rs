//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for mint admission.

mod access;
mod bus_sink;
mod inventory;

pub use access::SingleOwner;
pub use bus_sink::BusNotificationSink;
pub use inventory::InMemoryInventory;
