//! # Quantum-Mint Bus - Notification Delivery
//!
//! Every state-changing success in the admission subsystem emits exactly one
//! notification. This crate carries them from the subsystem to whoever listens
//! (indexers, audit log, UI).
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐  subscribe()  ┌──────────────┐
//! │ qm-admission │ ────────────→ │  Event Bus   │ ────────────→ │  Listeners   │
//! └──────────────┘               └──────────────┘               └──────────────┘
//! ```
//!
//! Delivery is fire-and-forget: publishing never fails and never blocks the
//! admission critical section. A notification with no subscribers is dropped.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, MintEvent, MintNotification, MintPath, MintedUnit};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Current schema version of `MintNotification`.
pub const PROTOCOL_VERSION: u16 = 1;

/// Maximum notifications to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
