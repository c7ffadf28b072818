//! # QM Admission - Quota & Phase-Admission Engine
//!
//! Grants or denies permission to mint a unit of serially-numbered inventory,
//! subject to nested capacity limits and a strictly sequential phase
//! lifecycle. Every single or batched request is evaluated as a dry run and
//! then committed as a whole, or rejected with no side effects.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | `AccountRegistry` | `domain/registry.rs` | Normal / Premium / Admin identities, limits, verification |
//! | `PhaseLifecycle` | `domain/phase.rs` | `Uncreated -> Created -> Active -> Deactivated`, per-phase balances |
//! | `QuotaEngine` | `domain/quota.rs` | Global counters, admission dry runs, commit |
//! | `TransferGate` | `domain/gates.rs` | One-way transfer enable |
//! | `PausableControl` | `domain/gates.rs` | Global pause switch |
//! | `MintAdmissionService` | `service.rs` | Single-writer critical section, notifications |
//!
//! ## Capacity Hierarchy
//!
//! | Limit | Applies to | Rejection |
//! |-------|-----------|-----------|
//! | `max_mint_limit` | unit ids (`0..max`) | `UnitIdOutOfRange` |
//! | `users_mint_limit` | Normal + Premium mints | `GlobalCapacityExhausted` |
//! | `platform_mint_limit` | Admin mints | `PlatformCapacityExhausted` |
//! | phase `reserved_limit` | mints in the active phase | `PhaseCapacityExhausted` |
//! | identity `global_limit` | units held per identity | `GlobalLimitExceeded` |
//! | phase role limit | units per address per phase | `PhaseRoleLimitExceeded` |
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Users capacity conserved | `domain/invariants.rs` - `invariant_users_capacity_conserved()` |
//! | At most one Active phase | `domain/invariants.rs` - `invariant_single_active_phase()` |
//! | Phase balances within role limits | `domain/invariants.rs` - `invariant_phase_balances()` |
//! | All-or-nothing batches | `domain/quota.rs` - dry run before commit |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Default Adapter | Purpose |
//! |-------|-----------------|---------|
//! | `InventoryLedger` | `InMemoryInventory` | Unit ownership, metadata, transfers |
//! | `AccessControl` | `SingleOwner` | Owner capability |
//! | `NotificationSink` | `BusNotificationSink` | Publish to `qm-bus` |
//! | `TimeSource` | `SystemTimeSource` | Notification timestamps |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qm_admission::prelude::*;
//!
//! let (service, bus) = create_test_service();
//! service.create_phase(TEST_OWNER, 50, 10, 5).await?;
//! service.activate_phase(TEST_OWNER).await?;
//!
//! let receipt = service.request_mint(alice, 7, MetadataHash::from_uri("ipfs://7")).await?;
//! assert_eq!(receipt.units[0].unit_id, 7);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
mod metrics;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::entities::{
        GlobalCounters, Identity, IdentityKind, MintConfig, Phase, PhaseStatus,
    };
    pub use crate::domain::errors::{AdmissionError, ErrorKind};
    pub use crate::domain::state::MintState;
    pub use crate::domain::value_objects::{
        AccountRegistration, BalanceKey, CounterSnapshot, Issuance, MintItem, MintReceipt,
        PhaseView,
    };

    // Ports
    pub use crate::ports::inbound::MintAdmissionApi;
    pub use crate::ports::outbound::{
        AccessControl, FixedTimeSource, InventoryLedger, LedgerError, NotificationSink,
        SystemTimeSource, TimeSource,
    };

    // Adapters
    pub use crate::adapters::{BusNotificationSink, InMemoryInventory, SingleOwner};

    // Config
    pub use crate::config::{
        ConfigError, ConfigProvider, StaticConfigProvider, TomlConfigProvider,
    };

    // Service
    pub use crate::service::{
        create_test_service, create_test_service_with, InMemoryAdmissionService,
        MintAdmissionService, ServiceConfig, ServiceStats, TEST_OWNER,
    };

    // Shared types
    pub use qm_bus::{MintEvent, MintNotification, MintPath, MintedUnit};
    pub use qm_types::{Address, MetadataHash, PhaseId, Role, UnitId};
}

/// Subsystem identifier used in log prefixes.
pub const SUBSYSTEM_ID: &str = "qm-admission";

pub use domain::errors::{AdmissionError, ErrorKind};
pub use service::MintAdmissionService;
