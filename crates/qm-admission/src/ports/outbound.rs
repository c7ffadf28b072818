//! Outbound (Driven) ports for the admission subsystem.
//!
//! These traits define dependencies on external systems: the inventory
//! ledger that records ownership, the owner capability, a clock, and the
//! notification channel.

use crate::domain::value_objects::Issuance;
use async_trait::async_trait;
use qm_bus::MintNotification;
use qm_types::{Address, MetadataHash, Timestamp, UnitId};
use thiserror::Error;

// =============================================================================
// INVENTORY LEDGER
// =============================================================================

/// Errors raised by the inventory ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Unit already has an owner.
    #[error("unit {0} already exists")]
    AlreadyExists(UnitId),

    /// Unit has not been issued.
    #[error("unit {0} does not exist")]
    NotFound(UnitId),

    /// Unit is held by someone else.
    #[error("unit {unit_id} is not held by {claimed:?}")]
    WrongOwner {
        /// Unit id.
        unit_id: UnitId,
        /// Address that claimed it.
        claimed: Address,
    },
}

/// Ledger that records which identity holds which unit.
///
/// Called synchronously from inside the admission critical section, so
/// implementations must not block on I/O for long.
pub trait InventoryLedger: Send + Sync {
    /// Whether a unit has been issued.
    fn is_issued(&self, unit_id: UnitId) -> bool;

    /// Current holder of a unit.
    fn owner_of(&self, unit_id: UnitId) -> Option<Address>;

    /// Number of units an address holds.
    fn balance_of(&self, owner: &Address) -> u64;

    /// Units held by an address, ascending.
    fn units_of_owner(&self, owner: &Address) -> Vec<UnitId>;

    /// Metadata hash stored with a unit.
    fn metadata_of(&self, unit_id: UnitId) -> Option<MetadataHash>;

    /// Issue every unit or none of them.
    fn issue_batch(&self, issuances: &[Issuance]) -> Result<(), LedgerError>;

    /// Move a unit from `from` to `to`.
    fn transfer(&self, unit_id: UnitId, from: &Address, to: &Address) -> Result<(), LedgerError>;

    /// Replace metadata of every listed unit or none of them.
    fn set_metadata_batch(&self, updates: &[(UnitId, MetadataHash)]) -> Result<(), LedgerError>;
}

// =============================================================================
// ACCESS CONTROL
// =============================================================================

/// Owner capability check.
pub trait AccessControl: Send + Sync {
    /// Whether `caller` holds the owner capability.
    fn is_owner(&self, caller: &Address) -> bool;
}

// =============================================================================
// TIME SOURCE
// =============================================================================

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Time source frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub Timestamp);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        self.0
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Channel that delivers notifications after a commit.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification. Delivery failures are not reported back.
    async fn notify(&self, notification: MintNotification);
}
