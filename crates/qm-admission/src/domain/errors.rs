//! # Error Types
//!
//! Every rejection the admission engine can produce. A rejected operation
//! leaves all state untouched.

use crate::ports::outbound::LedgerError;
use qm_types::{format_address, Address, ParseRoleError, PhaseId, UnitId};
use thiserror::Error;

// =============================================================================
// ERROR KIND
// =============================================================================

/// Coarse classification of a rejection, used for metric labels and
/// caller-side handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// Caller lacks the capability for the operation.
    Authorization,
    /// Operation not legal in the current lifecycle state.
    State,
    /// A capacity or per-identity limit would be exceeded.
    QuotaExceeded,
    /// Referenced identity or unit does not exist.
    NotFound,
}

impl ErrorKind {
    /// Metric label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authorization => "authorization",
            Self::State => "state",
            Self::QuotaExceeded => "quota_exceeded",
            Self::NotFound => "not_found",
        }
    }
}

// =============================================================================
// ADMISSION ERRORS
// =============================================================================

/// Errors returned by admission, registry, phase and gate operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------
    /// Parallel input columns differ in length.
    #[error("input length mismatch: {left} != {right}")]
    LengthMismatch {
        /// Length of the first column.
        left: usize,
        /// Length of the mismatching column.
        right: usize,
    },

    /// Role string did not name a known role.
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Batch operation called with no entries.
    #[error("empty batch")]
    EmptyBatch,

    /// Unit id outside `0..max_mint_limit`.
    #[error("unit id {unit_id} out of range (max {max})")]
    UnitIdOutOfRange {
        /// Requested unit id.
        unit_id: UnitId,
        /// Exclusive upper bound.
        max: u64,
    },

    /// Unit id already issued, or repeated within one batch.
    #[error("unit {0} already issued")]
    UnitAlreadyIssued(UnitId),

    // -------------------------------------------------------------------------
    // Authorization
    // -------------------------------------------------------------------------
    /// Caller is not the owner.
    #[error("caller {} is not the owner", format_address(.0))]
    NotOwner(Address),

    /// Caller is not a registered Admin.
    #[error("caller {} is not a registered admin", format_address(.0))]
    NotAdmin(Address),

    /// Caller does not hold the unit.
    #[error("caller does not hold unit {0}")]
    NotUnitHolder(UnitId),

    /// Premium identity has not been verified.
    #[error("premium identity {} is not verified", format_address(.0))]
    NotVerified(Address),

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------
    /// Address already holds an identity.
    #[error("address {} already registered", format_address(.0))]
    AlreadyRegistered(Address),

    /// Premium identity was verified earlier.
    #[error("premium identity {} already verified", format_address(.0))]
    AlreadyVerified(Address),

    /// Current phase is already Active.
    #[error("phase {0} is already active")]
    PhaseAlreadyActive(PhaseId),

    /// Current phase slot is already Created.
    #[error("phase {0} is already created")]
    PhaseAlreadyCreated(PhaseId),

    /// Current phase slot has not been created.
    #[error("phase {0} has not been created")]
    PhaseNotCreated(PhaseId),

    /// Current phase is not Active.
    #[error("phase {0} is not active")]
    PhaseNotActive(PhaseId),

    /// Mutating operations are suspended.
    #[error("contract is paused")]
    ContractPaused,

    /// `unpause` called while not paused.
    #[error("contract is not paused")]
    NotPaused,

    /// Transfers were enabled earlier.
    #[error("transfers already enabled")]
    AlreadyEnabled,

    /// Transfers have not been enabled.
    #[error("transfers are disabled")]
    TransferDisabled,

    /// An internal consistency check failed after a commit.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),

    // -------------------------------------------------------------------------
    // Quota exceeded
    // -------------------------------------------------------------------------
    /// `users_mint_limit` cannot cover the request.
    #[error("global user capacity exhausted")]
    GlobalCapacityExhausted,

    /// The active phase's reserved capacity cannot cover the request.
    #[error("phase {0} reserved capacity exhausted")]
    PhaseCapacityExhausted(PhaseId),

    /// `platform_mint_limit` cannot cover the request.
    #[error("platform capacity exhausted")]
    PlatformCapacityExhausted,

    /// Identity already holds its global limit.
    #[error("global limit {limit} reached for {}", format_address(.address))]
    GlobalLimitExceeded {
        /// Identity address.
        address: Address,
        /// Its global limit.
        limit: u64,
    },

    /// Identity already minted its per-phase role cap.
    #[error("phase {phase_id} limit {limit} reached for {}", format_address(.address))]
    PhaseRoleLimitExceeded {
        /// Phase id.
        phase_id: PhaseId,
        /// Identity address.
        address: Address,
        /// Per-role phase cap.
        limit: u64,
    },

    /// Requested reservation exceeds what users capacity can back.
    #[error("capacity exceeded: requested {requested}, available {available}")]
    CapacityExceeded {
        /// Requested reservation.
        requested: u64,
        /// Available users capacity.
        available: u64,
    },

    /// New phase cap does not exceed what the phase already consumed.
    #[error("limit too low: requested {requested}, already consumed {consumed}")]
    LimitTooLow {
        /// Requested total cap.
        requested: u64,
        /// Units already minted in the phase.
        consumed: u64,
    },

    /// New global limit does not exceed the identity's held count.
    #[error("limit {limit} does not exceed held balance {balance}")]
    LimitBelowBalance {
        /// Requested global limit.
        limit: u64,
        /// Units currently held.
        balance: u64,
    },

    // -------------------------------------------------------------------------
    // Not found
    // -------------------------------------------------------------------------
    /// Address is not registered under the required role.
    #[error("address {} not registered", format_address(.0))]
    NotRegistered(Address),

    /// Address is neither a Normal nor a Premium identity.
    #[error("address {} is neither normal nor premium", format_address(.0))]
    NeitherRole(Address),

    /// Unit has not been issued.
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------
    /// The inventory ledger refused the operation.
    #[error("inventory error: {0}")]
    Inventory(#[from] LedgerError),
}

impl AdmissionError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LengthMismatch { .. }
            | Self::InvalidRole(_)
            | Self::EmptyBatch
            | Self::UnitIdOutOfRange { .. }
            | Self::UnitAlreadyIssued(_) => ErrorKind::Validation,

            Self::NotOwner(_) | Self::NotAdmin(_) | Self::NotUnitHolder(_) | Self::NotVerified(_) => {
                ErrorKind::Authorization
            }

            Self::AlreadyRegistered(_)
            | Self::AlreadyVerified(_)
            | Self::PhaseAlreadyActive(_)
            | Self::PhaseAlreadyCreated(_)
            | Self::PhaseNotCreated(_)
            | Self::PhaseNotActive(_)
            | Self::ContractPaused
            | Self::NotPaused
            | Self::AlreadyEnabled
            | Self::TransferDisabled
            | Self::InvariantViolated(_)
            | Self::Inventory(_) => ErrorKind::State,

            Self::GlobalCapacityExhausted
            | Self::PhaseCapacityExhausted(_)
            | Self::PlatformCapacityExhausted
            | Self::GlobalLimitExceeded { .. }
            | Self::PhaseRoleLimitExceeded { .. }
            | Self::CapacityExceeded { .. }
            | Self::LimitTooLow { .. }
            | Self::LimitBelowBalance { .. } => ErrorKind::QuotaExceeded,

            Self::NotRegistered(_) | Self::NeitherRole(_) | Self::UnitNotFound(_) => {
                ErrorKind::NotFound
            }
        }
    }
}

impl From<ParseRoleError> for AdmissionError {
    fn from(err: ParseRoleError) -> Self {
        Self::InvalidRole(err.input)
    }
}
