//! # Value Objects
//!
//! Request items, balance keys and read-model views.

use super::entities::{GlobalCounters, Phase, PhaseStatus};
use super::errors::AdmissionError;
use qm_bus::{MintPath, MintedUnit};
use qm_types::{Address, MetadataHash, PhaseId, Role, UnitId};
use serde::{Deserialize, Serialize};

/// Composite key of the per-phase balance table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BalanceKey {
    /// Phase id.
    pub phase_id: PhaseId,
    /// Identity address.
    pub address: Address,
    /// Role the units were charged under.
    pub role: Role,
}

impl BalanceKey {
    /// Create a key.
    #[must_use]
    pub fn new(phase_id: PhaseId, address: Address, role: Role) -> Self {
        Self {
            phase_id,
            address,
            role,
        }
    }
}

/// Validated input for `register_account`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRegistration {
    /// Display name.
    pub name: String,
    /// Address to register.
    pub address: Address,
    /// Global limit (ignored for Admin).
    pub global_limit: u64,
    /// Role, already parsed.
    pub role: Role,
}

impl AccountRegistration {
    /// Parse a registration whose role arrives as free-form text.
    pub fn parse(
        name: impl Into<String>,
        address: Address,
        global_limit: u64,
        role: &str,
    ) -> Result<Self, AdmissionError> {
        Ok(Self {
            name: name.into(),
            address,
            global_limit,
            role: role.parse()?,
        })
    }
}

/// One element of a bulk mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintItem {
    /// Unit to issue.
    pub unit_id: UnitId,
    /// Receiving identity.
    pub to: Address,
    /// Metadata hash stored with the unit.
    pub metadata: MetadataHash,
}

impl MintItem {
    /// Build an item, hashing the metadata URI.
    #[must_use]
    pub fn new(unit_id: UnitId, to: Address, metadata_uri: &str) -> Self {
        Self {
            unit_id,
            to,
            metadata: MetadataHash::from_uri(metadata_uri),
        }
    }

    /// Zip three parallel columns into items.
    pub fn from_columns(
        unit_ids: &[UnitId],
        recipients: &[Address],
        metadata_uris: &[String],
    ) -> Result<Vec<Self>, AdmissionError> {
        if unit_ids.len() != recipients.len() {
            return Err(AdmissionError::LengthMismatch {
                left: unit_ids.len(),
                right: recipients.len(),
            });
        }
        if unit_ids.len() != metadata_uris.len() {
            return Err(AdmissionError::LengthMismatch {
                left: unit_ids.len(),
                right: metadata_uris.len(),
            });
        }
        Ok(unit_ids
            .iter()
            .zip(recipients)
            .zip(metadata_uris)
            .map(|((unit_id, to), uri)| Self::new(*unit_id, *to, uri))
            .collect())
    }
}

/// A unit handed to the inventory ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Issuance {
    /// Unit id.
    pub unit_id: UnitId,
    /// New holder.
    pub to: Address,
    /// Metadata hash.
    pub metadata: MetadataHash,
}

impl From<MintItem> for Issuance {
    fn from(item: MintItem) -> Self {
        Self {
            unit_id: item.unit_id,
            to: item.to,
            metadata: item.metadata,
        }
    }
}

/// Result of an admitted mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    /// Admission path.
    pub path: MintPath,
    /// Phase charged, if any.
    pub phase_id: Option<PhaseId>,
    /// Issued units in request order.
    pub units: Vec<MintedUnit>,
}

/// Point-in-time view of the global counters and gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// Cap on unit ids.
    pub max_mint_limit: u64,
    /// Remaining Admin capacity.
    pub platform_mint_limit: u64,
    /// Remaining Normal/Premium capacity.
    pub users_mint_limit: u64,
    /// Total Normal/Premium units admitted.
    pub users_minted_balance: u64,
    /// Transfer gate.
    pub transfer_enabled: bool,
    /// Pause gate.
    pub paused: bool,
    /// Current phase slot.
    pub current_phase_id: PhaseId,
}

impl CounterSnapshot {
    pub(crate) fn new(
        counters: &GlobalCounters,
        transfer_enabled: bool,
        paused: bool,
        current_phase_id: PhaseId,
    ) -> Self {
        Self {
            max_mint_limit: counters.max_mint_limit,
            platform_mint_limit: counters.platform_mint_limit,
            users_mint_limit: counters.users_mint_limit,
            users_minted_balance: counters.users_minted_balance,
            transfer_enabled,
            paused,
            current_phase_id,
        }
    }
}

/// Read-only view of one phase slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseView {
    /// Phase id.
    pub phase_id: PhaseId,
    /// Status (Uncreated for slots never created).
    pub status: PhaseStatus,
    /// Remaining reserved capacity.
    pub reserved_limit: u64,
    /// Units admitted in the phase.
    pub minted: u64,
    /// Per-address Premium cap.
    pub premium_user_limit: u64,
    /// Per-address Normal cap.
    pub normal_user_limit: u64,
}

impl PhaseView {
    /// View of a slot that was never created.
    #[must_use]
    pub fn uncreated(phase_id: PhaseId) -> Self {
        Self {
            phase_id,
            status: PhaseStatus::Uncreated,
            reserved_limit: 0,
            minted: 0,
            premium_user_limit: 0,
            normal_user_limit: 0,
        }
    }
}

impl From<&Phase> for PhaseView {
    fn from(phase: &Phase) -> Self {
        Self {
            phase_id: phase.id,
            status: phase.status,
            reserved_limit: phase.reserved_limit,
            minted: phase.minted,
            premium_user_limit: phase.premium_user_limit,
            normal_user_limit: phase.normal_user_limit,
        }
    }
}
