//! # Driving Ports (API - Inbound)
//!
//! The public API of the admission subsystem. Owner-gated operations take
//! the caller's address and check it against the owner capability after
//! the pause gate.

use crate::domain::entities::Identity;
use crate::domain::errors::AdmissionError;
use crate::domain::value_objects::{
    AccountRegistration, CounterSnapshot, MintItem, MintReceipt, PhaseView,
};
use async_trait::async_trait;
use qm_types::{Address, MetadataHash, PhaseId, Role, UnitId};

/// Mint admission API.
#[async_trait]
pub trait MintAdmissionApi: Send + Sync {
    // =========================================================================
    // ACCOUNT REGISTRY (owner-gated)
    // =========================================================================

    /// Register an identity under a role.
    async fn register_account(
        &self,
        caller: Address,
        registration: AccountRegistration,
    ) -> Result<(), AdmissionError>;

    /// Verify a Premium identity.
    async fn verify_premium(&self, caller: Address, address: Address)
        -> Result<(), AdmissionError>;

    /// Replace global limits of Normal/Premium identities, all or nothing.
    async fn update_global_limits(
        &self,
        caller: Address,
        addresses: &[Address],
        limits: &[u64],
    ) -> Result<(), AdmissionError>;

    // =========================================================================
    // PHASE LIFECYCLE (owner-gated)
    // =========================================================================

    /// Create the current phase slot. Returns its id.
    async fn create_phase(
        &self,
        caller: Address,
        reserved_limit: u64,
        premium_user_limit: u64,
        normal_user_limit: u64,
    ) -> Result<PhaseId, AdmissionError>;

    /// Activate the current phase. Returns its id.
    async fn activate_phase(&self, caller: Address) -> Result<PhaseId, AdmissionError>;

    /// Deactivate the current phase. Returns the new current id.
    async fn deactivate_phase(&self, caller: Address) -> Result<PhaseId, AdmissionError>;

    /// Set the active phase's total cap. Returns the remaining reservation.
    async fn update_reserved_limit(
        &self,
        caller: Address,
        new_limit: u64,
    ) -> Result<u64, AdmissionError>;

    // =========================================================================
    // ADMISSION
    // =========================================================================

    /// Mint one unit for a Normal or Premium identity.
    async fn request_mint(
        &self,
        identity: Address,
        unit_id: UnitId,
        metadata: MetadataHash,
    ) -> Result<MintReceipt, AdmissionError>;

    /// Mint one unit for an Admin from platform capacity.
    async fn request_admin_mint(
        &self,
        identity: Address,
        unit_id: UnitId,
        metadata: MetadataHash,
    ) -> Result<MintReceipt, AdmissionError>;

    /// Mint a batch charged to each destination's quotas (owner-gated).
    async fn request_bulk_mint(
        &self,
        caller: Address,
        items: Vec<MintItem>,
    ) -> Result<MintReceipt, AdmissionError>;

    /// Mint a batch from platform capacity (caller must be an Admin).
    async fn request_admin_bulk_mint(
        &self,
        caller: Address,
        items: Vec<MintItem>,
    ) -> Result<MintReceipt, AdmissionError>;

    // =========================================================================
    // GATES
    // =========================================================================

    /// Open the transfer gate (owner-gated, one-way).
    async fn enable_transfer(&self, caller: Address) -> Result<(), AdmissionError>;

    /// Suspend mutating operations (owner-gated).
    async fn pause(&self, caller: Address) -> Result<(), AdmissionError>;

    /// Resume mutating operations (owner-gated).
    async fn unpause(&self, caller: Address) -> Result<(), AdmissionError>;

    // =========================================================================
    // INVENTORY
    // =========================================================================

    /// Replace metadata of units the caller holds, all or nothing.
    async fn update_metadata(
        &self,
        caller: Address,
        updates: Vec<(UnitId, String)>,
    ) -> Result<(), AdmissionError>;

    /// Units held by `owner`, ascending.
    async fn list_units_by_owner(&self, owner: Address) -> Result<Vec<UnitId>, AdmissionError>;

    /// Move a unit the caller holds to `to`.
    async fn transfer_unit(
        &self,
        caller: Address,
        to: Address,
        unit_id: UnitId,
    ) -> Result<(), AdmissionError>;

    // =========================================================================
    // READ MODEL
    // =========================================================================

    /// Counters and gates.
    fn snapshot(&self) -> CounterSnapshot;

    /// View of one phase slot.
    fn phase(&self, phase_id: PhaseId) -> PhaseView;

    /// Identity record of an address.
    fn account(&self, address: &Address) -> Option<Identity>;

    /// Units `address` minted in `phase_id` under `role`.
    fn phase_balance(&self, phase_id: PhaseId, address: &Address, role: Role) -> u64;
}
