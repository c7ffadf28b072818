//! # Integration Tests
//!
//! Cross-crate flows through `MintAdmissionService`, the in-memory ledger and
//! the notification bus.

pub mod concurrency;
pub mod randomized;
pub mod scenarios;
pub mod wiring;

use qm_admission::prelude::*;

/// Normal identity used across scenarios.
pub const ALICE: Address = [0xA1; 20];
/// Premium identity used across scenarios.
pub const BOB: Address = [0xB0; 20];
/// Admin identity used across scenarios.
pub const CAROL: Address = [0xC0; 20];

/// Deterministic metadata for a unit.
pub fn metadata(unit_id: UnitId) -> MetadataHash {
    MetadataHash::from_uri(&format!("ipfs://quantum-mint/{unit_id}"))
}

/// Register an identity as [`TEST_OWNER`].
pub async fn register(
    service: &InMemoryAdmissionService,
    address: Address,
    role: Role,
    global_limit: u64,
) -> Result<(), AdmissionError> {
    service
        .register_account(
            TEST_OWNER,
            AccountRegistration {
                name: format!("{role}-{:02x}", address[0]),
                address,
                global_limit,
                role,
            },
        )
        .await
}

/// Create and activate a phase as [`TEST_OWNER`].
pub async fn open_phase(
    service: &InMemoryAdmissionService,
    reserved_limit: u64,
    premium_user_limit: u64,
    normal_user_limit: u64,
) -> Result<PhaseId, AdmissionError> {
    service
        .create_phase(TEST_OWNER, reserved_limit, premium_user_limit, normal_user_limit)
        .await?;
    service.activate_phase(TEST_OWNER).await
}
