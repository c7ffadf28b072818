//! # Randomized Request Streams
//!
//! Seeded random sequences of every mutating operation. After each step the
//! state invariants must hold, and a rejected step must leave the state
//! exactly as it was.

use qm_admission::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Identities in the stream. Index 0..3 Normal, 3..5 Premium, 5 Admin.
const POPULATION: [(Address, Role, u64); 6] = [
    ([0x51; 20], Role::Normal, 3),
    ([0x52; 20], Role::Normal, 5),
    ([0x53; 20], Role::Normal, 8),
    ([0x61; 20], Role::Premium, 12),
    ([0x62; 20], Role::Premium, 30),
    ([0x71; 20], Role::Admin, 0),
];

/// One randomly generated request.
#[derive(Debug, Clone)]
pub enum Step {
    /// Single user mint.
    Mint { who: usize, unit_id: UnitId },
    /// Owner bulk mint.
    Bulk { items: Vec<(UnitId, usize)> },
    /// Platform mint.
    AdminMint { unit_id: UnitId },
    /// Create phase with limits.
    CreatePhase { reserved: u64, premium: u64, normal: u64 },
    /// Activate current phase.
    Activate,
    /// Deactivate current phase.
    Deactivate,
    /// Move the active phase's cap.
    UpdateReserved { new_limit: u64 },
    /// Replace one identity's global limit.
    UpdateGlobalLimit { who: usize, limit: u64 },
    /// Verify a premium identity.
    Verify { who: usize },
    /// Toggle the pause switch.
    TogglePause,
}

impl Step {
    /// Draw a step. Unit ids overshoot the configured range on purpose.
    pub fn random(rng: &mut StdRng) -> Self {
        let unit = |rng: &mut StdRng| rng.gen_range(0..110u64);
        match rng.gen_range(0..100u32) {
            0..=39 => Self::Mint {
                who: rng.gen_range(0..POPULATION.len()),
                unit_id: unit(rng),
            },
            40..=49 => {
                let len = rng.gen_range(0..5usize);
                Self::Bulk {
                    items: (0..len)
                        .map(|_| (unit(rng), rng.gen_range(0..POPULATION.len())))
                        .collect(),
                }
            }
            50..=59 => Self::AdminMint { unit_id: unit(rng) },
            60..=67 => Self::CreatePhase {
                reserved: rng.gen_range(0..40),
                premium: rng.gen_range(0..8),
                normal: rng.gen_range(0..5),
            },
            68..=74 => Self::Activate,
            75..=79 => Self::Deactivate,
            80..=84 => Self::UpdateReserved {
                new_limit: rng.gen_range(0..60),
            },
            85..=89 => Self::UpdateGlobalLimit {
                who: rng.gen_range(0..POPULATION.len()),
                limit: rng.gen_range(0..15),
            },
            90..=94 => Self::Verify {
                who: rng.gen_range(3..5),
            },
            _ => Self::TogglePause,
        }
    }
}

/// Register the population as the owner.
pub async fn seed_population(service: &InMemoryAdmissionService) -> Result<(), AdmissionError> {
    for (index, (address, role, limit)) in POPULATION.iter().enumerate() {
        service
            .register_account(
                TEST_OWNER,
                AccountRegistration {
                    name: format!("{role}-{index}"),
                    address: *address,
                    global_limit: *limit,
                    role: *role,
                },
            )
            .await?;
    }
    Ok(())
}

/// Apply a step through the public API.
pub async fn apply(service: &InMemoryAdmissionService, step: &Step) -> Result<(), AdmissionError> {
    let hash = |unit_id: UnitId| MetadataHash::from_uri(&format!("ipfs://random/{unit_id}"));
    let admin = POPULATION[5].0;

    match step {
        Step::Mint { who, unit_id } => service
            .request_mint(POPULATION[*who].0, *unit_id, hash(*unit_id))
            .await
            .map(drop),
        Step::Bulk { items } => {
            let items = items
                .iter()
                .map(|(unit_id, who)| MintItem {
                    unit_id: *unit_id,
                    to: POPULATION[*who].0,
                    metadata: hash(*unit_id),
                })
                .collect();
            service.request_bulk_mint(TEST_OWNER, items).await.map(drop)
        }
        Step::AdminMint { unit_id } => service
            .request_admin_mint(admin, *unit_id, hash(*unit_id))
            .await
            .map(drop),
        Step::CreatePhase {
            reserved,
            premium,
            normal,
        } => service
            .create_phase(TEST_OWNER, *reserved, *premium, *normal)
            .await
            .map(drop),
        Step::Activate => service.activate_phase(TEST_OWNER).await.map(drop),
        Step::Deactivate => service.deactivate_phase(TEST_OWNER).await.map(drop),
        Step::UpdateReserved { new_limit } => service
            .update_reserved_limit(TEST_OWNER, *new_limit)
            .await
            .map(drop),
        Step::UpdateGlobalLimit { who, limit } => {
            service
                .update_global_limits(TEST_OWNER, &[POPULATION[*who].0], &[*limit])
                .await
        }
        Step::Verify { who } => service.verify_premium(TEST_OWNER, POPULATION[*who].0).await,
        Step::TogglePause => {
            if service.snapshot().paused {
                service.unpause(TEST_OWNER).await
            } else {
                service.pause(TEST_OWNER).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS_CAPACITY: u64 = 80;
    const PLATFORM_CAPACITY: u64 = 20;

    async fn run_stream(seed: u64, steps: usize) {
        let (service, _bus) = create_test_service();
        seed_population(&service).await.unwrap();
        let mut rng = StdRng::seed_from_u64(seed);

        for index in 0..steps {
            let step = Step::random(&mut rng);
            let before = service.state();

            let outcome = apply(&service, &step).await;
            let after = service.state();

            if let Err(err) = &outcome {
                assert_eq!(
                    after, before,
                    "seed {seed} step {index}: rejected {step:?} ({err}) changed state"
                );
            }
            after
                .check_invariants()
                .unwrap_or_else(|e| panic!("seed {seed} step {index} {step:?}: {e}"));

            let snapshot = service.snapshot();
            assert_eq!(
                snapshot.users_mint_limit + snapshot.users_minted_balance,
                USERS_CAPACITY
            );
            assert_eq!(
                service.ledger().total_issued() as u64,
                snapshot.users_minted_balance + (PLATFORM_CAPACITY - snapshot.platform_mint_limit)
            );
            assert!(snapshot.platform_mint_limit <= PLATFORM_CAPACITY);
        }
    }

    #[tokio::test]
    async fn test_random_streams_preserve_invariants() {
        for seed in [1, 7, 42, 1337, 9001] {
            run_stream(seed, 400).await;
        }
    }

    #[tokio::test]
    async fn test_rejections_are_side_effect_free() {
        let (service, _bus) = create_test_service();
        seed_population(&service).await.unwrap();

        // Nothing is open: every mint path but the platform one must bounce.
        let before = service.state();
        for step in [
            Step::Mint { who: 0, unit_id: 1 },
            Step::Bulk {
                items: vec![(1, 0), (2, 1)],
            },
            Step::Bulk { items: vec![] },
            Step::Deactivate,
            Step::Activate,
            Step::UpdateReserved { new_limit: 5 },
        ] {
            assert!(apply(&service, &step).await.is_err(), "{step:?} admitted");
            assert_eq!(service.state(), before);
        }
        assert_eq!(service.stats().operations_committed, POPULATION.len() as u64);
    }
}
