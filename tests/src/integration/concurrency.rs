//! # Concurrency Tests
//!
//! Contending requests must behave as if applied one at a time: no
//! over-admission, no lost update.

#[cfg(test)]
mod tests {
    use qm_admission::prelude::*;
    use std::sync::Arc;

    fn identity(index: u8) -> Address {
        let mut address = [0x40u8; 20];
        address[19] = index;
        address
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_phase_reservation_never_over_admits() {
        let (service, _bus) = create_test_service();
        let service = Arc::new(service);

        for index in 0..50u8 {
            service
                .register_account(
                    TEST_OWNER,
                    AccountRegistration {
                        name: format!("normal-{index}"),
                        address: identity(index),
                        global_limit: 5,
                        role: Role::Normal,
                    },
                )
                .await
                .unwrap();
        }
        service.create_phase(TEST_OWNER, 10, 5, 5).await.unwrap();
        service.activate_phase(TEST_OWNER).await.unwrap();

        let handles: Vec<_> = (0..50u8)
            .map(|index| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .request_mint(
                            identity(index),
                            u64::from(index),
                            MetadataHash::from_uri(&format!("ipfs://{index}")),
                        )
                        .await
                })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(err) => assert_eq!(err, AdmissionError::PhaseCapacityExhausted(0)),
            }
        }

        assert_eq!(admitted, 10);
        let snapshot = service.snapshot();
        assert_eq!(snapshot.users_mint_limit, 70);
        assert_eq!(service.phase(0).reserved_limit, 0);
        assert_eq!(service.ledger().total_issued(), 10);
        service.state().check_invariants().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_single_identity_never_exceeds_global_limit() {
        let (service, _bus) = create_test_service();
        let service = Arc::new(service);
        let hammer = identity(0xEE);

        service
            .register_account(
                TEST_OWNER,
                AccountRegistration {
                    name: "hammer".to_string(),
                    address: hammer,
                    global_limit: 3,
                    role: Role::Normal,
                },
            )
            .await
            .unwrap();
        service.create_phase(TEST_OWNER, 50, 10, 10).await.unwrap();
        service.activate_phase(TEST_OWNER).await.unwrap();

        let handles: Vec<_> = (0..16u64)
            .map(|unit_id| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .request_mint(hammer, unit_id, MetadataHash::from_uri("ipfs://hammer"))
                        .await
                })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 3);
        assert_eq!(service.ledger().balance_of(&hammer), 3);
        assert_eq!(service.phase_balance(0, &hammer, Role::Normal), 3);
        service.state().check_invariants().unwrap();
    }

    #[test]
    fn test_blocking_callers_share_one_runtime() {
        let runtime = Arc::new(tokio::runtime::Runtime::new().unwrap());
        let (service, _bus) = create_test_service();
        let service = Arc::new(service);

        runtime.block_on(async {
            service
                .register_account(
                    TEST_OWNER,
                    AccountRegistration {
                        name: "admin".to_string(),
                        address: identity(0xAD),
                        global_limit: 0,
                        role: Role::Admin,
                    },
                )
                .await
                .unwrap();
        });

        let threads: Vec<_> = (0..8u64)
            .map(|thread| {
                let service = Arc::clone(&service);
                let runtime = Arc::clone(&runtime);
                std::thread::spawn(move || {
                    (0..5u64)
                        .filter(|i| {
                            let unit_id = thread * 5 + i;
                            runtime
                                .block_on(service.request_admin_mint(
                                    identity(0xAD),
                                    unit_id,
                                    MetadataHash::from_uri("ipfs://platform"),
                                ))
                                .is_ok()
                        })
                        .count()
                })
            })
            .collect();

        let admitted: usize = threads.into_iter().map(|t| t.join().unwrap()).sum();
        assert_eq!(admitted, 20);
        assert_eq!(service.snapshot().platform_mint_limit, 0);
        assert_eq!(service.stats().units_admitted, 20);
    }
}
