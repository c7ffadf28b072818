//! # Reference Scenarios
//!
//! End-to-end walks through registration, phase lifecycle and admission,
//! each checked against the counters, the ledger and the notification bus.

#[cfg(test)]
mod tests {
    use crate::integration::{metadata, open_phase, register, ALICE, BOB, CAROL};
    use qm_admission::prelude::*;
    use qm_bus::{EventFilter, EventTopic};

    // =========================================================================
    // SCENARIO A: Normal identity walks into its global limit
    // =========================================================================

    #[tokio::test]
    async fn test_normal_identity_stops_at_global_limit() {
        let (service, bus) = create_test_service();
        let mut minted = bus.subscribe(EventFilter::topics(vec![EventTopic::Inventory]));

        register(&service, ALICE, Role::Normal, 3).await.unwrap();
        assert_eq!(open_phase(&service, 50, 10, 5).await.unwrap(), 0);

        for unit_id in [7, 8, 9] {
            let receipt = service
                .request_mint(ALICE, unit_id, metadata(unit_id))
                .await
                .unwrap();
            assert_eq!(receipt.path, MintPath::Single);
            assert_eq!(receipt.phase_id, Some(0));
        }

        let snapshot = service.snapshot();
        assert_eq!(snapshot.users_mint_limit, 77);
        assert_eq!(snapshot.users_minted_balance, 3);
        assert_eq!(service.phase(0).reserved_limit, 47);
        assert_eq!(service.phase(0).minted, 3);
        assert_eq!(service.phase_balance(0, &ALICE, Role::Normal), 3);
        assert_eq!(service.ledger().balance_of(&ALICE), 3);

        let err = service
            .request_mint(ALICE, 10, metadata(10))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AdmissionError::GlobalLimitExceeded {
                address: ALICE,
                limit: 3
            }
        );
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
        assert_eq!(service.snapshot().users_mint_limit, 77);

        let events = minted.drain();
        assert_eq!(events.len(), 3);
        assert!(events
            .iter()
            .all(|n| matches!(n.event, MintEvent::UnitsMinted { requester, .. } if requester == ALICE)));
    }

    // =========================================================================
    // SCENARIO B: Premium identity must be verified first
    // =========================================================================

    #[tokio::test]
    async fn test_premium_requires_verification() {
        let (service, _bus) = create_test_service();
        register(&service, BOB, Role::Premium, 20).await.unwrap();
        open_phase(&service, 50, 10, 5).await.unwrap();

        assert_eq!(
            service.request_mint(BOB, 1, metadata(1)).await,
            Err(AdmissionError::NotVerified(BOB))
        );
        assert_eq!(service.snapshot().users_minted_balance, 0);

        service.verify_premium(TEST_OWNER, BOB).await.unwrap();
        assert_eq!(
            service.verify_premium(TEST_OWNER, BOB).await,
            Err(AdmissionError::AlreadyVerified(BOB))
        );

        service.request_mint(BOB, 1, metadata(1)).await.unwrap();
        assert_eq!(service.phase_balance(0, &BOB, Role::Premium), 1);
        assert_eq!(
            service.list_units_by_owner(BOB).await.unwrap(),
            vec![1]
        );
    }

    // =========================================================================
    // SCENARIO C: Phase reservation runs out before identity limits
    // =========================================================================

    #[tokio::test]
    async fn test_phase_reservation_exhausted() {
        let (service, _bus) = create_test_service();
        register(&service, BOB, Role::Premium, 20).await.unwrap();
        service.verify_premium(TEST_OWNER, BOB).await.unwrap();
        open_phase(&service, 2, 10, 5).await.unwrap();

        service.request_mint(BOB, 1, metadata(1)).await.unwrap();
        service.request_mint(BOB, 2, metadata(2)).await.unwrap();
        assert_eq!(service.phase(0).reserved_limit, 0);

        let err = service.request_mint(BOB, 3, metadata(3)).await.unwrap_err();
        assert_eq!(err, AdmissionError::PhaseCapacityExhausted(0));

        // Raising the cap reopens the phase.
        assert_eq!(service.update_reserved_limit(TEST_OWNER, 4).await, Ok(2));
        service.request_mint(BOB, 3, metadata(3)).await.unwrap();
        assert_eq!(service.phase(0).minted, 3);
    }

    // =========================================================================
    // SCENARIO D: Lifecycle is strictly sequential
    // =========================================================================

    #[tokio::test]
    async fn test_deactivated_phase_cannot_return() {
        let (service, _bus) = create_test_service();
        open_phase(&service, 50, 10, 5).await.unwrap();

        assert_eq!(service.deactivate_phase(TEST_OWNER).await, Ok(1));
        assert_eq!(service.phase(0).status, PhaseStatus::Deactivated);
        assert_eq!(service.phase(1).status, PhaseStatus::Uncreated);
        assert_eq!(service.snapshot().current_phase_id, 1);

        assert_eq!(
            service.activate_phase(TEST_OWNER).await,
            Err(AdmissionError::PhaseNotCreated(1))
        );
        assert_eq!(
            service.create_phase(TEST_OWNER, 81, 10, 5).await,
            Err(AdmissionError::CapacityExceeded {
                requested: 81,
                available: 80
            })
        );

        assert_eq!(service.create_phase(TEST_OWNER, 80, 10, 5).await, Ok(1));
        assert_eq!(service.activate_phase(TEST_OWNER).await, Ok(1));
    }

    // =========================================================================
    // SCENARIO E: One bad item rejects the whole batch
    // =========================================================================

    #[tokio::test]
    async fn test_bulk_mint_is_all_or_nothing() {
        let (service, bus) = create_test_service();
        let mut minted = bus.subscribe(EventFilter::topics(vec![EventTopic::Inventory]));

        register(&service, ALICE, Role::Normal, 20).await.unwrap();
        register(&service, BOB, Role::Premium, 20).await.unwrap();
        service.verify_premium(TEST_OWNER, BOB).await.unwrap();
        open_phase(&service, 50, 10, 3).await.unwrap();

        let before = service.state();
        let items = vec![
            MintItem::new(1, ALICE, "ipfs://1"),
            MintItem::new(2, ALICE, "ipfs://2"),
            MintItem::new(3, ALICE, "ipfs://3"),
            MintItem::new(4, ALICE, "ipfs://4"),
            MintItem::new(5, BOB, "ipfs://5"),
        ];

        let err = service
            .request_bulk_mint(TEST_OWNER, items)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AdmissionError::PhaseRoleLimitExceeded {
                phase_id: 0,
                address: ALICE,
                limit: 3
            }
        );

        assert_eq!(service.state(), before);
        assert_eq!(service.ledger().total_issued(), 0);
        assert!(minted.drain().is_empty());

        let receipt = service
            .request_bulk_mint(
                TEST_OWNER,
                vec![
                    MintItem::new(1, ALICE, "ipfs://1"),
                    MintItem::new(5, BOB, "ipfs://5"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(receipt.path, MintPath::Bulk);
        assert_eq!(receipt.units.len(), 2);
        assert_eq!(service.snapshot().users_minted_balance, 2);
        assert_eq!(minted.drain().len(), 1);
    }

    // =========================================================================
    // PLATFORM PATH
    // =========================================================================

    #[tokio::test]
    async fn test_admin_mints_draw_on_platform_capacity() {
        let (service, _bus) = create_test_service();
        register(&service, CAROL, Role::Admin, 0).await.unwrap();

        // No phase needed for the platform quota.
        let receipt = service
            .request_admin_mint(CAROL, 99, metadata(99))
            .await
            .unwrap();
        assert_eq!(receipt.phase_id, None);
        assert_eq!(service.ledger().owner_of(99), Some(CAROL));

        let items = (0..19)
            .map(|i| MintItem::new(i, ALICE, &format!("ipfs://{i}")))
            .collect();
        service
            .request_admin_bulk_mint(CAROL, items)
            .await
            .unwrap();

        let snapshot = service.snapshot();
        assert_eq!(snapshot.platform_mint_limit, 0);
        assert_eq!(snapshot.users_mint_limit, 80);
        assert_eq!(
            service.request_admin_mint(CAROL, 50, metadata(50)).await,
            Err(AdmissionError::PlatformCapacityExhausted)
        );
    }

    #[tokio::test]
    async fn test_pause_freezes_mutations_until_unpaused() {
        let (service, _bus) = create_test_service();
        register(&service, ALICE, Role::Normal, 3).await.unwrap();
        open_phase(&service, 50, 10, 5).await.unwrap();

        service.pause(TEST_OWNER).await.unwrap();
        assert_eq!(
            service.request_mint(ALICE, 1, metadata(1)).await,
            Err(AdmissionError::ContractPaused)
        );
        assert_eq!(
            service.create_phase(ALICE, 1, 1, 1).await,
            Err(AdmissionError::ContractPaused)
        );
        assert_eq!(
            service.unpause(ALICE).await,
            Err(AdmissionError::NotOwner(ALICE))
        );

        service.unpause(TEST_OWNER).await.unwrap();
        service.request_mint(ALICE, 1, metadata(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_transfers_after_gate_opens() {
        let (service, _bus) = create_test_service();
        register(&service, ALICE, Role::Normal, 3).await.unwrap();
        register(&service, BOB, Role::Premium, 20).await.unwrap();
        open_phase(&service, 50, 10, 5).await.unwrap();
        service.request_mint(ALICE, 4, metadata(4)).await.unwrap();

        assert_eq!(
            service.transfer_unit(ALICE, BOB, 4).await,
            Err(AdmissionError::TransferDisabled)
        );
        service.enable_transfer(TEST_OWNER).await.unwrap();
        service.transfer_unit(ALICE, BOB, 4).await.unwrap();

        assert_eq!(service.ledger().owner_of(4), Some(BOB));
        // Transfers never touch admission counters.
        assert_eq!(service.snapshot().users_minted_balance, 1);
        assert_eq!(service.phase_balance(0, &ALICE, Role::Normal), 1);
    }
}
