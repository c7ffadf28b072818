//! # Wiring Tests
//!
//! The admission service assembled from its outer pieces: TOML
//! configuration, telemetry and the notification bus.

#[cfg(test)]
mod tests {
    use crate::integration::{metadata, open_phase, register, ALICE};
    use qm_admission::prelude::*;
    use qm_bus::{EventFilter, InMemoryEventBus};
    use std::io::Write;
    use std::sync::Arc;

    const CONFIG: &str = r#"
        [mint]
        owner = "0x1111111111111111111111111111111111111111"
        max_mint_limit = 10
        platform_mint_limit = 4
    "#;

    #[tokio::test]
    async fn test_service_from_toml_file() -> anyhow::Result<()> {
        qm_telemetry::init_test_tracing();

        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(CONFIG.as_bytes())?;
        let provider = TomlConfigProvider::load(file.path())?;

        let bus = Arc::new(InMemoryEventBus::new());
        let service = MintAdmissionService::from_provider(
            &provider,
            Arc::new(InMemoryInventory::new()),
            Arc::new(BusNotificationSink::new(Arc::clone(&bus))),
        )?;

        let snapshot = service.snapshot();
        assert_eq!(snapshot.max_mint_limit, 10);
        assert_eq!(snapshot.users_mint_limit, 6);
        assert_eq!(snapshot.platform_mint_limit, 4);

        register(&service, ALICE, Role::Normal, 5).await?;
        open_phase(&service, 6, 5, 5).await?;
        assert_eq!(
            service.request_mint(ALICE, 10, metadata(10)).await,
            Err(AdmissionError::UnitIdOutOfRange {
                unit_id: 10,
                max: 10
            })
        );
        service.request_mint(ALICE, 9, metadata(9)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_admissions_reach_prometheus_registry() {
        qm_telemetry::register_metrics().unwrap();

        let (service, _bus) = create_test_service();
        register(&service, ALICE, Role::Normal, 3).await.unwrap();
        open_phase(&service, 10, 5, 5).await.unwrap();
        service.request_mint(ALICE, 1, metadata(1)).await.unwrap();
        let _ = service.request_mint(ALICE, 1, metadata(1)).await;

        let exposition = qm_telemetry::encode_metrics().unwrap();
        assert!(exposition.contains("qm_admission_units_admitted_total"));
        assert!(exposition.contains("qm_admission_rejected_total"));
        assert!(exposition.contains("qm_admission_critical_section_seconds"));
    }

    #[tokio::test]
    async fn test_every_commit_notifies_in_order() {
        let (service, bus) = create_test_service();
        let mut all = bus.subscribe(EventFilter::all());

        register(&service, ALICE, Role::Normal, 3).await.unwrap();
        open_phase(&service, 10, 5, 5).await.unwrap();
        service.request_mint(ALICE, 1, metadata(1)).await.unwrap();
        service.deactivate_phase(TEST_OWNER).await.unwrap();

        let mut names = Vec::new();
        while let Ok(Some(notification)) = all.try_recv() {
            names.push(notification.event.name());
        }
        assert_eq!(
            names,
            vec![
                "account_registered",
                "phase_created",
                "phase_activated",
                "units_minted",
                "phase_deactivated",
            ]
        );
        assert_eq!(service.stats().notifications_sent, 5);
    }
}
