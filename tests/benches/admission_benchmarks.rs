//! Admission Benchmarks
//!
//! Throughput of the single-writer critical section for single and bulk
//! admissions, plus the cost of a rejected dry run.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qm_admission::prelude::*;
use tokio::runtime::Runtime;

fn identity(index: u64) -> Address {
    let mut address = [0x30u8; 20];
    address[12..].copy_from_slice(&index.to_be_bytes());
    address
}

/// A service with `users` Normal identities and one wide-open active phase.
fn prepared_service(rt: &Runtime, max_mint_limit: u64, users: u64) -> InMemoryAdmissionService {
    let (service, _bus) = create_test_service_with(MintConfig {
        owner: TEST_OWNER,
        max_mint_limit,
        platform_mint_limit: 0,
    })
    .unwrap();

    rt.block_on(async {
        for index in 0..users {
            service
                .register_account(
                    TEST_OWNER,
                    AccountRegistration {
                        name: format!("bench-{index}"),
                        address: identity(index),
                        global_limit: max_mint_limit,
                        role: Role::Normal,
                    },
                )
                .await
                .unwrap();
        }
        service
            .create_phase(TEST_OWNER, max_mint_limit, 0, max_mint_limit)
            .await
            .unwrap();
        service.activate_phase(TEST_OWNER).await.unwrap();
    });
    service
}

fn bench_single_mint(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("admission/single");
    group.throughput(Throughput::Elements(1));

    group.bench_function("request_mint", |b| {
        let service = prepared_service(&rt, u64::MAX / 2, 1);
        let mut unit_id = 0u64;
        b.iter(|| {
            unit_id += 1;
            rt.block_on(service.request_mint(
                identity(0),
                black_box(unit_id),
                MetadataHash::default(),
            ))
            .unwrap()
        });
    });

    group.bench_function("rejected_dry_run", |b| {
        let service = prepared_service(&rt, 16, 1);
        b.iter(|| {
            let err = rt
                .block_on(service.request_mint(identity(0), black_box(99), MetadataHash::default()))
                .unwrap_err();
            black_box(err)
        });
    });

    group.finish();
}

fn bench_bulk_mint(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("admission/bulk");

    for size in [10u64, 100, 1_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let service = prepared_service(&rt, u64::MAX / 2, 16);
            let mut next = 0u64;
            b.iter(|| {
                let items: Vec<MintItem> = (0..size)
                    .map(|i| MintItem {
                        unit_id: next + i,
                        to: identity(i % 16),
                        metadata: MetadataHash::default(),
                    })
                    .collect();
                next += size;
                rt.block_on(service.request_bulk_mint(TEST_OWNER, items))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_mint, bench_bulk_mint);
criterion_main!(benches);
