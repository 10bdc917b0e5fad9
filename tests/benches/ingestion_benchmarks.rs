//! # Mirror-Node Ingestion Benchmarks
//!
//! | Subsystem | Operation | Expectation |
//! |-----------|-----------|-------------|
//! | mn-01 Entity Resolution | Cached EVM address lookup | no store read |
//! | mn-01 Entity Resolution | Numeric lookup | no cache, no I/O |
//! | mn-02 Contract Results | Batch ingestion | scales with workers |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use mn_01_entity_resolution::{EntityIdResolver, EntityIdService, InMemoryResolutionStore};
use mn_02_contract_results::domain::{ContractCallBody, ContractFunctionResult, ContractLogInfo};
use mn_02_contract_results::{
    BatchIngestor, ContractResultService, LoggingBytecodeMigrator, RecordBuffer, RecordItem,
    ReconcilerConfig, TransactionBody,
};
use shared_types::{AccountId, ContractId, EntityId, EntityKind, HapiVersion};

// ============================================================================
// MN-01: Entity Resolution Benchmarks
// ============================================================================

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("mn-01-entity-resolution");

    let store = Arc::new(InMemoryResolutionStore::new());
    let mut rng = rand::thread_rng();
    let addresses: Vec<Vec<u8>> = (0..1024u64)
        .map(|num| {
            let mut address = vec![0u8; 20];
            rng.fill(&mut address[..]);
            address[0] |= 0x80; // never long-zero
            let id = EntityId::of(0, 0, 10_000 + num, EntityKind::Contract)
                .map(|id| id.id())
                .unwrap_or_default();
            store.bind_evm_address(address.clone(), id);
            address
        })
        .collect();
    let resolver = EntityIdService::new(Arc::clone(&store));
    let keys: Vec<ContractId> = addresses
        .into_iter()
        .map(|address| ContractId::evm_address(0, 0, address))
        .collect();
    for key in &keys {
        let _ = resolver.lookup_contract(key);
    }

    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("cached_evm_address", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(resolver.lookup_contract(black_box(key)).ok());
            }
        })
    });

    let numeric: Vec<AccountId> = (0..1024u64).map(|n| AccountId::num(0, 0, n)).collect();
    group.bench_function("numeric_account", |b| {
        b.iter(|| {
            for account in &numeric {
                black_box(resolver.lookup_account(black_box(account)).ok());
            }
        })
    });

    group.finish();
}

// ============================================================================
// MN-02: Batch Ingestion Benchmarks
// ============================================================================

fn call_item(i: u64) -> RecordItem {
    let target = ContractId::num(0, 0, 1000 + i % 64);
    RecordItem {
        consensus_timestamp: 1_000_000 + i as i64,
        transaction_index: i as i32,
        hapi_version: HapiVersion::new(0, 38, 0),
        payer_account_id: AccountId::num(0, 0, 2),
        transaction_hash: vec![0xAB; 48],
        status: 22,
        body: TransactionBody::ContractCall(ContractCallBody {
            contract_id: target.clone(),
            gas: 100_000,
            ..ContractCallBody::default()
        }),
        contract_call_result: Some(ContractFunctionResult {
            contract_id: target.clone(),
            gas_used: 50_000,
            log_info: (0..4)
                .map(|_| ContractLogInfo {
                    contract_id: target.clone(),
                    topics: vec![vec![0x11; 32], vec![0x22; 32]],
                    data: vec![0; 64],
                    ..ContractLogInfo::default()
                })
                .collect(),
            ..ContractFunctionResult::default()
        }),
        ..RecordItem::default()
    }
}

fn bench_batch_ingestion(c: &mut Criterion) {
    let mut group = c.benchmark_group("mn-02-contract-results");
    group.measurement_time(Duration::from_secs(10));

    let batch: Vec<RecordItem> = (0..2_000).map(call_item).collect();
    group.throughput(Throughput::Elements(batch.len() as u64));

    for workers in [1usize, 4, 8] {
        let resolver = Arc::new(EntityIdService::new(Arc::new(InMemoryResolutionStore::new())));
        let service = Arc::new(ContractResultService::new(
            ReconcilerConfig::default(),
            resolver,
            Arc::new(LoggingBytecodeMigrator),
        ));
        let Ok(ingestor) = BatchIngestor::new(service, workers) else {
            continue;
        };

        group.bench_with_input(BenchmarkId::new("ingest", workers), &batch, |b, batch| {
            b.iter(|| {
                let sink = RecordBuffer::new();
                black_box(ingestor.ingest(batch, &sink).ok());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolution, bench_batch_ingestion);
criterion_main!(benches);
