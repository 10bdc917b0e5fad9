//! # Batch Ingestion Flows
//!
//! Parallel ingestion over one shared resolver.
//!
//! ## Properties Tested:
//!
//! 1. Output is independent of the worker count
//! 2. Concurrent transactions needing the same unresolved address share a
//!    single store read
//! 3. A store outage aborts the batch, is not cached, and the retried batch
//!    succeeds

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mn_01_entity_resolution::{
        EntityIdService, InMemoryResolutionStore, ResolutionError, StoreError,
    };
    use mn_02_contract_results::domain::{
        ContractCallBody, ContractFunctionResult, ContractLogInfo, ContractStateChangeEntry,
        StorageChange,
    };
    use mn_02_contract_results::{
        BatchIngestor, ContractResultService, IngestError, ReconcileError, RecordBuffer,
        RecordItem, RecordingBytecodeMigrator, ReconcilerConfig, SidecarPayload, SidecarRecord,
        TransactionBody,
    };
    use shared_types::{AccountId, ContractId, EntityId, EntityKind, HapiVersion};

    const SUCCESS: i32 = 22;
    const TS: i64 = 1_690_000_000_000_000_000;

    type Ingestor = BatchIngestor<EntityIdService<InMemoryResolutionStore>, RecordingBytecodeMigrator>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn contract(num: u64) -> EntityId {
        EntityId::of(0, 0, num, EntityKind::Contract).unwrap()
    }

    fn setup(store: Arc<InMemoryResolutionStore>, workers: usize) -> Ingestor {
        let resolver = Arc::new(EntityIdService::new(store));
        let service = Arc::new(ContractResultService::new(
            ReconcilerConfig::default(),
            resolver,
            Arc::new(RecordingBytecodeMigrator::new()),
        ));
        BatchIngestor::new(service, workers).unwrap()
    }

    /// A pre-0.23 call that creates a child, logs twice and writes storage.
    fn rich_item(i: u64, target: ContractId) -> RecordItem {
        let offset = i as i64;
        RecordItem {
            consensus_timestamp: TS + offset,
            transaction_index: offset as i32,
            hapi_version: HapiVersion::new(0, 22, 0),
            payer_account_id: AccountId::num(0, 0, 2),
            transaction_hash: vec![(i % 251) as u8; 48],
            status: SUCCESS,
            body: TransactionBody::ContractCall(ContractCallBody {
                contract_id: target.clone(),
                gas: 100_000 + offset,
                ..ContractCallBody::default()
            }),
            contract_call_result: Some(ContractFunctionResult {
                contract_id: target.clone(),
                gas_used: 50_000,
                created_contract_ids: vec![ContractId::num(0, 0, 100_000 + i)],
                log_info: vec![
                    ContractLogInfo {
                        contract_id: target.clone(),
                        data: vec![1],
                        ..ContractLogInfo::default()
                    },
                    ContractLogInfo {
                        contract_id: ContractId::num(0, 0, 100_000 + i),
                        data: vec![2],
                        ..ContractLogInfo::default()
                    },
                ],
                ..ContractFunctionResult::default()
            }),
            sidecars: vec![SidecarRecord {
                consensus_timestamp: TS + offset,
                migration: false,
                payload: SidecarPayload::StateChanges(vec![ContractStateChangeEntry {
                    contract_id: target,
                    storage_changes: vec![StorageChange {
                        slot: vec![i as u8],
                        value_read: vec![],
                        value_written: Some(vec![1]),
                    }],
                }]),
            }],
            ..RecordItem::default()
        }
    }

    // =============================================================================
    // ORDERING
    // =============================================================================

    #[test]
    fn test_output_independent_of_worker_count() {
        let batch: Vec<RecordItem> = (0..120)
            .map(|i| rich_item(i, ContractId::num(0, 0, 1000 + i)))
            .collect();

        let sequential = RecordBuffer::new();
        setup(Arc::new(InMemoryResolutionStore::new()), 1)
            .ingest(&batch, &sequential)
            .unwrap();

        let parallel = RecordBuffer::new();
        let summary = setup(Arc::new(InMemoryResolutionStore::new()), 8)
            .ingest(&batch, &parallel)
            .unwrap();

        // State change, child entity + contract, two logs, result.
        assert_eq!(summary.records, 120 * 6);
        assert_eq!(sequential.records(), parallel.records());

        let timestamps: Vec<i64> = parallel
            .contract_results()
            .iter()
            .map(|r| r.consensus_timestamp)
            .collect();
        assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
    }

    // =============================================================================
    // SINGLE-FLIGHT
    // =============================================================================

    #[test]
    fn test_shared_address_loaded_once() {
        let address = vec![0x7A; 20];
        let store = Arc::new(InMemoryResolutionStore::new());
        store.bind_evm_address(address.clone(), contract(4242).id());
        let ingestor = setup(Arc::clone(&store), 8);

        let target = ContractId::evm_address(0, 0, address);
        let batch: Vec<RecordItem> = (0..64).map(|i| rich_item(i, target.clone())).collect();
        let sink = RecordBuffer::new();
        ingestor.ingest(&batch, &sink).unwrap();

        assert_eq!(store.evm_address_reads(), 1);
        assert!(sink
            .contract_results()
            .iter()
            .all(|r| r.contract_id == contract(4242)));
        assert!(sink
            .contract_state_changes()
            .iter()
            .all(|c| c.contract_id == contract(4242)));
    }

    // =============================================================================
    // FAILURE AND RETRY
    // =============================================================================

    #[test]
    fn test_store_outage_aborts_then_retry_succeeds() {
        let address = vec![0x7B; 20];
        let store = Arc::new(InMemoryResolutionStore::new());
        store.bind_evm_address(address.clone(), contract(4343).id());
        let ingestor = setup(Arc::clone(&store), 4);

        let target = ContractId::evm_address(0, 0, address);
        let batch: Vec<RecordItem> = (0..16).map(|i| rich_item(i, target.clone())).collect();

        store.set_failure(Some(StoreError::Unavailable("connection reset".into())));
        let sink = RecordBuffer::new();
        let err = ingestor.ingest(&batch, &sink).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Item {
                consensus_timestamp: TS,
                source: ReconcileError::Resolution(ResolutionError::Store(_)),
            }
        ));
        assert!(sink.is_empty());

        let resolver = ingestor.service().resolver();
        assert!(resolver.cache().stats().load_failures >= 1);
        assert!(resolver.cache().is_empty());

        store.set_failure(None);
        let summary = ingestor.ingest(&batch, &sink).unwrap();
        assert_eq!(summary.items, 16);
        assert_eq!(sink.contract_results().len(), 16);
    }
}
