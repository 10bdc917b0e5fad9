//! # Contract Reconciliation Flows
//!
//! Entity resolution (1) and contract results (2) working together on
//! realistic record items.
//!
//! ## Flows Tested:
//!
//! 1. **Create -> call**: a created contract's EVM address, cached by the
//!    create, resolves a later Ethereum transaction, its logs and its state
//!    changes without a store read, in a later batch or the same one
//! 2. **CREATE2 workaround**: miscoded numeric ids in logs and state changes
//!    resolve to persisted contracts, unknown ones fall back to the root
//! 3. **Skip policy**: actions whose caller does not resolve are dropped
//!    without disturbing the indices of the rest

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mn_01_entity_resolution::{EntityIdService, InMemoryResolutionStore, NotFoundPolicy};
    use mn_02_contract_results::domain::{
        ActionCaller, ActionRecipient, ActionResult, CallOperationType, ContractActionInfo,
        ContractActionType, ContractCallBody, ContractCreateBody, ContractFunctionResult,
        ContractLogInfo, ContractStateChangeEntry, EthereumTransactionBody, StorageChange,
        TransactionReceipt,
    };
    use mn_02_contract_results::{
        miscoded_evm_address, BatchIngestor, ContractResultService, RecordBuffer, RecordItem,
        RecordingBytecodeMigrator, ReconcilerConfig, SidecarPayload, SidecarRecord,
        TransactionBody,
    };
    use shared_types::{AccountId, ContractId, Entity, EntityId, EntityKind, HapiVersion};

    const SUCCESS: i32 = 22;
    const TS: i64 = 1_680_000_000_000_000_000;
    const VERSION: HapiVersion = HapiVersion::new(0, 38, 0);
    // Does not fit the 32-bit entity number.
    const MISCODED_NUM: u64 = 0x0000_00AB_CDEF_0123;

    type Ingestor = BatchIngestor<EntityIdService<InMemoryResolutionStore>, RecordingBytecodeMigrator>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn contract(num: u64) -> EntityId {
        EntityId::of(0, 0, num, EntityKind::Contract).unwrap()
    }

    fn setup(store: InMemoryResolutionStore, policy: NotFoundPolicy) -> (Arc<InMemoryResolutionStore>, Ingestor) {
        let store = Arc::new(store);
        let resolver = Arc::new(EntityIdService::new(Arc::clone(&store)));
        let service = Arc::new(ContractResultService::new(
            ReconcilerConfig {
                not_found_policy: policy,
                ..ReconcilerConfig::default()
            },
            resolver,
            Arc::new(RecordingBytecodeMigrator::new()),
        ));
        (store, BatchIngestor::new(service, 2).unwrap())
    }

    fn base_item(offset: i64) -> RecordItem {
        RecordItem {
            consensus_timestamp: TS + offset,
            transaction_index: offset as i32,
            hapi_version: VERSION,
            payer_account_id: AccountId::num(0, 0, 2),
            transaction_hash: vec![0xAA; 48],
            status: SUCCESS,
            ..RecordItem::default()
        }
    }

    fn sidecar(offset: i64, payload: SidecarPayload) -> SidecarRecord {
        SidecarRecord {
            consensus_timestamp: TS + offset,
            migration: false,
            payload,
        }
    }

    fn storage_write(slot: u8) -> StorageChange {
        StorageChange {
            slot: vec![slot],
            value_read: vec![0],
            value_written: Some(vec![slot]),
        }
    }

    // =============================================================================
    // FLOW 1: CREATE -> CALL BY EVM ADDRESS
    // =============================================================================

    #[test]
    fn test_created_address_resolves_later_transaction() {
        let (store, ingestor) = setup(InMemoryResolutionStore::new(), NotFoundPolicy::Error);
        let address = vec![0xC2; 20];
        let created = contract(2000);

        let create = RecordItem {
            body: TransactionBody::ContractCreate(ContractCreateBody {
                gas: 400_000,
                ..ContractCreateBody::default()
            }),
            receipt: TransactionReceipt {
                contract_id: ContractId::num(0, 0, 2000),
                ..TransactionReceipt::default()
            },
            contract_create_result: Some(ContractFunctionResult {
                contract_id: ContractId::num(0, 0, 2000),
                gas_used: 300_000,
                evm_address: Some(address.clone()),
                ..ContractFunctionResult::default()
            }),
            ..base_item(0)
        };
        let sink = RecordBuffer::new();
        ingestor.ingest(&[create], &sink).unwrap();

        let by_address = ContractId::evm_address(0, 0, address);
        let ethereum = RecordItem {
            body: TransactionBody::EthereumTransaction(EthereumTransactionBody {
                gas_limit: 90_000,
                value: 0,
                call_data: vec![0xA9, 0x05],
            }),
            ethereum_hash: Some(vec![0xEE; 32]),
            contract_call_result: Some(ContractFunctionResult {
                contract_id: by_address.clone(),
                gas_used: 45_000,
                log_info: vec![ContractLogInfo {
                    contract_id: by_address.clone(),
                    topics: vec![vec![0xDD; 32]],
                    ..ContractLogInfo::default()
                }],
                ..ContractFunctionResult::default()
            }),
            sidecars: vec![sidecar(
                1,
                SidecarPayload::StateChanges(vec![ContractStateChangeEntry {
                    contract_id: by_address,
                    storage_changes: vec![storage_write(1), storage_write(2)],
                }]),
            )],
            ..base_item(1)
        };
        let sink = RecordBuffer::new();
        ingestor.ingest(&[ethereum], &sink).unwrap();

        let result = &sink.contract_results()[0];
        assert_eq!(result.contract_id, created);
        assert_eq!(result.transaction_hash, vec![0xEE; 32]);
        assert_eq!(result.function_parameters, Some(vec![0xA9, 0x05]));
        assert_eq!(sink.contract_logs()[0].contract_id, created);
        assert_eq!(sink.contract_logs()[0].root_contract_id, created);

        let changes = sink.contract_state_changes();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|change| change.contract_id == created));
        assert_eq!(store.evm_address_reads(), 0);
    }

    #[test]
    fn test_created_address_resolves_within_same_batch() {
        for policy in [NotFoundPolicy::Error, NotFoundPolicy::Fallthrough] {
            let store = Arc::new(InMemoryResolutionStore::new());
            let resolver = Arc::new(EntityIdService::new(Arc::clone(&store)));
            let service = Arc::new(ContractResultService::new(
                ReconcilerConfig {
                    not_found_policy: policy,
                    ..ReconcilerConfig::default()
                },
                resolver,
                Arc::new(RecordingBytecodeMigrator::new()),
            ));
            let ingestor = BatchIngestor::new(service, 8).unwrap();

            for round in 0..100u64 {
                let mut address = vec![0xD0; 20];
                address[19] = round as u8;
                let created = ContractId::num(0, 0, 5000 + round);
                let create = RecordItem {
                    body: TransactionBody::ContractCreate(ContractCreateBody::default()),
                    receipt: TransactionReceipt {
                        contract_id: created.clone(),
                        ..TransactionReceipt::default()
                    },
                    contract_create_result: Some(ContractFunctionResult {
                        contract_id: created,
                        gas_used: 1,
                        evm_address: Some(address.clone()),
                        ..ContractFunctionResult::default()
                    }),
                    ..base_item(0)
                };
                let mut batch = vec![create];
                batch.extend((1..8).map(|offset| RecordItem {
                    body: TransactionBody::EthereumTransaction(EthereumTransactionBody::default()),
                    contract_call_result: Some(ContractFunctionResult {
                        contract_id: ContractId::evm_address(0, 0, address.clone()),
                        gas_used: 1,
                        ..ContractFunctionResult::default()
                    }),
                    ..base_item(offset)
                }));

                let sink = RecordBuffer::new();
                ingestor.ingest(&batch, &sink).unwrap();

                let results = sink.contract_results();
                assert_eq!(results.len(), 8, "{policy} round {round}");
                assert!(
                    results.iter().all(|r| r.contract_id == contract(5000 + round)),
                    "{policy} round {round}"
                );
            }
            assert_eq!(store.evm_address_reads(), 0, "{policy}");
        }
    }

    // =============================================================================
    // FLOW 2: CREATE2 WORKAROUND
    // =============================================================================

    #[test]
    fn test_miscoded_ids_resolve_to_persisted_contract() {
        let address = miscoded_evm_address(0, 0, MISCODED_NUM).unwrap();
        let store = InMemoryResolutionStore::from_entities(&[Entity {
            evm_address: Some(address.to_vec()),
            ..Entity::new(contract(3000))
        }]);
        let (_store, ingestor) = setup(store, NotFoundPolicy::Fallthrough);

        let miscoded = ContractId::num(0, 0, MISCODED_NUM);
        let unknown = ContractId::num(0, 0, MISCODED_NUM + 1);
        let item = RecordItem {
            body: TransactionBody::ContractCall(ContractCallBody {
                contract_id: ContractId::num(0, 0, 1000),
                gas: 100_000,
                ..ContractCallBody::default()
            }),
            contract_call_result: Some(ContractFunctionResult {
                contract_id: ContractId::num(0, 0, 1000),
                gas_used: 60_000,
                log_info: vec![
                    ContractLogInfo {
                        contract_id: miscoded.clone(),
                        ..ContractLogInfo::default()
                    },
                    ContractLogInfo {
                        contract_id: unknown.clone(),
                        ..ContractLogInfo::default()
                    },
                ],
                ..ContractFunctionResult::default()
            }),
            sidecars: vec![sidecar(
                0,
                SidecarPayload::StateChanges(vec![
                    ContractStateChangeEntry {
                        contract_id: miscoded,
                        storage_changes: vec![storage_write(9)],
                    },
                    ContractStateChangeEntry {
                        contract_id: unknown,
                        storage_changes: vec![storage_write(8)],
                    },
                ]),
            )],
            ..base_item(0)
        };
        let sink = RecordBuffer::new();
        ingestor.ingest(&[item], &sink).unwrap();

        let logs = sink.contract_logs();
        assert_eq!(logs[0].contract_id, contract(3000));
        assert_eq!(logs[1].contract_id, contract(1000));
        assert!(logs.iter().all(|log| log.root_contract_id == contract(1000)));

        let changes = sink.contract_state_changes();
        assert_eq!(changes[0].contract_id, contract(3000));
        assert_eq!(changes[1].contract_id, contract(1000));
    }

    // =============================================================================
    // FLOW 3: SKIP POLICY ON ACTIONS
    // =============================================================================

    #[test]
    fn test_skip_policy_drops_unresolved_actions() {
        let known_alias = vec![0x5E; 20];
        let store = InMemoryResolutionStore::new();
        store.bind_evm_address(known_alias.clone(), EntityId::of(0, 0, 4000, EntityKind::Account).unwrap().id());
        let (_store, ingestor) = setup(store, NotFoundPolicy::Skip);

        let action = |caller: AccountId| ContractActionInfo {
            call_type: ContractActionType::Call,
            call_operation_type: CallOperationType::OpCall,
            caller: Some(ActionCaller::Account(caller)),
            recipient: Some(ActionRecipient::Contract(ContractId::num(0, 0, 1000))),
            result: Some(ActionResult::Output(vec![1])),
            gas: 30_000,
            ..ContractActionInfo::default()
        };
        let item = RecordItem {
            body: TransactionBody::ContractCall(ContractCallBody {
                contract_id: ContractId::num(0, 0, 1000),
                ..ContractCallBody::default()
            }),
            contract_call_result: Some(ContractFunctionResult {
                contract_id: ContractId::num(0, 0, 1000),
                gas_used: 1,
                ..ContractFunctionResult::default()
            }),
            sidecars: vec![
                sidecar(
                    0,
                    SidecarPayload::Actions(vec![
                        action(AccountId::alias(0, 0, known_alias.clone())),
                        action(AccountId::alias(0, 0, vec![0x5F; 20])),
                    ]),
                ),
                sidecar(
                    0,
                    SidecarPayload::Actions(vec![action(AccountId::alias(0, 0, known_alias))]),
                ),
            ],
            ..base_item(0)
        };
        let sink = RecordBuffer::new();
        ingestor.ingest(&[item], &sink).unwrap();

        let actions = sink.contract_actions();
        let indices: Vec<i32> = actions.iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert!(actions
            .iter()
            .all(|a| a.caller == EntityId::of(0, 0, 4000, EntityKind::Account).unwrap()));
        assert_eq!(sink.contract_results().len(), 1);
    }
}
