//! # Contract Result Service
//!
//! Reconciles one transaction record into `ContractResult`, `ContractLog`,
//! child `Entity`/`Contract` records and everything its sidecars carry.
//!
//! ## Processing Order
//!
//! 1. Sidecars, always (precompile calls from non-contract transactions
//!    still emit them). With result persistence disabled, only the bytecode
//!    hand-off runs and processing stops here.
//! 2. Stop unless the transaction is a contract call/create or carries a
//!    usable function result.
//! 3. Resolve the result's contract id.
//! 4. Child contracts, behind the version gate.
//! 5. Build the `ContractResult`, then logs, then emit the result.

use crate::domain::{
    resolve_contract_id, ContractFunctionResult, ReconcilerConfig, RecordItem, TransactionBody,
    Transaction,
};
use crate::errors::ReconcileError;
use crate::lookup::resolve_or_absorb;
use crate::ports::inbound::ContractResultApi;
use crate::ports::outbound::{BytecodeMigrator, EntityListener};
use crate::sidecars::{SidecarOutcome, SidecarProcessor};
use mn_01_entity_resolution::EntityIdResolver;
use shared_types::{AccountId, Contract, ContractLog, ContractResult, Entity, EntityId, EntityKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Snapshot of reconciliation counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcilerStats {
    /// Contract results emitted.
    pub results: u64,
    /// Logs emitted.
    pub logs: u64,
    /// State changes emitted.
    pub state_changes: u64,
    /// Actions emitted.
    pub actions: u64,
    /// Child contracts synthesized.
    pub child_contracts: u64,
    /// Migration-flagged sidecars seen.
    pub migration_sidecars: u64,
    /// Results carrying a failed init code.
    pub failed_initcodes: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    results: AtomicU64,
    logs: AtomicU64,
    state_changes: AtomicU64,
    actions: AtomicU64,
    child_contracts: AtomicU64,
    migration_sidecars: AtomicU64,
    failed_initcodes: AtomicU64,
}

impl StatsCounters {
    fn record_sidecars(&self, outcome: &SidecarOutcome) {
        self.state_changes
            .fetch_add(outcome.state_changes, Ordering::Relaxed);
        self.actions.fetch_add(outcome.actions, Ordering::Relaxed);
        self.migration_sidecars
            .fetch_add(outcome.migration_count as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ReconcilerStats {
        ReconcilerStats {
            results: self.results.load(Ordering::Relaxed),
            logs: self.logs.load(Ordering::Relaxed),
            state_changes: self.state_changes.load(Ordering::Relaxed),
            actions: self.actions.load(Ordering::Relaxed),
            child_contracts: self.child_contracts.load(Ordering::Relaxed),
            migration_sidecars: self.migration_sidecars.load(Ordering::Relaxed),
            failed_initcodes: self.failed_initcodes.load(Ordering::Relaxed),
        }
    }
}

/// The contract result reconciler.
pub struct ContractResultService<R: EntityIdResolver, M: BytecodeMigrator> {
    /// Reconciler configuration.
    config: ReconcilerConfig,
    /// Shared id resolver.
    resolver: Arc<R>,
    /// Bytecode migration collaborator.
    migrator: Arc<M>,
    /// Counters.
    stats: StatsCounters,
}

impl<R: EntityIdResolver, M: BytecodeMigrator> ContractResultService<R, M> {
    /// Create a reconciler.
    pub fn new(config: ReconcilerConfig, resolver: Arc<R>, migrator: Arc<M>) -> Self {
        Self {
            config,
            resolver,
            migrator,
            stats: StatsCounters::default(),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// The shared resolver.
    pub fn resolver(&self) -> &Arc<R> {
        &self.resolver
    }

    /// Current counters.
    pub fn stats(&self) -> ReconcilerStats {
        self.stats.snapshot()
    }

    fn resolve_optional_account(
        &self,
        account_id: Option<&AccountId>,
        consensus_timestamp: i64,
        field: &'static str,
    ) -> Result<Option<EntityId>, ReconcileError> {
        let Some(account_id) = account_id else {
            return Ok(None);
        };
        let lookup = self.resolver.lookup_account(account_id);
        let id = resolve_or_absorb(self.config.not_found_policy, lookup, consensus_timestamp, field)?;
        Ok(id.filter(|id| !id.is_empty()))
    }

    /// Contract id of the result: the transaction's own entity for native
    /// calls and creates, else the function result's id via the CREATE2
    /// workaround.
    fn result_contract_id(
        &self,
        item: &RecordItem,
        transaction: &Transaction,
        function_result: Option<&ContractFunctionResult>,
    ) -> EntityId {
        let root = transaction.entity_id.unwrap_or(EntityId::EMPTY);
        match (item.body.is_contract_call_or_create(), transaction.entity_id) {
            (true, Some(id)) => id,
            _ => function_result.map_or(root, |result| {
                resolve_contract_id(self.resolver.as_ref(), &result.contract_id, root)
            }),
        }
    }

    /// Amount, gas and parameters from the transaction body.
    fn apply_handler_fields(&self, item: &RecordItem, result: &mut ContractResult) {
        match &item.body {
            TransactionBody::ContractCall(body) => {
                result.amount = Some(body.amount);
                result.gas_limit = Some(body.gas);
                result.function_parameters = Some(body.function_parameters.clone());
            }
            TransactionBody::ContractCreate(body) => {
                result.amount = Some(body.initial_balance);
                result.gas_limit = Some(body.gas);
                result.function_parameters = Some(body.constructor_parameters.clone());
                if !item.is_successful() {
                    result.failed_initcode =
                        body.initcode.clone().filter(|initcode| !initcode.is_empty());
                }
            }
            TransactionBody::EthereumTransaction(body) => {
                result.amount = Some(body.value);
                result.gas_limit = Some(body.gas_limit);
                result.function_parameters = Some(body.call_data.clone());
            }
            TransactionBody::Other => {}
        }
    }

    /// Resolve created contract ids, synthesizing child records when the
    /// version gate allows. Returns the packed ids of every resolved id.
    fn process_children(
        &self,
        item: &RecordItem,
        function_result: &ContractFunctionResult,
        parent: EntityId,
        listener: &dyn EntityListener,
    ) -> Result<Vec<i64>, ReconcileError> {
        let consensus_timestamp = item.consensus_timestamp;
        let synthesize =
            item.is_successful() && self.config.synthesizes_children(item.hapi_version);
        let mut created_ids = Vec::with_capacity(function_result.created_contract_ids.len());

        for created in &function_result.created_contract_ids {
            let lookup = self.resolver.lookup_contract(created);
            let Some(child) = resolve_or_absorb(
                self.config.not_found_policy,
                lookup,
                consensus_timestamp,
                "created_contract_id",
            )?
            else {
                continue;
            };
            if child.is_empty() {
                continue;
            }

            created_ids.push(child.id());
            if synthesize && child.id() != parent.id() {
                self.emit_child(item, child.with_kind(EntityKind::Contract), listener)?;
            }
        }

        Ok(created_ids)
    }

    fn emit_child(
        &self,
        item: &RecordItem,
        child: EntityId,
        listener: &dyn EntityListener,
    ) -> Result<(), ReconcileError> {
        let consensus_timestamp = item.consensus_timestamp;
        let mut entity = Entity {
            balance: Some(0),
            deleted: Some(false),
            created_timestamp: Some(consensus_timestamp),
            timestamp_lower: Some(consensus_timestamp),
            ..Entity::new(child)
        };
        let mut contract = Contract {
            id: child,
            ..Contract::default()
        };

        if let TransactionBody::ContractCreate(body) = &item.body {
            entity.key = body.admin_key.clone();
            entity.auto_renew_period = body.auto_renew_period;
            entity.memo = Some(body.memo.clone());
            entity.auto_renew_account_id = self.resolve_optional_account(
                body.auto_renew_account_id.as_ref(),
                consensus_timestamp,
                "auto_renew_account_id",
            )?;
            entity.proxy_account_id = self.resolve_optional_account(
                body.proxy_account_id.as_ref(),
                consensus_timestamp,
                "proxy_account_id",
            )?;
            contract.file_id = body.file_id;
        }

        debug!(consensus_timestamp, %child, "Synthesized child contract");
        listener.on_entity(entity);
        listener.on_contract(contract);
        self.stats.child_contracts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Seed the resolution cache with a created contract's EVM address.
    fn notify_created_contract(
        &self,
        item: &RecordItem,
        function_result: &ContractFunctionResult,
        contract_id: EntityId,
    ) -> Result<(), ReconcileError> {
        if item.contract_create_result.as_ref() != Some(function_result) || contract_id.is_empty() {
            return Ok(());
        }
        let Some(address) = function_result
            .evm_address
            .as_ref()
            .filter(|address| !address.is_empty())
        else {
            return Ok(());
        };

        debug!(
            consensus_timestamp = item.consensus_timestamp,
            %contract_id,
            evm_address = %hex::encode(address),
            "Caching created contract address"
        );
        self.resolver.notify(&Entity {
            evm_address: Some(address.clone()),
            ..Entity::new(contract_id.with_kind(EntityKind::Contract))
        })?;
        Ok(())
    }

    fn process_logs(
        &self,
        item: &RecordItem,
        transaction: &Transaction,
        function_result: &ContractFunctionResult,
        root: EntityId,
        transaction_hash: &[u8],
        listener: &dyn EntityListener,
    ) {
        for (index, log) in function_result.log_info.iter().enumerate() {
            let topic = |i: usize| log.topics.get(i).cloned();
            listener.on_contract_log(ContractLog {
                consensus_timestamp: item.consensus_timestamp,
                index: index as i32,
                contract_id: resolve_contract_id(self.resolver.as_ref(), &log.contract_id, root),
                root_contract_id: root,
                payer_account_id: transaction.payer_account_id,
                transaction_hash: transaction_hash.to_vec(),
                transaction_index: item.transaction_index,
                bloom: log.bloom.clone(),
                data: log.data.clone(),
                topic0: topic(0),
                topic1: topic(1),
                topic2: topic(2),
                topic3: topic(3),
            });
        }
        self.stats
            .logs
            .fetch_add(function_result.log_info.len() as u64, Ordering::Relaxed);
    }
}

impl<R: EntityIdResolver, M: BytecodeMigrator> ContractResultApi for ContractResultService<R, M> {
    #[instrument(
        level = "debug",
        skip_all,
        fields(consensus_timestamp = item.consensus_timestamp)
    )]
    fn process(
        &self,
        item: &RecordItem,
        transaction: &Transaction,
        listener: &dyn EntityListener,
    ) -> Result<(), ReconcileError> {
        let sidecars = SidecarProcessor::new(
            self.resolver.as_ref(),
            self.migrator.as_ref(),
            self.config.not_found_policy,
        );

        if !self.config.persist_contract_results {
            let outcome = sidecars.process(item, transaction, None)?;
            self.stats.record_sidecars(&outcome);
            return Ok(());
        }

        let function_result = item.function_result();
        let outcome = sidecars.process(item, transaction, Some(listener))?;
        self.stats.record_sidecars(&outcome);

        if !item.body.is_contract_call_or_create() && function_result.is_none() {
            return Ok(());
        }

        let contract_id = self.result_contract_id(item, transaction, function_result);
        let transaction_hash = item.persisted_transaction_hash();
        let mut result = ContractResult {
            consensus_timestamp: item.consensus_timestamp,
            contract_id,
            payer_account_id: transaction.payer_account_id,
            transaction_hash: transaction_hash.clone(),
            transaction_index: item.transaction_index,
            transaction_result: item.status,
            ..ContractResult::default()
        };

        self.apply_handler_fields(item, &mut result);
        if result.failed_initcode.is_none() {
            result.failed_initcode = outcome.failed_initcode;
        }

        if let Some(function_result) = function_result {
            result.created_contract_ids =
                self.process_children(item, function_result, contract_id, listener)?;
            self.notify_created_contract(item, function_result, contract_id)?;

            result.bloom = Some(function_result.bloom.clone());
            result.call_result = Some(function_result.contract_call_result.clone());
            result.gas_used = Some(function_result.gas_used);
            result.function_result = Some(function_result.encoded.clone());
            if !function_result.error_message.is_empty() {
                result.error_message = Some(function_result.error_message.clone());
            }
            result.sender_id = self.resolve_optional_account(
                function_result.sender_id.as_ref(),
                item.consensus_timestamp,
                "sender_id",
            )?;

            self.process_logs(
                item,
                transaction,
                function_result,
                contract_id,
                &transaction_hash,
                listener,
            );
        }

        if result.failed_initcode.is_some() {
            self.stats.failed_initcodes.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.results.fetch_add(1, Ordering::Relaxed);
        listener.on_contract_result(result);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
