//! # Batch Ingestion
//!
//! Fans a record file's transactions out over a rayon pool. Each transaction
//! is resolved and reconciled into its own [`RecordBuffer`]; buffers are
//! replayed into the caller's sink in input order once the whole batch has
//! succeeded. A failing transaction aborts the batch and nothing is flushed.
//!
//! All workers share one resolver and therefore one resolution cache.
//!
//! ## Waves
//!
//! A contract create that carries an EVM address seeds the cache, and later
//! transactions in the same file may address the contract only by that EVM
//! address. The batch is therefore cut into waves, each ending at such a
//! create. Items within a wave run in parallel; a wave starts only after the
//! previous one has finished.

use crate::adapters::RecordBuffer;
use crate::domain::{RecordItem, Transaction, TransactionBody};
use crate::errors::{IngestError, ReconcileError};
use crate::ports::inbound::ContractResultApi;
use crate::ports::outbound::{BytecodeMigrator, EntityListener};
use crate::service::ContractResultService;
use mn_01_entity_resolution::{EntityIdResolver, NotFoundPolicy, ResolutionError};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use shared_types::{ContractId, EntityId};
use std::sync::Arc;
use tracing::{info, instrument};

/// Entity a transaction targets, from its receipt and body.
///
/// `None` for transaction types that do not target a contract, or when no
/// candidate resolved.
///
/// # Errors
///
/// Resolution failures not absorbed by `policy`.
pub fn resolve_transaction_entity<R>(
    resolver: &R,
    item: &RecordItem,
    policy: NotFoundPolicy,
) -> Result<Option<EntityId>, ResolutionError>
where
    R: EntityIdResolver + ?Sized,
{
    let receipt = &item.receipt.contract_id;
    let candidates: Vec<&ContractId> = match &item.body {
        TransactionBody::ContractCall(body) => vec![receipt, &body.contract_id],
        TransactionBody::ContractCreate(_) => vec![receipt],
        TransactionBody::EthereumTransaction(_) => std::iter::once(receipt)
            .chain(item.function_result().map(|result| &result.contract_id))
            .collect(),
        TransactionBody::Other => return Ok(None),
    };

    let id = resolver.lookup_contracts(policy, &candidates)?;
    Ok(Some(id).filter(|id| !id.is_empty()))
}

/// Outcome of one ingested batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Transactions processed.
    pub items: usize,
    /// Records flushed to the sink.
    pub records: usize,
}

/// Parallel batch ingestor.
pub struct BatchIngestor<R: EntityIdResolver, M: BytecodeMigrator> {
    service: Arc<ContractResultService<R, M>>,
    pool: ThreadPool,
}

impl<R: EntityIdResolver, M: BytecodeMigrator> BatchIngestor<R, M> {
    /// Create an ingestor with `workers` threads (at least one).
    ///
    /// # Errors
    ///
    /// `IngestError::Pool` if the thread pool cannot be built.
    pub fn new(service: Arc<ContractResultService<R, M>>, workers: usize) -> Result<Self, IngestError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("mn-ingest-{i}"))
            .build()?;
        Ok(Self { service, pool })
    }

    /// The reconciler driven by this ingestor.
    pub fn service(&self) -> &Arc<ContractResultService<R, M>> {
        &self.service
    }

    /// Ingest `batch`, flushing its records into `sink` in input order.
    ///
    /// # Errors
    ///
    /// The first failing transaction, in input order. Nothing is flushed.
    #[instrument(level = "debug", skip_all, fields(items = batch.len()))]
    pub fn ingest(
        &self,
        batch: &[RecordItem],
        sink: &dyn EntityListener,
    ) -> Result<BatchSummary, IngestError> {
        let mut buffers = Vec::with_capacity(batch.len());
        let mut waves = 0usize;
        for wave in batch.split_inclusive(RecordItem::seeds_resolution_cache) {
            let results: Vec<Result<RecordBuffer, IngestError>> = self
                .pool
                .install(|| wave.par_iter().map(|item| self.process_item(item)).collect());
            for result in results {
                buffers.push(result?);
            }
            waves += 1;
        }

        let records = buffers
            .into_iter()
            .map(|buffer| buffer.replay_into(sink))
            .sum();
        let summary = BatchSummary {
            items: batch.len(),
            records,
        };
        info!(items = summary.items, records = summary.records, waves, "Ingested batch");
        Ok(summary)
    }

    fn process_item(&self, item: &RecordItem) -> Result<RecordBuffer, IngestError> {
        let wrap = |source: ReconcileError| IngestError::Item {
            consensus_timestamp: item.consensus_timestamp,
            source,
        };

        let transaction = self.build_transaction(item).map_err(wrap)?;
        let buffer = RecordBuffer::new();
        self.service
            .process(item, &transaction, &buffer)
            .map_err(wrap)?;
        Ok(buffer)
    }

    fn build_transaction(&self, item: &RecordItem) -> Result<Transaction, ReconcileError> {
        let resolver = self.service.resolver().as_ref();
        let policy = self.service.config().not_found_policy;
        Ok(Transaction {
            consensus_timestamp: item.consensus_timestamp,
            entity_id: resolve_transaction_entity(resolver, item, policy)?,
            payer_account_id: resolver.lookup_accounts(policy, &[&item.payer_account_id])?,
            index: item.transaction_index,
            result: item.status,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
