//! # Replay
//!
//! Feeds decoded record items from a JSON file through entity resolution and
//! contract result reconciliation, writing every emitted record as one JSON
//! line.
//!
//! ```json
//! { "entities": [ ...previously persisted Entity... ], "items": [ ...RecordItem... ] }
//! ```
//!
//! The entities seed an in-memory resolution store, standing in for the
//! mirror's database.

use crate::config::RuntimeConfig;
use mn_01_entity_resolution::{EntityIdService, InMemoryResolutionStore};
use mn_02_contract_results::{
    BatchIngestor, BatchSummary, ContractResultService, IngestError, LoggingBytecodeMigrator,
    RecordBuffer, RecordItem, ReconcilerStats,
};
use serde::{Deserialize, Serialize};
use shared_types::Entity;
use std::io::{Read, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors raised while replaying.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The input is not a valid replay file, or a record failed to encode.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Ingestion aborted.
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Contents of a replay file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayFile {
    /// Entities already persisted before the replayed items.
    pub entities: Vec<Entity>,
    /// Record items, in consensus order.
    pub items: Vec<RecordItem>,
}

impl ReplayFile {
    /// Parse a replay file.
    ///
    /// # Errors
    ///
    /// `ReplayError::Json` if the input does not match the replay format.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReplayError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    /// Batch totals.
    pub summary: BatchSummary,
    /// Reconciler counters.
    pub stats: ReconcilerStats,
}

/// Replay `file` under `config`, writing emitted records to `out`.
///
/// Nothing is written if ingestion fails.
///
/// # Errors
///
/// Ingestion failures, and failures writing to `out`.
pub fn replay<W: Write>(
    config: &RuntimeConfig,
    file: &ReplayFile,
    out: &mut W,
) -> Result<ReplayReport, ReplayError> {
    let store = Arc::new(InMemoryResolutionStore::from_entities(&file.entities));
    let resolver = Arc::new(EntityIdService::new(store));
    let service = Arc::new(ContractResultService::new(
        config.reconciler.clone(),
        resolver,
        Arc::new(LoggingBytecodeMigrator),
    ));
    let ingestor = BatchIngestor::new(Arc::clone(&service), config.workers)?;

    let sink = RecordBuffer::new();
    let summary = ingestor.ingest(&file.items, &sink)?;
    for record in sink.into_records() {
        serde_json::to_writer(&mut *out, &record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    let stats = service.stats();
    let cache = service.resolver().cache().stats();
    info!(
        items = summary.items,
        records = summary.records,
        results = stats.results,
        logs = stats.logs,
        child_contracts = stats.child_contracts,
        cache_hits = cache.hits,
        cache_loads = cache.loads,
        "Replay complete"
    );
    Ok(ReplayReport { summary, stats })
}
