//! # MN-02 Contract Results
//!
//! Reconciles smart contract execution records into persistable
//! `ContractResult`, `ContractLog`, `ContractStateChange`, `ContractAction`
//! and child `Entity`/`Contract` records.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Execution records reference contracts by number, by EVM address, and
//! sometimes by an EVM address miscoded into numeric fields. This crate
//! resolves them through MN-01, applies the CREATE2 workaround, drains
//! sidecars and emits records to an [`EntityListener`].
//!
//! ## Rules
//!
//! | Rule | Where |
//! |------|-------|
//! | Sidecars always processed, even without a function result | `sidecars` |
//! | Miscoded contract ids fall back to the root contract | `domain::workaround` |
//! | Child contracts only synthesized before protocol 0.23.0 | `service` |
//! | Parent never synthesized as its own child | `service` |
//! | Batch output flushed in input order, or not at all | `ingest` |
//!
//! ## Module Structure
//!
//! ```text
//! mn-02-contract-results/
//! ├── domain/          # RecordItem, sidecars, config, CREATE2 workaround
//! ├── ports/           # ContractResultApi (inbound), EntityListener, BytecodeMigrator (outbound)
//! ├── adapters/        # RecordBuffer, migrators
//! ├── sidecars.rs      # SidecarProcessor
//! ├── service.rs       # ContractResultService
//! └── ingest.rs        # BatchIngestor
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ingest;
pub mod ports;
pub mod service;
pub mod sidecars;

mod lookup;

// Re-exports
pub use adapters::{
    EmittedRecord, LoggingBytecodeMigrator, MigrationCall, RecordBuffer, RecordingBytecodeMigrator,
};
pub use domain::{
    miscoded_evm_address, resolve_contract_id, state_change_root, ReconcilerConfig, RecordItem,
    SidecarPayload, SidecarRecord, Transaction, TransactionBody,
    DEFAULT_CREATED_CONTRACT_IDS_MAX_VERSION,
};
pub use errors::{IngestError, MigrationError, ReconcileError};
pub use ingest::{resolve_transaction_entity, BatchIngestor, BatchSummary};
pub use ports::{BytecodeMigrator, ContractResultApi, EntityListener};
pub use service::{ContractResultService, ReconcilerStats};
pub use sidecars::{SidecarOutcome, SidecarProcessor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
