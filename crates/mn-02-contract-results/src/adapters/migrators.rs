//! Bytecode Migrators
//!
//! `BytecodeMigrator` implementations. Durable bytecode storage lives outside
//! this workspace; the runtime logs hand-offs and tests record them.

use crate::domain::ContractBytecode;
use crate::errors::MigrationError;
use crate::ports::outbound::BytecodeMigrator;
use parking_lot::Mutex;
use tracing::{debug, info};

/// Logs each non-empty hand-off.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingBytecodeMigrator;

impl BytecodeMigrator for LoggingBytecodeMigrator {
    fn migrate(
        &self,
        batch: Vec<ContractBytecode>,
        migration_count: usize,
    ) -> Result<(), MigrationError> {
        if batch.is_empty() {
            debug!("No migration bytecode for transaction");
            return Ok(());
        }
        let bytes: usize = batch.iter().map(|b| b.runtime_bytecode.len()).sum();
        info!(
            contracts = batch.len(),
            migration_count, bytes, "Migrating contract bytecode"
        );
        Ok(())
    }
}

/// One recorded `migrate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationCall {
    /// Bytecode handed off.
    pub batch: Vec<ContractBytecode>,
    /// Migration-flagged sidecar count.
    pub migration_count: usize,
}

/// Records every call; optionally fails.
#[derive(Debug, Default)]
pub struct RecordingBytecodeMigrator {
    calls: Mutex<Vec<MigrationCall>>,
    failure: Mutex<Option<String>>,
}

impl RecordingBytecodeMigrator {
    /// Create a migrator that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent call with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock() = Some(reason.into());
    }

    /// Recorded calls, in order.
    pub fn calls(&self) -> Vec<MigrationCall> {
        self.calls.lock().clone()
    }
}

impl BytecodeMigrator for RecordingBytecodeMigrator {
    fn migrate(
        &self,
        batch: Vec<ContractBytecode>,
        migration_count: usize,
    ) -> Result<(), MigrationError> {
        self.calls.lock().push(MigrationCall {
            batch,
            migration_count,
        });
        match self.failure.lock().as_ref() {
            Some(reason) => Err(MigrationError(reason.clone())),
            None => Ok(()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
