//! # Error Types
//!
//! All error types for contract result reconciliation and batch ingestion.

use mn_01_entity_resolution::ResolutionError;
use thiserror::Error;

// =============================================================================
// RECONCILE ERRORS
// =============================================================================

/// Errors that abort reconciliation of one transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Identifier resolution failed and the policy did not absorb it.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A sidecar violates a decoding invariant.
    #[error("malformed sidecar at {consensus_timestamp}: {reason}")]
    MalformedSidecar {
        /// Consensus timestamp of the owning transaction.
        consensus_timestamp: i64,
        /// What was missing or inconsistent.
        reason: String,
    },

    /// The bytecode migration collaborator failed.
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

impl ReconcileError {
    /// Shorthand for a `MalformedSidecar`.
    pub fn malformed(consensus_timestamp: i64, reason: impl Into<String>) -> Self {
        Self::MalformedSidecar {
            consensus_timestamp,
            reason: reason.into(),
        }
    }
}

/// Failure reported by a bytecode migrator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("bytecode migration failed: {0}")]
pub struct MigrationError(pub String);

// =============================================================================
// INGEST ERRORS
// =============================================================================

/// Errors raised by batch ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The worker pool could not be built.
    #[error("failed to build ingestion pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// One transaction failed; nothing from the batch was flushed.
    #[error("transaction at {consensus_timestamp} failed: {source}")]
    Item {
        /// Consensus timestamp of the failing transaction.
        consensus_timestamp: i64,
        /// Underlying failure.
        #[source]
        source: ReconcileError,
    },
}

// =============================================================================
// TESTS
// =============================================================================
