//! # Error Types
//!
//! All error types for entity id resolution.

use shared_types::{EntityKind, InvalidEntityError};
use thiserror::Error;

// =============================================================================
// RESOLUTION ERRORS
// =============================================================================

/// Errors raised while resolving a wire-level id.
///
/// `Clone` so that every caller waiting on the same in-flight load observes
/// the same failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// An alias or EVM address has no known mapping yet.
    #[error("no {kind} found for alias 0x{}", hex::encode(.identifier))]
    AliasNotFound {
        /// The alias or EVM address bytes.
        identifier: Vec<u8>,
        /// Kind the caller expected.
        kind: EntityKind,
    },

    /// Numeric components cannot represent an entity.
    #[error(transparent)]
    InvalidEntity(#[from] InvalidEntityError),

    /// `notify` was called for a kind that cannot carry an alias.
    #[error("entity kind {0} cannot carry an alias")]
    UnsupportedKind(EntityKind),

    /// The in-flight load for this key was abandoned before completing.
    #[error("resolution load aborted before completion")]
    LoadAborted,

    /// Resolution store failure, propagated unchanged.
    #[error("resolution store error: {0}")]
    Store(#[from] StoreError),
}

impl ResolutionError {
    /// Returns true for domain-level misses that a lenient policy may absorb.
    ///
    /// Store failures are never absorbed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::AliasNotFound { .. } | Self::InvalidEntity(_))
    }

    /// Shorthand for an `AliasNotFound`.
    #[must_use]
    pub fn alias_not_found(identifier: &[u8], kind: EntityKind) -> Self {
        Self::AliasNotFound {
            identifier: identifier.to_vec(),
            kind,
        }
    }
}

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Errors from the resolution store read path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store returned data that does not decode.
    #[error("corrupt store data: {0}")]
    Corrupted(String),
}

// =============================================================================
// TESTS
// =============================================================================
