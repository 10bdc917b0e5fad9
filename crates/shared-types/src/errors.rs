//! # Error Types
//!
//! Error types shared across subsystems.

use thiserror::Error;

/// `(shard, realm, num)` cannot be represented as a packed entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid entity {shard}.{realm}.{num}: component out of range")]
pub struct InvalidEntityError {
    /// Requested shard.
    pub shard: u64,
    /// Requested realm.
    pub realm: u64,
    /// Requested entity number.
    pub num: u64,
}

/// A protocol version string is not `major.minor.patch`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid HAPI version: {0:?} (expected major.minor.patch)")]
pub struct VersionParseError(pub String);
