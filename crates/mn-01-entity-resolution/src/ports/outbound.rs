//! # Outbound Ports (Driven Ports)
//!
//! SPI required by entity resolution: read access to persisted
//! alias and EVM address mappings.

use crate::errors::StoreError;

/// Read path of the entity store.
///
/// Both lookups return the packed 63-bit id of the matching entity, or
/// `None` when nothing is mapped yet. Implementations must be safe to call
/// from many ingestion workers at once.
pub trait ResolutionStore: Send + Sync {
    /// Entity whose public-key alias equals `alias`.
    fn find_by_alias(&self, alias: &[u8]) -> Result<Option<i64>, StoreError>;

    /// Entity whose assigned EVM address equals `address`.
    fn find_by_evm_address(&self, address: &[u8]) -> Result<Option<i64>, StoreError>;
}
