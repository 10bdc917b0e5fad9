//! In-Memory Resolution Store
//!
//! Implements `ResolutionStore` over hash maps. Used by the replay runtime
//! (seeded from previously persisted entities) and as the store double in
//! tests, where its call counters and failure injection matter.

use crate::errors::StoreError;
use crate::ports::outbound::ResolutionStore;
use parking_lot::RwLock;
use shared_types::Entity;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Hash-map backed resolution store.
#[derive(Default)]
pub struct InMemoryResolutionStore {
    /// alias bytes -> packed id.
    aliases: RwLock<HashMap<Vec<u8>, i64>>,
    /// EVM address bytes -> packed id.
    evm_addresses: RwLock<HashMap<Vec<u8>, i64>>,
    /// Injected failure returned by every read while set.
    failure: RwLock<Option<StoreError>>,
    alias_reads: AtomicU64,
    evm_address_reads: AtomicU64,
}

impl InMemoryResolutionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted entities.
    ///
    /// Deleted entities are ignored.
    pub fn from_entities<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        let store = Self::new();
        for entity in entities.into_iter().filter(|e| !e.is_deleted()) {
            if let Some(alias) = &entity.alias {
                store.bind_alias(alias.clone(), entity.id.id());
            }
            if let Some(address) = &entity.evm_address {
                store.bind_evm_address(address.clone(), entity.id.id());
            }
        }
        debug!(
            aliases = store.aliases.read().len(),
            evm_addresses = store.evm_addresses.read().len(),
            "Seeded in-memory resolution store"
        );
        store
    }

    /// Map an alias to a packed id.
    pub fn bind_alias(&self, alias: impl Into<Vec<u8>>, id: i64) {
        self.aliases.write().insert(alias.into(), id);
    }

    /// Map an EVM address to a packed id.
    pub fn bind_evm_address(&self, address: impl Into<Vec<u8>>, id: i64) {
        self.evm_addresses.write().insert(address.into(), id);
    }

    /// Make every subsequent read fail with `error`, or clear with `None`.
    pub fn set_failure(&self, error: Option<StoreError>) {
        *self.failure.write() = error;
    }

    /// Number of `find_by_alias` calls served.
    pub fn alias_reads(&self) -> u64 {
        self.alias_reads.load(Ordering::SeqCst)
    }

    /// Number of `find_by_evm_address` calls served.
    pub fn evm_address_reads(&self) -> u64 {
        self.evm_address_reads.load(Ordering::SeqCst)
    }

    /// Total reads of either kind.
    pub fn total_reads(&self) -> u64 {
        self.alias_reads() + self.evm_address_reads()
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        match self.failure.read().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl ResolutionStore for InMemoryResolutionStore {
    fn find_by_alias(&self, alias: &[u8]) -> Result<Option<i64>, StoreError> {
        self.alias_reads.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.aliases.read().get(alias).copied())
    }

    fn find_by_evm_address(&self, address: &[u8]) -> Result<Option<i64>, StoreError> {
        self.evm_address_reads.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.evm_addresses.read().get(address).copied())
    }
}

// =============================================================================
// TESTS
// =============================================================================
