//! # MN-01 Entity Resolution
//!
//! Converts wire-level account and contract references into canonical
//! [`EntityId`](shared_types::EntityId)s.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! The ledger addresses entities three ways: numerically (`shard.realm.num`),
//! by a public-key-derived alias, and by a 20-byte EVM address. Persistence
//! needs a single packed id. This crate resolves all three, caching the
//! I/O-bound forms so concurrent ingestion workers share one store read per
//! key.
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | No I/O for numeric / long-zero ids | resolved before the cache |
//! | One store read per key under contention | single-flight `ResolutionCache` |
//! | Failed loads retried | failures shared, never cached |
//! | Same-batch visibility of new aliases | `notify` write-through |
//!
//! ## Module Structure
//!
//! ```text
//! mn-01-entity-resolution/
//! ├── domain/          # Alias codecs, NotFoundPolicy, ResolutionCache
//! ├── ports/           # EntityIdResolver (inbound), ResolutionStore (outbound)
//! ├── adapters/        # InMemoryResolutionStore
//! └── service.rs       # EntityIdService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemoryResolutionStore;
pub use domain::{
    alias_to_evm_address, first_resolved, long_zero_entity_id, CacheStats, NotFoundPolicy,
    ResolutionCache, WireKey, ECDSA_SECP256K1_ALIAS_LENGTH, ECDSA_SECP256K1_ALIAS_PREFIX,
};
pub use errors::{ResolutionError, StoreError};
pub use ports::{EntityIdResolver, ResolutionStore};
pub use service::EntityIdService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
