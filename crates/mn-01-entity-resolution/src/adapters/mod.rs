//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implementations of the outbound `ResolutionStore` port.

mod memory_store;

pub use memory_store::InMemoryResolutionStore;
