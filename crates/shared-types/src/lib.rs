//! # Shared Types Crate
//!
//! Identifier and record types shared by the ingestion subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `EntityId`, the wire-level `AccountId` /
//!   `ContractId`, and every persisted record are defined here once.
//! - **Immutable identity**: `EntityId` is a value type; it is built by
//!   resolution and only ever compared or attached to records afterwards.
//! - **Wire vs. canonical**: wire-level ids are what the ledger emitted and
//!   may need I/O to resolve; `EntityId` is what gets persisted.

pub mod entities;
pub mod errors;
pub mod records;

pub use entities::*;
pub use errors::*;
pub use records::*;
