//! # Ports Layer
//!
//! - **Driving Ports (Inbound)**: `ContractResultApi`, consumed by the batch ingestor.
//! - **Driven Ports (Outbound)**: `EntityListener` (output sink) and
//!   `BytecodeMigrator` (migration collaborator).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
