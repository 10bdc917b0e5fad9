//! # Ports Layer
//!
//! - **Driving Ports (Inbound)**: `EntityIdResolver`, consumed by ingestion.
//! - **Driven Ports (Outbound)**: `ResolutionStore`, implemented by storage adapters.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
