//! # Domain Layer
//!
//! Input model (record items, sidecars), configuration and the id
//! reinterpretation rules used while reconciling.

pub mod config;
pub mod record_item;
pub mod sidecar;
pub mod workaround;

pub use config::*;
pub use record_item::*;
pub use sidecar::*;
pub use workaround::*;
