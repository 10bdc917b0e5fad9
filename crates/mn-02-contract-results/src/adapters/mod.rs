//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implementations of the outbound ports.

mod migrators;
mod record_buffer;

pub use migrators::{LoggingBytecodeMigrator, MigrationCall, RecordingBytecodeMigrator};
pub use record_buffer::{EmittedRecord, RecordBuffer};
