//! # Mirror Node Runtime
//!
//! Wires entity resolution (mn-01) into contract result reconciliation
//! (mn-02) and provides the process-level concerns around them.
//!
//! ## Modules
//!
//! - `config` - `RuntimeConfig` loaded from `MN_*` environment variables
//! - `telemetry` - `tracing-subscriber` setup (text or JSON)
//! - `replay` - JSON replay of decoded record items
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MN_PERSIST_CONTRACT_RESULTS` | `true` | Emit contract results, logs, state changes, actions |
//! | `MN_PERSIST_CONTRACTS` | `true` | Synthesize child contracts for old records |
//! | `MN_CREATED_CONTRACT_IDS_MAX_VERSION` | `0.23.0` | Child contract version gate |
//! | `MN_NOT_FOUND_POLICY` | `fallthrough` | `error`, `fallthrough` or `skip` |
//! | `MN_WORKERS` | `4` | Ingestion worker threads |
//! | `MN_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `MN_JSON_LOGS` | `false` | JSON log output |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod replay;
pub mod telemetry;

pub use config::{ConfigError, RuntimeConfig};
pub use replay::{replay, ReplayError, ReplayFile, ReplayReport};
pub use telemetry::{init_tracing, TelemetryError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
