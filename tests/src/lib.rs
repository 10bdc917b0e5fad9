//! # Mirror-Node Ingestion Test Suite
//!
//! Cross-crate flows that no single subsystem crate can test on its own.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── alias_flows.rs       # notify -> same-batch lookup, ECDSA aliases
//! │   ├── contract_flows.rs    # reconciler + resolver end to end, CREATE2
//! │   ├── batch_flows.rs       # parallel ingestion, ordering, single-flight
//! │   └── replay_flows.rs      # mn-runtime replay of demos/replay.json
//! └── benches/
//!     └── ingestion_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mn-tests
//! cargo test -p mn-tests integration::batch_flows
//! cargo bench -p mn-tests
//! ```

pub mod integration;
