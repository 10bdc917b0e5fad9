//! # Reconciler Configuration
//!
//! Persistence switches and the child-contract version gate. Loaded from the
//! environment by the runtime; defaults match a mainnet mirror.

use mn_01_entity_resolution::NotFoundPolicy;
use serde::{Deserialize, Serialize};
use shared_types::HapiVersion;

/// First protocol version that externalizes child contract creation.
pub const DEFAULT_CREATED_CONTRACT_IDS_MAX_VERSION: HapiVersion = HapiVersion::new(0, 23, 0);

/// Contract result reconciliation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Emit contract results, logs, state changes and actions.
    pub persist_contract_results: bool,
    /// Synthesize child contract entities for pre-threshold records.
    pub persist_contracts: bool,
    /// Records at or above this version never synthesize child contracts.
    pub created_contract_ids_max_version: HapiVersion,
    /// Policy for ids that do not resolve.
    pub not_found_policy: NotFoundPolicy,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            persist_contract_results: true,
            persist_contracts: true,
            created_contract_ids_max_version: DEFAULT_CREATED_CONTRACT_IDS_MAX_VERSION,
            not_found_policy: NotFoundPolicy::Fallthrough,
        }
    }
}

impl ReconcilerConfig {
    /// Whether a record of `version` still needs child contracts synthesized.
    #[must_use]
    pub fn synthesizes_children(&self, version: HapiVersion) -> bool {
        self.persist_contracts && version < self.created_contract_ids_max_version
    }
}
