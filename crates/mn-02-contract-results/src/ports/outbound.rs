//! # Outbound Ports (Driven Ports)
//!
//! SPIs the reconciler emits into.

use crate::domain::ContractBytecode;
use crate::errors::MigrationError;
use shared_types::{
    Contract, ContractAction, ContractLog, ContractResult, ContractStateChange, Entity,
};

/// Output sink for fully built records.
///
/// One method per record kind. Implementations batch and persist at commit
/// boundaries owned by the caller; emission itself cannot fail.
pub trait EntityListener: Send + Sync {
    /// An entity was created or updated.
    fn on_entity(&self, entity: Entity);

    /// A contract was created.
    fn on_contract(&self, contract: Contract);

    /// A contract call or create completed.
    fn on_contract_result(&self, result: ContractResult);

    /// A log was emitted.
    fn on_contract_log(&self, log: ContractLog);

    /// A storage slot was read or written.
    fn on_contract_state_change(&self, state_change: ContractStateChange);

    /// A call frame was traced.
    fn on_contract_action(&self, action: ContractAction);
}

/// Collaborator that stores migrated contract bytecode.
pub trait BytecodeMigrator: Send + Sync {
    /// Hand off the migration bytecode of one transaction.
    ///
    /// Called exactly once per processed transaction, possibly with an empty
    /// batch. `migration_count` is the number of migration-flagged sidecars.
    fn migrate(
        &self,
        batch: Vec<ContractBytecode>,
        migration_count: usize,
    ) -> Result<(), MigrationError>;
}
