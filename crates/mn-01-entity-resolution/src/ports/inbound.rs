//! # Inbound Ports (Driving Ports)
//!
//! API exposed by entity resolution to the ingestion pipeline.

use crate::domain::{first_resolved, NotFoundPolicy};
use crate::errors::ResolutionError;
use shared_types::{AccountId, ContractId, Entity, EntityId};

/// Wire-level id to canonical [`EntityId`] resolution.
///
/// ## Contract
///
/// - Numerically addressed ids resolve without I/O and never touch the cache.
/// - The protocol's default (unset) id resolves to `EntityId::EMPTY`.
/// - Alias and EVM address ids go through the shared cache; a miss in both
///   cache and store is `ResolutionError::AliasNotFound`.
pub trait EntityIdResolver: Send + Sync {
    /// Resolve an account reference.
    fn lookup_account(&self, account_id: &AccountId) -> Result<EntityId, ResolutionError>;

    /// Resolve a contract reference.
    fn lookup_contract(&self, contract_id: &ContractId) -> Result<EntityId, ResolutionError>;

    /// First candidate resolving to a non-empty id, under `policy`.
    fn lookup_accounts(
        &self,
        policy: NotFoundPolicy,
        candidates: &[&AccountId],
    ) -> Result<EntityId, ResolutionError> {
        first_resolved(policy, candidates, |account_id| self.lookup_account(account_id))
    }

    /// First candidate resolving to a non-empty id, under `policy`.
    fn lookup_contracts(
        &self,
        policy: NotFoundPolicy,
        candidates: &[&ContractId],
    ) -> Result<EntityId, ResolutionError> {
        first_resolved(policy, candidates, |contract_id| {
            self.lookup_contract(contract_id)
        })
    }

    /// Record the alias and EVM address of a freshly created entity so later
    /// lookups in the same batch resolve without a store read.
    fn notify(&self, entity: &Entity) -> Result<(), ResolutionError>;
}
