//! # Entity Id Service
//!
//! Driving implementation of [`EntityIdResolver`], composing the shared
//! [`ResolutionCache`], a [`ResolutionStore`] and the alias codecs.
//!
//! ## Resolution Paths
//!
//! | Wire form | Path | I/O |
//! |-----------|------|-----|
//! | default / unset | `EntityId::EMPTY` | none |
//! | numeric | `EntityId::of` | none |
//! | 20-byte alias / EVM address, long-zero in caller's shard.realm | reverse mapping | none |
//! | 20-byte alias / EVM address, otherwise | cache, then `find_by_evm_address` | on miss |
//! | any other alias | cache, then `find_by_alias` | on miss |

use crate::domain::{alias_to_evm_address, long_zero_entity_id, ResolutionCache, WireKey};
use crate::errors::{ResolutionError, StoreError};
use crate::ports::inbound::EntityIdResolver;
use crate::ports::outbound::ResolutionStore;
use shared_types::{
    AccountId, AccountRef, ContractId, ContractRef, Entity, EntityId, EntityKind,
    EVM_ADDRESS_LENGTH,
};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Resolves wire-level ids through a shared cache in front of a store.
pub struct EntityIdService<S: ResolutionStore> {
    /// Read path of persisted entities.
    store: Arc<S>,
    /// Cache shared by every clone of this service.
    cache: Arc<ResolutionCache>,
}

impl<S: ResolutionStore> Clone for EntityIdService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S: ResolutionStore> EntityIdService<S> {
    /// Create a service with a fresh cache.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_cache(store, Arc::new(ResolutionCache::new()))
    }

    /// Create a service sharing an existing cache.
    pub fn with_cache(store: Arc<S>, cache: Arc<ResolutionCache>) -> Self {
        Self { store, cache }
    }

    /// The shared resolution cache.
    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    fn resolve_evm_address(
        &self,
        key: WireKey,
        shard: u64,
        realm: u64,
        address: &[u8],
        kind: EntityKind,
    ) -> Result<EntityId, ResolutionError> {
        if let Some(id) = long_zero_entity_id(shard, realm, address, kind) {
            trace!(%id, "Resolved long-zero EVM address without I/O");
            return Ok(id);
        }

        self.cache.get_or_load(&key, || {
            let packed = self.store.find_by_evm_address(address)?;
            decode_found(packed, address, kind)
        })
    }

    fn resolve_alias(&self, key: WireKey, alias: &[u8]) -> Result<EntityId, ResolutionError> {
        self.cache.get_or_load(&key, || {
            let packed = self.store.find_by_alias(alias)?;
            decode_found(packed, alias, EntityKind::Account)
        })
    }
}

/// Turn a store hit into an id of `kind`, or a miss into `AliasNotFound`.
fn decode_found(
    packed: Option<i64>,
    identifier: &[u8],
    kind: EntityKind,
) -> Result<EntityId, ResolutionError> {
    let packed = packed.ok_or_else(|| ResolutionError::alias_not_found(identifier, kind))?;
    EntityId::decode(packed, kind)
        .map_err(|err| ResolutionError::Store(StoreError::Corrupted(err.to_string())))
}

impl<S: ResolutionStore> EntityIdResolver for EntityIdService<S> {
    #[instrument(level = "trace", skip(self))]
    fn lookup_account(&self, account_id: &AccountId) -> Result<EntityId, ResolutionError> {
        let (shard, realm) = (account_id.shard_num, account_id.realm_num);
        match &account_id.account {
            None => Ok(EntityId::EMPTY),
            Some(AccountRef::Num(num)) => Ok(EntityId::of(shard, realm, *num, EntityKind::Account)?),
            Some(AccountRef::Alias(alias)) if alias.is_empty() => Ok(EntityId::EMPTY),
            Some(AccountRef::Alias(alias)) if alias.len() == EVM_ADDRESS_LENGTH => self
                .resolve_evm_address(
                    WireKey::Account(account_id.clone()),
                    shard,
                    realm,
                    alias,
                    EntityKind::Account,
                ),
            Some(AccountRef::Alias(alias)) => {
                self.resolve_alias(WireKey::Account(account_id.clone()), alias)
            }
        }
    }

    #[instrument(level = "trace", skip(self))]
    fn lookup_contract(&self, contract_id: &ContractId) -> Result<EntityId, ResolutionError> {
        let (shard, realm) = (contract_id.shard_num, contract_id.realm_num);
        match &contract_id.contract {
            None => Ok(EntityId::EMPTY),
            Some(ContractRef::Num(num)) => {
                Ok(EntityId::of(shard, realm, *num, EntityKind::Contract)?)
            }
            Some(ContractRef::EvmAddress(address)) if address.is_empty() => Ok(EntityId::EMPTY),
            Some(ContractRef::EvmAddress(address)) => self.resolve_evm_address(
                WireKey::Contract(contract_id.clone()),
                shard,
                realm,
                address,
                EntityKind::Contract,
            ),
        }
    }

    fn notify(&self, entity: &Entity) -> Result<(), ResolutionError> {
        if entity.is_deleted() {
            return Ok(());
        }

        let alias = entity.alias.as_deref().filter(|a| !a.is_empty());
        let evm_address = entity.evm_address.as_deref().filter(|a| !a.is_empty());
        if alias.is_none() && evm_address.is_none() {
            return Ok(());
        }

        let id = entity.id;
        let (shard, realm) = (id.shard(), id.realm());
        match entity.kind() {
            EntityKind::Account => {
                if let Some(alias) = alias {
                    self.cache
                        .put(WireKey::Account(AccountId::alias(shard, realm, alias)), id);
                }
                let address = evm_address
                    .map(<[u8]>::to_vec)
                    .or_else(|| alias.and_then(alias_to_evm_address).map(Vec::from));
                if let Some(address) = address {
                    self.cache
                        .put(WireKey::Account(AccountId::alias(shard, realm, address)), id);
                }
            }
            EntityKind::Contract => {
                if let Some(address) = evm_address.or(alias) {
                    self.cache.put(
                        WireKey::Contract(ContractId::evm_address(shard, realm, address)),
                        id,
                    );
                }
            }
            other => return Err(ResolutionError::UnsupportedKind(other)),
        }

        debug!(%id, kind = %entity.kind(), "Seeded resolution cache from new entity");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
