//! # CREATE2 Address Workaround
//!
//! Some EVM-generated contract ids in logs and state changes carry a raw
//! 20-byte EVM address packed into the numeric `(shard, realm, num)` fields.
//! These ids either fail numeric validation or point at the wrong entity, so
//! they are reinterpreted as an EVM address and resolved in the root
//! contract's shard and realm.
//!
//! Resolution here never fails: the root contract id is the fallback.

use mn_01_entity_resolution::{EntityIdResolver, ResolutionError};
use shared_types::{ContractId, ContractRef, EntityId, EntityKind, EvmAddress, EVM_ADDRESS_LENGTH};
use tracing::{debug, warn};

/// Reinterpret a numeric triple as the EVM address it was miscoded from.
///
/// `None` if the shard cannot have come from a 4-byte address prefix.
#[must_use]
pub fn miscoded_evm_address(shard: u64, realm: u64, num: u64) -> Option<EvmAddress> {
    let shard = u32::try_from(shard).ok()?;
    let mut address = [0u8; EVM_ADDRESS_LENGTH];
    address[..4].copy_from_slice(&shard.to_be_bytes());
    address[4..12].copy_from_slice(&realm.to_be_bytes());
    address[12..].copy_from_slice(&num.to_be_bytes());
    Some(address)
}

/// Resolve a contract id from a log or state change, falling back to `root`.
///
/// - Unset ids yield `root`.
/// - EVM-address ids resolve normally.
/// - Numeric ids in shard 0, realm 0 resolve normally unless they fail as an
///   invalid entity, in which case they are reinterpreted.
/// - Any other numeric id is reinterpreted as an EVM address and looked up
///   in `root`'s shard and realm.
pub fn resolve_contract_id<R>(resolver: &R, contract_id: &ContractId, root: EntityId) -> EntityId
where
    R: EntityIdResolver + ?Sized,
{
    let num = match &contract_id.contract {
        None => return root,
        Some(ContractRef::EvmAddress(_)) => return lookup_or_root(resolver, contract_id, root),
        Some(ContractRef::Num(num)) => *num,
    };
    let (shard, realm) = (contract_id.shard_num, contract_id.realm_num);

    if shard == 0 && realm == 0 {
        match resolver.lookup_contract(contract_id) {
            Ok(id) => return id,
            Err(ResolutionError::InvalidEntity(_)) => {
                debug!(num, "Contract id is not a valid entity, reinterpreting as EVM address");
            }
            Err(err) => {
                warn!(%root, error = %err, "Unable to resolve contract id, using root contract");
                return root;
            }
        }
    }

    let Some(address) = miscoded_evm_address(shard, realm, num) else {
        warn!(shard, realm, num, %root, "Contract id cannot be an EVM address, using root contract");
        return root;
    };
    let reinterpreted = ContractId::evm_address(root.shard(), root.realm(), address);
    lookup_or_root(resolver, &reinterpreted, root)
}

fn lookup_or_root<R>(resolver: &R, contract_id: &ContractId, root: EntityId) -> EntityId
where
    R: EntityIdResolver + ?Sized,
{
    match resolver.lookup_contract(contract_id) {
        Ok(id) if !id.is_empty() => id,
        Ok(_) => root,
        Err(err) => {
            warn!(%root, error = %err, "Unable to resolve contract id, using root contract");
            root
        }
    }
}

/// Root for a state change entry: the entry's own id when it is a valid
/// numeric id, else the transaction's entity, else `EMPTY`.
#[must_use]
pub fn state_change_root(contract_id: &ContractId, transaction_entity: Option<EntityId>) -> EntityId {
    contract_id
        .contract_num()
        .and_then(|num| {
            EntityId::of(
                contract_id.shard_num,
                contract_id.realm_num,
                num,
                EntityKind::Contract,
            )
            .ok()
        })
        .or(transaction_entity)
        .unwrap_or(EntityId::EMPTY)
}

// =============================================================================
// TESTS
// =============================================================================
