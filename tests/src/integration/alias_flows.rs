//! # Alias Resolution Flows
//!
//! Entity creation seeding the resolution cache, then later lookups by
//! alias or derived EVM address resolving without a store read.
//!
//! ## Flows Tested:
//!
//! 1. ECDSA alias account notified, looked up by alias and by EVM address
//! 2. Persisted alias loaded once, then served from cache
//! 3. Cache keys are scoped to shard and realm

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use k256::elliptic_curve::sec1::ToEncodedPoint;
    use k256::SecretKey;
    use sha3::{Digest, Keccak256};

    use mn_01_entity_resolution::{
        alias_to_evm_address, EntityIdResolver, EntityIdService, InMemoryResolutionStore,
        ResolutionError, ECDSA_SECP256K1_ALIAS_PREFIX,
    };
    use shared_types::{AccountId, Entity, EntityId, EntityKind};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn setup() -> (Arc<InMemoryResolutionStore>, EntityIdService<InMemoryResolutionStore>) {
        let store = Arc::new(InMemoryResolutionStore::new());
        (Arc::clone(&store), EntityIdService::new(Arc::clone(&store)))
    }

    fn account(realm: u64, num: u64) -> EntityId {
        EntityId::of(0, realm, num, EntityKind::Account).unwrap()
    }

    /// ECDSA alias and its EVM address, derived independently of the resolver.
    fn ecdsa_key(seed: u8) -> (Vec<u8>, Vec<u8>) {
        let public = SecretKey::from_slice(&[seed; 32]).unwrap().public_key();

        let mut alias = ECDSA_SECP256K1_ALIAS_PREFIX.to_vec();
        alias.extend_from_slice(public.to_encoded_point(true).as_bytes());

        let uncompressed = public.to_encoded_point(false);
        let address = Keccak256::digest(&uncompressed.as_bytes()[1..])[12..].to_vec();
        (alias, address)
    }

    // =============================================================================
    // NOTIFY -> LOOKUP
    // =============================================================================

    #[test]
    fn test_notified_ecdsa_account_resolves_both_ways() {
        let (store, resolver) = setup();
        let (alias, address) = ecdsa_key(0x11);
        assert_eq!(alias_to_evm_address(&alias).map(Vec::from), Some(address.clone()));

        let id = account(0, 5001);
        resolver
            .notify(&Entity {
                alias: Some(alias.clone()),
                ..Entity::new(id)
            })
            .unwrap();

        assert_eq!(resolver.lookup_account(&AccountId::alias(0, 0, alias)).unwrap(), id);
        assert_eq!(resolver.lookup_account(&AccountId::alias(0, 0, address)).unwrap(), id);
        assert_eq!(store.total_reads(), 0);
    }

    #[test]
    fn test_many_accounts_notified_in_one_batch() {
        let (store, resolver) = setup();
        let keys: Vec<(Vec<u8>, Vec<u8>)> = (1..=16).map(ecdsa_key).collect();

        for (i, (alias, _)) in keys.iter().enumerate() {
            resolver
                .notify(&Entity {
                    alias: Some(alias.clone()),
                    ..Entity::new(account(0, 7000 + i as u64))
                })
                .unwrap();
        }
        for (i, (_, address)) in keys.iter().enumerate() {
            let resolved = resolver
                .lookup_account(&AccountId::alias(0, 0, address.clone()))
                .unwrap();
            assert_eq!(resolved, account(0, 7000 + i as u64));
        }
        assert_eq!(store.total_reads(), 0);
    }

    #[test]
    fn test_deleted_entity_not_cached() {
        let (store, resolver) = setup();
        let (alias, _) = ecdsa_key(0x22);
        resolver
            .notify(&Entity {
                alias: Some(alias.clone()),
                deleted: Some(true),
                ..Entity::new(account(0, 5002))
            })
            .unwrap();

        let err = resolver
            .lookup_account(&AccountId::alias(0, 0, alias))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::AliasNotFound { .. }));
        assert_eq!(store.alias_reads(), 1);
    }

    // =============================================================================
    // PERSISTED ALIASES
    // =============================================================================

    #[test]
    fn test_persisted_alias_loaded_once() {
        let (alias, _) = ecdsa_key(0x33);
        let id = account(0, 6001);
        let store = Arc::new(InMemoryResolutionStore::from_entities(&[Entity {
            alias: Some(alias.clone()),
            ..Entity::new(id)
        }]));
        let resolver = EntityIdService::new(Arc::clone(&store));

        for _ in 0..5 {
            let resolved = resolver
                .lookup_account(&AccountId::alias(0, 0, alias.clone()))
                .unwrap();
            assert_eq!(resolved, id);
        }
        assert_eq!(store.alias_reads(), 1);
        assert_eq!(resolver.cache().stats().hits, 4);
    }

    #[test]
    fn test_cache_keys_scoped_to_realm() {
        let (_store, resolver) = setup();
        let (alias, _) = ecdsa_key(0x44);
        resolver
            .notify(&Entity {
                alias: Some(alias.clone()),
                ..Entity::new(account(2, 10))
            })
            .unwrap();

        assert_eq!(
            resolver
                .lookup_account(&AccountId::alias(0, 2, alias.clone()))
                .unwrap(),
            account(2, 10)
        );
        assert!(resolver.lookup_account(&AccountId::alias(0, 0, alias)).is_err());
    }

    #[test]
    fn test_long_zero_address_needs_no_entity() {
        let (store, resolver) = setup();
        let id = account(0, 1234);
        let address = id.to_evm_address();

        assert_eq!(
            resolver.lookup_account(&AccountId::alias(0, 0, address)).unwrap(),
            id
        );
        assert_eq!(store.total_reads(), 0);
        assert!(resolver.cache().is_empty());
    }
}
