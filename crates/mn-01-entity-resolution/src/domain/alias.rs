//! # Alias & EVM Address Codecs
//!
//! Pure conversions between aliases, EVM addresses and entity ids.
//! No I/O; everything here can run before touching the cache or store.

use sha3::{Digest, Keccak256};
use shared_types::{evm_address_from_slice, EntityId, EntityKind, EvmAddress};

/// Protobuf prefix of a serialized ECDSA(secp256k1) key: field 7, 33 bytes.
pub const ECDSA_SECP256K1_ALIAS_PREFIX: [u8; 2] = [0x3a, 0x21];

/// Length of an ECDSA(secp256k1) key alias (prefix + compressed key).
pub const ECDSA_SECP256K1_ALIAS_LENGTH: usize = 35;

/// Derive the EVM address of an ECDSA(secp256k1) key alias.
///
/// Returns `None` for any other alias shape, or if the key is not a valid
/// curve point.
#[must_use]
pub fn alias_to_evm_address(alias: &[u8]) -> Option<EvmAddress> {
    use k256::elliptic_curve::sec1::ToEncodedPoint;

    if alias.len() != ECDSA_SECP256K1_ALIAS_LENGTH || alias[..2] != ECDSA_SECP256K1_ALIAS_PREFIX {
        return None;
    }

    let public_key = k256::PublicKey::from_sec1_bytes(&alias[2..]).ok()?;
    let uncompressed = public_key.to_encoded_point(false);
    let hash = Keccak256::digest(&uncompressed.as_bytes()[1..]);
    evm_address_from_slice(&hash[12..])
}

/// Zero-I/O reverse mapping of a long-zero EVM address.
///
/// Only yields an id when the address decodes to a representable entity in
/// the caller's own shard and realm.
#[must_use]
pub fn long_zero_entity_id(
    shard: u64,
    realm: u64,
    address: &[u8],
    kind: EntityKind,
) -> Option<EntityId> {
    let address = evm_address_from_slice(address)?;
    let id = EntityId::from_evm_address(&address, kind).ok()?;
    (id.shard() == shard && id.realm() == realm).then_some(id)
}

// =============================================================================
// TESTS
// =============================================================================
