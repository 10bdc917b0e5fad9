//! # Core Domain Entities
//!
//! Identifier types shared by every ingestion subsystem.
//!
//! ## Clusters
//!
//! - **Canonical identity**: `EntityId`, `EntityKind`
//! - **Wire-level identity**: `AccountId`, `ContractId` (as decoded from the
//!   ledger protocol, before resolution)
//! - **Protocol versioning**: `HapiVersion`

use crate::errors::{InvalidEntityError, VersionParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 20-byte EVM-style address.
pub type EvmAddress = [u8; 20];

/// Length of an EVM address in bytes.
pub const EVM_ADDRESS_LENGTH: usize = 20;

// =============================================================================
// CLUSTER A: CANONICAL IDENTITY
// =============================================================================

/// Bits available to the shard component of a packed id.
pub const SHARD_BITS: u32 = 15;
/// Bits available to the realm component of a packed id.
pub const REALM_BITS: u32 = 16;
/// Bits available to the entity number of a packed id.
pub const NUM_BITS: u32 = 32;

const SHARD_MASK: u64 = (1 << SHARD_BITS) - 1;
const REALM_MASK: u64 = (1 << REALM_BITS) - 1;
const NUM_MASK: u64 = (1 << NUM_BITS) - 1;

/// The kind of ledger entity an id refers to.
///
/// Codes are stable and used in persistence. Unknown codes decode to
/// `Unknown` instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// Code not recognised.
    Unknown,
    /// Crypto account.
    Account,
    /// Smart contract.
    Contract,
    /// File service file.
    File,
    /// Consensus topic.
    Topic,
    /// Token.
    Token,
    /// Scheduled transaction.
    Schedule,
}

impl EntityKind {
    /// Persistence code for this kind.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Account => 1,
            Self::Contract => 2,
            Self::File => 3,
            Self::Topic => 4,
            Self::Token => 5,
            Self::Schedule => 6,
        }
    }

    /// Decode a persistence code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Account,
            2 => Self::Contract,
            3 => Self::File,
            4 => Self::Topic,
            5 => Self::Token,
            6 => Self::Schedule,
            _ => Self::Unknown,
        }
    }

    /// Whether entities of this kind can be addressed by alias or EVM address.
    #[must_use]
    pub const fn is_aliasable(self) -> bool {
        matches!(self, Self::Account | Self::Contract)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "UNKNOWN",
            Self::Account => "ACCOUNT",
            Self::Contract => "CONTRACT",
            Self::File => "FILE",
            Self::Topic => "TOPIC",
            Self::Token => "TOKEN",
            Self::Schedule => "SCHEDULE",
        };
        f.write_str(name)
    }
}

/// Canonical identifier of a ledger entity.
///
/// Immutable once built. `(shard, realm, num)` packs into a 63-bit integer
/// via [`EntityId::id`]; the packed value ignores `kind`, so two ids that
/// differ only by kind are unequal but share a packed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    shard: u64,
    realm: u64,
    num: u64,
    kind: EntityKind,
}

impl EntityId {
    /// The canonical "absent" id, `0.0.0`.
    pub const EMPTY: Self = Self {
        shard: 0,
        realm: 0,
        num: 0,
        kind: EntityKind::Account,
    };

    /// Build an id, rejecting components that do not fit the packed layout.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEntityError` if any component overflows its bit width.
    pub const fn of(
        shard: u64,
        realm: u64,
        num: u64,
        kind: EntityKind,
    ) -> Result<Self, InvalidEntityError> {
        if shard > SHARD_MASK || realm > REALM_MASK || num > NUM_MASK {
            return Err(InvalidEntityError { shard, realm, num });
        }
        Ok(Self {
            shard,
            realm,
            num,
            kind,
        })
    }

    /// Unpack a persisted 63-bit id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEntityError` for negative input.
    pub fn decode(id: i64, kind: EntityKind) -> Result<Self, InvalidEntityError> {
        let raw = u64::try_from(id).map_err(|_| InvalidEntityError {
            shard: 0,
            realm: 0,
            num: id.unsigned_abs(),
        })?;
        Self::of(
            (raw >> (REALM_BITS + NUM_BITS)) & SHARD_MASK,
            (raw >> NUM_BITS) & REALM_MASK,
            raw & NUM_MASK,
            kind,
        )
    }

    /// Decode a long-zero EVM address (4-byte shard, 8-byte realm, 8-byte num,
    /// big-endian).
    ///
    /// # Errors
    ///
    /// Returns `InvalidEntityError` if the decoded components overflow.
    pub fn from_evm_address(
        address: &EvmAddress,
        kind: EntityKind,
    ) -> Result<Self, InvalidEntityError> {
        let (shard, realm, num) = split_evm_address(address);
        Self::of(shard, realm, num, kind)
    }

    /// Shard component.
    #[must_use]
    pub const fn shard(&self) -> u64 {
        self.shard
    }

    /// Realm component.
    #[must_use]
    pub const fn realm(&self) -> u64 {
        self.realm
    }

    /// Entity number.
    #[must_use]
    pub const fn num(&self) -> u64 {
        self.num
    }

    /// Entity kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The same entity tagged with another kind.
    #[must_use]
    pub const fn with_kind(self, kind: EntityKind) -> Self {
        Self { kind, ..self }
    }

    /// Packed numeric id. Pure function of `(shard, realm, num)`.
    #[must_use]
    pub const fn id(&self) -> i64 {
        ((self.shard << (REALM_BITS + NUM_BITS)) | (self.realm << NUM_BITS) | self.num) as i64
    }

    /// Whether this is `0.0.0`, regardless of kind.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.shard == 0 && self.realm == 0 && self.num == 0
    }

    /// `true` for `None` and for the empty id.
    #[must_use]
    pub fn is_absent(id: Option<&Self>) -> bool {
        id.map_or(true, Self::is_empty)
    }

    /// Long-zero EVM address of this id.
    #[must_use]
    pub fn to_evm_address(&self) -> EvmAddress {
        let mut address = [0u8; EVM_ADDRESS_LENGTH];
        // Shard fits in 15 bits, so the 4-byte field never truncates.
        address[..4].copy_from_slice(&(self.shard as u32).to_be_bytes());
        address[4..12].copy_from_slice(&self.realm.to_be_bytes());
        address[12..].copy_from_slice(&self.num.to_be_bytes());
        address
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

/// Split a long-zero address into raw `(shard, realm, num)` without range checks.
#[must_use]
pub fn split_evm_address(address: &EvmAddress) -> (u64, u64, u64) {
    let mut shard = [0u8; 4];
    let mut realm = [0u8; 8];
    let mut num = [0u8; 8];
    shard.copy_from_slice(&address[..4]);
    realm.copy_from_slice(&address[4..12]);
    num.copy_from_slice(&address[12..]);
    (
        u64::from(u32::from_be_bytes(shard)),
        u64::from_be_bytes(realm),
        u64::from_be_bytes(num),
    )
}

/// Copy a slice into an EVM address. Returns None if wrong length.
#[must_use]
pub fn evm_address_from_slice(slice: &[u8]) -> Option<EvmAddress> {
    <EvmAddress>::try_from(slice).ok()
}

// =============================================================================
// CLUSTER B: WIRE-LEVEL IDENTITY
// =============================================================================

/// How a wire-level account reference addresses its account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRef {
    /// Sequential entity number.
    Num(u64),
    /// Public-key-derived alias, or a 20-byte EVM address.
    Alias(Vec<u8>),
}

/// An account reference exactly as it appears on the wire.
///
/// The default value (no reference set) is the protocol's zero sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId {
    /// Shard number.
    pub shard_num: u64,
    /// Realm number.
    pub realm_num: u64,
    /// The account reference, if set.
    pub account: Option<AccountRef>,
}

impl AccountId {
    /// Numerically addressed account.
    #[must_use]
    pub const fn num(shard_num: u64, realm_num: u64, num: u64) -> Self {
        Self {
            shard_num,
            realm_num,
            account: Some(AccountRef::Num(num)),
        }
    }

    /// Alias-addressed account.
    #[must_use]
    pub fn alias(shard_num: u64, realm_num: u64, alias: impl Into<Vec<u8>>) -> Self {
        Self {
            shard_num,
            realm_num,
            account: Some(AccountRef::Alias(alias.into())),
        }
    }

    /// Whether this is the protocol's zero-value sentinel.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.shard_num == 0 && self.realm_num == 0 && self.account.is_none()
    }
}

/// How a wire-level contract reference addresses its contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractRef {
    /// Sequential entity number.
    Num(u64),
    /// 20-byte EVM address.
    EvmAddress(Vec<u8>),
}

/// A contract reference exactly as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId {
    /// Shard number.
    pub shard_num: u64,
    /// Realm number.
    pub realm_num: u64,
    /// The contract reference, if set.
    pub contract: Option<ContractRef>,
}

impl ContractId {
    /// Numerically addressed contract.
    #[must_use]
    pub const fn num(shard_num: u64, realm_num: u64, num: u64) -> Self {
        Self {
            shard_num,
            realm_num,
            contract: Some(ContractRef::Num(num)),
        }
    }

    /// EVM-address-addressed contract.
    #[must_use]
    pub fn evm_address(shard_num: u64, realm_num: u64, address: impl Into<Vec<u8>>) -> Self {
        Self {
            shard_num,
            realm_num,
            contract: Some(ContractRef::EvmAddress(address.into())),
        }
    }

    /// Whether this is the protocol's zero-value sentinel.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.shard_num == 0 && self.realm_num == 0 && self.contract.is_none()
    }

    /// The numeric entity number, if numerically addressed.
    #[must_use]
    pub fn contract_num(&self) -> Option<u64> {
        match self.contract {
            Some(ContractRef::Num(num)) => Some(num),
            _ => None,
        }
    }
}

// =============================================================================
// CLUSTER C: PROTOCOL VERSIONING
// =============================================================================

/// Ledger API (HAPI) version a record was produced under.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct HapiVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl HapiVersion {
    /// Create a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for HapiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for HapiVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionParseError(s.to_string());
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u32, VersionParseError> {
            parts
                .next()
                .ok_or_else(invalid)?
                .parse::<u32>()
                .map_err(|_| invalid())
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

// =============================================================================
// TESTS
// =============================================================================
