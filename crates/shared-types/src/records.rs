//! # Persisted Records
//!
//! Canonical, append-only records produced by ingestion and handed to the
//! entity listener for batched persistence.
//!
//! ## Keys
//!
//! | Record | Key |
//! |--------|-----|
//! | `Entity` | `id` |
//! | `Contract` | `id` |
//! | `ContractResult` | `consensus_timestamp` |
//! | `ContractLog` | `(consensus_timestamp, index)` |
//! | `ContractStateChange` | `(consensus_timestamp, contract_id, slot)` |
//! | `ContractAction` | `(consensus_timestamp, index)` |

use crate::entities::{EntityId, EntityKind};
use serde::{Deserialize, Serialize};

// =============================================================================
// ENTITIES
// =============================================================================

/// A ledger entity (account, contract, ...) as persisted.
///
/// Optional fields left `None` are not touched on upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Canonical id; its kind is the entity type.
    pub id: EntityId,
    /// Public-key-derived alias.
    pub alias: Option<Vec<u8>>,
    /// Independently assigned 20-byte EVM address.
    pub evm_address: Option<Vec<u8>>,
    /// Admin key bytes.
    pub key: Option<Vec<u8>>,
    /// Memo.
    pub memo: Option<String>,
    /// Balance in tinybars.
    pub balance: Option<i64>,
    /// Whether the entity is deleted.
    pub deleted: Option<bool>,
    /// Consensus timestamp of creation.
    pub created_timestamp: Option<i64>,
    /// Lower bound of the validity range of this version.
    pub timestamp_lower: Option<i64>,
    /// Auto-renew period in seconds.
    pub auto_renew_period: Option<i64>,
    /// Account paying auto-renewal.
    pub auto_renew_account_id: Option<EntityId>,
    /// Proxy account.
    pub proxy_account_id: Option<EntityId>,
    /// Maximum automatic token associations.
    pub max_automatic_token_associations: Option<i32>,
}

impl Entity {
    /// A bare entity with only its id set.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Entity type.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.id.kind()
    }

    /// Whether this entity is flagged deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted == Some(true)
    }
}

/// Contract-specific attributes of a contract entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Contract id.
    pub id: EntityId,
    /// File holding the init code, when created from a file.
    pub file_id: Option<EntityId>,
    /// Inline init code.
    pub initcode: Option<Vec<u8>>,
}

// =============================================================================
// CONTRACT EXECUTION
// =============================================================================

/// Outcome of one contract call/create, keyed by consensus timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractResult {
    /// Consensus timestamp (nanoseconds).
    pub consensus_timestamp: i64,
    /// Resolved contract id.
    pub contract_id: EntityId,
    /// Payer account.
    pub payer_account_id: EntityId,
    /// 32-byte transaction hash.
    pub transaction_hash: Vec<u8>,
    /// Index of the transaction within its record file.
    pub transaction_index: i32,
    /// Transaction status code.
    pub transaction_result: i32,
    /// Value sent with the call.
    pub amount: Option<i64>,
    /// Gas limit.
    pub gas_limit: Option<i64>,
    /// Gas used.
    pub gas_used: Option<i64>,
    /// Call parameters or constructor parameters.
    pub function_parameters: Option<Vec<u8>>,
    /// Raw encoded function result.
    pub function_result: Option<Vec<u8>>,
    /// Call result bytes.
    pub call_result: Option<Vec<u8>>,
    /// Bloom filter.
    pub bloom: Option<Vec<u8>>,
    /// EVM error message.
    pub error_message: Option<String>,
    /// Packed ids of contracts created during execution.
    pub created_contract_ids: Vec<i64>,
    /// Init code of a failed creation.
    pub failed_initcode: Option<Vec<u8>>,
    /// Sender of an EVM-originated call.
    pub sender_id: Option<EntityId>,
}

/// One EVM log emitted during execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractLog {
    /// Consensus timestamp.
    pub consensus_timestamp: i64,
    /// 0-based position within the function result.
    pub index: i32,
    /// Contract that emitted the log.
    pub contract_id: EntityId,
    /// Entry point of the call.
    pub root_contract_id: EntityId,
    /// Payer account.
    pub payer_account_id: EntityId,
    /// 32-byte transaction hash.
    pub transaction_hash: Vec<u8>,
    /// Transaction index.
    pub transaction_index: i32,
    /// Bloom filter.
    pub bloom: Vec<u8>,
    /// Log data.
    pub data: Vec<u8>,
    /// Topic 0.
    pub topic0: Option<Vec<u8>>,
    /// Topic 1.
    pub topic1: Option<Vec<u8>>,
    /// Topic 2.
    pub topic2: Option<Vec<u8>>,
    /// Topic 3.
    pub topic3: Option<Vec<u8>>,
}

/// A storage slot read or write.
///
/// `value_written == None` means the slot was only read; `Some(vec![])`
/// means it was written with an empty (zero) value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStateChange {
    /// Consensus timestamp.
    pub consensus_timestamp: i64,
    /// Contract owning the slot.
    pub contract_id: EntityId,
    /// Storage slot.
    pub slot: Vec<u8>,
    /// Value read.
    pub value_read: Vec<u8>,
    /// Value written, if any.
    pub value_written: Option<Vec<u8>>,
    /// Produced by a state migration rather than execution.
    pub migration: bool,
    /// Payer account.
    pub payer_account_id: EntityId,
}

/// Which variant carried the result payload of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultDataType {
    /// Successful output.
    Output,
    /// Revert reason.
    RevertReason,
    /// Halt error.
    Error,
}

/// One call frame of an EVM execution trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAction {
    /// Consensus timestamp.
    pub consensus_timestamp: i64,
    /// 0-based position among the transaction's actions.
    pub index: i32,
    /// Call depth.
    pub call_depth: i32,
    /// EVM operation code of the call (`CALL`, `CREATE2`, ...).
    pub call_operation_type: i32,
    /// Action type code (`CALL`, `CREATE`, `PRECOMPILE`, `SYSTEM`).
    pub call_type: i32,
    /// Calling account or contract.
    pub caller: EntityId,
    /// Whether the caller is an account or a contract.
    pub caller_type: EntityKind,
    /// Gas supplied.
    pub gas: i64,
    /// Gas used.
    pub gas_used: i64,
    /// Call input.
    pub input: Vec<u8>,
    /// Payer account.
    pub payer_account_id: EntityId,
    /// Recipient account.
    pub recipient_account: Option<EntityId>,
    /// Raw recipient address when it did not resolve to an entity.
    pub recipient_address: Option<Vec<u8>>,
    /// Recipient contract.
    pub recipient_contract: Option<EntityId>,
    /// Result payload.
    pub result_data: Vec<u8>,
    /// Which variant carried `result_data`.
    pub result_data_type: ResultDataType,
    /// Value transferred.
    pub value: i64,
}

// =============================================================================
// TESTS
// =============================================================================
