//! # Record Items
//!
//! Decoded transaction records as handed over by the record file parser,
//! plus the [`Transaction`] value built from one after its ids are resolved.
//!
//! Ids in this module are wire-level (`AccountId`, `ContractId`) until the
//! ingestor resolves them.

use crate::domain::sidecar::SidecarRecord;
use serde::{Deserialize, Serialize};
use shared_types::{AccountId, ContractId, EntityId, HapiVersion};

/// Ledger transaction hashes are SHA-384; persisted hashes keep 32 bytes.
pub const TRANSACTION_HASH_LENGTH: usize = 32;

/// Transaction status codes relevant to reconciliation.
pub mod response_code {
    /// Transaction succeeded.
    pub const SUCCESS: i32 = 22;
    /// Fee schedule chunk uploaded; counts as success.
    pub const FEE_SCHEDULE_FILE_PART_UPLOADED: i32 = 104;
    /// Succeeded, but an expected follow-up operation was absent.
    pub const SUCCESS_BUT_MISSING_EXPECTED_OPERATION: i32 = 220;

    /// Whether `code` is a successful outcome.
    #[must_use]
    pub const fn is_successful(code: i32) -> bool {
        matches!(
            code,
            SUCCESS | FEE_SCHEDULE_FILE_PART_UPLOADED | SUCCESS_BUT_MISSING_EXPECTED_OPERATION
        )
    }
}

// =============================================================================
// TRANSACTION BODIES
// =============================================================================

/// Body of a `ContractCall` transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractCallBody {
    /// Called contract.
    pub contract_id: ContractId,
    /// Gas limit.
    pub gas: i64,
    /// Tinybars sent with the call.
    pub amount: i64,
    /// ABI-encoded call parameters.
    pub function_parameters: Vec<u8>,
}

/// Body of a `ContractCreate` transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractCreateBody {
    /// File holding the init code.
    pub file_id: Option<EntityId>,
    /// Inline init code.
    pub initcode: Option<Vec<u8>>,
    /// Admin key bytes.
    pub admin_key: Option<Vec<u8>>,
    /// Auto-renew period in seconds.
    pub auto_renew_period: Option<i64>,
    /// Account paying auto-renewal.
    pub auto_renew_account_id: Option<AccountId>,
    /// Proxy account.
    pub proxy_account_id: Option<AccountId>,
    /// Memo.
    pub memo: String,
    /// Gas limit.
    pub gas: i64,
    /// Initial balance in tinybars.
    pub initial_balance: i64,
    /// ABI-encoded constructor parameters.
    pub constructor_parameters: Vec<u8>,
}

/// Body of an `EthereumTransaction`, already decoded from its RLP payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EthereumTransactionBody {
    /// Gas limit.
    pub gas_limit: i64,
    /// Value sent.
    pub value: i64,
    /// Call data.
    pub call_data: Vec<u8>,
}

/// Transaction body, by transaction type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionBody {
    /// Smart contract call.
    ContractCall(ContractCallBody),
    /// Smart contract creation.
    ContractCreate(ContractCreateBody),
    /// EVM-encoded transaction.
    EthereumTransaction(EthereumTransactionBody),
    /// Any transaction type without contract-specific fields.
    #[default]
    Other,
}

impl TransactionBody {
    /// Whether this is a native contract call or create.
    #[must_use]
    pub const fn is_contract_call_or_create(&self) -> bool {
        matches!(self, Self::ContractCall(_) | Self::ContractCreate(_))
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// Ids assigned by the transaction receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionReceipt {
    /// Contract created or called.
    pub contract_id: ContractId,
    /// Account created.
    pub account_id: AccountId,
}

/// One EVM log as carried by a function result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractLogInfo {
    /// Emitting contract.
    pub contract_id: ContractId,
    /// Bloom filter.
    pub bloom: Vec<u8>,
    /// Log data.
    pub data: Vec<u8>,
    /// Up to four topics.
    pub topics: Vec<Vec<u8>>,
}

/// Result of a contract call or create.
///
/// The all-default value is the protocol's "no result" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractFunctionResult {
    /// Contract that was executed.
    pub contract_id: ContractId,
    /// Output bytes.
    pub contract_call_result: Vec<u8>,
    /// EVM error message, empty on success.
    pub error_message: String,
    /// Bloom filter over all logs.
    pub bloom: Vec<u8>,
    /// Gas used.
    pub gas_used: i64,
    /// Emitted logs, in order.
    pub log_info: Vec<ContractLogInfo>,
    /// Contracts created during execution.
    pub created_contract_ids: Vec<ContractId>,
    /// EVM address of the created contract.
    pub evm_address: Option<Vec<u8>>,
    /// Sender of an EVM-originated call.
    pub sender_id: Option<AccountId>,
    /// The result exactly as encoded in the record.
    pub encoded: Vec<u8>,
}

impl ContractFunctionResult {
    /// Whether this is the protocol's "no result" sentinel.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A decoded transaction record with its sidecars.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordItem {
    /// Consensus timestamp (nanoseconds).
    pub consensus_timestamp: i64,
    /// Position within the record file.
    pub transaction_index: i32,
    /// Protocol version of the record file.
    pub hapi_version: HapiVersion,
    /// Paying account, as on the wire.
    pub payer_account_id: AccountId,
    /// Ledger transaction hash (48 bytes).
    pub transaction_hash: Vec<u8>,
    /// Ethereum transaction hash, for EVM-encoded transactions.
    pub ethereum_hash: Option<Vec<u8>>,
    /// Status code.
    pub status: i32,
    /// Transaction body.
    pub body: TransactionBody,
    /// Receipt.
    pub receipt: TransactionReceipt,
    /// Create result.
    pub contract_create_result: Option<ContractFunctionResult>,
    /// Call result.
    pub contract_call_result: Option<ContractFunctionResult>,
    /// Sidecar records for this transaction.
    pub sidecars: Vec<SidecarRecord>,
}

impl RecordItem {
    /// Whether the transaction succeeded.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        response_code::is_successful(self.status)
    }

    /// Whether reconciling this item may seed the resolution cache with a
    /// created contract's EVM address. Later items in the same batch must
    /// not be resolved before it.
    #[must_use]
    pub fn seeds_resolution_cache(&self) -> bool {
        self.contract_create_result
            .as_ref()
            .and_then(|result| result.evm_address.as_deref())
            .is_some_and(|address| !address.is_empty())
    }

    /// The create result if present, else the call result, unless it is the
    /// "no result" sentinel.
    #[must_use]
    pub fn function_result(&self) -> Option<&ContractFunctionResult> {
        self.contract_create_result
            .as_ref()
            .or(self.contract_call_result.as_ref())
            .filter(|result| !result.is_default())
    }

    /// Hash to persist: the Ethereum hash when present, else the ledger hash
    /// truncated to 32 bytes.
    #[must_use]
    pub fn persisted_transaction_hash(&self) -> Vec<u8> {
        match self.ethereum_hash.as_deref() {
            Some(hash) if !hash.is_empty() => hash.to_vec(),
            _ => {
                let len = self.transaction_hash.len().min(TRANSACTION_HASH_LENGTH);
                self.transaction_hash[..len].to_vec()
            }
        }
    }
}

/// A record item's identity after resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Consensus timestamp.
    pub consensus_timestamp: i64,
    /// Resolved entity the transaction targets, if any.
    pub entity_id: Option<EntityId>,
    /// Resolved payer.
    pub payer_account_id: EntityId,
    /// Position within the record file.
    pub index: i32,
    /// Status code.
    pub result: i32,
}

// =============================================================================
// TESTS
// =============================================================================
