//! # Sidecar Records
//!
//! Side-channel records attached to a transaction: storage slot changes,
//! the EVM call trace, and contract bytecode.
//!
//! Caller, recipient and result payload are closed sum types. An absent
//! variant (`None`) is a decoding invariant violation for callers and
//! results, and allowed for recipients of create-type actions only.

use serde::{Deserialize, Serialize};
use shared_types::{AccountId, ContractId};

// =============================================================================
// CODES
// =============================================================================

/// Kind of call frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractActionType {
    /// Not set.
    #[default]
    NoAction,
    /// Message call.
    Call,
    /// Contract creation.
    Create,
    /// Precompiled contract invocation.
    Precompile,
    /// System contract invocation.
    System,
}

impl ContractActionType {
    /// Protocol code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::NoAction => 0,
            Self::Call => 1,
            Self::Create => 2,
            Self::Precompile => 3,
            Self::System => 4,
        }
    }
}

/// EVM opcode that opened the call frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallOperationType {
    /// Not set.
    #[default]
    OpUnknown,
    /// `CALL`
    OpCall,
    /// `CALLCODE`
    OpCallcode,
    /// `DELEGATECALL`
    OpDelegatecall,
    /// `STATICCALL`
    OpStaticcall,
    /// `CREATE`
    OpCreate,
    /// `CREATE2`
    OpCreate2,
}

impl CallOperationType {
    /// Protocol code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::OpUnknown => 0,
            Self::OpCall => 1,
            Self::OpCallcode => 2,
            Self::OpDelegatecall => 3,
            Self::OpStaticcall => 4,
            Self::OpCreate => 5,
            Self::OpCreate2 => 6,
        }
    }

    /// `CREATE` or `CREATE2`.
    #[must_use]
    pub const fn is_create(self) -> bool {
        matches!(self, Self::OpCreate | Self::OpCreate2)
    }
}

// =============================================================================
// STATE CHANGES
// =============================================================================

/// One storage slot access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageChange {
    /// Slot key.
    pub slot: Vec<u8>,
    /// Value read.
    pub value_read: Vec<u8>,
    /// Value written; `None` if the slot was only read.
    pub value_written: Option<Vec<u8>>,
}

/// Storage accesses of one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractStateChangeEntry {
    /// Contract owning the storage.
    pub contract_id: ContractId,
    /// Slot accesses, in order.
    pub storage_changes: Vec<StorageChange>,
}

// =============================================================================
// ACTIONS
// =============================================================================

/// Who opened a call frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCaller {
    /// An account (EOA).
    Account(AccountId),
    /// A contract.
    Contract(ContractId),
}

/// Target of a call frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionRecipient {
    /// An account.
    Account(AccountId),
    /// A contract.
    Contract(ContractId),
    /// A raw address that does not belong to any entity.
    TargetedAddress(Vec<u8>),
}

/// How a call frame ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionResult {
    /// Returned normally.
    Output(Vec<u8>),
    /// Reverted.
    RevertReason(Vec<u8>),
    /// Halted.
    Error(Vec<u8>),
}

/// One call frame of the EVM trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractActionInfo {
    /// Frame kind.
    pub call_type: ContractActionType,
    /// Opening opcode.
    pub call_operation_type: CallOperationType,
    /// Caller.
    pub caller: Option<ActionCaller>,
    /// Recipient.
    pub recipient: Option<ActionRecipient>,
    /// Result payload.
    pub result: Option<ActionResult>,
    /// Call depth.
    pub call_depth: i32,
    /// Gas supplied.
    pub gas: i64,
    /// Gas used.
    pub gas_used: i64,
    /// Input data.
    pub input: Vec<u8>,
    /// Value transferred.
    pub value: i64,
}

impl ContractActionInfo {
    /// Whether this frame creates a contract.
    #[must_use]
    pub const fn is_create(&self) -> bool {
        matches!(self.call_type, ContractActionType::Create) || self.call_operation_type.is_create()
    }
}

// =============================================================================
// BYTECODE
// =============================================================================

/// Bytecode of one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractBytecode {
    /// Contract the bytecode belongs to.
    pub contract_id: ContractId,
    /// Init code.
    pub initcode: Vec<u8>,
    /// Deployed runtime bytecode.
    pub runtime_bytecode: Vec<u8>,
}

// =============================================================================
// SIDECAR RECORD
// =============================================================================

/// Sidecar payload, by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidecarPayload {
    /// Storage accesses, grouped by contract.
    StateChanges(Vec<ContractStateChangeEntry>),
    /// Call trace.
    Actions(Vec<ContractActionInfo>),
    /// Contract bytecode.
    Bytecode(ContractBytecode),
}

/// One sidecar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarRecord {
    /// Consensus timestamp of the owning transaction.
    pub consensus_timestamp: i64,
    /// Produced by a state migration rather than execution.
    #[serde(default)]
    pub migration: bool,
    /// Payload.
    pub payload: SidecarPayload,
}

// =============================================================================
// TESTS
// =============================================================================
