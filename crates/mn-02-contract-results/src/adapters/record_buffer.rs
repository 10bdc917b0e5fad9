//! Record Buffer
//!
//! An `EntityListener` that keeps emitted records in order. The batch
//! ingestor gives every transaction its own buffer and flushes the buffers
//! in transaction order; tests use it to inspect what was emitted.

use crate::ports::outbound::EntityListener;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::{
    Contract, ContractAction, ContractLog, ContractResult, ContractStateChange, Entity,
};

/// Any record an `EntityListener` can receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum EmittedRecord {
    /// See [`EntityListener::on_entity`].
    Entity(Entity),
    /// See [`EntityListener::on_contract`].
    Contract(Contract),
    /// See [`EntityListener::on_contract_result`].
    ContractResult(ContractResult),
    /// See [`EntityListener::on_contract_log`].
    ContractLog(ContractLog),
    /// See [`EntityListener::on_contract_state_change`].
    ContractStateChange(ContractStateChange),
    /// See [`EntityListener::on_contract_action`].
    ContractAction(ContractAction),
}

impl EmittedRecord {
    /// Deliver this record to `listener`.
    pub fn deliver(self, listener: &dyn EntityListener) {
        match self {
            Self::Entity(entity) => listener.on_entity(entity),
            Self::Contract(contract) => listener.on_contract(contract),
            Self::ContractResult(result) => listener.on_contract_result(result),
            Self::ContractLog(log) => listener.on_contract_log(log),
            Self::ContractStateChange(change) => listener.on_contract_state_change(change),
            Self::ContractAction(action) => listener.on_contract_action(action),
        }
    }
}

/// Ordered in-memory sink.
#[derive(Debug, Default)]
pub struct RecordBuffer {
    records: Mutex<Vec<EmittedRecord>>,
}

impl RecordBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Copy of the buffered records, in emission order.
    pub fn records(&self) -> Vec<EmittedRecord> {
        self.records.lock().clone()
    }

    /// Take the buffered records, in emission order.
    pub fn into_records(self) -> Vec<EmittedRecord> {
        self.records.into_inner()
    }

    /// Deliver every buffered record to `listener` in emission order.
    /// Returns the number delivered.
    pub fn replay_into(self, listener: &dyn EntityListener) -> usize {
        let records = self.into_records();
        let count = records.len();
        for record in records {
            record.deliver(listener);
        }
        count
    }

    /// Buffered entities.
    pub fn entities(&self) -> Vec<Entity> {
        self.filter(|record| match record {
            EmittedRecord::Entity(entity) => Some(entity.clone()),
            _ => None,
        })
    }

    /// Buffered contracts.
    pub fn contracts(&self) -> Vec<Contract> {
        self.filter(|record| match record {
            EmittedRecord::Contract(contract) => Some(contract.clone()),
            _ => None,
        })
    }

    /// Buffered contract results.
    pub fn contract_results(&self) -> Vec<ContractResult> {
        self.filter(|record| match record {
            EmittedRecord::ContractResult(result) => Some(result.clone()),
            _ => None,
        })
    }

    /// Buffered logs.
    pub fn contract_logs(&self) -> Vec<ContractLog> {
        self.filter(|record| match record {
            EmittedRecord::ContractLog(log) => Some(log.clone()),
            _ => None,
        })
    }

    /// Buffered state changes.
    pub fn contract_state_changes(&self) -> Vec<ContractStateChange> {
        self.filter(|record| match record {
            EmittedRecord::ContractStateChange(change) => Some(change.clone()),
            _ => None,
        })
    }

    /// Buffered actions.
    pub fn contract_actions(&self) -> Vec<ContractAction> {
        self.filter(|record| match record {
            EmittedRecord::ContractAction(action) => Some(action.clone()),
            _ => None,
        })
    }

    fn filter<T>(&self, pick: impl Fn(&EmittedRecord) -> Option<T>) -> Vec<T> {
        self.records.lock().iter().filter_map(pick).collect()
    }

    fn push(&self, record: EmittedRecord) {
        self.records.lock().push(record);
    }
}

impl EntityListener for RecordBuffer {
    fn on_entity(&self, entity: Entity) {
        self.push(EmittedRecord::Entity(entity));
    }

    fn on_contract(&self, contract: Contract) {
        self.push(EmittedRecord::Contract(contract));
    }

    fn on_contract_result(&self, result: ContractResult) {
        self.push(EmittedRecord::ContractResult(result));
    }

    fn on_contract_log(&self, log: ContractLog) {
        self.push(EmittedRecord::ContractLog(log));
    }

    fn on_contract_state_change(&self, state_change: ContractStateChange) {
        self.push(EmittedRecord::ContractStateChange(state_change));
    }

    fn on_contract_action(&self, action: ContractAction) {
        self.push(EmittedRecord::ContractAction(action));
    }
}

// =============================================================================
// TESTS
// =============================================================================
