//! # Sidecar Processor
//!
//! Drains a transaction's sidecar list in arrival order:
//!
//! | Payload | Effect |
//! |---------|--------|
//! | `StateChanges` | one `ContractStateChange` per slot access |
//! | `Actions` | one `ContractAction` per call frame, indexed across all action sidecars |
//! | `Bytecode`, migration | accumulated, handed to the `BytecodeMigrator` once |
//! | `Bytecode`, failed transaction | first init code kept as the failed init code |
//!
//! Without a listener only the bytecode hand-off runs.

use crate::domain::{
    state_change_root, resolve_contract_id, ActionCaller, ActionRecipient, ActionResult,
    ContractActionInfo, ContractStateChangeEntry, RecordItem, SidecarPayload, Transaction,
};
use crate::errors::ReconcileError;
use crate::lookup::resolve_or_absorb;
use crate::ports::outbound::{BytecodeMigrator, EntityListener};
use mn_01_entity_resolution::{EntityIdResolver, NotFoundPolicy};
use shared_types::{ContractAction, ContractStateChange, EntityId, EntityKind, ResultDataType};
use tracing::{debug, info, warn};

/// What sidecar processing produced besides emitted records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarOutcome {
    /// Init code of a failed creation, if a sidecar carried one.
    pub failed_initcode: Option<Vec<u8>>,
    /// State changes emitted.
    pub state_changes: u64,
    /// Actions emitted.
    pub actions: u64,
    /// Migration-flagged sidecars seen.
    pub migration_count: usize,
}

/// Sidecar processing for one transaction.
pub struct SidecarProcessor<'a, R: ?Sized, M: ?Sized> {
    resolver: &'a R,
    migrator: &'a M,
    policy: NotFoundPolicy,
}

impl<'a, R, M> SidecarProcessor<'a, R, M>
where
    R: EntityIdResolver + ?Sized,
    M: BytecodeMigrator + ?Sized,
{
    /// Create a processor.
    pub fn new(resolver: &'a R, migrator: &'a M, policy: NotFoundPolicy) -> Self {
        Self {
            resolver,
            migrator,
            policy,
        }
    }

    /// Process every sidecar of `item`.
    ///
    /// With `listener == None` state changes and actions are not emitted.
    /// The migrator is invoked exactly once either way.
    ///
    /// # Errors
    ///
    /// Malformed actions, unabsorbed resolution failures and migrator
    /// failures.
    pub fn process(
        &self,
        item: &RecordItem,
        transaction: &Transaction,
        listener: Option<&dyn EntityListener>,
    ) -> Result<SidecarOutcome, ReconcileError> {
        let consensus_timestamp = item.consensus_timestamp;
        let mut outcome = SidecarOutcome::default();
        let mut migration_batch = Vec::new();
        let mut action_index: i32 = 0;

        for sidecar in &item.sidecars {
            if sidecar.consensus_timestamp != consensus_timestamp {
                warn!(
                    consensus_timestamp,
                    sidecar_timestamp = sidecar.consensus_timestamp,
                    "Sidecar timestamp does not match its transaction, skipping"
                );
                continue;
            }
            if sidecar.migration {
                outcome.migration_count += 1;
            }

            match &sidecar.payload {
                SidecarPayload::Bytecode(bytecode) => {
                    if sidecar.migration {
                        migration_batch.push(bytecode.clone());
                    } else if !item.is_successful() && outcome.failed_initcode.is_none() {
                        outcome.failed_initcode = Some(bytecode.initcode.clone());
                    }
                }
                SidecarPayload::StateChanges(entries) => {
                    let Some(listener) = listener else { continue };
                    for entry in entries {
                        outcome.state_changes +=
                            self.state_changes(entry, sidecar.migration, transaction, listener);
                    }
                }
                SidecarPayload::Actions(actions) => {
                    let Some(listener) = listener else { continue };
                    for action in actions {
                        let index = action_index;
                        action_index += 1;
                        if self.action(action, index, transaction, listener)? {
                            outcome.actions += 1;
                        }
                    }
                }
            }
        }

        debug!(
            consensus_timestamp,
            sidecars = item.sidecars.len(),
            state_changes = outcome.state_changes,
            actions = outcome.actions,
            failed_initcode = outcome.failed_initcode.is_some(),
            "Processed sidecars"
        );
        if !migration_batch.is_empty() {
            info!(
                consensus_timestamp,
                contracts = migration_batch.len(),
                migration_count = outcome.migration_count,
                "Handing off migration bytecode"
            );
        }
        self.migrator
            .migrate(migration_batch, outcome.migration_count)?;

        Ok(outcome)
    }

    fn state_changes(
        &self,
        entry: &ContractStateChangeEntry,
        migration: bool,
        transaction: &Transaction,
        listener: &dyn EntityListener,
    ) -> u64 {
        let root = state_change_root(&entry.contract_id, transaction.entity_id);
        let contract_id = resolve_contract_id(self.resolver, &entry.contract_id, root);

        for change in &entry.storage_changes {
            listener.on_contract_state_change(ContractStateChange {
                consensus_timestamp: transaction.consensus_timestamp,
                contract_id,
                slot: change.slot.clone(),
                value_read: change.value_read.clone(),
                value_written: change.value_written.clone(),
                migration,
                payer_account_id: transaction.payer_account_id,
            });
        }
        entry.storage_changes.len() as u64
    }

    /// Emit one action. `Ok(false)` if a lenient `Skip` dropped it.
    fn action(
        &self,
        action: &ContractActionInfo,
        index: i32,
        transaction: &Transaction,
        listener: &dyn EntityListener,
    ) -> Result<bool, ReconcileError> {
        let consensus_timestamp = transaction.consensus_timestamp;

        let Some(caller) = &action.caller else {
            return Err(ReconcileError::malformed(
                consensus_timestamp,
                format!("action {index} has no caller"),
            ));
        };
        let Some(result) = &action.result else {
            return Err(ReconcileError::malformed(
                consensus_timestamp,
                format!("action {index} has no result"),
            ));
        };
        if action.recipient.is_none() && !action.is_create() {
            return Err(ReconcileError::malformed(
                consensus_timestamp,
                format!("non-create action {index} has no recipient"),
            ));
        }

        let (result_data, result_data_type) = match result {
            ActionResult::Output(data) => (data.clone(), ResultDataType::Output),
            ActionResult::RevertReason(data) => (data.clone(), ResultDataType::RevertReason),
            ActionResult::Error(data) => (data.clone(), ResultDataType::Error),
        };

        let (lookup, caller_type) = match caller {
            ActionCaller::Account(id) => (self.resolver.lookup_account(id), EntityKind::Account),
            ActionCaller::Contract(id) => (self.resolver.lookup_contract(id), EntityKind::Contract),
        };
        let caller = match resolve_or_absorb(self.policy, lookup, consensus_timestamp, "caller")? {
            Some(id) => id,
            None if self.policy == NotFoundPolicy::Skip => return Ok(false),
            None => EntityId::EMPTY,
        };

        let mut recipient_account = None;
        let mut recipient_contract = None;
        let mut recipient_address = None;
        match &action.recipient {
            None => {}
            Some(ActionRecipient::TargetedAddress(address)) => {
                recipient_address = Some(address.clone());
            }
            Some(ActionRecipient::Account(id)) => {
                let lookup = self.resolver.lookup_account(id);
                match resolve_or_absorb(self.policy, lookup, consensus_timestamp, "recipient")? {
                    Some(id) => recipient_account = Some(id),
                    None if self.policy == NotFoundPolicy::Skip => return Ok(false),
                    None => {}
                }
            }
            Some(ActionRecipient::Contract(id)) => {
                let lookup = self.resolver.lookup_contract(id);
                match resolve_or_absorb(self.policy, lookup, consensus_timestamp, "recipient")? {
                    Some(id) => recipient_contract = Some(id),
                    None if self.policy == NotFoundPolicy::Skip => return Ok(false),
                    None => {}
                }
            }
        }

        listener.on_contract_action(ContractAction {
            consensus_timestamp,
            index,
            call_depth: action.call_depth,
            call_operation_type: action.call_operation_type.code(),
            call_type: action.call_type.code(),
            caller,
            caller_type,
            gas: action.gas,
            gas_used: action.gas_used,
            input: action.input.clone(),
            payer_account_id: transaction.payer_account_id,
            recipient_account,
            recipient_address,
            recipient_contract,
            result_data,
            result_data_type,
            value: action.value,
        });
        Ok(true)
    }
}

// =============================================================================
// TESTS
// =============================================================================
