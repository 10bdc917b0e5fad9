//! # Inbound Ports (Driving Ports)
//!
//! API exposed by contract result reconciliation.

use crate::domain::{RecordItem, Transaction};
use crate::errors::ReconcileError;
use crate::ports::outbound::EntityListener;

/// Reconciles one transaction record into persistable records.
pub trait ContractResultApi: Send + Sync {
    /// Process `item`, whose ids were resolved into `transaction`, emitting
    /// every produced record into `listener`.
    ///
    /// # Errors
    ///
    /// Resolution failures not absorbed by the configured policy, malformed
    /// sidecars and migration failures abort the transaction.
    fn process(
        &self,
        item: &RecordItem,
        transaction: &Transaction,
        listener: &dyn EntityListener,
    ) -> Result<(), ReconcileError>;
}
