//! Policy application for single-id lookups made while reconciling.

use crate::errors::ReconcileError;
use mn_01_entity_resolution::{NotFoundPolicy, ResolutionError};
use shared_types::EntityId;
use tracing::warn;

/// Apply `policy` to one lookup.
///
/// `Ok(None)` means a recoverable miss that the policy absorbed; the caller
/// decides whether that omits a field or the whole record. Store failures
/// always propagate.
pub(crate) fn resolve_or_absorb(
    policy: NotFoundPolicy,
    lookup: Result<EntityId, ResolutionError>,
    consensus_timestamp: i64,
    field: &'static str,
) -> Result<Option<EntityId>, ReconcileError> {
    match lookup {
        Ok(id) => Ok(Some(id)),
        Err(err) if err.is_recoverable() && policy != NotFoundPolicy::Error => {
            warn!(consensus_timestamp, field, %policy, error = %err, "Unable to resolve id");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
