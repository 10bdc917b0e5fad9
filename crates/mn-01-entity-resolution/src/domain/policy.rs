//! # Not-Found Policy
//!
//! What a caller does when an alias or EVM address has no mapping yet.

use crate::errors::ResolutionError;
use serde::{Deserialize, Serialize};
use shared_types::EntityId;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Policy applied to recoverable resolution failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotFoundPolicy {
    /// Propagate the failure and abort the enclosing operation.
    Error,
    /// Log, then continue with the next candidate or substitute `EMPTY`.
    #[default]
    Fallthrough,
    /// Log, then omit the dependent field or record.
    Skip,
}

impl fmt::Display for NotFoundPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Fallthrough => "fallthrough",
            Self::Skip => "skip",
        };
        f.write_str(name)
    }
}

impl FromStr for NotFoundPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "fallthrough" | "default" => Ok(Self::Fallthrough),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown not-found policy: {other}")),
        }
    }
}

/// Resolve candidates left to right, returning the first non-empty id.
///
/// Recoverable failures propagate immediately under [`NotFoundPolicy::Error`]
/// and are logged and skipped otherwise. Store failures always propagate.
/// Exhausting every candidate yields `EntityId::EMPTY`.
///
/// # Errors
///
/// See above.
pub fn first_resolved<T, F>(
    policy: NotFoundPolicy,
    candidates: &[T],
    mut resolve: F,
) -> Result<EntityId, ResolutionError>
where
    F: FnMut(&T) -> Result<EntityId, ResolutionError>,
{
    for (position, candidate) in candidates.iter().enumerate() {
        match resolve(candidate) {
            Ok(id) if !id.is_empty() => return Ok(id),
            Ok(_) => {}
            Err(err) if err.is_recoverable() && policy != NotFoundPolicy::Error => {
                warn!(position, %policy, error = %err, "Unable to resolve candidate id");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(EntityId::EMPTY)
}

// =============================================================================
// TESTS
// =============================================================================
