//! # Resolution Cache (Single-Flight Memoization)
//!
//! Shared, thread-safe memoization in front of the resolution store, keyed by
//! the raw wire-level id rather than the resolved value.
//!
//! ## Problem
//!
//! Many transactions in one batch reference the same alias. Without
//! deduplication, N workers missing the cache at once issue N identical
//! store reads.
//!
//! ## Solution: Per-Key Flights
//!
//! - Resolved values live in a `DashMap`.
//! - A miss registers (or joins) a *flight* for that key. Exactly one caller,
//!   the leader, runs the loader; followers block on the flight's condvar and
//!   receive the leader's outcome, success or failure.
//! - Failures are handed to the current followers only. The flight is then
//!   retired, so the next lookup retries the loader.
//! - `put` (the notify write path) is a plain upsert. A loader that finishes
//!   after a `put` for the same key keeps the `put` value.
//!
//! The in-flight table lock is held only to register or retire a flight,
//! never across a store call.

use crate::errors::ResolutionError;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use shared_types::{AccountId, ContractId, EntityId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cache key: the wire-level id, compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireKey {
    /// Account reference.
    Account(AccountId),
    /// Contract reference.
    Contract(ContractId),
}

type LoadOutcome = Result<EntityId, ResolutionError>;

/// One in-flight load shared by the leader and its followers.
#[derive(Default)]
struct Flight {
    outcome: Mutex<Option<LoadOutcome>>,
    done: Condvar,
}

impl Flight {
    fn complete(&self, outcome: LoadOutcome) {
        let mut slot = self.outcome.lock();
        if slot.is_none() {
            *slot = Some(outcome);
        }
        self.done.notify_all();
    }

    fn wait(&self) -> LoadOutcome {
        let mut slot = self.outcome.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            self.done.wait(&mut slot);
        }
    }
}

/// Retires a flight even if the loader unwinds, so followers never hang.
struct FlightGuard<'a> {
    cache: &'a ResolutionCache,
    key: &'a WireKey,
    flight: Arc<Flight>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flight.complete(Err(ResolutionError::LoadAborted));
        self.cache.in_flight.lock().remove(self.key);
    }
}

/// Cache statistics for monitoring.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Resolved entries currently cached.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that started or joined a load.
    pub misses: u64,
    /// Loader invocations.
    pub loads: u64,
    /// Loader invocations that failed.
    pub load_failures: u64,
}

/// Shared memoization layer for wire-level id resolution.
#[derive(Default)]
pub struct ResolutionCache {
    entries: DashMap<WireKey, EntityId>,
    in_flight: Mutex<HashMap<WireKey, Arc<Flight>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
}

impl ResolutionCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, without loading.
    #[must_use]
    pub fn get(&self, key: &WireKey) -> Option<EntityId> {
        self.entries.get(key).map(|entry| *entry)
    }

    /// Upsert a resolved value. Takes precedence over in-flight loads.
    pub fn put(&self, key: WireKey, id: EntityId) {
        self.entries.insert(key, id);
    }

    /// Return the cached value for `key`, or run `loader` at most once across
    /// all concurrent callers for that key.
    ///
    /// # Errors
    ///
    /// Returns the loader's error to the leader and every follower of this
    /// flight. Nothing is cached on failure.
    pub fn get_or_load<F>(&self, key: &WireKey, loader: F) -> LoadOutcome
    where
        F: FnOnce() -> LoadOutcome,
    {
        if let Some(id) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(id);
        }

        let (flight, leader) = {
            let mut in_flight = self.in_flight.lock();
            // Re-check: a leader may have finished between the first read and the lock.
            if let Some(id) = self.get(key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(id);
            }
            self.misses.fetch_add(1, Ordering::Relaxed);
            match in_flight.get(key) {
                Some(flight) => (Arc::clone(flight), false),
                None => {
                    let flight = Arc::new(Flight::default());
                    in_flight.insert(key.clone(), Arc::clone(&flight));
                    (flight, true)
                }
            }
        };

        if !leader {
            return flight.wait();
        }

        let guard = FlightGuard {
            cache: self,
            key,
            flight,
        };

        self.loads.fetch_add(1, Ordering::Relaxed);
        let outcome = match loader() {
            Ok(id) => Ok(*self.entries.entry(key.clone()).or_insert(id)),
            Err(err) => {
                self.load_failures.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        };

        guard.flight.complete(outcome.clone());
        drop(guard);
        outcome
    }

    /// Number of resolved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every resolved entry. In-flight loads are unaffected.
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Snapshot of cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
