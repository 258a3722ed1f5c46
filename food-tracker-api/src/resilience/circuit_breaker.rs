//! Circuit breaker backed by the persisted breaker log.
//!
//! Instances keep no state of their own. Every decision reads the latest
//! [`CircuitBreakerRecord`] for an event name from the store and derives the
//! logical state from it, so any number of service replicas agree on whether
//! a dependency is tripped.
//!
//! # States
//!
//! - **Closed**: no record, or the latest record is CLOSED
//! - **Open**: latest record is OPEN/HALF_OPEN and younger than the timeout
//! - **HalfOpen**: latest record is OPEN/HALF_OPEN and at least the timeout old
//!
//! # Example
//!
//! ```no_run
//! use food_tracker_api::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
//! use food_tracker_core::SystemClock;
//! use food_tracker_storage::MemoryCircuitBreakerStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let breaker = CircuitBreaker::new(
//!     Arc::new(MemoryCircuitBreakerStore::new()),
//!     Arc::new(SystemClock),
//!     CircuitBreakerConfig::default(),
//! );
//!
//! let snapshot = breaker.snapshot("nutrition_api").await?;
//! if !snapshot.is_open() {
//!     // call the dependency, then report the outcome
//!     breaker.record_failure(&snapshot).await?;
//! }
//! # Ok(())
//! # }
//! ```

use food_tracker_core::{
    derive_state, stale_cutoff, CircuitBreakerRecord, CircuitBreakerStore, CircuitState, Clock,
    Result, DEFAULT_BREAKER_TIMEOUT,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for circuit breaker
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Time a trip stays OPEN before a trial call is allowed
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_BREAKER_TIMEOUT,
        }
    }
}

/// Breaker state observed at the start of a protected call.
///
/// The outcome of the call is reported against this snapshot, so the
/// transition written afterwards is the one the observed state calls for.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerSnapshot {
    pub event_name: String,
    pub state: CircuitState,
    pub record: Option<CircuitBreakerRecord>,
}

impl BreakerSnapshot {
    pub fn is_open(&self) -> bool {
        self.state == CircuitState::Open
    }
}

#[derive(Clone)]
pub struct CircuitBreaker {
    store: Arc<dyn CircuitBreakerStore>,
    clock: Arc<dyn Clock>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(
        store: Arc<dyn CircuitBreakerStore>,
        clock: Arc<dyn Clock>,
        config: CircuitBreakerConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Read the latest record for `event_name` and derive the current state.
    pub async fn snapshot(&self, event_name: &str) -> Result<BreakerSnapshot> {
        let record = self.store.latest(event_name).await?;
        let state = derive_state(record.as_ref(), self.clock.now(), self.config.timeout);

        debug!(event_name, %state, "Circuit breaker state derived");

        Ok(BreakerSnapshot {
            event_name: event_name.to_string(),
            state,
            record,
        })
    }

    pub async fn state(&self, event_name: &str) -> Result<CircuitState> {
        Ok(self.snapshot(event_name).await?.state)
    }

    /// Append an OPEN record stamped now.
    pub async fn trip(&self, event_name: &str) -> Result<CircuitBreakerRecord> {
        let record = CircuitBreakerRecord::new(event_name, CircuitState::Open, self.clock.now());
        let record = self.store.insert(&record).await?;

        warn!(event_name, record_id = %record.id, "Circuit breaker tripped");

        Ok(record)
    }

    /// Settle a trial call made while `record` was the latest tripped record.
    ///
    /// Appends CLOSED on success or a fresh OPEN on failure. Nothing is
    /// written when the record is gone, is no longer OPEN/HALF_OPEN, or has
    /// been superseded by a newer record for the same event.
    pub async fn resolve_half_open(
        &self,
        record: &CircuitBreakerRecord,
        success: bool,
    ) -> Result<Option<CircuitBreakerRecord>> {
        let Some(current) = self.store.find_by_id(&record.id).await? else {
            warn!(record_id = %record.id, "Breaker record disappeared before resolution");
            return Ok(None);
        };

        if !current.state.is_tripped() {
            debug!(record_id = %current.id, state = %current.state, "Breaker record already resolved");
            return Ok(None);
        }

        let latest = self.store.latest(&current.event_name).await?;
        if latest.as_ref().is_some_and(|latest| latest.id != current.id) {
            debug!(record_id = %current.id, "Breaker record superseded, skipping resolution");
            return Ok(None);
        }

        let next = if success {
            CircuitState::Closed
        } else {
            CircuitState::Open
        };
        let resolved = CircuitBreakerRecord::new(&current.event_name, next, self.clock.now());
        let resolved = self.store.insert(&resolved).await?;

        if success {
            info!(event_name = %resolved.event_name, "Circuit breaker closing after successful trial call");
        } else {
            warn!(event_name = %resolved.event_name, "Circuit breaker re-opening after failed trial call");
        }

        Ok(Some(resolved))
    }

    /// Report a call that exhausted its attempts.
    ///
    /// CLOSED trips, HALF_OPEN resolves as failed. OPEN never reaches the
    /// dependency, so there is nothing to write.
    pub async fn record_failure(
        &self,
        snapshot: &BreakerSnapshot,
    ) -> Result<Option<CircuitBreakerRecord>> {
        match (snapshot.state, snapshot.record.as_ref()) {
            (CircuitState::Closed, _) => self.trip(&snapshot.event_name).await.map(Some),
            (CircuitState::HalfOpen, Some(record)) => self.resolve_half_open(record, false).await,
            _ => Ok(None),
        }
    }

    /// Report a call that reached the dependency successfully.
    pub async fn record_success(
        &self,
        snapshot: &BreakerSnapshot,
    ) -> Result<Option<CircuitBreakerRecord>> {
        match (snapshot.state, snapshot.record.as_ref()) {
            (CircuitState::HalfOpen, Some(record)) => self.resolve_half_open(record, true).await,
            _ => Ok(None),
        }
    }

    /// Mark OPEN records older than the timeout as HALF_OPEN, across all events.
    ///
    /// Record timestamps are left alone so a swept record still derives the
    /// same state. Idempotent.
    pub async fn sweep_stale_open(&self) -> Result<u64> {
        let cutoff = stale_cutoff(self.clock.now(), self.config.timeout);
        let updated = self
            .store
            .transition_stale(CircuitState::Open, CircuitState::HalfOpen, cutoff)
            .await?;

        if updated > 0 {
            info!(updated, "Swept stale circuit breaker records to half-open");
        }

        Ok(updated)
    }
}
