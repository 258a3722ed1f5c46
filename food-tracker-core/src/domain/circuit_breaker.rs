//! Persisted circuit breaker records.
//!
//! The breaker is never stored as a mutable "current state". Every transition
//! appends a timestamped [`CircuitBreakerRecord`] and the logical state is
//! derived from the latest record for an event name plus the elapsed time,
//! see [`derive_state`].

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::ids::BreakerRecordId;
use crate::error::CoreError;

/// Penalty window after a trip during which calls fail fast.
pub const DEFAULT_BREAKER_TIMEOUT: Duration = Duration::from_secs(30);

/// Circuit breaker states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation, calls pass through
    Closed,
    /// Dependency is known-bad, calls fail fast
    Open,
    /// Penalty window elapsed, a trial call decides the next transition
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }

    /// True for the states a trip leaves behind (OPEN, or OPEN swept to HALF_OPEN).
    pub fn is_tripped(&self) -> bool {
        matches!(self, CircuitState::Open | CircuitState::HalfOpen)
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CircuitState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "closed" => Ok(CircuitState::Closed),
            "open" => Ok(CircuitState::Open),
            "half_open" => Ok(CircuitState::HalfOpen),
            other => Err(CoreError::Serialization(format!(
                "unknown circuit breaker state: {other}"
            ))),
        }
    }
}

/// One stored breaker transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircuitBreakerRecord {
    pub id: BreakerRecordId,
    /// Identifies the protected external dependency
    pub event_name: String,
    pub state: CircuitState,
    pub timestamp: DateTime<Utc>,
}

impl CircuitBreakerRecord {
    pub fn new(event_name: impl Into<String>, state: CircuitState, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: BreakerRecordId::new(),
            event_name: event_name.into(),
            state,
            timestamp,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.timestamp
    }
}

/// Derive the logical breaker state from the latest stored record.
///
/// - no record, or a stored CLOSED record: `Closed`
/// - stored OPEN/HALF_OPEN younger than `timeout`: `Open`
/// - stored OPEN/HALF_OPEN at least `timeout` old: `HalfOpen`
pub fn derive_state(
    latest: Option<&CircuitBreakerRecord>,
    now: DateTime<Utc>,
    timeout: Duration,
) -> CircuitState {
    let Some(record) = latest else {
        return CircuitState::Closed;
    };

    if record.state == CircuitState::Closed {
        return CircuitState::Closed;
    }

    if record.age(now) < to_time_delta(timeout) {
        CircuitState::Open
    } else {
        CircuitState::HalfOpen
    }
}

/// Records stamped strictly before this instant are past the penalty window.
pub fn stale_cutoff(now: DateTime<Utc>, timeout: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(to_time_delta(timeout))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn to_time_delta(timeout: Duration) -> TimeDelta {
    TimeDelta::from_std(timeout).unwrap_or(TimeDelta::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: CircuitState, age_secs: i64, now: DateTime<Utc>) -> CircuitBreakerRecord {
        CircuitBreakerRecord::new("nutrition_api", state, now - TimeDelta::seconds(age_secs))
    }

    #[test]
    fn test_no_record_is_closed() {
        assert_eq!(
            derive_state(None, Utc::now(), DEFAULT_BREAKER_TIMEOUT),
            CircuitState::Closed
        );
    }

    #[test]
    fn test_closed_record_stays_closed_regardless_of_age() {
        let now = Utc::now();
        for age in [0, 29, 30, 3600] {
            let r = record(CircuitState::Closed, age, now);
            assert_eq!(derive_state(Some(&r), now, DEFAULT_BREAKER_TIMEOUT), CircuitState::Closed);
        }
    }

    #[test]
    fn test_recent_open_record_is_open() {
        let now = Utc::now();
        let r = record(CircuitState::Open, 29, now);
        assert_eq!(derive_state(Some(&r), now, DEFAULT_BREAKER_TIMEOUT), CircuitState::Open);
    }

    #[test]
    fn test_recent_half_open_record_collapses_to_open() {
        let now = Utc::now();
        let r = record(CircuitState::HalfOpen, 5, now);
        assert_eq!(derive_state(Some(&r), now, DEFAULT_BREAKER_TIMEOUT), CircuitState::Open);
    }

    #[test]
    fn test_open_record_at_timeout_is_half_open() {
        let now = Utc::now();
        let r = record(CircuitState::Open, 30, now);
        assert_eq!(derive_state(Some(&r), now, DEFAULT_BREAKER_TIMEOUT), CircuitState::HalfOpen);
    }

    #[test]
    fn test_stale_cutoff() {
        let now = Utc::now();
        assert_eq!(stale_cutoff(now, DEFAULT_BREAKER_TIMEOUT), now - TimeDelta::seconds(30));
    }

    #[test]
    fn test_state_string_roundtrip() {
        for state in [CircuitState::Closed, CircuitState::Open, CircuitState::HalfOpen] {
            assert_eq!(state.as_str().parse::<CircuitState>().unwrap(), state);
        }
        assert!("tripped".parse::<CircuitState>().is_err());
    }
}
