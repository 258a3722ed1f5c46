//! Resilience patterns guarding calls to external dependencies.
//!
//! - **Circuit Breaker**: fail fast while a dependency is known to be down,
//!   with state shared through the breaker store
//! - **Retry**: bounded attempts with a constant pause between them

pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig};
pub use retry::{retry, ConstantBackoff, RetryError, RetryPolicy};
