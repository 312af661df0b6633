//! Recovery policies.
//!
//! ## Contents
//! - [`EscalationPolicy`] exact-count thresholds for soft failure / channel reset / restart
//! - [`FailureCounter`] the consumer's consecutive-failure counter
//! - [`Escalation`], [`RecoveryState`] the actions and states the counter moves through
//!
//! ## Defaults
//! - `EscalationPolicy::default()` → warn at 5, reset at 10, restart at 15.

mod escalation;

pub use escalation::{Escalation, EscalationPolicy, FailureCounter, RecoveryState};
