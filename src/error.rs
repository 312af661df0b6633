//! Error types used by the watchvisor runtime and its tasks.
//!
//! This module defines the error enums shared across the crate:
//!
//! - [`RuntimeError`] - errors raised by the orchestration runtime itself.
//! - [`CycleError`] - transient failures of a single producer/consumer cycle.
//! - [`ConfigError`] - rejected [`Config`](crate::Config) values.
//! - [`AllocError`] - the bounded [`Heap`](crate::Heap) refused an allocation.
//!
//! All of them provide `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the watchvisor runtime.
///
/// These represent failures in the orchestration itself, such as a shutdown
/// sequence exceeding its grace period. A restart request is **not** an error:
/// it is reported through [`Exit::Restart`](crate::Exit::Restart).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some actors remained stuck and were aborted.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the actors that did not stop in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use watchvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// # Transient failure of one task cycle.
///
/// None of these are fatal: the owning task reports the failure and retries
/// on its next period. Sustained [`CycleError::ChannelEmpty`] feeds the
/// consumer's escalation policy.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// The work item could not be allocated.
    #[error("allocation failed: {0}")]
    OutOfMemory(#[from] AllocError),

    /// The channel already held an item; the offered item was dropped.
    #[error("channel full, item {id} dropped")]
    ChannelFull {
        /// Id of the rejected item.
        id: u32,
    },

    /// Nothing to drain this cycle.
    #[error("channel empty ({failures} consecutive)")]
    ChannelEmpty {
        /// Consecutive failed drains including this one.
        failures: u32,
    },
}

impl CycleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CycleError::OutOfMemory(_) => "cycle_out_of_memory",
            CycleError::ChannelFull { .. } => "cycle_channel_full",
            CycleError::ChannelEmpty { .. } => "cycle_channel_empty",
        }
    }
}

/// # The bounded heap refused an allocation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Every slot of the heap is in use.
    #[error("heap exhausted ({capacity} live allocations)")]
    Exhausted {
        /// Configured heap capacity.
        capacity: usize,
    },
}

/// # Invalid runtime configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A task period was zero.
    #[error("{task} period must be greater than zero")]
    ZeroPeriod {
        /// Which task.
        task: &'static str,
    },

    /// The supervisor must run at a coarser cadence than the tasks it samples.
    #[error("supervisor period {supervisor:?} must be longer than {task} period {period:?}")]
    SupervisorNotCoarser {
        /// Configured supervisor period.
        supervisor: Duration,
        /// Task whose period is not shorter.
        task: &'static str,
        /// That task's period.
        period: Duration,
    },

    /// Escalation thresholds must satisfy `0 < warn_at < reset_at < restart_at`.
    #[error("escalation thresholds must be ascending and non-zero (warn={warn_at}, reset={reset_at}, restart={restart_at})")]
    Thresholds {
        /// Soft-failure threshold.
        warn_at: u32,
        /// Channel-reset threshold.
        reset_at: u32,
        /// Restart threshold.
        restart_at: u32,
    },

    /// The watchdog timeout was zero.
    #[error("watchdog timeout must be greater than zero")]
    ZeroWatchdogTimeout,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroPeriod { .. } => "config_zero_period",
            ConfigError::SupervisorNotCoarser { .. } => "config_supervisor_not_coarser",
            ConfigError::Thresholds { .. } => "config_thresholds",
            ConfigError::ZeroWatchdogTimeout => "config_zero_watchdog_timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_error_converts_into_cycle_error() {
        let err: CycleError = AllocError::Exhausted { capacity: 2 }.into();
        assert_eq!(err.as_label(), "cycle_out_of_memory");
        assert_eq!(err.to_string(), "allocation failed: heap exhausted (2 live allocations)");
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(CycleError::ChannelFull { id: 3 }.as_label(), "cycle_channel_full");
        assert_eq!(
            CycleError::ChannelEmpty { failures: 1 }.as_label(),
            "cycle_channel_empty"
        );
        assert_eq!(
            ConfigError::ZeroWatchdogTimeout.as_label(),
            "config_zero_watchdog_timeout"
        );
    }
}
