//! # Escalating recovery policy for the consumer.
//!
//! [`FailureCounter`] counts consecutive cycles in which nothing was drained.
//! [`EscalationPolicy`] maps exact counter values to recovery steps:
//!
//! ```text
//! count:   0 ─ 1 ─ … ─ warn_at ─ … ─ reset_at ─ … ─ restart_at
//! state:   Normal      Warned        Degraded       Restarting (terminal)
//! action:              SoftFailure   ResetChannel   Restart
//!
//! any successful drain ──► count = 0, state = Normal
//! ```
//!
//! ## Rules
//! - Thresholds are compared with equality, so each action fires exactly once
//!   while the counter passes through it.
//! - A success cancels every pending escalation.
//!
//! # Example
//! ```rust
//! use watchvisor::{Escalation, EscalationPolicy, FailureCounter};
//!
//! let mut counter = FailureCounter::new(EscalationPolicy::default());
//! let fired: Vec<_> = (0..15).filter_map(|_| counter.record_failure()).collect();
//! assert_eq!(fired, vec![Escalation::SoftFailure, Escalation::ResetChannel, Escalation::Restart]);
//! ```

/// Recovery step triggered at a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Report only.
    SoftFailure,
    /// Forcibly empty the channel.
    ResetChannel,
    /// Restart the whole process.
    Restart,
}

/// Coarse state derived from the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    /// Below the warning threshold.
    Normal,
    /// Warned, no corrective action yet.
    Warned,
    /// Channel has been reset.
    Degraded,
    /// Restart requested; terminal.
    Restarting,
}

/// Thresholds for each escalation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    /// Consecutive failures that produce a soft-failure report.
    pub warn_at: u32,
    /// Consecutive failures that reset the channel.
    pub reset_at: u32,
    /// Consecutive failures that restart the process.
    pub restart_at: u32,
}

impl Default for EscalationPolicy {
    /// `warn_at = 5`, `reset_at = 10`, `restart_at = 15`.
    fn default() -> Self {
        Self {
            warn_at: 5,
            reset_at: 10,
            restart_at: 15,
        }
    }
}

impl EscalationPolicy {
    /// Returns the action for exactly `count` consecutive failures, if any.
    pub fn escalation_at(&self, count: u32) -> Option<Escalation> {
        if count == self.warn_at {
            Some(Escalation::SoftFailure)
        } else if count == self.reset_at {
            Some(Escalation::ResetChannel)
        } else if count == self.restart_at {
            Some(Escalation::Restart)
        } else {
            None
        }
    }

    /// Returns the state for `count` consecutive failures.
    pub fn state_at(&self, count: u32) -> RecoveryState {
        if count >= self.restart_at {
            RecoveryState::Restarting
        } else if count >= self.reset_at {
            RecoveryState::Degraded
        } else if count >= self.warn_at {
            RecoveryState::Warned
        } else {
            RecoveryState::Normal
        }
    }

    /// `true` when `0 < warn_at < reset_at < restart_at`.
    pub fn is_ascending(&self) -> bool {
        0 < self.warn_at && self.warn_at < self.reset_at && self.reset_at < self.restart_at
    }
}

/// Consumer-private count of consecutive failed drains.
#[derive(Debug, Clone)]
pub struct FailureCounter {
    policy: EscalationPolicy,
    count: u32,
}

impl FailureCounter {
    /// Creates a counter at zero.
    pub fn new(policy: EscalationPolicy) -> Self {
        Self { policy, count: 0 }
    }

    /// Records a failed drain and returns the action due at the new count.
    pub fn record_failure(&mut self) -> Option<Escalation> {
        self.count = self.count.saturating_add(1);
        self.policy.escalation_at(self.count)
    }

    /// Records a successful drain.
    pub fn record_success(&mut self) {
        self.count = 0;
    }

    /// Current consecutive failures.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Current recovery state.
    pub fn state(&self) -> RecoveryState {
        self.policy.state_at(self.count)
    }
}
