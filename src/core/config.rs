//! # Global runtime configuration.
//!
//! Provides [`Config`], centralized settings for the runtime: task cadences,
//! escalation thresholds, watchdog, heap and event-bus sizing.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]
//! - `heap_capacity = 0` → every allocation fails (useful only for fault drills)

use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::EscalationPolicy;
use crate::watchdog::WatchdogConfig;

/// Global configuration for the runtime.
///
/// ## Field semantics
/// - `producer_period` / `consumer_period`: sleep between cycles of the data-path tasks
/// - `supervisor_period`: sleep between health samples; must be coarser than both
/// - `restart_delay`: pause between scheduling and requesting an aggressive restart
/// - `escalation`: consumer thresholds (soft failure / channel reset / restart)
/// - `watchdog`: check-in timeout, idle probes, trigger action
/// - `heap_capacity`: live work items the heap allows
/// - `bus_capacity`: event bus ring buffer size
/// - `grace`: maximum wait for actors to stop after a shutdown signal
#[derive(Clone, Debug)]
pub struct Config {
    /// Producer cadence.
    pub producer_period: Duration,
    /// Consumer cadence.
    pub consumer_period: Duration,
    /// Supervisor cadence.
    pub supervisor_period: Duration,
    /// Delay before an aggressive restart is requested.
    pub restart_delay: Duration,
    /// Consumer escalation thresholds.
    pub escalation: EscalationPolicy,
    /// Watchdog settings.
    pub watchdog: WatchdogConfig,
    /// Maximum live work items.
    pub heap_capacity: usize,
    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
    /// Maximum time to wait for graceful shutdown before aborting actors.
    pub grace: Duration,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks the invariants the runtime relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (task, period) in [
            ("producer", self.producer_period),
            ("consumer", self.consumer_period),
            ("supervisor", self.supervisor_period),
        ] {
            if period.is_zero() {
                return Err(ConfigError::ZeroPeriod { task });
            }
        }

        for (task, period) in [
            ("producer", self.producer_period),
            ("consumer", self.consumer_period),
        ] {
            if self.supervisor_period <= period {
                return Err(ConfigError::SupervisorNotCoarser {
                    supervisor: self.supervisor_period,
                    task,
                    period,
                });
            }
        }

        if !self.escalation.is_ascending() {
            let EscalationPolicy {
                warn_at,
                reset_at,
                restart_at,
            } = self.escalation;
            return Err(ConfigError::Thresholds {
                warn_at,
                reset_at,
                restart_at,
            });
        }

        if self.watchdog.timeout.is_zero() {
            return Err(ConfigError::ZeroWatchdogTimeout);
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - producer/consumer every 1s, supervisor every 2s
    /// - `restart_delay = 1s`
    /// - `EscalationPolicy::default()` (5 / 10 / 15)
    /// - `WatchdogConfig::default()` (5s, two idle probes, restart on expiry)
    /// - `heap_capacity = 16`, `bus_capacity = 1024`, `grace = 10s`
    fn default() -> Self {
        Self {
            producer_period: Duration::from_secs(1),
            consumer_period: Duration::from_secs(1),
            supervisor_period: Duration::from_secs(2),
            restart_delay: Duration::from_secs(1),
            escalation: EscalationPolicy::default(),
            watchdog: WatchdogConfig::default(),
            heap_capacity: 16,
            bus_capacity: 1024,
            grace: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_period() {
        let cfg = Config {
            consumer_period: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroPeriod { task: "consumer" })
        );
    }

    #[test]
    fn supervisor_must_be_coarser() {
        let cfg = Config {
            supervisor_period: Duration::from_secs(1),
            ..Config::default()
        };
        assert_eq!(
            cfg.validate().unwrap_err().as_label(),
            "config_supervisor_not_coarser"
        );
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let cfg = Config {
            escalation: EscalationPolicy {
                warn_at: 10,
                reset_at: 5,
                restart_at: 15,
            },
            ..Config::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Thresholds { warn_at: 10, .. })
        ));
    }

    #[test]
    fn rejects_zero_watchdog_timeout() {
        let mut cfg = Config::default();
        cfg.watchdog.timeout = Duration::ZERO;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroWatchdogTimeout));
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
