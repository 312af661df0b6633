//! Watchdog configuration.

use std::time::Duration;

/// What the watchdog does when a subject misses its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerAction {
    /// Publish `WatchdogExpired` and re-arm the subject.
    Report,
    /// Publish `WatchdogExpired` and request a process restart.
    #[default]
    PanicAndRestart,
}

/// Watchdog settings.
///
/// ## Field semantics
/// - `timeout`: maximum time between check-ins of any registered subject
/// - `idle_mask`: one idle probe per set bit (`idle0`, `idle1`, ...), each checking in
///   whenever the executor gets around to it; a starved executor trips the watchdog
/// - `trigger`: action on expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogConfig {
    /// Maximum time between check-ins before the trigger fires.
    pub timeout: Duration,
    /// Execution contexts covered by idle probes (bit `n` → probe `idle{n}`).
    pub idle_mask: u32,
    /// Action taken on expiry.
    pub trigger: TriggerAction,
}

impl Default for WatchdogConfig {
    /// `timeout = 5s`, `idle_mask = 0b11`, `trigger = PanicAndRestart`.
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            idle_mask: 0b11,
            trigger: TriggerAction::PanicAndRestart,
        }
    }
}

impl WatchdogConfig {
    /// How often the monitor scans the subjects: a quarter of the timeout, at least 1ms.
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        (self.timeout / 4).max(Duration::from_millis(1))
    }

    /// Indices of the idle probes selected by `idle_mask`.
    pub fn idle_contexts(&self) -> impl Iterator<Item = u32> + '_ {
        (0..u32::BITS).filter(move |n| self.idle_mask & (1 << n) != 0)
    }
}
