//! # Task watchdog: check-in registry and expiry monitor.
//!
//! ```text
//! Watchdog::register("producer") ──► WatchdogHandle ── check_in() ──► last = now
//!
//! Watchdog::run():
//! loop every poll_interval {
//!   for subject with now - last > timeout:
//!     ├─► publish WatchdogExpired
//!     ├─► Report          → re-arm subject
//!     └─► PanicAndRestart → Reboot::trigger(Watchdog { task })   (never returns)
//! }
//! ```
//!
//! ## Rules
//! - A subject's deadline starts at registration.
//! - Handles are not unregistered on drop: a task that dies still trips the watchdog.
//! - Uses `tokio::time::Instant`, so paused-clock tests drive expiry deterministically.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::config::{TriggerAction, WatchdogConfig};
use crate::core::{Reboot, RestartCause};
use crate::events::{Bus, Event, EventKind};

struct Subject {
    name: Arc<str>,
    last: Mutex<Instant>,
}

impl Subject {
    fn last(&self) -> MutexGuard<'_, Instant> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-task check-in handle.
pub struct WatchdogHandle {
    subject: Arc<Subject>,
}

impl WatchdogHandle {
    /// Records a liveness check-in now.
    #[inline]
    pub fn check_in(&self) {
        *self.subject.last() = Instant::now();
    }

    /// Name the subject was registered under.
    pub fn name(&self) -> &str {
        &self.subject.name
    }
}

impl std::fmt::Debug for WatchdogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchdogHandle")
            .field("name", &self.subject.name)
            .finish()
    }
}

/// Registry of monitored subjects plus the expiry monitor.
#[derive(Clone)]
pub struct Watchdog {
    cfg: WatchdogConfig,
    subjects: Arc<Mutex<Vec<Arc<Subject>>>>,
    bus: Bus,
}

impl Watchdog {
    /// Creates a watchdog with no subjects.
    pub fn new(cfg: WatchdogConfig, bus: Bus) -> Self {
        Self {
            cfg,
            subjects: Arc::new(Mutex::new(Vec::new())),
            bus,
        }
    }

    fn subjects(&self) -> MutexGuard<'_, Vec<Arc<Subject>>> {
        self.subjects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a subject; its first deadline is `timeout` from now.
    pub fn register(&self, name: impl Into<Arc<str>>) -> WatchdogHandle {
        let subject = Arc::new(Subject {
            name: name.into(),
            last: Mutex::new(Instant::now()),
        });
        self.subjects().push(Arc::clone(&subject));
        WatchdogHandle { subject }
    }

    /// Names of all registered subjects, in registration order.
    pub fn registered(&self) -> Vec<String> {
        self.subjects().iter().map(|s| s.name.to_string()).collect()
    }

    /// The configuration in use.
    pub fn config(&self) -> &WatchdogConfig {
        &self.cfg
    }

    /// Subjects whose last check-in is older than the timeout at `now`.
    pub fn expired(&self, now: Instant) -> Vec<Arc<str>> {
        self.subjects()
            .iter()
            .filter(|s| now.saturating_duration_since(*s.last()) > self.cfg.timeout)
            .map(|s| Arc::clone(&s.name))
            .collect()
    }

    fn rearm(&self, name: &str, now: Instant) {
        for s in self.subjects().iter().filter(|s| &*s.name == name) {
            *s.last() = now;
        }
    }

    /// Monitors the subjects until cancelled or until a restart is triggered.
    pub async fn run(self, token: CancellationToken, reboot: Reboot) {
        let mut ticker = time::interval(self.cfg.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = token.cancelled() => break,
            }

            let now = Instant::now();
            for task in self.expired(now) {
                self.bus.publish(
                    Event::new(EventKind::WatchdogExpired)
                        .with_task(Arc::clone(&task))
                        .with_timeout(self.cfg.timeout),
                );
                match self.cfg.trigger {
                    TriggerAction::Report => self.rearm(&task, now),
                    TriggerAction::PanicAndRestart => {
                        match reboot.trigger(RestartCause::Watchdog { task }).await {}
                    }
                }
            }
        }
    }
}
