//! # Process restart: the terminal recovery path.
//!
//! A restart is not an error to be handled. Inside a task it is requested with
//! [`Reboot::trigger`], whose future resolves to [`Infallible`] (it never
//! completes); the runtime observes the request, aborts every actor and returns
//! [`Exit::Restart`](crate::Exit::Restart). The host then calls
//! [`restart_process`], which does not return.
//!
//! ```text
//! Consumer (restart_at) ─┐
//!                        ├─► Reboot::trigger(cause) ──► RestartRequested event
//! Watchdog (expired)  ───┘          │ (first cause wins)
//!                                   ▼
//!                      Runtime: abort actors ─► Exit::Restart(cause) ─► restart_process(&cause) -> !
//! ```

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::events::{Bus, Event, EventKind};

/// Exit status used when re-executing the current binary is not possible.
pub const RESTART_EXIT_CODE: i32 = 75;

/// Why a restart was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartCause {
    /// The consumer failed to drain for `failures` consecutive cycles.
    ConsumerStalled {
        /// Consecutive failures at the time of the request.
        failures: u32,
    },
    /// A watchdog subject missed its check-in deadline.
    Watchdog {
        /// Name of the subject that expired.
        task: Arc<str>,
    },
}

impl RestartCause {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RestartCause::ConsumerStalled { .. } => "consumer_stalled",
            RestartCause::Watchdog { .. } => "watchdog_expired",
        }
    }
}

impl fmt::Display for RestartCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartCause::ConsumerStalled { failures } => {
                write!(f, "consumer stalled after {failures} consecutive failures")
            }
            RestartCause::Watchdog { task } => write!(f, "watchdog expired for task {task}"),
        }
    }
}

/// Shared restart line. Clones refer to the same request.
#[derive(Clone)]
pub struct Reboot {
    tx: Arc<watch::Sender<Option<RestartCause>>>,
    bus: Bus,
}

impl Reboot {
    /// Creates a line with no pending request.
    pub fn new(bus: Bus) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            bus,
        }
    }

    /// Records a restart request without waiting.
    ///
    /// Returns `true` if this was the first request; later causes are ignored.
    pub fn request(&self, cause: RestartCause) -> bool {
        let reason = cause.to_string();
        let first = self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(cause);
            true
        });
        if first {
            self.bus
                .publish(Event::new(EventKind::RestartRequested).with_reason(reason));
        }
        first
    }

    /// Requests a restart and never completes.
    ///
    /// The calling task stays parked here until the runtime aborts it.
    pub async fn trigger(&self, cause: RestartCause) -> Infallible {
        self.request(cause);
        std::future::pending().await
    }

    /// The first requested cause, if any.
    pub fn cause(&self) -> Option<RestartCause> {
        self.tx.borrow().clone()
    }

    /// Resolves with the first cause once a restart has been requested.
    pub async fn requested(&self) -> RestartCause {
        let mut rx = self.tx.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(cause) = current {
                return cause;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}

impl fmt::Debug for Reboot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reboot").field("cause", &self.cause()).finish()
    }
}

/// Restarts the current process. Does not return.
///
/// On Unix the running binary is re-executed with the same arguments. If that
/// fails, or on other platforms, the process exits with [`RESTART_EXIT_CODE`]
/// so a service manager can start it again.
pub fn restart_process(cause: &RestartCause) -> ! {
    eprintln!("[restart] {cause}");

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;

        if let Ok(exe) = std::env::current_exe() {
            let err = std::process::Command::new(exe)
                .args(std::env::args_os().skip(1))
                .exec();
            eprintln!("[restart] re-exec failed: {err}");
        }
    }

    std::process::exit(RESTART_EXIT_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn first_cause_wins() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let reboot = Reboot::new(bus);

        assert!(reboot.request(RestartCause::ConsumerStalled { failures: 15 }));
        assert!(!reboot.request(RestartCause::Watchdog {
            task: "producer".into()
        }));

        assert_eq!(
            reboot.requested().await,
            RestartCause::ConsumerStalled { failures: 15 }
        );
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::RestartRequested);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_never_completes_but_wakes_waiters() {
        let reboot = Reboot::new(Bus::new(8));
        let waiter = tokio::spawn({
            let reboot = reboot.clone();
            async move { reboot.requested().await }
        });

        let parked = tokio::time::timeout(
            Duration::from_secs(60),
            reboot.trigger(RestartCause::Watchdog {
                task: "consumer".into(),
            }),
        )
        .await;
        assert!(parked.is_err());

        assert_eq!(
            waiter.await.unwrap(),
            RestartCause::Watchdog {
                task: "consumer".into()
            }
        );
    }
}
