//! # Status-report bus.
//!
//! Every component reports by publishing an [`Event`]; the runtime listener is
//! the single consumer and forwards each report to the subscribers.
//!
//! ```text
//!   Producer   ──┐
//!   Consumer   ──┤
//!   Supervisor ──┼── publish() ──► Bus ──► runtime listener ──► SubscriberSet
//!   Watchdog   ──┤
//!   Reboot     ──┘
//! ```
//!
//! Publishing never waits: the tasks keep their cadence even when nobody
//! listens. A listener that falls behind by more than the capacity loses the
//! oldest reports (`RecvError::Lagged`).

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle to the report channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus keeping up to `capacity` unread reports (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes a report; dropped if no receiver exists.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Returns a receiver for reports published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
