//! # Runtime events emitted by the tasks, the watchdog and the runtime.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Data path**: producer and consumer cycle outcomes
//! - **Escalation**: consumer recovery steps (soft failure, channel reset, restart)
//! - **Liveness**: supervisor health reports and watchdog expiry
//! - **Runtime**: restart/shutdown and subscriber delivery problems
//!
//! The [`Event`] struct carries metadata such as timestamps, task name, item
//! id/payload, failure counts and the classified [`Health`].
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use watchvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ItemSent)
//!     .with_task("producer")
//!     .with_item(3, 4);
//!
//! assert_eq!(ev.kind, EventKind::ItemSent);
//! assert_eq!(ev.task.as_deref(), Some("producer"));
//! assert_eq!(ev.item_id, Some(3));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::sync::Signals;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Producer ===
    /// The producer could not allocate a work item; the cycle was skipped.
    ///
    /// Sets: `task`, `reason`
    AllocFailed,

    /// An item was handed to the channel.
    ///
    /// Sets: `task`, `item_id`, `payload`
    ItemSent,

    /// The channel was full; the item was dropped by the producer.
    ///
    /// Sets: `task`, `item_id`, `payload`
    SendFailed,

    // === Consumer ===
    /// An item was drained and released.
    ///
    /// Sets: `task`, `item_id`, `payload`
    ItemReceived,

    /// Nothing to drain this cycle.
    ///
    /// Sets: `task`, `failures`
    ReceiveFailed,

    // === Escalation ===
    /// Consecutive failures reached the warning threshold (report only).
    ///
    /// Sets: `task`, `failures`
    SoftFailure,

    /// Moderate recovery: the channel was forcibly emptied.
    ///
    /// Sets: `task`, `failures`, `reason` (`"discarded"` or `"empty"`)
    ChannelReset,

    /// Aggressive recovery: a process restart follows after `delay_ms`.
    ///
    /// Sets: `task`, `failures`, `delay_ms`
    RestartScheduled,

    // === Liveness ===
    /// Supervisor classification of the health flags read this period.
    ///
    /// Sets: `task`, `health`, `signals`
    HealthReport,

    /// A watchdog subject missed its check-in deadline.
    ///
    /// Sets: `task` (the subject), `timeout_ms`
    WatchdogExpired,

    // === Runtime ===
    /// A process restart was requested (first request wins).
    ///
    /// Sets: `reason`
    RestartRequested,

    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    /// All actors stopped within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some actors did not stop in time.
    GraceExceeded,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason`
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason`
    SubscriberOverflow,
}

/// Four-way classification of one supervisor sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// Both producer and consumer signaled.
    Healthy,
    /// Only the producer signaled.
    ProducerOnly,
    /// Only the consumer signaled.
    ConsumerOnly,
    /// Neither task signaled.
    Failed,
}

impl Health {
    /// Classifies a set of observed signals.
    pub fn classify(signals: Signals) -> Self {
        let producer = signals.contains(Signals::PRODUCER_OK);
        let consumer = signals.contains(Signals::CONSUMER_OK);
        match (producer, consumer) {
            (true, true) => Health::Healthy,
            (true, false) => Health::ProducerOnly,
            (false, true) => Health::ConsumerOnly,
            (false, false) => Health::Failed,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Health::Healthy => "healthy",
            Health::ProducerOnly => "partial_producer_only",
            Health::ConsumerOnly => "partial_consumer_only",
            Health::Failed => "failed",
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task (or watchdog subject / subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Work item id.
    pub item_id: Option<u32>,
    /// Work item payload.
    pub payload: Option<u32>,
    /// Consecutive consumer failures.
    pub failures: Option<u32>,
    /// Supervisor classification.
    pub health: Option<Health>,
    /// Raw signals observed by the supervisor.
    pub signals: Option<Signals>,
    /// Watchdog timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Delay before a scheduled action in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, restart cause).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            item_id: None,
            payload: None,
            failures: None,
            health: None,
            signals: None,
            timeout_ms: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a work item's id and payload.
    #[inline]
    pub fn with_item(mut self, id: u32, payload: u32) -> Self {
        self.item_id = Some(id);
        self.payload = Some(payload);
        self
    }

    /// Attaches a consecutive failure count.
    #[inline]
    pub fn with_failures(mut self, n: u32) -> Self {
        self.failures = Some(n);
        self
    }

    /// Attaches a health classification and the signals it was derived from.
    #[inline]
    pub fn with_health(mut self, health: Health, signals: Signals) -> Self {
        self.health = Some(health);
        self.signals = Some(signals);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
