//! # Console status reports.
//!
//! [`LogWriter`] prints one line per event to stdout.
//!
//! ## Output format
//! ```text
//! [sent] task=producer id=3 payload=4
//! [send-failed] task=producer id=4 payload=5 reason=channel full
//! [received] task=consumer id=3 payload=4
//! [receive-failed] task=consumer failures=2
//! [soft-failure] task=consumer failures=5
//! [channel-reset] task=consumer failures=10 discarded
//! [restart-scheduled] task=consumer failures=15 delay=1000ms
//! [health] fully healthy (producer and consumer)
//! [watchdog] task=consumer missed check-in (timeout=5000ms)
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind, Health};
use crate::subscribers::Subscribe;

/// Stdout status-report subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self
    }

    /// Renders an event as a single status line.
    pub fn render(e: &Event) -> String {
        let task = e.task.as_deref().unwrap_or("-");
        let id = e.item_id.unwrap_or_default();
        let payload = e.payload.unwrap_or_default();
        let failures = e.failures.unwrap_or_default();
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::AllocFailed => format!("[alloc-failed] task={task} reason={reason}"),
            EventKind::ItemSent => format!("[sent] task={task} id={id} payload={payload}"),
            EventKind::SendFailed => {
                format!("[send-failed] task={task} id={id} payload={payload} reason=channel full")
            }
            EventKind::ItemReceived => {
                format!("[received] task={task} id={id} payload={payload}")
            }
            EventKind::ReceiveFailed => format!("[receive-failed] task={task} failures={failures}"),
            EventKind::SoftFailure => format!("[soft-failure] task={task} failures={failures}"),
            EventKind::ChannelReset => {
                format!("[channel-reset] task={task} failures={failures} {reason}")
            }
            EventKind::RestartScheduled => format!(
                "[restart-scheduled] task={task} failures={failures} delay={}ms",
                e.delay_ms.unwrap_or_default()
            ),
            EventKind::HealthReport => match e.health {
                Some(Health::Healthy) => "[health] fully healthy (producer and consumer)".into(),
                Some(Health::ProducerOnly) => "[health] partially healthy (producer only)".into(),
                Some(Health::ConsumerOnly) => "[health] partially healthy (consumer only)".into(),
                Some(Health::Failed) | None => "[health] failure (no task signaled)".into(),
            },
            EventKind::WatchdogExpired => format!(
                "[watchdog] task={task} missed check-in (timeout={}ms)",
                e.timeout_ms.unwrap_or_default()
            ),
            EventKind::RestartRequested => format!("[restart] cause={reason}"),
            EventKind::ShutdownRequested => "[shutdown-requested]".into(),
            EventKind::AllStoppedWithin => "[all-stopped-within-grace]".into(),
            EventKind::GraceExceeded => "[grace-exceeded]".into(),
            EventKind::SubscriberPanicked => format!("[subscriber-panicked] {reason}"),
            EventKind::SubscriberOverflow => format!("[subscriber-overflow] {reason}"),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", Self::render(e));
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::Signals;

    #[test]
    fn renders_each_health_report_distinctly() {
        let lines: Vec<String> = [
            Health::Healthy,
            Health::ProducerOnly,
            Health::ConsumerOnly,
            Health::Failed,
        ]
        .into_iter()
        .map(|h| {
            LogWriter::render(
                &Event::new(EventKind::HealthReport).with_health(h, Signals::empty()),
            )
        })
        .collect();

        assert_eq!(lines[0], "[health] fully healthy (producer and consumer)");
        assert_eq!(lines[3], "[health] failure (no task signaled)");
        for (i, a) in lines.iter().enumerate() {
            for b in &lines[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn renders_item_events() {
        let ev = Event::new(EventKind::ItemSent)
            .with_task("producer")
            .with_item(3, 4);
        assert_eq!(LogWriter::render(&ev), "[sent] task=producer id=3 payload=4");
    }
}
