//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for plugging status-report
//! handlers (console, metrics, alerting) into the runtime.
//!
//! The runtime hands each report to every subscriber through a bounded queue;
//! a panic inside `on_event` is caught and reported as `SubscriberPanicked`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use watchvisor::{Event, EventKind, Health, Subscribe};
//!
//! struct Alarm;
//!
//! #[async_trait]
//! impl Subscribe for Alarm {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::HealthReport && ev.health == Some(Health::Failed) {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "alarm" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// A handler for runtime status reports.
///
/// Runs on its own worker: a slow or panicking handler never stalls the tasks,
/// it only loses reports from its own queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one report. Reports arrive in publish order.
    async fn on_event(&self, event: &Event);

    /// Name used in `SubscriberOverflow` / `SubscriberPanicked` reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue length for this subscriber's worker; 0 is treated as 1.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
