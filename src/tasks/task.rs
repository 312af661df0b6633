//! # Periodic task abstraction.
//!
//! A [`Task`] performs one bounded unit of work per [`cycle`](Task::cycle);
//! the runtime's actor calls it once per period and sleeps in between.
//! State that must survive between cycles (sequence numbers, failure
//! counters) lives in the task itself, hence `&mut self`.

use async_trait::async_trait;

/// # One periodic, supervised unit.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use watchvisor::Task;
///
/// struct Tick(u64);
///
/// #[async_trait]
/// impl Task for Tick {
///     fn name(&self) -> &str { "tick" }
///
///     async fn cycle(&mut self) {
///         self.0 += 1;
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Runs one cycle. Outcomes are reported on the event bus, not returned.
    ///
    /// A cycle may never complete (a requested restart parks it); the actor
    /// does not rely on it returning.
    async fn cycle(&mut self);
}
