//! # TaskActor: periodic driver for one task.
//!
//! ```text
//! loop {
//!   ├─► task.cycle()        (raced against cancellation; may never complete)
//!   └─► sleep(period)       (raced against cancellation)
//! }
//! ```
//!
//! ## Rules
//! - Cycles run **sequentially** within one actor (never overlapping).
//! - The period is a fixed sleep after each cycle, whatever its outcome.
//! - Cancellation is observed at both await points; a parked cycle is dropped.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::tasks::Task;

/// Drives one [`Task`] at a fixed period.
pub struct TaskActor {
    task: Box<dyn Task>,
    period: Duration,
}

impl TaskActor {
    /// Creates an actor for `task` sleeping `period` between cycles.
    pub fn new(task: impl Task, period: Duration) -> Self {
        Self {
            task: Box::new(task),
            period,
        }
    }

    /// Name of the driven task.
    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Runs cycles until `token` is cancelled.
    pub async fn run(mut self, token: CancellationToken) {
        loop {
            tokio::select! {
                _ = self.task.cycle() => {}
                _ = token.cancelled() => break,
            }
            tokio::select! {
                _ = time::sleep(self.period) => {}
                _ = token.cancelled() => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct Count(Arc<AtomicU32>);

    #[async_trait]
    impl Task for Count {
        fn name(&self) -> &str {
            "count"
        }
        async fn cycle(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Stuck;

    #[async_trait]
    impl Task for Stuck {
        fn name(&self) -> &str {
            "stuck"
        }
        async fn cycle(&mut self) {
            std::future::pending::<()>().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_once_per_period() {
        let n = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();
        let actor = TaskActor::new(Count(n.clone()), Duration::from_secs(1));
        assert_eq!(actor.name(), "count");
        let handle = tokio::spawn(actor.run(token.clone()));

        // Cycles at t=0,1,2,3,4.
        time::sleep(Duration::from_millis(4500)).await;
        assert_eq!(n.load(Ordering::SeqCst), 5);

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_a_parked_cycle() {
        let token = CancellationToken::new();
        let handle = tokio::spawn(TaskActor::new(Stuck, Duration::from_secs(1)).run(token.clone()));
        time::sleep(Duration::from_secs(10)).await;
        token.cancel();
        handle.await.unwrap();
    }
}
