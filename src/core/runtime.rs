//! # Runtime: wires the shared objects, drives the actors, decides the exit.
//!
//! ## High-level architecture
//! ```text
//! run_until(shutdown):
//!   Bus.subscribe() ─► forward(): Event ─► SubscriberSet::emit (fire-and-forget)
//!
//!   Slot (channel) ─┬─► Producer   ─► TaskActor(producer_period)
//!   HealthFlags ────┤   Consumer   ─► TaskActor(consumer_period)
//!   Watchdog ───────┘   Supervisor ─► TaskActor(supervisor_period)
//!                       idle probes, Watchdog::run
//!
//! select! {
//!   Reboot::requested() ─► abort all actors ─► Exit::Restart(cause)
//!   shutdown            ─► publish ShutdownRequested
//!                          ─► runtime_token.cancel()
//!                          ─► wait up to grace:
//!                               ├─ all joined → AllStoppedWithin → Exit::Shutdown
//!                               └─ timeout    → GraceExceeded   → RuntimeError::GraceExceeded
//! }
//! ```
//!
//! - A restart is non-graceful: actors are aborted where they stand, nothing is saved.
//! - Subscribers are flushed before `run_until` returns, so the last reports
//!   (e.g. `RestartRequested`) are delivered before the host restarts.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use watchvisor::{restart_process, Config, Exit, LogWriter, Runtime, Subscribe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let log: Arc<dyn Subscribe> = Arc::new(LogWriter);
//!     let runtime = Runtime::builder(Config::default())
//!         .with_subscribers(vec![log])
//!         .build()?;
//!
//!     match runtime.run().await? {
//!         Exit::Shutdown => Ok(()),
//!         Exit::Restart(cause) => restart_process(&cause),
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::{AbortHandle, JoinSet};
use tokio::time;
use tokio_util::sync::CancellationToken;

use super::{actor::TaskActor, builder::RuntimeBuilder, reboot::Reboot, shutdown, RestartCause};
use crate::core::Config;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::heap::Heap;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::sync::{HealthFlags, Signals};
use crate::tasks::{self, Channel, Consumer, Producer, Supervisor};
use crate::watchdog::{idle_probe, Watchdog};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    /// An OS signal was received and every actor stopped within the grace period.
    Shutdown,
    /// A restart was requested; the caller must restart the process.
    Restart(RestartCause),
}

/// Owns the configuration, bus, heap and subscribers; spawns the pipeline per run.
pub struct Runtime {
    cfg: Config,
    bus: Bus,
    heap: Heap,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Runtime {
    /// Starts building a runtime.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        heap: Heap,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        Self {
            cfg,
            bus,
            heap,
            subscribers,
        }
    }

    /// The runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// The event bus; subscribe before running to observe every report.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The heap work items are allocated from.
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Runs until a restart is requested or an OS termination signal arrives.
    pub async fn run(&self) -> Result<Exit, RuntimeError> {
        self.run_until(shutdown::wait_for_shutdown_signal()).await
    }

    /// Runs until a restart is requested or `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<Exit, RuntimeError>
    where
        F: Future + Send,
    {
        let stop_listener = CancellationToken::new();
        let listener = tokio::spawn(forward(
            self.bus.subscribe(),
            SubscriberSet::new(self.subscribers.clone(), self.bus.clone()),
            stop_listener.clone(),
        ));

        let runtime_token = CancellationToken::new();
        let reboot = Reboot::new(self.bus.clone());
        let mut set = JoinSet::new();
        let actors = self.spawn_actors(&mut set, &runtime_token, &reboot);

        let exit = tokio::select! {
            cause = reboot.requested() => {
                set.abort_all();
                Ok(Exit::Restart(cause))
            }
            _ = shutdown => {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                runtime_token.cancel();
                self.wait_all_with_grace(&mut set, &actors).await
            }
        };

        stop_listener.cancel();
        let _ = listener.await;
        exit
    }

    /// Builds the shared objects and spawns every actor into `set`.
    ///
    /// Returns the name and abort handle of each spawned actor.
    fn spawn_actors(
        &self,
        set: &mut JoinSet<()>,
        runtime_token: &CancellationToken,
        reboot: &Reboot,
    ) -> Vec<(String, AbortHandle)> {
        let channel = Arc::new(Channel::new());
        let flags = HealthFlags::new();
        let watchdog = Watchdog::new(self.cfg.watchdog, self.bus.clone());

        let producer = Producer::new(
            self.heap.clone(),
            Arc::clone(&channel),
            flags.signal(Signals::PRODUCER_OK),
            watchdog.register(tasks::PRODUCER),
            self.bus.clone(),
        );
        let consumer = Consumer::new(
            channel,
            flags.signal(Signals::CONSUMER_OK),
            watchdog.register(tasks::CONSUMER),
            self.bus.clone(),
            reboot.clone(),
            self.cfg.escalation,
            self.cfg.restart_delay,
        );
        let supervisor = Supervisor::new(
            flags.into_reader(),
            watchdog.register(tasks::SUPERVISOR),
            self.bus.clone(),
        );

        let mut actors = Vec::new();
        for actor in [
            TaskActor::new(producer, self.cfg.producer_period),
            TaskActor::new(consumer, self.cfg.consumer_period),
            TaskActor::new(supervisor, self.cfg.supervisor_period),
        ] {
            let name = actor.name().to_string();
            let handle = set.spawn(actor.run(runtime_token.child_token()));
            actors.push((name, handle));
        }

        let probe_every = self.cfg.watchdog.poll_interval();
        for n in self.cfg.watchdog.idle_contexts() {
            let name = format!("idle{n}");
            let probe = idle_probe(
                watchdog.register(name.as_str()),
                probe_every,
                runtime_token.child_token(),
            );
            actors.push((name, set.spawn(probe)));
        }

        let monitor = watchdog.run(runtime_token.child_token(), reboot.clone());
        actors.push(("watchdog".to_string(), set.spawn(monitor)));
        actors
    }

    /// Waits for all actors to finish within the configured grace period.
    ///
    /// Publishes [`EventKind::AllStoppedWithin`] on success, or
    /// [`EventKind::GraceExceeded`] on timeout, aborting the stragglers.
    async fn wait_all_with_grace(
        &self,
        set: &mut JoinSet<()>,
        actors: &[(String, AbortHandle)],
    ) -> Result<Exit, RuntimeError> {
        let grace = self.cfg.grace;
        let done = async { while set.join_next().await.is_some() {} };

        match time::timeout(grace, done).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(Exit::Shutdown)
            }
            Err(_elapsed) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                let stuck: Vec<String> = actors
                    .iter()
                    .filter(|(_, handle)| !handle.is_finished())
                    .map(|(name, _)| name.clone())
                    .collect();
                set.abort_all();
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}

/// Forwards bus events to the subscriber set until `stop`, then flushes.
async fn forward(
    mut rx: broadcast::Receiver<Event>,
    subs: SubscriberSet,
    stop: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            res = rx.recv() => match res {
                Ok(ev) => subs.emit(&ev),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = stop.cancelled() => break,
        }
    }
    while let Ok(ev) = rx.try_recv() {
        subs.emit(&ev);
    }
    subs.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::WorkItem;
    use crate::watchdog::TriggerAction;
    use std::time::Duration;

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn count(events: &[Event], kind: EventKind) -> usize {
        events.iter().filter(|e| e.kind == kind).count()
    }

    /// Heap whose only slot is held by the caller: every producer allocation fails.
    fn starved_heap() -> (Heap, crate::heap::HeapBox<WorkItem>) {
        let heap = Heap::new(1);
        let lease = heap.try_alloc(WorkItem::default()).unwrap();
        (heap, lease)
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_every_actor_within_grace() {
        let rt = Runtime::builder(Config::default()).build().unwrap();
        let mut rx = rt.bus().subscribe();

        let exit = rt.run_until(time::sleep(Duration::from_secs(5))).await;
        assert_eq!(exit.unwrap(), Exit::Shutdown);

        let events = drain(&mut rx);
        assert!(count(&events, EventKind::ItemSent) > 0);
        assert!(count(&events, EventKind::ItemReceived) > 0);
        assert!(count(&events, EventKind::HealthReport) > 0);
        assert_eq!(count(&events, EventKind::WatchdogExpired), 0);
        assert_eq!(count(&events, EventKind::RestartRequested), 0);
        assert_eq!(count(&events, EventKind::ShutdownRequested), 1);
        assert_eq!(count(&events, EventKind::AllStoppedWithin), 1);

        // Every item ever allocated has been released.
        let stats = rt.heap().stats();
        assert_eq!(stats.live, 0);
        assert_eq!(stats.allocated, stats.freed);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_producer_trips_the_watchdog() {
        let (heap, _lease) = starved_heap();
        let rt = Runtime::builder(Config::default())
            .with_heap(heap)
            .build()
            .unwrap();
        let mut rx = rt.bus().subscribe();
        let started = time::Instant::now();

        let exit = rt.run_until(std::future::pending::<()>()).await.unwrap();
        assert_eq!(
            exit,
            Exit::Restart(RestartCause::Watchdog {
                task: Arc::from(tasks::PRODUCER)
            })
        );

        // Polled every 1.25s; the first poll strictly past 5s is at 6.25s.
        assert_eq!(started.elapsed(), Duration::from_millis(6250));

        let events = drain(&mut rx);
        assert!(count(&events, EventKind::AllocFailed) > 0);
        assert_eq!(count(&events, EventKind::ItemSent), 0);
        assert_eq!(count(&events, EventKind::RestartRequested), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn starved_consumer_requests_restart_after_delay() {
        let (heap, _lease) = starved_heap();
        let mut cfg = Config::default();
        cfg.watchdog.trigger = TriggerAction::Report;
        let rt = Runtime::builder(cfg).with_heap(heap).build().unwrap();
        let mut rx = rt.bus().subscribe();
        let started = time::Instant::now();

        let exit = rt.run_until(std::future::pending::<()>()).await.unwrap();
        assert_eq!(
            exit,
            Exit::Restart(RestartCause::ConsumerStalled { failures: 15 })
        );
        // 15th failure at t=14s, then the 1s restart delay.
        assert_eq!(started.elapsed(), Duration::from_secs(15));

        let events = drain(&mut rx);
        assert_eq!(count(&events, EventKind::SoftFailure), 1);
        assert_eq!(count(&events, EventKind::ChannelReset), 1);
        assert_eq!(count(&events, EventKind::RestartScheduled), 1);
        assert!(events.iter().any(|e| {
            e.kind == EventKind::WatchdogExpired && e.task.as_deref() == Some(tasks::PRODUCER)
        }));
        assert!(events
            .iter()
            .filter(|e| e.kind == EventKind::HealthReport)
            .all(|e| e.health == Some(crate::events::Health::Failed)));
    }
}
