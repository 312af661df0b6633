//! # watchvisor
//!
//! **Watchvisor** is a small self-supervising producer/consumer runtime.
//!
//! Three periodic tasks cooperate through a single-slot channel and a pair of
//! clear-on-read health flags. A watchdog restarts the process when any task
//! stops checking in, and the consumer escalates sustained starvation from a
//! soft warning to a channel reset to an aggressive restart.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐  Slot<HeapBox<WorkItem>>  ┌──────────────┐
//!     │   Producer   │ ────────────────────────► │   Consumer   │
//!     │ (heap alloc) │                           │ (escalation) │
//!     └──────┬───────┘                           └──────┬───────┘
//!            │ PRODUCER_OK       HealthFlags            │ CONSUMER_OK
//!            └──────────────────────┬───────────────────┘
//!                                   ▼ take (clear-on-read)
//!                           ┌──────────────┐
//!                           │  Supervisor  │ ─► HealthReport
//!                           └──────────────┘
//!
//!  check_in() from producer, consumer, supervisor, idle probes
//!            ▼
//!     ┌──────────────┐  expired   ┌──────────────┐  first cause wins
//!     │   Watchdog   │ ─────────► │    Reboot    │ ─────────────────► Exit::Restart
//!     └──────────────┘            └──────────────┘
//!            ▲                           ▲
//!            │                           │ failures == restart_at
//!            │                     Consumer escalation
//!
//!   every component ── publish(Event) ──► Bus ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ### Lifecycle
//! ```text
//! Runtime::builder(cfg).build()?  ─► Config::validate()
//! Runtime::run()
//!   ├─► spawn TaskActor(producer), TaskActor(consumer), TaskActor(supervisor)
//!   ├─► spawn idle probes and Watchdog::run
//!   └─► wait:
//!         ├─ restart requested ─► abort actors ─► Ok(Exit::Restart(cause))
//!         └─ OS signal         ─► cancel, wait up to grace ─► Ok(Exit::Shutdown)
//!                                                          └► Err(GraceExceeded)
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Runtime**       | Wire the pipeline, drive the tasks, decide the exit.           | [`Runtime`], [`Exit`], [`Config`]           |
//! | **Tasks**         | Producer, consumer and health supervisor.                      | [`Task`], [`Producer`], [`Consumer`], [`Supervisor`] |
//! | **Recovery**      | Consecutive-failure escalation and process restart.            | [`EscalationPolicy`], [`Reboot`]            |
//! | **Watchdog**      | Per-task check-in deadlines.                                   | [`Watchdog`], [`WatchdogConfig`]            |
//! | **Subscriber API**| Hook into runtime events (logging, custom reporting).          | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed errors for the runtime, cycles, config and allocation.   | [`RuntimeError`], [`CycleError`]            |
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use watchvisor::{restart_process, Config, Exit, LogWriter, Runtime, Subscribe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!     let runtime = Runtime::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     match runtime.run().await? {
//!         Exit::Shutdown => Ok(()),
//!         Exit::Restart(cause) => restart_process(&cause),
//!     }
//! }
//! ```
mod core;
mod error;
mod events;
mod heap;
mod policies;
mod subscribers;
mod sync;
mod tasks;
mod watchdog;

// ---- Public re-exports ----

pub use crate::core::{
    restart_process, Config, Exit, Reboot, RestartCause, Runtime, RuntimeBuilder,
    RESTART_EXIT_CODE,
};
pub use error::{AllocError, ConfigError, CycleError, RuntimeError};
pub use events::{Bus, Event, EventKind, Health};
pub use heap::{Heap, HeapBox, HeapStats};
pub use policies::{Escalation, EscalationPolicy, FailureCounter, RecoveryState};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use sync::{HealthFlags, HealthReader, HealthSignal, Signals, Slot, TryRecvError, TrySendError};
pub use tasks::{Channel, Consumer, Parcel, Producer, Supervisor, Task, WorkItem};
pub use tasks::{CONSUMER, PRODUCER, SUPERVISOR};
pub use watchdog::{idle_probe, TriggerAction, Watchdog, WatchdogConfig, WatchdogHandle};
