//! # The three supervised tasks.
//!
//! - [`Task`] - trait for a periodic unit driven by the runtime's actor
//! - [`Producer`] - allocates [`WorkItem`]s and offers them to the [`Channel`]
//! - [`Consumer`] - drains the channel and escalates on sustained emptiness
//! - [`Supervisor`] - samples the health flags and classifies them

mod consumer;
mod item;
mod producer;
mod supervisor;
mod task;

pub use consumer::Consumer;
pub use item::{Channel, Parcel, WorkItem};
pub use producer::Producer;
pub use supervisor::Supervisor;
pub use task::Task;

/// Task and watchdog subject name of the producer.
pub const PRODUCER: &str = "producer";
/// Task and watchdog subject name of the consumer.
pub const CONSUMER: &str = "consumer";
/// Task and watchdog subject name of the supervisor.
pub const SUPERVISOR: &str = "supervisor";
