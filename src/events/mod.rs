//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Health`] four-way supervisor classification carried by `HealthReport`
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Producer`, `Consumer`, `Supervisor`, `Watchdog`, `Reboot`,
//!   `Runtime`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the runtime listener, which fans out to `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, Health};
