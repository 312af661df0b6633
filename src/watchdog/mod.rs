//! Task watchdog.
//!
//! Every supervised task registers a subject and receives a [`WatchdogHandle`];
//! it must call [`WatchdogHandle::check_in`] within [`WatchdogConfig::timeout`].
//! The monitor ([`Watchdog::run`]) applies [`TriggerAction`] to any subject
//! that falls behind. Idle probes ([`idle_probe`]) cover the execution
//! contexts selected by [`WatchdogConfig::idle_mask`].

mod config;
mod idle;
mod monitor;

pub use config::{TriggerAction, WatchdogConfig};
pub use idle::idle_probe;
pub use monitor::{Watchdog, WatchdogHandle};
