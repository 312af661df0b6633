//! Shared primitives the tasks cooperate through.
//!
//! - [`Slot`] single-slot, non-blocking, ownership-transferring channel
//! - [`HealthFlags`] / [`HealthSignal`] / [`HealthReader`] clear-on-read liveness bits

mod health;
mod slot;

pub use health::{HealthFlags, HealthReader, HealthSignal, Signals};
pub use slot::{Slot, TryRecvError, TrySendError};
