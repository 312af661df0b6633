//! # Clear-on-read health flags.
//!
//! A single atomic word holds one bit per liveness signal. Owners set their
//! bit through a [`HealthSignal`] bound to it; the unique [`HealthReader`]
//! takes the bits, clearing exactly what it observed in the same atomic step.
//!
//! ```text
//! producer ─ HealthSignal(PRODUCER_OK).set() ─┐
//!                                             ├─► AtomicU32 ─► HealthReader::take(mask)
//! consumer ─ HealthSignal(CONSUMER_OK).set() ─┘                (fetch_and(!mask))
//! ```
//!
//! ## Rules
//! - `set` is an OR-merge (idempotent) and can never be lost to a concurrent `take`.
//! - `take(mask)` returns the masked bits present at that instant and clears the whole mask.
//! - Only one [`HealthReader`] exists per [`HealthFlags`] (it is created by consuming it).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bitflags::bitflags;

bitflags! {
    /// Liveness signals tracked by the supervisor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Signals: u32 {
        /// The producer handed an item to the channel this period.
        const PRODUCER_OK = 1 << 0;
        /// The consumer drained an item this period.
        const CONSUMER_OK = 1 << 1;
    }
}

/// Owner of a fresh, all-clear flag word.
///
/// Hand out one [`HealthSignal`] per owner, then convert into the single reader.
#[derive(Debug, Default)]
pub struct HealthFlags {
    bits: Arc<AtomicU32>,
}

impl HealthFlags {
    /// Creates a flag word with no bits set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a setter restricted to `flag`.
    pub fn signal(&self, flag: Signals) -> HealthSignal {
        HealthSignal {
            bits: Arc::clone(&self.bits),
            flag,
        }
    }

    /// Consumes the flags and returns the only reader.
    pub fn into_reader(self) -> HealthReader {
        HealthReader { bits: self.bits }
    }
}

/// Setter for one owner's bits.
#[derive(Debug, Clone)]
pub struct HealthSignal {
    bits: Arc<AtomicU32>,
    flag: Signals,
}

impl HealthSignal {
    /// Raises this owner's bit.
    #[inline]
    pub fn set(&self) {
        self.bits.fetch_or(self.flag.bits(), Ordering::AcqRel);
    }

    /// The bit this signal controls.
    pub fn flag(&self) -> Signals {
        self.flag
    }
}

/// Exclusive clear-on-read view of the flags.
#[derive(Debug)]
pub struct HealthReader {
    bits: Arc<AtomicU32>,
}

impl HealthReader {
    /// Returns the requested bits that are set and clears all of `mask`.
    ///
    /// Never waits.
    pub fn take(&mut self, mask: Signals) -> Signals {
        let prev = self.bits.fetch_and(!mask.bits(), Ordering::AcqRel);
        Signals::from_bits_truncate(prev) & mask
    }

    /// Returns the current bits without clearing them.
    pub fn peek(&self) -> Signals {
        Signals::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }
}
