//! # Single-slot handoff channel.
//!
//! [`Slot`] holds at most one value. Offers and drains never wait: a full
//! slot rejects the offer and hands the value back, an empty slot reports
//! [`TryRecvError::Empty`].
//!
//! ## Ownership
//! ```text
//! producer ── try_send(v) ──► [ slot ] ── try_recv() ──► consumer
//!     ▲            │ full                                   │
//!     └── Err(Full(v)) (caller drops v)               drop after use
//!
//! reset() ──► takes and drops the held value, slot is empty again
//! ```
//!
//! ## Rules
//! - Capacity is exactly one; there is no queueing behind a full slot.
//! - `try_send`, `try_recv` and `reset` are mutually exclusive (one mutex).
//! - A rejected value is returned to the caller, never dropped silently by the slot.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Error returned by [`Slot::try_send`]; carries the rejected value back.
#[derive(PartialEq, Eq)]
pub enum TrySendError<T> {
    /// The slot already holds a value.
    Full(T),
}

impl<T> TrySendError<T> {
    /// Returns the rejected value.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(v) => v,
        }
    }
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.write_str("Full(..)"),
        }
    }
}

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("slot is full")
    }
}

impl<T> std::error::Error for TrySendError<T> {}

/// Error returned by [`Slot::try_recv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TryRecvError {
    /// Nothing to take.
    #[error("slot is empty")]
    Empty,
}

/// Bounded channel of capacity one.
pub struct Slot<T> {
    cell: Mutex<Option<T>>,
}

impl<T> Slot<T> {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            cell: Mutex::new(None),
        }
    }

    // A panic while holding the lock cannot leave the Option half-written.
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offers a value without waiting.
    ///
    /// On success ownership moves into the slot. When the slot is already
    /// occupied the value is returned in [`TrySendError::Full`].
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let mut cell = self.lock();
        if cell.is_some() {
            return Err(TrySendError::Full(value));
        }
        *cell = Some(value);
        Ok(())
    }

    /// Takes the held value without waiting.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.lock().take().ok_or(TryRecvError::Empty)
    }

    /// Drops any held value and leaves the slot empty.
    ///
    /// Returns `true` if a value was discarded. The value is dropped after the
    /// lock is released.
    pub fn reset(&self) -> bool {
        let stale = self.lock().take();
        stale.is_some()
    }

    /// Number of values held (0 or 1).
    pub fn len(&self) -> usize {
        usize::from(self.lock().is_some())
    }

    /// Returns `true` if the slot holds nothing.
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use std::sync::Arc;

    #[test]
    fn full_slot_hands_value_back() {
        let slot = Slot::new();
        slot.try_send(1).unwrap();
        match slot.try_send(2) {
            Err(TrySendError::Full(v)) => assert_eq!(v, 2),
            Ok(()) => panic!("second send must be rejected"),
        }
        assert_eq!(slot.len(), 1);
        assert_eq!(slot.try_recv(), Ok(1));
        assert_eq!(slot.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn reset_frees_held_value() {
        let heap = Heap::new(4);
        let slot = Slot::new();
        slot.try_send(heap.try_alloc(7u32).unwrap()).unwrap();
        assert_eq!(heap.stats().live, 1);

        assert!(slot.reset());
        assert!(slot.is_empty());
        assert_eq!(heap.stats().live, 0);
        assert_eq!(heap.stats().freed, 1);

        assert!(!slot.reset());
    }

    #[test]
    fn concurrent_senders_never_exceed_one() {
        let slot = Arc::new(Slot::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let slot = Arc::clone(&slot);
                std::thread::spawn(move || {
                    let mut accepted = 0;
                    for i in 0..1000 {
                        if slot.try_send(n * 1000 + i).is_ok() {
                            accepted += 1;
                        }
                        assert!(slot.len() <= 1);
                        let _ = slot.try_recv();
                    }
                    accepted
                })
            })
            .collect();

        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert!(accepted > 0);
        assert!(slot.len() <= 1);
    }
}
