//! # Bounded, accounted heap for work items.
//!
//! [`Heap`] hands out [`HeapBox`] allocations up to a fixed number of live
//! items. Exhaustion is reported as [`AllocError::Exhausted`] instead of
//! aborting the process, so the producer can treat it as a transient failure.
//!
//! ## Rules
//! - A reservation is taken **before** the value is boxed; a failed reservation allocates nothing.
//! - Every [`HeapBox`] releases its reservation exactly once, on drop.
//! - `allocated - freed == live` at every quiescent point.
//!
//! ```text
//! try_alloc() ──► reserve (live < capacity?) ──► Box::new ──► HeapBox
//!                        └─ no ──► AllocError::Exhausted
//! drop(HeapBox) ──► live -= 1, freed += 1
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::AllocError;

struct Accounts {
    capacity: usize,
    live: AtomicUsize,
    allocated: AtomicU64,
    freed: AtomicU64,
}

/// Snapshot of heap counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    /// Successful allocations since creation.
    pub allocated: u64,
    /// Allocations released since creation.
    pub freed: u64,
    /// Allocations currently alive.
    pub live: usize,
}

/// Cloneable handle to a bounded heap. Clones share the same accounts.
#[derive(Clone)]
pub struct Heap {
    accounts: Arc<Accounts>,
}

impl Heap {
    /// Creates a heap that allows at most `capacity` live allocations.
    pub fn new(capacity: usize) -> Self {
        Self {
            accounts: Arc::new(Accounts {
                capacity,
                live: AtomicUsize::new(0),
                allocated: AtomicU64::new(0),
                freed: AtomicU64::new(0),
            }),
        }
    }

    /// Moves `value` onto the heap, or fails if the heap is exhausted.
    pub fn try_alloc<T>(&self, value: T) -> Result<HeapBox<T>, AllocError> {
        let capacity = self.accounts.capacity;
        self.accounts
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < capacity).then_some(live + 1)
            })
            .map_err(|_| AllocError::Exhausted { capacity })?;

        self.accounts.allocated.fetch_add(1, Ordering::Relaxed);
        Ok(HeapBox {
            value: Box::new(value),
            accounts: Arc::clone(&self.accounts),
        })
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.accounts.capacity
    }

    /// Returns the current counters.
    pub fn stats(&self) -> HeapStats {
        HeapStats {
            allocated: self.accounts.allocated.load(Ordering::Acquire),
            freed: self.accounts.freed.load(Ordering::Acquire),
            live: self.accounts.live.load(Ordering::Acquire),
        }
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("capacity", &self.accounts.capacity)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Owned heap allocation; releases its reservation on drop.
pub struct HeapBox<T> {
    value: Box<T>,
    accounts: Arc<Accounts>,
}

impl<T> Deref for HeapBox<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for HeapBox<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for HeapBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.value, f)
    }
}

impl<T> Drop for HeapBox<T> {
    fn drop(&mut self) {
        self.accounts.freed.fetch_add(1, Ordering::Relaxed);
        self.accounts.live.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_past_capacity_and_recovers_after_drop() {
        let heap = Heap::new(2);
        let a = heap.try_alloc(1u32).unwrap();
        let b = heap.try_alloc(2u32).unwrap();
        assert_eq!(
            heap.try_alloc(3u32).unwrap_err(),
            AllocError::Exhausted { capacity: 2 }
        );

        drop(a);
        let c = heap.try_alloc(4u32).unwrap();
        assert_eq!((*b, *c), (2, 4));
        assert_eq!(
            heap.stats(),
            HeapStats {
                allocated: 3,
                freed: 1,
                live: 2
            }
        );
    }

    #[test]
    fn clones_share_accounts() {
        let heap = Heap::new(1);
        let other = heap.clone();
        let held = heap.try_alloc(()).unwrap();
        assert!(other.try_alloc(()).is_err());
        drop(held);
        assert_eq!(other.stats().freed, 1);
        assert_eq!(other.stats().live, 0);
    }

    #[test]
    fn zero_capacity_never_allocates() {
        let heap = Heap::new(0);
        assert!(heap.try_alloc(0u8).is_err());
        assert_eq!(heap.stats().allocated, 0);
    }
}
