//! Work items and the channel that carries them.

use crate::heap::HeapBox;
use crate::sync::Slot;

/// Unit of work handed from producer to consumer.
///
/// `id` increases by one per allocated item (wrapping); `payload` is `id + 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkItem {
    /// Sequence number assigned by the producer.
    pub id: u32,
    /// Value correlated with `id`.
    pub payload: u32,
}

/// A heap-allocated work item; dropping it frees the allocation.
pub type Parcel = HeapBox<WorkItem>;

/// The producer → consumer handoff.
pub type Channel = Slot<Parcel>;
