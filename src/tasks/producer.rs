//! # Producer: allocate, number, offer.
//!
//! ```text
//! cycle():
//!   try_alloc ── Err ──► AllocFailed                      (no flag, no check-in)
//!      │ Ok
//!   id = seq++, payload = id + 1
//!   try_send ── Ok ───► PRODUCER_OK, check-in, ItemSent
//!            └─ Full ─► drop item, check-in, SendFailed   (no flag)
//! ```
//!
//! The allocation-failure path deliberately skips the watchdog check-in:
//! sustained allocation failure lets the watchdog fire.

use std::sync::Arc;

use async_trait::async_trait;

use super::item::{Channel, WorkItem};
use super::task::Task;
use crate::error::CycleError;
use crate::events::{Bus, Event, EventKind};
use crate::heap::Heap;
use crate::sync::HealthSignal;
use crate::watchdog::WatchdogHandle;

/// Periodically hands freshly allocated items to the channel.
pub struct Producer {
    name: Arc<str>,
    heap: Heap,
    channel: Arc<Channel>,
    signal: HealthSignal,
    watchdog: WatchdogHandle,
    bus: Bus,
    seq: u32,
}

impl Producer {
    /// Creates a producer whose first item gets id 0.
    pub fn new(
        heap: Heap,
        channel: Arc<Channel>,
        signal: HealthSignal,
        watchdog: WatchdogHandle,
        bus: Bus,
    ) -> Self {
        Self {
            name: Arc::from(super::PRODUCER),
            heap,
            channel,
            signal,
            watchdog,
            bus,
            seq: 0,
        }
    }

    /// Id the next successfully allocated item will get.
    pub fn next_id(&self) -> u32 {
        self.seq
    }

    /// Runs one producer cycle and returns the item that was sent.
    pub fn step(&mut self) -> Result<WorkItem, CycleError> {
        let mut parcel = match self.heap.try_alloc(WorkItem::default()) {
            Ok(parcel) => parcel,
            Err(e) => {
                self.bus.publish(
                    Event::new(EventKind::AllocFailed)
                        .with_task(Arc::clone(&self.name))
                        .with_reason(e.to_string()),
                );
                return Err(e.into());
            }
        };

        parcel.id = self.seq;
        parcel.payload = self.seq.wrapping_add(1);
        self.seq = self.seq.wrapping_add(1);
        let item = *parcel;

        let result = match self.channel.try_send(parcel) {
            Ok(()) => {
                self.signal.set();
                Ok(item)
            }
            Err(rejected) => {
                drop(rejected.into_inner());
                Err(CycleError::ChannelFull { id: item.id })
            }
        };
        self.watchdog.check_in();

        let kind = if result.is_ok() {
            EventKind::ItemSent
        } else {
            EventKind::SendFailed
        };
        self.bus.publish(
            Event::new(kind)
                .with_task(Arc::clone(&self.name))
                .with_item(item.id, item.payload),
        );
        result
    }
}

#[async_trait]
impl Task for Producer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn cycle(&mut self) {
        // Both outcomes were already reported on the bus.
        let _ = self.step();
    }
}
