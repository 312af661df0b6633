//! # Consumer: drain, release, escalate.
//!
//! ```text
//! cycle():
//!   try_recv ── Ok ────► drop item, failures = 0, check-in, CONSUMER_OK, ItemReceived
//!            └─ Empty ─► failures += 1, ReceiveFailed
//!                          ├─ == warn_at    ─► SoftFailure
//!                          ├─ == reset_at   ─► channel.reset(), ChannelReset
//!                          └─ == restart_at ─► RestartScheduled, sleep, Reboot::trigger (never returns)
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;

use super::item::{Channel, WorkItem};
use super::task::Task;
use crate::core::{Reboot, RestartCause};
use crate::error::CycleError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::{Escalation, EscalationPolicy, FailureCounter, RecoveryState};
use crate::sync::{HealthSignal, TryRecvError};
use crate::watchdog::WatchdogHandle;

/// Periodically drains the channel and runs the escalating recovery policy.
pub struct Consumer {
    name: Arc<str>,
    channel: Arc<Channel>,
    signal: HealthSignal,
    watchdog: WatchdogHandle,
    bus: Bus,
    reboot: Reboot,
    counter: FailureCounter,
    restart_delay: Duration,
}

impl Consumer {
    /// Creates a consumer in the `Normal` state.
    pub fn new(
        channel: Arc<Channel>,
        signal: HealthSignal,
        watchdog: WatchdogHandle,
        bus: Bus,
        reboot: Reboot,
        policy: EscalationPolicy,
        restart_delay: Duration,
    ) -> Self {
        Self {
            name: Arc::from(super::CONSUMER),
            channel,
            signal,
            watchdog,
            bus,
            reboot,
            counter: FailureCounter::new(policy),
            restart_delay,
        }
    }

    /// Consecutive failed drains.
    pub fn failures(&self) -> u32 {
        self.counter.count()
    }

    /// Current recovery state.
    pub fn state(&self) -> RecoveryState {
        self.counter.state()
    }

    /// Runs one consumer cycle and returns the drained item.
    ///
    /// When the restart threshold is reached this future never completes.
    pub async fn step(&mut self) -> Result<WorkItem, CycleError> {
        let parcel = match self.channel.try_recv() {
            Ok(parcel) => parcel,
            Err(TryRecvError::Empty) => {
                let due = self.counter.record_failure();
                let failures = self.counter.count();
                self.publish(Event::new(EventKind::ReceiveFailed).with_failures(failures));
                if let Some(action) = due {
                    self.escalate(action).await;
                }
                return Err(CycleError::ChannelEmpty { failures });
            }
        };

        let item = *parcel;
        drop(parcel);
        self.counter.record_success();
        self.watchdog.check_in();
        self.signal.set();
        self.publish(Event::new(EventKind::ItemReceived).with_item(item.id, item.payload));
        Ok(item)
    }

    async fn escalate(&mut self, action: Escalation) {
        let failures = self.counter.count();
        match action {
            Escalation::SoftFailure => {
                self.publish(Event::new(EventKind::SoftFailure).with_failures(failures));
            }
            Escalation::ResetChannel => {
                let discarded = self.channel.reset();
                self.publish(
                    Event::new(EventKind::ChannelReset)
                        .with_failures(failures)
                        .with_reason(if discarded { "discarded" } else { "empty" }),
                );
            }
            Escalation::Restart => {
                self.publish(
                    Event::new(EventKind::RestartScheduled)
                        .with_failures(failures)
                        .with_delay(self.restart_delay),
                );
                time::sleep(self.restart_delay).await;
                match self
                    .reboot
                    .trigger(RestartCause::ConsumerStalled { failures })
                    .await
                {}
            }
        }
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_task(Arc::clone(&self.name)));
    }
}

#[async_trait]
impl Task for Consumer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn cycle(&mut self) {
        // Outcomes are reported on the bus.
        let _ = self.step().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use crate::sync::{HealthFlags, HealthReader, Signals};
    use crate::watchdog::{Watchdog, WatchdogConfig};
    use tokio::sync::broadcast;
    use tokio::time::Instant;

    struct Rig {
        consumer: Consumer,
        heap: Heap,
        channel: Arc<Channel>,
        reader: HealthReader,
        watchdog: Watchdog,
        reboot: Reboot,
        rx: broadcast::Receiver<Event>,
    }

    fn rig() -> Rig {
        let bus = Bus::new(256);
        let rx = bus.subscribe();
        let channel = Arc::new(Channel::new());
        let flags = HealthFlags::new();
        let watchdog = Watchdog::new(WatchdogConfig::default(), bus.clone());
        let reboot = Reboot::new(bus.clone());
        let consumer = Consumer::new(
            Arc::clone(&channel),
            flags.signal(Signals::CONSUMER_OK),
            watchdog.register("consumer"),
            bus,
            reboot.clone(),
            EscalationPolicy::default(),
            Duration::from_secs(1),
        );
        Rig {
            consumer,
            heap: Heap::new(4),
            channel,
            reader: flags.into_reader(),
            watchdog,
            reboot,
            rx,
        }
    }

    fn offer(r: &Rig, id: u32) {
        let parcel = r
            .heap
            .try_alloc(WorkItem {
                id,
                payload: id + 1,
            })
            .unwrap();
        r.channel.try_send(parcel).unwrap();
    }

    fn kinds(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev.kind);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn drain_frees_item_signals_and_checks_in() {
        let mut r = rig();
        offer(&r, 7);
        time::advance(Duration::from_secs(6)).await;

        let item = r.consumer.step().await.unwrap();
        assert_eq!(item, WorkItem { id: 7, payload: 8 });
        assert_eq!(r.heap.stats().live, 0);
        assert_eq!(r.heap.stats().freed, 1);
        assert_eq!(r.reader.take(Signals::all()), Signals::CONSUMER_OK);
        assert!(r.watchdog.expired(Instant::now()).is_empty());
        assert_eq!(kinds(&mut r.rx), vec![EventKind::ItemReceived]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_drain_neither_signals_nor_checks_in() {
        let mut r = rig();
        time::advance(Duration::from_secs(6)).await;

        assert_eq!(
            r.consumer.step().await,
            Err(CycleError::ChannelEmpty { failures: 1 })
        );
        assert_eq!(r.reader.take(Signals::all()), Signals::empty());
        assert_eq!(r.watchdog.expired(Instant::now()).len(), 1);
    }

    #[tokio::test]
    async fn nine_failures_then_reset_at_ten() {
        let mut r = rig();
        for _ in 0..9 {
            assert!(r.consumer.step().await.is_err());
        }
        let before = kinds(&mut r.rx);
        assert!(!before.contains(&EventKind::ChannelReset));
        assert_eq!(
            before.iter().filter(|k| **k == EventKind::SoftFailure).count(),
            1
        );
        assert_eq!(r.consumer.state(), RecoveryState::Warned);

        assert!(r.consumer.step().await.is_err());
        let tenth = kinds(&mut r.rx);
        assert_eq!(
            tenth,
            vec![EventKind::ReceiveFailed, EventKind::ChannelReset]
        );
        assert_eq!(r.consumer.state(), RecoveryState::Degraded);

        for _ in 0..4 {
            assert!(r.consumer.step().await.is_err());
        }
        assert!(!kinds(&mut r.rx).contains(&EventKind::ChannelReset));
        assert_eq!(r.reboot.cause(), None);
    }

    #[tokio::test]
    async fn success_before_restart_cancels_escalation() {
        let mut r = rig();
        for _ in 0..14 {
            assert!(r.consumer.step().await.is_err());
        }
        offer(&r, 0);
        r.consumer.step().await.unwrap();
        assert_eq!(r.consumer.failures(), 0);
        assert_eq!(r.consumer.state(), RecoveryState::Normal);

        for _ in 0..14 {
            assert!(r.consumer.step().await.is_err());
        }
        assert_eq!(r.reboot.cause(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_fires_exactly_at_fifteen_and_never_returns() {
        let mut r = rig();
        for _ in 0..14 {
            assert!(r.consumer.step().await.is_err());
        }
        assert_eq!(r.reboot.cause(), None);
        kinds(&mut r.rx);

        let parked = time::timeout(Duration::from_secs(30), r.consumer.step()).await;
        assert!(parked.is_err());
        assert_eq!(
            r.reboot.cause(),
            Some(RestartCause::ConsumerStalled { failures: 15 })
        );
        assert_eq!(
            kinds(&mut r.rx),
            vec![
                EventKind::ReceiveFailed,
                EventKind::RestartScheduled,
                EventKind::RestartRequested
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn restart_waits_for_the_delay_first() {
        let mut r = rig();
        for _ in 0..14 {
            let _ = r.consumer.step().await;
        }
        let parked = time::timeout(Duration::from_millis(500), r.consumer.step()).await;
        assert!(parked.is_err());
        assert_eq!(r.reboot.cause(), None);
    }
}
