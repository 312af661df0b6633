//! # Supervisor: sample and classify health.
//!
//! Each cycle takes both health bits (clear-on-read), reports one of four
//! classifications and checks in with the watchdog. Because the read clears
//! the bits, owners must raise them again every period to look healthy.

use std::sync::Arc;

use async_trait::async_trait;

use super::task::Task;
use crate::events::{Bus, Event, EventKind, Health};
use crate::sync::{HealthReader, Signals};
use crate::watchdog::WatchdogHandle;

/// Periodic health aggregator; the only reader of the health flags.
pub struct Supervisor {
    name: Arc<str>,
    reader: HealthReader,
    watchdog: WatchdogHandle,
    bus: Bus,
}

impl Supervisor {
    /// Creates a supervisor owning the flags' reader.
    pub fn new(reader: HealthReader, watchdog: WatchdogHandle, bus: Bus) -> Self {
        Self {
            name: Arc::from(super::SUPERVISOR),
            reader,
            watchdog,
            bus,
        }
    }

    /// Runs one supervisor cycle.
    pub fn step(&mut self) -> Health {
        let signals = self.reader.take(Signals::all());
        let health = Health::classify(signals);
        self.bus.publish(
            Event::new(EventKind::HealthReport)
                .with_task(Arc::clone(&self.name))
                .with_health(health, signals),
        );
        self.watchdog.check_in();
        health
    }
}

#[async_trait]
impl Task for Supervisor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn cycle(&mut self) {
        self.step();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Reboot;
    use crate::heap::Heap;
    use crate::policies::EscalationPolicy;
    use crate::sync::HealthFlags;
    use crate::tasks::{Channel, Consumer, Producer};
    use crate::watchdog::{Watchdog, WatchdogConfig};
    use std::time::Duration;
    use tokio::time::{self, Instant};

    #[test]
    fn reports_each_combination_and_clears() {
        let bus = Bus::new(16);
        let flags = HealthFlags::new();
        let producer = flags.signal(Signals::PRODUCER_OK);
        let consumer = flags.signal(Signals::CONSUMER_OK);
        let wd = Watchdog::new(WatchdogConfig::default(), bus.clone());
        let mut sup = Supervisor::new(flags.into_reader(), wd.register("supervisor"), bus);

        assert_eq!(sup.step(), Health::Failed);
        producer.set();
        assert_eq!(sup.step(), Health::ProducerOnly);
        assert_eq!(sup.step(), Health::Failed);
        consumer.set();
        assert_eq!(sup.step(), Health::ConsumerOnly);
        producer.set();
        consumer.set();
        assert_eq!(sup.step(), Health::Healthy);
        assert_eq!(sup.step(), Health::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn checks_in_every_cycle_even_when_unhealthy() {
        let bus = Bus::new(16);
        let wd = Watchdog::new(WatchdogConfig::default(), bus.clone());
        let mut sup = Supervisor::new(
            HealthFlags::new().into_reader(),
            wd.register("supervisor"),
            bus,
        );
        time::advance(Duration::from_secs(6)).await;
        assert_eq!(sup.step(), Health::Failed);
        assert!(wd.expired(Instant::now()).is_empty());
    }

    #[tokio::test]
    async fn lockstep_pipeline_stays_fully_healthy() {
        let bus = Bus::new(256);
        let heap = Heap::new(2);
        let channel = Arc::new(Channel::new());
        let flags = HealthFlags::new();
        let wd = Watchdog::new(WatchdogConfig::default(), bus.clone());
        let mut producer = Producer::new(
            heap.clone(),
            Arc::clone(&channel),
            flags.signal(Signals::PRODUCER_OK),
            wd.register("producer"),
            bus.clone(),
        );
        let mut consumer = Consumer::new(
            Arc::clone(&channel),
            flags.signal(Signals::CONSUMER_OK),
            wd.register("consumer"),
            bus.clone(),
            Reboot::new(bus.clone()),
            EscalationPolicy::default(),
            Duration::from_secs(1),
        );
        let mut sup = Supervisor::new(flags.into_reader(), wd.register("supervisor"), bus);

        // Two producer/consumer periods per supervisor period.
        for _ in 0..20 {
            for _ in 0..2 {
                producer.step().unwrap();
                consumer.step().await.unwrap();
                assert_eq!(consumer.failures(), 0);
            }
            assert_eq!(sup.step(), Health::Healthy);
        }

        let stats = heap.stats();
        assert_eq!(stats.allocated, 40);
        assert_eq!(stats.freed, 40);
        assert_eq!(stats.live, 0);
    }
}
