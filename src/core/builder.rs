use std::sync::Arc;

use crate::{
    core::Config, error::ConfigError, events::Bus, heap::Heap, subscribers::Subscribe,
};

use super::runtime::Runtime;

/// Builder for constructing a [`Runtime`] with optional features.
pub struct RuntimeBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    heap: Option<Heap>,
}

impl RuntimeBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            heap: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (items, failures, health reports, etc.)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Uses a shared heap instead of one sized by [`Config::heap_capacity`].
    ///
    /// Holding allocations from the same heap outside the runtime starves the producer.
    pub fn with_heap(mut self, heap: Heap) -> Self {
        self.heap = Some(heap);
        self
    }

    /// Validates the configuration and builds the [`Runtime`].
    pub fn build(self) -> Result<Runtime, ConfigError> {
        self.cfg.validate()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let heap = self
            .heap
            .unwrap_or_else(|| Heap::new(self.cfg.heap_capacity));
        Ok(Runtime::new_internal(self.cfg, bus, heap, self.subscribers))
    }
}
