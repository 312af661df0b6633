//! # Example: Self-supervising pipeline
//!
//! Runs the producer/consumer pipeline with the built-in log subscriber.
//!
//! - `Ctrl-C` (or `SIGTERM`) stops the tasks gracefully.
//! - `WATCHVISOR_STARVE=1` holds the only heap slot, so the producer never
//!   allocates: the consumer escalates and the watchdog requests a restart,
//!   after which the binary re-executes itself.
//!
//! Run: `cargo run --example pipeline`

use std::sync::Arc;
use std::time::Duration;

use watchvisor::{
    restart_process, Config, Exit, Heap, LogWriter, Runtime, Subscribe, WorkItem,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = Config {
        producer_period: Duration::from_millis(500),
        consumer_period: Duration::from_millis(500),
        supervisor_period: Duration::from_secs(1),
        ..Config::default()
    };

    let starve = std::env::var_os("WATCHVISOR_STARVE").is_some();
    let heap = Heap::new(if starve { 1 } else { cfg.heap_capacity });
    let _lease = if starve {
        Some(heap.try_alloc(WorkItem::default())?)
    } else {
        None
    };

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let runtime = Runtime::builder(cfg)
        .with_subscribers(subs)
        .with_heap(heap)
        .build()?;

    match runtime.run().await? {
        Exit::Shutdown => {
            let stats = runtime.heap().stats();
            println!(
                "[demo] stopped: allocated={} freed={} live={}",
                stats.allocated, stats.freed, stats.live
            );
            Ok(())
        }
        Exit::Restart(cause) => {
            println!("[demo] restarting: {cause}");
            restart_process(&cause)
        }
    }
}
