//! Idle probes: watchdog subjects fed only when the executor has spare time.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use super::monitor::WatchdogHandle;

/// Checks in on `handle` every `every`, after yielding to other tasks.
///
/// If the executor is starved the probe falls behind and its subject expires.
pub async fn idle_probe(handle: WatchdogHandle, every: Duration, token: CancellationToken) {
    loop {
        tokio::task::yield_now().await;
        handle.check_in();

        tokio::select! {
            _ = time::sleep(every) => {}
            _ = token.cancelled() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Bus;
    use crate::watchdog::{Watchdog, WatchdogConfig};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn probe_keeps_subject_fresh_until_cancelled() {
        let wd = Watchdog::new(WatchdogConfig::default(), Bus::new(8));
        let token = CancellationToken::new();
        let probe = tokio::spawn(idle_probe(
            wd.register("idle0"),
            Duration::from_secs(1),
            token.clone(),
        ));

        time::sleep(Duration::from_secs(30)).await;
        assert!(wd.expired(Instant::now()).is_empty());

        token.cancel();
        probe.await.unwrap();
        time::sleep(Duration::from_secs(6)).await;
        assert_eq!(wd.expired(Instant::now()).len(), 1);
    }
}
