//! # OS termination signals.
//!
//! Unix: `SIGINT`, `SIGTERM`, `SIGQUIT` (and Ctrl-C). Elsewhere: Ctrl-C.

/// Completes when the process receives a termination signal.
///
/// Returns `Err` if a signal listener could not be installed.
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut listeners = [
            signal(SignalKind::interrupt())?,
            signal(SignalKind::terminate())?,
            signal(SignalKind::quit())?,
        ];
        let [int, term, quit] = &mut listeners;
        tokio::select! {
            _ = int.recv() => {}
            _ = term.recv() => {}
            _ = quit.recv() => {}
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
