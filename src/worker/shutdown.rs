//! Process signals that stop the poll loop.
//!
//! Ctrl-C (SIGINT) and, on Unix, SIGTERM both cancel the shutdown token. The
//! scheduler notices between cycles.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Spawns a task that cancels `shutdown` on the first termination signal.
///
/// The SIGTERM handler is installed before this returns, so a signal sent
/// afterwards is never missed. Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error if the SIGTERM handler cannot be installed.
pub fn cancel_on_signal(shutdown: CancellationToken) -> std::io::Result<JoinHandle<()>> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        #[cfg(unix)]
        let terminated = async {
            terminate.recv().await;
        };
        #[cfg(not(unix))]
        let terminated = std::future::pending::<()>();

        let interrupted = async {
            // Without a Ctrl-C handler only SIGTERM can stop the loop.
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            () = interrupted => info!("Interrupt received"),
            () = terminated => info!("SIGTERM received"),
            () = shutdown.cancelled() => return,
        }
        shutdown.cancel();
    }))
}
