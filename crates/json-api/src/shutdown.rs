//! Stop the server gracefully on Ctrl+C or SIGTERM

use std::{fmt, io};

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;

#[derive(Debug, Error)]
pub(crate) enum ShutdownSignalError {
    #[error("failed to listen for {signal}: {source}")]
    Install {
        signal: StopSignal,
        #[source]
        source: io::Error,
    },
}

/// Which signal asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        })
    }
}

async fn interrupt() -> Result<StopSignal, ShutdownSignalError> {
    signal::ctrl_c()
        .await
        .map_err(|source| ShutdownSignalError::Install {
            signal: StopSignal::Interrupt,
            source,
        })?;

    Ok(StopSignal::Interrupt)
}

#[cfg(unix)]
async fn terminate() -> Result<StopSignal, ShutdownSignalError> {
    signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(|source| ShutdownSignalError::Install {
            signal: StopSignal::Terminate,
            source,
        })?
        .recv()
        .await;

    Ok(StopSignal::Terminate)
}

#[cfg(not(unix))]
async fn terminate() -> Result<StopSignal, ShutdownSignalError> {
    std::future::pending().await
}

/// Wait for a stop signal, then let in-flight requests (and any ledger
/// writes they are retrying) finish before the listener closes.
pub(crate) async fn listen(handle: ServerHandle) -> Result<(), ShutdownSignalError> {
    let received = tokio::select! {
        result = interrupt() => result?,
        result = terminate() => result?,
    };

    tracing::info!(signal = %received, "stopping canteen api");

    handle.stop_graceful(None);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_display_their_unix_names() {
        assert_eq!(StopSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(StopSignal::Terminate.to_string(), "SIGTERM");
    }
}
