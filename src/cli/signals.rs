//! Shutdown signal handling for the watch loop

use std::fmt;

use tokio::sync::mpsc;

/// Why the watch loop is shutting down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT or Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Shutdown signal listener.
///
/// Handles SIGINT/SIGTERM on Unix and Ctrl+C elsewhere. Must be created
/// inside a Tokio runtime.
pub struct ShutdownSignal {
    receiver: mpsc::Receiver<ShutdownReason>,
}

impl ShutdownSignal {
    /// Install the handlers and start listening
    pub fn listen() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(4);

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let tx_int = tx.clone();
            let mut sigint = signal(SignalKind::interrupt())?;
            tokio::spawn(async move {
                sigint.recv().await;
                let _ = tx_int.send(ShutdownReason::Interrupt).await;
            });

            let mut sigterm = signal(SignalKind::terminate())?;
            tokio::spawn(async move {
                sigterm.recv().await;
                let _ = tx.send(ShutdownReason::Terminate).await;
            });
        }

        #[cfg(not(unix))]
        {
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = tx.send(ShutdownReason::Interrupt).await;
                }
            });
        }

        Ok(Self { receiver: rx })
    }

    /// Wait for the next shutdown request
    pub async fn recv(&mut self) -> Option<ShutdownReason> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_reason_display() {
        assert_eq!(ShutdownReason::Interrupt.to_string(), "SIGINT");
        assert_eq!(ShutdownReason::Terminate.to_string(), "SIGTERM");
    }

    #[tokio::test]
    async fn listen_installs_handlers() {
        assert!(ShutdownSignal::listen().is_ok());
    }
}
