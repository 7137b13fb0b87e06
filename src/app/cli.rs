use std::future::Future;
use std::time::Duration;

use tokio::io::{BufWriter, Stdout};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::error::AppError;

/// Reusable CLI application runner that handles:
/// - Signal handling (SIGINT, SIGTERM, SIGHUP)
/// - Stdout buffering
/// - Exit codes (0 = success, 1 = error, 130 = SIGINT, 143 = SIGTERM, 129 = SIGHUP)
/// - Graceful shutdown through a cancellation token
pub struct CliApp {
    name: String,
    shutdown_grace: Duration,
}

impl CliApp {
    /// Create a new CLI application runner
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            shutdown_grace: Duration::from_secs(10),
        }
    }

    /// How long the main future may keep running after a signal
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Run the CLI application with signal handling.
    ///
    /// The main function gets a buffered stdout writer and a shutdown token.
    /// On a signal the token is cancelled and the main function is given the
    /// grace period to finish (e.g. to write its final snapshot) before the
    /// process exits with the signal's code.
    ///
    /// This function never returns - it calls std::process::exit with the appropriate code
    pub async fn run<F, Fut>(self, main_fn: F) -> !
    where
        F: FnOnce(BufWriter<Stdout>, CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let writer = BufWriter::new(tokio::io::stdout());
        let shutdown = CancellationToken::new();

        let main_fut = main_fn(writer, shutdown.clone());
        tokio::pin!(main_fut);

        let signal_code = tokio::select! {
            result = &mut main_fut => std::process::exit(self.exit_code(result)),
            signal_code = wait_for_signal() => signal_code,
        };

        info!(app = %self.name, "Shutting down");
        shutdown.cancel();

        match tokio::time::timeout(self.shutdown_grace, &mut main_fut).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(app = %self.name, error = %e, "Error during shutdown"),
            Err(_) => warn!(
                app = %self.name,
                grace_ms = self.shutdown_grace.as_millis() as u64,
                "Shutdown grace period elapsed"
            ),
        }
        std::process::exit(signal_code);
    }

    fn exit_code(&self, result: Result<(), AppError>) -> i32 {
        match result {
            Ok(()) => 0,
            Err(e) => {
                error!(app = %self.name, error = %e, "Exited with error");
                1
            }
        }
    }
}

/// Wait for any Unix signal (SIGINT, SIGTERM, SIGHUP) or Ctrl+C
/// Returns the exit code to use (130 for SIGINT, 143 for SIGTERM, etc.)
async fn wait_for_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
        let mut sighup = signal(SignalKind::hangup()).expect("Failed to setup SIGHUP handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
                143 // 128 + 15
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
                130 // 128 + 2
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP");
                129 // 128 + 1
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to setup Ctrl+C handler");
        info!("Received Ctrl+C");
        130
    }
}
