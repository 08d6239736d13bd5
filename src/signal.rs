use {super::*, tokio::signal::ctrl_c};

/// Cancels the returned token on the first Ctrl-C or SIGTERM.
pub(crate) fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();

    tokio::spawn({
        let cancel_token = cancel_token.clone();

        async move {
            let signal = shutdown_signal().await;
            info!("Received {signal}, shutting down");
            cancel_token.cancel();
        }
    });

    cancel_token
}

/// Resolves with the name of whichever shutdown signal arrives first.
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {err}");
                return interrupt().await;
            }
        };

        tokio::select! {
            name = interrupt() => name,
            _ = sigterm.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    {
        interrupt().await
    }
}

async fn interrupt() -> &'static str {
    if let Err(err) = ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }

    "SIGINT"
}
