use lechr_dns_application::use_cases::ReloadConfigUseCase;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Resolves on SIGINT or SIGTERM (Ctrl-C off Unix).
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = sigint.recv() => info!("Received SIGINT"),
                }
                return;
            }
            _ => error!("Failed to install Unix signal handlers, falling back to Ctrl-C"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
    }
}

/// Reload the configuration file on every SIGHUP until `shutdown` fires.
#[cfg(unix)]
pub fn spawn_reload_on_sighup(
    reload: Arc<ReloadConfigUseCase>,
    path: PathBuf,
    shutdown: CancellationToken,
) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sighup = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            error!(error = %e, "Failed to install SIGHUP handler");
            return;
        }
    };

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = sighup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    info!(path = %path.display(), "Received SIGHUP, reloading configuration");
                    if let Err(e) = reload.execute(&path) {
                        error!(error = %e, "Reload failed, keeping active configuration");
                    }
                }
            }
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_reload_on_sighup(
    _reload: Arc<ReloadConfigUseCase>,
    _path: PathBuf,
    _shutdown: CancellationToken,
) {
}
