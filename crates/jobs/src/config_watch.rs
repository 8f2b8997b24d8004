use lechr_dns_application::use_cases::ReloadConfigUseCase;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Modification time and size; a change in either triggers a reload.
type FileFingerprint = (SystemTime, u64);

fn fingerprint(path: &Path) -> Option<FileFingerprint> {
    let metadata = std::fs::metadata(path).ok()?;
    Some((metadata.modified().ok()?, metadata.len()))
}

/// Polls the configuration file and reloads it when it changes.
pub struct ConfigWatchJob {
    reload: Arc<ReloadConfigUseCase>,
    path: PathBuf,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl ConfigWatchJob {
    pub fn new(reload: Arc<ReloadConfigUseCase>, path: impl Into<PathBuf>) -> Self {
        Self {
            reload,
            path: path.into(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            path = %self.path.display(),
            interval_ms = self.poll_interval.as_millis() as u64,
            "Starting configuration watch job"
        );

        tokio::spawn(async move {
            let mut last_seen = fingerprint(&self.path);
            let mut interval = tokio::time::interval(self.poll_interval);
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("ConfigWatchJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.poll(&mut last_seen);
                    }
                }
            }
        });
    }

    fn poll(&self, last_seen: &mut Option<FileFingerprint>) {
        let current = fingerprint(&self.path);
        if current == *last_seen {
            return;
        }
        *last_seen = current;

        if current.is_none() {
            warn!(
                path = %self.path.display(),
                "Configuration file is gone, keeping active configuration"
            );
            return;
        }

        match self.reload.execute(&self.path) {
            Ok(snapshot) => info!(
                nameservers = snapshot.upstream.attempts(),
                overwrites = snapshot.policy.overwrite_count(),
                blacklisted = snapshot.policy.blacklist_count(),
                "Configuration change applied"
            ),
            Err(e) => error!(
                error = %e,
                "Configuration change rejected, keeping active configuration"
            ),
        }
    }
}
