use clap::Parser;
use lechr_dns_application::ports::ResponseCachePort;
use lechr_dns_domain::{CliOverrides, Config};
use lechr_dns_jobs::ConfigWatchJob;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "lechr-dns")]
#[command(version)]
#[command(about = "Lechr DNS - caching DNS forwarder with local overwrites and blacklists")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Lechr DNS v{}", env!("CARGO_PKG_VERSION"));

    let services = di::ProxyServices::new(&config)?;
    let shutdown = CancellationToken::new();

    match Config::locate(cli.config.as_deref()) {
        Some(path) => {
            server::spawn_reload_on_sighup(
                Arc::clone(&services.reload_config),
                path.clone(),
                shutdown.clone(),
            );

            if config.reload.watch {
                let job = ConfigWatchJob::new(Arc::clone(&services.reload_config), path)
                    .with_interval(Duration::from_millis(config.reload.poll_interval_ms))
                    .with_cancellation(shutdown.clone());
                Arc::new(job).start().await;
            }
        }
        None => warn!("No configuration file found, running with defaults (reload disabled)"),
    }

    let dns_addr = config.listen_address()?;
    let mut dns_server = tokio::spawn(server::start_dns_server(
        dns_addr,
        Arc::clone(&services.resolve_query),
        shutdown.clone(),
    ));

    let finished_early = tokio::select! {
        _ = server::wait_for_shutdown() => None,
        result = &mut dns_server => Some(result),
    };
    shutdown.cancel();

    let server_result = match finished_early {
        Some(result) => result,
        None => {
            info!("Shutdown requested");
            dns_server.await
        }
    };

    let stats = services.cache.metrics_snapshot();
    info!(
        entries = stats.entries,
        hits = stats.hits,
        misses = stats.misses,
        insertions = stats.insertions,
        expirations = stats.expirations,
        invalidations = stats.invalidations,
        hit_rate = format!("{:.1}%", stats.hit_rate),
        "Cache statistics"
    );
    services.cache.clear();

    if let Err(e) = &server_result {
        error!(error = %e, "DNS server task failed");
    }
    server_result??;

    info!(
        nameservers = services.active_config.load().upstream.attempts(),
        "Server shutdown complete"
    );
    Ok(())
}
