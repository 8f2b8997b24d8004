use lechr_dns_application::ports::ResponseCachePort;
use lechr_dns_application::services::{log_snapshot_summary, ActiveConfig};
use lechr_dns_application::use_cases::{ReloadConfigUseCase, ResolveQueryUseCase};
use lechr_dns_domain::Config;
use lechr_dns_infrastructure::dns::{HickoryCodec, ResponseCache, UdpForwarder};
use std::sync::Arc;
use tracing::info;

pub struct ProxyServices {
    pub active_config: Arc<ActiveConfig>,
    pub cache: Arc<ResponseCache>,
    pub resolve_query: Arc<ResolveQueryUseCase>,
    pub reload_config: Arc<ReloadConfigUseCase>,
}

impl ProxyServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        info!("Initializing proxy services");

        let snapshot = config.snapshot()?;
        log_snapshot_summary(&snapshot);

        let active_config = Arc::new(ActiveConfig::new(snapshot));
        let cache = Arc::new(ResponseCache::new());

        let resolve_query = Arc::new(ResolveQueryUseCase::new(
            Arc::clone(&active_config),
            Arc::clone(&cache) as Arc<dyn ResponseCachePort>,
            Arc::new(UdpForwarder::new()),
            Arc::new(HickoryCodec::new()),
        ));
        let reload_config = Arc::new(ReloadConfigUseCase::new(Arc::clone(&active_config)));

        Ok(Self {
            active_config,
            cache,
            resolve_query,
            reload_config,
        })
    }
}
