use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gate_server::cache::BoardCache;
use gate_server::catalog::{kerala_junctions, load_catalog};
use gate_server::collector::{Collector, MockCollector, NtesCollector};
use gate_server::config::ServerConfig;
use gate_server::correlate::Correlator;
use gate_server::orchestrator::Orchestrator;
use gate_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    // The catalog is required; there is nothing to serve without it
    let index = match load_catalog(&config.catalog_path, kerala_junctions()) {
        Ok(index) => index,
        Err(e) => {
            error!(error = %e, "failed to load station catalog");
            std::process::exit(1);
        }
    };

    let collector: Collector = match &config.mock_boards_dir {
        Some(dir) => match MockCollector::new(dir, config.window()) {
            Ok(mock) => mock.into(),
            Err(e) => {
                error!(error = %e, dir = %dir.display(), "failed to load mock boards");
                std::process::exit(1);
            }
        },
        None => NtesCollector::new(config.collector_config()).into(),
    };
    info!(collector = collector.name(), "using live train collector");

    let orchestrator = Orchestrator::new(collector, Correlator::new(config.window()))
        .with_cache(BoardCache::new(&config.cache_config()))
        .with_fetch_concurrency(config.fetch_concurrency);

    let addr = config.addr;
    let state = AppState::new(index, orchestrator, config);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "failed to bind");
            std::process::exit(1);
        }
    };
    info!("Gate status server listening on http://{addr}");
    info!("  GET  /health        - Health check");
    info!("  POST /railway_data  - Gate status for a batch of gates");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
