use gridcast::api::{create_router, AppState};
use gridcast::config::{AppConfig, LoggingConfig};
use gridcast::forecast::ForecastService;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},gridcast=debug", config.level)));

    if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging);

    if let Err(errors) = config.validate() {
        anyhow::bail!("invalid configuration:\n{}", errors.join("\n"));
    }

    // One-time blocking load before serving; the artifact is read-only for
    // the rest of the process lifetime.
    let service = ForecastService::from_config(&config.model);
    if !service.is_ready() && !config.model.allow_fallback {
        warn!("Model failed to load and fallback is disabled; forecasts will be rejected");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_router(AppState::new(service, config));

    info!("Starting forecast API on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
