use crate::config::AppConfig;
use crate::forecast::ForecastService;
use std::sync::Arc;

/// Shared application state for API handlers.
///
/// Both members are constructed once at startup and never mutated, so
/// handlers share them concurrently without locks.
#[derive(Clone)]
pub struct AppState {
    /// Forecast service owning the loaded artifact
    pub service: Arc<ForecastService>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(service: ForecastService, config: AppConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}
