pub mod api;
pub mod artifact;
pub mod config;
pub mod error;
pub mod forecast;

pub use artifact::{ArtifactLoader, LoadedArtifact, Prediction, Predictor};
pub use config::AppConfig;
pub use error::{GridcastError, Result};
pub use forecast::{ForecastRequest, ForecastResponse, ForecastService};
