pub mod features;
pub mod service;

pub use features::{AlignedRow, FeatureValue, ForecastFeatures};
pub use service::{ForecastOutput, ForecastRequest, ForecastResponse, ForecastService};
