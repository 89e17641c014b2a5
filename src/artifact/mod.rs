pub mod loader;
pub mod model;

pub use loader::{ArtifactLoader, LoadedArtifact};
pub use model::{LinearArtifact, Prediction, Predictor};
