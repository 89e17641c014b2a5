//! Forecast orchestration: one feature payload in, one labeled output
//! vector out. Uses the loaded artifact when available and degrades to a
//! deterministic heuristic otherwise — the only request that is ever
//! rejected is a forecast against an unloaded artifact with fallback
//! disabled.

use crate::artifact::{ArtifactLoader, LoadedArtifact};
use crate::config::ModelConfig;
use crate::error::{GridcastError, Result};
use crate::forecast::features::{AlignedRow, ForecastFeatures};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{error, warn};
use uuid::Uuid;

/// Default material categories of the multi-output POWERGRID model, in
/// output order.
const DEFAULT_MATERIALS: [&str; 4] = [
    "Steel Towers",
    "Conductors",
    "Insulator Strings",
    "Substation Equipment",
];

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastRequest {
    pub project_name: String,
    #[serde(default)]
    pub scenario: Option<String>,
    pub features: ForecastFeatures,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastOutput {
    pub label: String,
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastResponse {
    pub forecast_id: String,
    pub generated_at: DateTime<Utc>,
    pub project_name: String,
    /// The aligned feature row actually fed to inference, for caller-side
    /// auditability.
    pub features_used: Map<String, Value>,
    pub outputs: Vec<ForecastOutput>,
    pub model_ready: bool,
}

/// Owns the loaded artifact for the process lifetime. Immutable after
/// construction, so requests share it without synchronization.
pub struct ForecastService {
    artifact: LoadedArtifact,
    allow_fallback: bool,
}

impl ForecastService {
    pub fn new(artifact: LoadedArtifact, allow_fallback: bool) -> Self {
        Self {
            artifact,
            allow_fallback,
        }
    }

    /// Load the artifact from the configured path. A failed load leaves the
    /// service running in a degraded state.
    pub fn from_config(model: &ModelConfig) -> Self {
        Self::new(ArtifactLoader::load(&model.path), model.allow_fallback)
    }

    pub fn is_ready(&self) -> bool {
        self.artifact.is_ready()
    }

    pub fn artifact(&self) -> &LoadedArtifact {
        &self.artifact
    }

    /// Generate one forecast. Inference-time faults are absorbed into the
    /// fallback path; only `ModelNotReady` with fallback disabled escapes.
    pub fn generate(&self, request: &ForecastRequest) -> Result<ForecastResponse> {
        let expected = (!self.artifact.feature_names.is_empty())
            .then_some(self.artifact.feature_names.as_slice());
        let payload = request.features.to_payload(expected);
        let row = AlignedRow::align(payload, expected);

        let values = match self.predict_row(&row) {
            Ok(values) => values,
            Err(GridcastError::ModelNotReady(msg)) => {
                if !self.allow_fallback {
                    return Err(GridcastError::ModelNotReady(msg));
                }
                warn!("Serving fallback forecast because model is unavailable");
                fallback_predictions(&row)
            }
            Err(e) => {
                error!(error = %e, "Model inference failed; switching to fallback");
                fallback_predictions(&row)
            }
        };

        let outputs = self
            .material_labels(values.len())
            .into_iter()
            .zip(values)
            .map(|(label, value)| ForecastOutput {
                label,
                value,
                unit: "units".to_string(),
            })
            .collect();

        Ok(ForecastResponse {
            forecast_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            project_name: request.project_name.clone(),
            features_used: row.to_json_map(),
            outputs,
            model_ready: self.is_ready(),
        })
    }

    fn predict_row(&self, row: &AlignedRow) -> Result<Vec<f64>> {
        let Some(predictor) = self.artifact.predictor.as_deref() else {
            let msg = self
                .artifact
                .load_error
                .clone()
                .unwrap_or_else(|| "no artifact loaded".to_string());
            return Err(GridcastError::ModelNotReady(msg));
        };
        Ok(predictor.predict(row)?.into_row())
    }

    /// One label per output position. Artifact-declared names are used only
    /// when their count matches; defaults cover the first four positions
    /// and ordinal labels are synthesized past them.
    fn material_labels(&self, count: usize) -> Vec<String> {
        let declared = &self.artifact.output_names;
        if !declared.is_empty() && declared.len() == count {
            return declared.clone();
        }
        (0..count)
            .map(|idx| {
                DEFAULT_MATERIALS
                    .get(idx)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("Output {}", idx + 1))
            })
            .collect()
    }
}

/// Deterministic heuristic served when the artifact is absent or failing.
/// Approximate by design; the closed forms and the 1.0 floor are part of
/// the compatibility contract and must not change.
fn fallback_predictions(row: &AlignedRow) -> Vec<f64> {
    let budget = row.numeric("project_budget_price_in_lake");
    let line = row.numeric("transmission_line_length_km");
    let distance = row.numeric("Distance_from_Storage_unit");
    let base = budget.max(1.0);

    [
        0.12 * base + line * 1.8,
        0.08 * base + line * 3.2,
        0.02 * base + distance * 0.4,
        0.05 * base + distance * 0.25,
    ]
    .into_iter()
    .map(|v| v.max(1.0))
    .collect()
}
