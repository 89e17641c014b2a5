//! Prediction backends.
//!
//! The service treats the trained model as an opaque capability: one
//! required `predict` operation plus optional schema introspection. The
//! concrete backend shipped here is a multi-output linear regressor with an
//! embedded column preprocessor, matching the document the training
//! pipeline exports.

use crate::error::{GridcastError, Result};
use crate::forecast::features::AlignedRow;
use serde::Deserialize;

/// Capability contract for a loaded prediction backend.
///
/// Any backend that can score a single aligned feature row qualifies: a
/// trained regressor, a rules engine, or a remote call behind the trait.
pub trait Predictor: Send + Sync {
    /// Score one aligned feature row.
    fn predict(&self, row: &AlignedRow) -> Result<Prediction>;

    /// Ordered input columns the backend was trained on, if declared.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Ordered output names, if declared.
    fn output_names(&self) -> Option<&[String]> {
        None
    }
}

/// Raw prediction shape as produced by a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Scalar(f64),
    Vector(Vec<f64>),
    /// Batch-shaped output; only the first row is meaningful for the
    /// single-row requests this service issues.
    Matrix(Vec<Vec<f64>>),
}

impl Prediction {
    /// Normalize to a flat output vector: scalars wrap to length 1,
    /// matrices collapse to their first row.
    pub fn into_row(self) -> Vec<f64> {
        match self {
            Prediction::Scalar(value) => vec![value],
            Prediction::Vector(values) => values,
            Prediction::Matrix(mut rows) => {
                if rows.is_empty() {
                    Vec::new()
                } else {
                    rows.swap_remove(0)
                }
            }
        }
    }
}

/// Multi-output linear regression artifact deserialized from the JSON
/// document the training pipeline exports.
#[derive(Debug, Deserialize)]
pub struct LinearArtifact {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    #[serde(default)]
    output_names: Option<Vec<String>>,
    preprocessor: Preprocessor,
    /// One row of coefficients per output, over the encoded column layout.
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct Preprocessor {
    columns: Vec<ColumnSpec>,
    #[serde(default)]
    remainder: Option<RemainderCols>,
}

/// Marker for pass-through columns appended after the transformed ones.
/// Legacy artifacts serialize this as a bare array; the loader wraps it
/// in the tagged form before deserialization (see
/// `loader::patch_legacy_remainder`).
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RemainderCols {
    #[serde(rename = "remainder_cols")]
    Columns { columns: Vec<String> },
}

impl RemainderCols {
    fn columns(&self) -> &[String] {
        match self {
            RemainderCols::Columns { columns } => columns,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ColumnSpec {
    Numeric {
        name: String,
    },
    /// Label-encoded categorical column; unknown or missing values encode
    /// as -1, matching the training-side encoder.
    Categorical {
        name: String,
        categories: Vec<String>,
    },
}

impl ColumnSpec {
    fn encode(&self, row: &AlignedRow) -> f64 {
        match self {
            ColumnSpec::Numeric { name } => row.numeric(name),
            ColumnSpec::Categorical { name, categories } => {
                match row.get(name).and_then(|v| v.as_text()) {
                    Some(value) => categories
                        .iter()
                        .position(|c| *c == value)
                        .map(|idx| idx as f64)
                        .unwrap_or(-1.0),
                    None => -1.0,
                }
            }
        }
    }
}

impl LinearArtifact {
    fn encoded_width(&self) -> usize {
        self.preprocessor.columns.len()
            + self
                .preprocessor
                .remainder
                .as_ref()
                .map(|r| r.columns().len())
                .unwrap_or(0)
    }

    /// Check internal consistency after deserialization. A mismatch means a
    /// corrupt or schema-incompatible artifact and fails the load.
    pub fn validate(&self) -> Result<()> {
        if self.weights.is_empty() {
            return Err(GridcastError::Validation(
                "artifact declares no outputs".to_string(),
            ));
        }
        if self.intercepts.len() != self.weights.len() {
            return Err(GridcastError::Validation(format!(
                "artifact intercept count {} does not match output count {}",
                self.intercepts.len(),
                self.weights.len()
            )));
        }
        let width = self.encoded_width();
        for (idx, row) in self.weights.iter().enumerate() {
            if row.len() != width {
                return Err(GridcastError::Validation(format!(
                    "weight row {idx} has {} coefficients, expected {width}",
                    row.len()
                )));
            }
        }
        Ok(())
    }

    fn encode(&self, row: &AlignedRow) -> Vec<f64> {
        let mut encoded = Vec::with_capacity(self.encoded_width());
        for column in &self.preprocessor.columns {
            encoded.push(column.encode(row));
        }
        if let Some(remainder) = &self.preprocessor.remainder {
            for name in remainder.columns() {
                encoded.push(row.numeric(name));
            }
        }
        encoded
    }
}

impl Predictor for LinearArtifact {
    fn predict(&self, row: &AlignedRow) -> Result<Prediction> {
        let encoded = self.encode(row);
        let values = self
            .weights
            .iter()
            .zip(&self.intercepts)
            .map(|(coeffs, intercept)| {
                intercept
                    + coeffs
                        .iter()
                        .zip(&encoded)
                        .map(|(c, x)| c * x)
                        .sum::<f64>()
            })
            .collect();
        Ok(Prediction::Vector(values))
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn output_names(&self) -> Option<&[String]> {
        self.output_names.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::features::FeatureValue;

    fn sample_artifact() -> LinearArtifact {
        serde_json::from_str(
            r#"{
                "schema_version": 2,
                "feature_names": ["budget", "terrain"],
                "output_names": ["Steel Towers", "Conductors"],
                "preprocessor": {
                    "columns": [
                        {"name": "budget", "kind": "numeric"},
                        {"name": "terrain", "kind": "categorical",
                         "categories": ["plains", "hilly", "forest"]}
                    ],
                    "remainder": {"type": "remainder_cols", "columns": ["line_km"]}
                },
                "weights": [[0.5, 2.0, 1.5], [0.25, 1.0, 3.0]],
                "intercepts": [10.0, 20.0]
            }"#,
        )
        .unwrap()
    }

    fn row(entries: Vec<(&str, FeatureValue)>) -> AlignedRow {
        AlignedRow::align(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            None,
        )
    }

    #[test]
    fn test_linear_predict_encodes_columns() {
        let artifact = sample_artifact();
        let row = row(vec![
            ("budget", FeatureValue::Number(100.0)),
            ("terrain", FeatureValue::Text("hilly".to_string())),
            ("line_km", FeatureValue::Number(4.0)),
        ]);

        // encoded = [100, 1 (hilly), 4]
        let values = artifact.predict(&row).unwrap().into_row();
        assert_eq!(values, vec![10.0 + 50.0 + 2.0 + 6.0, 20.0 + 25.0 + 1.0 + 12.0]);
    }

    #[test]
    fn test_unknown_category_encodes_negative_one() {
        let artifact = sample_artifact();
        let row = row(vec![
            ("budget", FeatureValue::Number(0.0)),
            ("terrain", FeatureValue::Text("swamp".to_string())),
        ]);

        // encoded = [0, -1, 0]
        let values = artifact.predict(&row).unwrap().into_row();
        assert_eq!(values, vec![10.0 - 2.0, 20.0 - 1.0]);
    }

    #[test]
    fn test_validate_rejects_width_mismatch() {
        let artifact: LinearArtifact = serde_json::from_str(
            r#"{
                "preprocessor": {"columns": [{"name": "a", "kind": "numeric"}]},
                "weights": [[1.0, 2.0]],
                "intercepts": [0.0]
            }"#,
        )
        .unwrap();

        assert!(matches!(
            artifact.validate(),
            Err(GridcastError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_intercept_mismatch() {
        let artifact: LinearArtifact = serde_json::from_str(
            r#"{
                "preprocessor": {"columns": [{"name": "a", "kind": "numeric"}]},
                "weights": [[1.0]],
                "intercepts": [0.0, 1.0]
            }"#,
        )
        .unwrap();

        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_prediction_normalization() {
        assert_eq!(Prediction::Scalar(3.5).into_row(), vec![3.5]);
        assert_eq!(Prediction::Vector(vec![1.0, 2.0]).into_row(), vec![1.0, 2.0]);
        assert_eq!(
            Prediction::Matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).into_row(),
            vec![1.0, 2.0]
        );
        assert!(Prediction::Matrix(Vec::new()).into_row().is_empty());
    }

    #[test]
    fn test_schema_version_defaults_to_one() {
        let artifact: LinearArtifact = serde_json::from_str(
            r#"{
                "preprocessor": {"columns": []},
                "weights": [[]],
                "intercepts": [0.0]
            }"#,
        )
        .unwrap();

        assert_eq!(artifact.schema_version, 1);
    }
}
