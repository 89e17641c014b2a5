//! One-time artifact load at startup.
//!
//! Load failure is recorded as state, never propagated: the process keeps
//! running in a degraded, non-ready mode and the surrounding supervisor may
//! restart it to retry.

use crate::artifact::model::{LinearArtifact, Predictor};
use crate::error::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Outcome of the one-time artifact load. `predictor` is populated iff the
/// load succeeded; partially-loaded artifacts never exist — any failure
/// clears the reference and records the error instead.
pub struct LoadedArtifact {
    pub predictor: Option<Box<dyn Predictor>>,
    /// Ordered input columns the artifact was trained on (may be empty for
    /// older artifacts that do not declare them).
    pub feature_names: Vec<String>,
    /// Ordered output names declared by the artifact (may be empty).
    pub output_names: Vec<String>,
    pub load_error: Option<String>,
    pub path: PathBuf,
}

impl LoadedArtifact {
    pub fn is_ready(&self) -> bool {
        self.predictor.is_some() && self.load_error.is_none()
    }
}

pub struct ArtifactLoader;

impl ArtifactLoader {
    /// Load a prediction artifact, reporting failure as state rather than
    /// as an error. No retries; a failed load is terminal for the process
    /// lifetime.
    pub fn load(path: &Path) -> LoadedArtifact {
        match Self::try_load(path) {
            Ok(artifact) => {
                let feature_names = artifact
                    .feature_names()
                    .map(|n| n.to_vec())
                    .unwrap_or_default();
                let output_names = artifact
                    .output_names()
                    .map(|n| n.to_vec())
                    .unwrap_or_default();
                info!(
                    path = %path.display(),
                    schema_version = artifact.schema_version,
                    features = feature_names.len(),
                    "Loaded prediction artifact"
                );
                LoadedArtifact {
                    predictor: Some(Box::new(artifact)),
                    feature_names,
                    output_names,
                    load_error: None,
                    path: path.to_path_buf(),
                }
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Unable to load prediction artifact");
                LoadedArtifact {
                    predictor: None,
                    feature_names: Vec::new(),
                    output_names: Vec::new(),
                    load_error: Some(e.to_string()),
                    path: path.to_path_buf(),
                }
            }
        }
    }

    fn try_load(path: &Path) -> Result<LinearArtifact> {
        let raw = std::fs::read_to_string(path)?;
        let mut doc: Value = serde_json::from_str(&raw)?;
        patch_legacy_remainder(&mut doc);
        let artifact: LinearArtifact = serde_json::from_value(doc)?;
        artifact.validate()?;
        Ok(artifact)
    }
}

/// Artifacts written before schema v2 store the preprocessor's pass-through
/// columns as a bare array; the current schema expects the tagged
/// `remainder_cols` marker object. Wrap the legacy form in place so old
/// artifacts stay loadable. Idempotent: a no-op when the marker is already
/// tagged or the field is absent.
pub fn patch_legacy_remainder(doc: &mut Value) {
    if let Some(remainder) = doc.pointer_mut("/preprocessor/remainder") {
        if remainder.is_array() {
            let columns = remainder.take();
            *remainder = serde_json::json!({ "type": "remainder_cols", "columns": columns });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn artifact_doc(remainder: Value) -> Value {
        json!({
            "schema_version": 2,
            "feature_names": ["budget", "line_km"],
            "output_names": ["Steel Towers", "Conductors"],
            "preprocessor": {
                "columns": [
                    {"name": "budget", "kind": "numeric"}
                ],
                "remainder": remainder
            },
            "weights": [[1.0, 0.5], [2.0, 0.25]],
            "intercepts": [0.0, 0.0]
        })
    }

    fn write_doc(doc: &Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(doc.to_string().as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_patch_wraps_bare_array() {
        let mut doc = artifact_doc(json!(["line_km"]));
        patch_legacy_remainder(&mut doc);

        assert_eq!(
            doc.pointer("/preprocessor/remainder").unwrap(),
            &json!({"type": "remainder_cols", "columns": ["line_km"]})
        );
    }

    #[test]
    fn test_patch_is_idempotent() {
        let mut doc = artifact_doc(json!(["line_km"]));
        patch_legacy_remainder(&mut doc);
        let once = doc.clone();
        patch_legacy_remainder(&mut doc);

        assert_eq!(doc, once);
    }

    #[test]
    fn test_patch_ignores_absent_remainder() {
        let mut doc = json!({"preprocessor": {"columns": []}});
        let before = doc.clone();
        patch_legacy_remainder(&mut doc);

        assert_eq!(doc, before);
    }

    #[test]
    fn test_load_legacy_artifact() {
        let file = write_doc(&artifact_doc(json!(["line_km"])));
        let loaded = ArtifactLoader::load(file.path());

        assert!(loaded.is_ready());
        assert_eq!(loaded.feature_names, vec!["budget", "line_km"]);
        assert_eq!(loaded.output_names, vec!["Steel Towers", "Conductors"]);
    }

    #[test]
    fn test_load_current_artifact() {
        let file = write_doc(&artifact_doc(
            json!({"type": "remainder_cols", "columns": ["line_km"]}),
        ));
        let loaded = ArtifactLoader::load(file.path());

        assert!(loaded.is_ready());
        assert!(loaded.load_error.is_none());
    }

    #[test]
    fn test_missing_file_records_error() {
        let loaded = ArtifactLoader::load(Path::new("/nonexistent/model.json"));

        assert!(!loaded.is_ready());
        assert!(loaded.predictor.is_none());
        assert!(loaded.load_error.is_some());
    }

    #[test]
    fn test_corrupt_artifact_records_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json at all").unwrap();
        file.flush().unwrap();

        let loaded = ArtifactLoader::load(file.path());
        assert!(!loaded.is_ready());
        assert!(loaded.load_error.is_some());
    }

    #[test]
    fn test_inconsistent_artifact_records_error() {
        // Weight rows wider than the encoded layout fail validation.
        let mut doc = artifact_doc(json!([]));
        doc["weights"] = json!([[1.0, 2.0, 3.0], [1.0, 2.0, 3.0]]);
        let file = write_doc(&doc);

        let loaded = ArtifactLoader::load(file.path());
        assert!(!loaded.is_ready());
        assert!(loaded.load_error.unwrap().contains("coefficients"));
    }
}
