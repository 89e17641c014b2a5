//! Feature payloads and schema alignment.
//!
//! The artifact consumes a positional row, so the caller's named payload
//! must be reconciled against the column order the artifact was trained on
//! before inference: missing columns zero-fill, extra fields drop, nulls
//! never survive into the row.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A single scalar feature value as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
    Null,
}

impl FeatureValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FeatureValue::Null)
    }

    /// Numeric view; text values parse if they can.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(s) => s.trim().parse().ok(),
            FeatureValue::Null => None,
        }
    }

    /// Text view for categorical encoding.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FeatureValue::Text(s) => Some(s.clone()),
            FeatureValue::Number(n) => Some(n.to_string()),
            FeatureValue::Null => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FeatureValue::Number(n) => Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FeatureValue::Text(s) => Value::String(s.clone()),
            FeatureValue::Null => Value::Null,
        }
    }
}

/// Project features for one forecast request. Field names (and the
/// historical `Distance_from_Storage_unit` spelling) match the columns the
/// training data used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFeatures {
    pub project_category_main: String,
    pub project_type: String,
    pub project_budget_price_in_lake: f64,
    pub state: String,
    pub terrain: String,
    #[serde(
        rename = "Distance_from_Storage_unit",
        alias = "distance_from_storage_unit"
    )]
    pub distance_from_storage_unit: f64,
    pub transmission_line_length_km: f64,
}

impl ForecastFeatures {
    /// Named payload in wire order, optionally restricted to the artifact's
    /// required columns (unknown required columns come back as nulls).
    pub fn to_payload(&self, required_order: Option<&[String]>) -> Vec<(String, FeatureValue)> {
        let values: Vec<(String, FeatureValue)> = vec![
            (
                "project_category_main".to_string(),
                FeatureValue::Text(self.project_category_main.clone()),
            ),
            (
                "project_type".to_string(),
                FeatureValue::Text(self.project_type.clone()),
            ),
            (
                "project_budget_price_in_lake".to_string(),
                FeatureValue::Number(self.project_budget_price_in_lake),
            ),
            ("state".to_string(), FeatureValue::Text(self.state.clone())),
            (
                "terrain".to_string(),
                FeatureValue::Text(self.terrain.clone()),
            ),
            (
                "Distance_from_Storage_unit".to_string(),
                FeatureValue::Number(self.distance_from_storage_unit),
            ),
            (
                "transmission_line_length_km".to_string(),
                FeatureValue::Number(self.transmission_line_length_km),
            ),
        ];

        match required_order {
            Some(order) => order
                .iter()
                .map(|name| {
                    let value = values
                        .iter()
                        .find(|(k, _)| k == name)
                        .map(|(_, v)| v.clone())
                        .unwrap_or(FeatureValue::Null);
                    (name.clone(), value)
                })
                .collect(),
            None => values,
        }
    }
}

/// The feature row actually fed to inference: expected columns in the
/// artifact's order, zero-filled where the payload had no usable value.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow(Vec<(String, FeatureValue)>);

impl AlignedRow {
    /// Align a payload against the artifact's expected column order.
    /// Missing expected columns become 0, extra payload fields drop, and
    /// nulls are replaced with 0. Without an expected order the payload
    /// passes through as-is (nulls still zeroed).
    pub fn align(payload: Vec<(String, FeatureValue)>, expected: Option<&[String]>) -> Self {
        let entries: Vec<(String, FeatureValue)> = match expected {
            Some(order) if !order.is_empty() => order
                .iter()
                .map(|name| {
                    let value = payload
                        .iter()
                        .find(|(k, _)| k == name)
                        .map(|(_, v)| v.clone())
                        .unwrap_or(FeatureValue::Null);
                    (name.clone(), value)
                })
                .collect(),
            _ => payload,
        };

        Self(
            entries
                .into_iter()
                .map(|(name, value)| {
                    let value = if value.is_null() {
                        FeatureValue::Number(0.0)
                    } else {
                        value
                    };
                    (name, value)
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[(String, FeatureValue)] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Numeric view of a column; missing or unparseable values read as 0.
    pub fn numeric(&self, name: &str) -> f64 {
        self.get(name).and_then(FeatureValue::as_f64).unwrap_or(0.0)
    }

    /// JSON object preserving column order, for the `features_used` echo.
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }
}
