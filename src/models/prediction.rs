use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::observation::{CropObservation, CropType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Tons.
    pub yield_prediction: f64,
    /// Conventionally 0-100.
    pub health_score: f64,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
}

/// Where a `PredictionResult` came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PredictionSource {
    Remote,
    Synthetic,
}

impl PredictionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionSource::Remote => "remote",
            PredictionSource::Synthetic => "synthetic",
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, PredictionSource::Synthetic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub result: PredictionResult,
    pub source: PredictionSource,
}

/// One entry of the history log. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub field_name: String,
    pub crop_type: CropType,
    #[serde(flatten)]
    pub result: PredictionResult,
}

impl PredictionRecord {
    pub fn new(
        id: i64,
        date: DateTime<Utc>,
        observation: &CropObservation,
        result: PredictionResult,
    ) -> Self {
        Self {
            id,
            date,
            field_name: observation.field_name.clone(),
            crop_type: observation.crop_type,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_flattens_result_fields() {
        let date = DateTime::parse_from_rfc3339("2026-05-01T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = PredictionRecord {
            id: 1_777_624_200_000,
            date,
            field_name: "East Field".into(),
            crop_type: CropType::Wheat,
            result: PredictionResult {
                yield_prediction: 91.0,
                health_score: 88.0,
                recommendations: vec!["Reduce irrigation".into()],
                risk_factors: vec!["Frost risk".into()],
            },
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["fieldName"], "East Field");
        assert_eq!(value["cropType"], "wheat");
        assert_eq!(value["yieldPrediction"], 91.0);
        assert_eq!(value["riskFactors"], json!(["Frost risk"]));
        assert!(value.get("result").is_none());

        let parsed: PredictionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn remote_body_parses_integer_numbers() {
        let body = r#"{"yieldPrediction":91,"healthScore":88,"recommendations":[],"riskFactors":[]}"#;
        let result: PredictionResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.yield_prediction, 91.0);
        assert_eq!(result.health_score, 88.0);
    }
}
