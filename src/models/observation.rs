//! Field measurements submitted for a prediction.
//!
//! `CropForm` is the raw, unvalidated shape the form hands over. It becomes a
//! `CropObservation` only after `submission::validation::validate` accepts it.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Wheat,
    Rice,
    Corn,
    Soybean,
    Cotton,
    Sugarcane,
}

impl CropType {
    pub const ALL: [CropType; 6] = [
        CropType::Wheat,
        CropType::Rice,
        CropType::Corn,
        CropType::Soybean,
        CropType::Cotton,
        CropType::Sugarcane,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Wheat => "wheat",
            CropType::Rice => "rice",
            CropType::Corn => "corn",
            CropType::Soybean => "soybean",
            CropType::Cotton => "cotton",
            CropType::Sugarcane => "sugarcane",
        }
    }

    /// Human-readable label for list and detail views.
    pub fn label(&self) -> &'static str {
        match self {
            CropType::Wheat => "Wheat",
            CropType::Rice => "Rice",
            CropType::Corn => "Corn",
            CropType::Soybean => "Soybean",
            CropType::Cotton => "Cotton",
            CropType::Sugarcane => "Sugarcane",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|crop| crop.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Loamy,
    Sandy,
    Clay,
    Silt,
    Peaty,
    Chalky,
}

impl SoilType {
    pub const ALL: [SoilType; 6] = [
        SoilType::Loamy,
        SoilType::Sandy,
        SoilType::Clay,
        SoilType::Silt,
        SoilType::Peaty,
        SoilType::Chalky,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Loamy => "loamy",
            SoilType::Sandy => "sandy",
            SoilType::Clay => "clay",
            SoilType::Silt => "silt",
            SoilType::Peaty => "peaty",
            SoilType::Chalky => "chalky",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SoilType::Loamy => "Loamy",
            SoilType::Sandy => "Sandy",
            SoilType::Clay => "Clay",
            SoilType::Silt => "Silt",
            SoilType::Peaty => "Peaty",
            SoilType::Chalky => "Chalky",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|soil| soil.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw form input, before validation. Enumerated fields arrive as free strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropForm {
    pub field_name: String,
    pub crop_type: Option<String>,
    pub soil_type: Option<String>,
    pub field_size: f64,
    #[serde(rename = "soilPH")]
    pub soil_ph: f64,
    pub nitrogen_level: f64,
    pub phosphorus_level: f64,
    pub potassium_level: f64,
    #[serde(default)]
    pub irrigation_system: Option<String>,
}

/// Validated measurements, serialized as the `/api/predict` request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CropObservation {
    pub field_name: String,
    pub crop_type: CropType,
    pub soil_type: SoilType,
    pub field_size: f64,
    #[serde(rename = "soilPH")]
    pub soil_ph: f64,
    pub nitrogen_level: f64,
    pub phosphorus_level: f64,
    pub potassium_level: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub irrigation_system: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn observation_serializes_with_wire_keys() {
        let observation = CropObservation {
            field_name: "East Field".into(),
            crop_type: CropType::Wheat,
            soil_type: SoilType::Clay,
            field_size: 2.5,
            soil_ph: 6.8,
            nitrogen_level: 40.0,
            phosphorus_level: 30.0,
            potassium_level: 25.0,
            irrigation_system: None,
        };

        let value = serde_json::to_value(&observation).unwrap();
        assert_eq!(
            value,
            json!({
                "fieldName": "East Field",
                "cropType": "wheat",
                "soilType": "clay",
                "fieldSize": 2.5,
                "soilPH": 6.8,
                "nitrogenLevel": 40.0,
                "phosphorusLevel": 30.0,
                "potassiumLevel": 25.0,
            })
        );
    }

    #[test]
    fn irrigation_is_sent_when_present() {
        let observation = CropObservation {
            field_name: "North".into(),
            crop_type: CropType::Rice,
            soil_type: SoilType::Silt,
            field_size: 1.0,
            soil_ph: 6.5,
            nitrogen_level: 0.0,
            phosphorus_level: 0.0,
            potassium_level: 0.0,
            irrigation_system: Some("drip".into()),
        };

        let value = serde_json::to_value(&observation).unwrap();
        assert_eq!(value["irrigationSystem"], "drip");
    }

    #[test]
    fn parse_accepts_known_values_case_insensitively() {
        assert_eq!(CropType::parse("Sugarcane"), Some(CropType::Sugarcane));
        assert_eq!(SoilType::parse("PEATY"), Some(SoilType::Peaty));
        assert_eq!(CropType::parse("barley"), None);
        assert_eq!(SoilType::parse(""), None);
    }

    #[test]
    fn labels_are_title_case() {
        assert_eq!(CropType::Soybean.label(), "Soybean");
        assert_eq!(SoilType::Chalky.to_string(), "Chalky");
    }
}
