use thiserror::Error;

use crate::models::{CropForm, CropObservation, CropType, SoilType};

pub const MIN_FIELD_NAME_CHARS: usize = 2;
pub const MIN_FIELD_SIZE: f64 = 0.1;
pub const SOIL_PH_MIN: f64 = 3.5;
pub const SOIL_PH_MAX: f64 = 9.5;
pub const NUTRIENT_MIN: f64 = 0.0;
pub const NUTRIENT_MAX: f64 = 100.0;

/// A form field that failed its bound. `field` uses the form's camelCase key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every bound and produce the observation sent to the predictor.
/// Fields are checked in form order; the first violation wins.
pub fn validate(form: &CropForm) -> Result<CropObservation, ValidationError> {
    if form.field_name.chars().count() < MIN_FIELD_NAME_CHARS {
        return Err(ValidationError::new(
            "fieldName",
            "Field name must be at least 2 characters.",
        ));
    }

    if !form.field_size.is_finite() || form.field_size < MIN_FIELD_SIZE {
        return Err(ValidationError::new(
            "fieldSize",
            "Field size must be at least 0.1 hectares.",
        ));
    }

    let crop_type = form
        .crop_type
        .as_deref()
        .and_then(CropType::parse)
        .ok_or_else(|| ValidationError::new("cropType", "Please select a crop type."))?;

    let soil_type = form
        .soil_type
        .as_deref()
        .and_then(SoilType::parse)
        .ok_or_else(|| ValidationError::new("soilType", "Please select a soil type."))?;

    check_range("soilPH", "Soil pH", form.soil_ph, SOIL_PH_MIN, SOIL_PH_MAX)?;
    check_range(
        "nitrogenLevel",
        "Nitrogen level",
        form.nitrogen_level,
        NUTRIENT_MIN,
        NUTRIENT_MAX,
    )?;
    check_range(
        "phosphorusLevel",
        "Phosphorus level",
        form.phosphorus_level,
        NUTRIENT_MIN,
        NUTRIENT_MAX,
    )?;
    check_range(
        "potassiumLevel",
        "Potassium level",
        form.potassium_level,
        NUTRIENT_MIN,
        NUTRIENT_MAX,
    )?;

    let irrigation_system = form
        .irrigation_system
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    Ok(CropObservation {
        field_name: form.field_name.clone(),
        crop_type,
        soil_type,
        field_size: form.field_size,
        soil_ph: form.soil_ph,
        nitrogen_level: form.nitrogen_level,
        phosphorus_level: form.phosphorus_level,
        potassium_level: form.potassium_level,
        irrigation_system,
    })
}

fn check_range(
    field: &'static str,
    label: &str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    // NaN fails `contains`, so it is rejected here too.
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("{label} must be between {min} and {max}."),
        ))
    }
}
