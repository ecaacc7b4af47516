//! Offline stand-in for the prediction service.
//!
//! Values are drawn from fixed ranges and the advisory text is canned. It is
//! never derived from the observation, so a synthetic result can't pass for a
//! real inference.

use std::{ops::RangeInclusive, sync::Mutex};

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

use crate::models::PredictionResult;

pub const YIELD_RANGE: RangeInclusive<f64> = 60.0..=100.0;
pub const HEALTH_RANGE: RangeInclusive<f64> = 70.0..=100.0;

pub const FALLBACK_RECOMMENDATIONS: [&str; 3] = [
    "Consider increasing nitrogen application by 10%",
    "Monitor soil moisture levels during the next growth stage",
    "Implement pest control measures within the next two weeks",
];

pub const FALLBACK_RISK_FACTORS: [&str; 3] = [
    "Potential phosphorus deficiency",
    "Risk of drought stress if rainfall remains below average",
    "Possible pest pressure due to recent weather conditions",
];

pub struct FallbackSynthesizer {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl FallbackSynthesizer {
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Reproducible sequence, for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn synthesize(&self) -> PredictionResult {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        PredictionResult {
            yield_prediction: rng.gen_range(YIELD_RANGE).round(),
            health_score: rng.gen_range(HEALTH_RANGE).round(),
            recommendations: FALLBACK_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
            risk_factors: FALLBACK_RISK_FACTORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for FallbackSynthesizer {
    fn default() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl std::fmt::Debug for FallbackSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackSynthesizer").finish_non_exhaustive()
    }
}
