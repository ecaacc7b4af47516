use std::{sync::Arc, time::Duration};

use crate::{
    api::TransportError,
    log_warn,
    models::{CropObservation, Prediction, PredictionResult, PredictionSource},
    notifications::{Notification, Notifier},
};

use super::{FallbackSynthesizer, Predictor};

const ENABLE_LOGS: bool = true;

pub const OFFLINE_WARNING: &str =
    "Could not connect to the prediction service. Using mock data instead.";

/// Remote prediction with a synthetic fallback. `predict` never fails: any
/// transport problem becomes a `Synthetic` prediction plus one warning.
pub struct PredictionClient<P> {
    predictor: P,
    fallback: FallbackSynthesizer,
    notifier: Arc<dyn Notifier>,
    deadline: Duration,
}

impl<P: Predictor> PredictionClient<P> {
    pub fn new(
        predictor: P,
        fallback: FallbackSynthesizer,
        notifier: Arc<dyn Notifier>,
        deadline: Duration,
    ) -> Self {
        Self {
            predictor,
            fallback,
            notifier,
            deadline,
        }
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    pub async fn predict(&self, observation: &CropObservation) -> Prediction {
        let outcome = match tokio::time::timeout(self.deadline, self.predictor.request(observation))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        };

        match outcome {
            Ok(result) => Prediction {
                result: sanitize(result),
                source: PredictionSource::Remote,
            },
            Err(err) => {
                log_warn!(
                    "Prediction for '{}' failed, falling back to synthetic data: {err}",
                    observation.field_name
                );
                self.notifier.notify(Notification::warning(OFFLINE_WARNING));
                Prediction {
                    result: self.fallback.synthesize(),
                    source: PredictionSource::Synthetic,
                }
            }
        }
    }
}

/// Keep remote numbers displayable: yield never negative, health within 0-100.
fn sanitize(mut result: PredictionResult) -> PredictionResult {
    let yield_prediction = if result.yield_prediction.is_nan() {
        0.0
    } else {
        result.yield_prediction.max(0.0)
    };
    let health_score = if result.health_score.is_nan() {
        0.0
    } else {
        result.health_score.clamp(0.0, 100.0)
    };

    if yield_prediction != result.yield_prediction || health_score != result.health_score {
        log_warn!(
            "Clamped out-of-range remote prediction (yield {} -> {}, health {} -> {})",
            result.yield_prediction,
            yield_prediction,
            result.health_score,
            health_score
        );
    }

    result.yield_prediction = yield_prediction;
    result.health_score = health_score;
    result
}
