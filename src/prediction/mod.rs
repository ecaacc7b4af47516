pub mod client;
pub mod fallback;

use std::future::Future;

use crate::{
    api::TransportError,
    models::{CropObservation, PredictionResult},
};

pub use client::{PredictionClient, OFFLINE_WARNING};
pub use fallback::FallbackSynthesizer;

/// The remote predictor as seen by [`PredictionClient`].
pub trait Predictor: Send + Sync {
    fn request(
        &self,
        observation: &CropObservation,
    ) -> impl Future<Output = Result<PredictionResult, TransportError>> + Send;
}
