pub mod auth;
pub mod observation;
pub mod prediction;

pub use auth::{LoginRequest, LoginResponse, UserProfile};
pub use observation::{CropForm, CropObservation, CropType, SoilType};
pub use prediction::{Prediction, PredictionRecord, PredictionResult, PredictionSource};
