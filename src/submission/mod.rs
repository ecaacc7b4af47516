pub mod orchestrator;
pub mod validation;

pub use orchestrator::{SubmissionOrchestrator, SubmissionPhase, SubmitOutcome};
pub use validation::{validate, ValidationError};
