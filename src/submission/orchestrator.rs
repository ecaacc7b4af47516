use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::{
    db::KeyValueStore,
    history::HistoryStore,
    log_error, log_info,
    models::{CropForm, PredictionRecord, PredictionSource},
    notifications::{Notification, Notifier},
    prediction::{PredictionClient, Predictor},
};

use super::validation::{validate, ValidationError};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Requesting,
    Persisting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Success {
        record: PredictionRecord,
        source: PredictionSource,
    },
    Rejected(ValidationError),
}

impl SubmitOutcome {
    pub fn record(&self) -> Option<&PredictionRecord> {
        match self {
            SubmitOutcome::Success { record, .. } => Some(record),
            SubmitOutcome::Rejected(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Success { .. })
    }
}

/// Validates form input, runs the prediction and records it in history.
///
/// Does not serialize overlapping `submit` calls; the caller keeps at most one
/// in flight. History appends stay safe either way.
pub struct SubmissionOrchestrator<P, S> {
    client: PredictionClient<P>,
    history: HistoryStore<S>,
    notifier: Arc<dyn Notifier>,
    phase: watch::Sender<SubmissionPhase>,
    last_id: AtomicI64,
}

impl<P: Predictor, S: KeyValueStore> SubmissionOrchestrator<P, S> {
    pub fn new(
        client: PredictionClient<P>,
        history: HistoryStore<S>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (phase, _) = watch::channel(SubmissionPhase::Idle);
        Self {
            client,
            history,
            notifier,
            phase,
            last_id: AtomicI64::new(0),
        }
    }

    pub fn client(&self) -> &PredictionClient<P> {
        &self.client
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub fn phase(&self) -> SubmissionPhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionPhase> {
        self.phase.subscribe()
    }

    pub async fn submit(&self, form: &CropForm) -> SubmitOutcome {
        self.set_phase(SubmissionPhase::Validating);
        let observation = match validate(form) {
            Ok(observation) => observation,
            Err(err) => {
                log_info!("Rejected submission: {err}");
                self.set_phase(SubmissionPhase::Idle);
                return SubmitOutcome::Rejected(err);
            }
        };

        self.set_phase(SubmissionPhase::Requesting);
        let prediction = self.client.predict(&observation).await;

        self.set_phase(SubmissionPhase::Persisting);
        let now = Utc::now();
        let record = PredictionRecord::new(
            self.next_id(now),
            now,
            &observation,
            prediction.result,
        );

        if let Err(err) = self.history.append(record.clone()).await {
            log_error!("Failed to save prediction {} to history: {err:#}", record.id);
            self.notifier.notify(Notification::error(
                "History not saved",
                "The prediction could not be saved to history.",
            ));
        }

        self.notifier.notify(Notification::success(
            "Prediction completed!",
            format!(
                "Yield prediction for \"{}\" is {} tons.",
                record.field_name, record.result.yield_prediction
            ),
        ));
        log_info!(
            "Stored {} prediction {} for '{}'",
            prediction.source.as_str(),
            record.id,
            record.field_name
        );

        self.set_phase(SubmissionPhase::Idle);
        SubmitOutcome::Success {
            record,
            source: prediction.source,
        }
    }

    /// Creation time in epoch millis, bumped past the previous id on collision.
    fn next_id(&self, now: DateTime<Utc>) -> i64 {
        let candidate = now.timestamp_millis();
        let mut previous = self.last_id.load(Ordering::SeqCst);
        loop {
            let next = candidate.max(previous + 1);
            match self.last_id.compare_exchange(
                previous,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return next,
                Err(actual) => previous = actual,
            }
        }
    }

    fn set_phase(&self, phase: SubmissionPhase) {
        self.phase.send_replace(phase);
    }
}
