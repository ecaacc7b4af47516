pub mod api;
mod commands;
pub mod db;
pub mod history;
pub mod models;
pub mod notifications;
pub mod prediction;
pub mod settings;
pub mod submission;
pub mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};

use api::ApiClient;
use db::{Database, KeyValueStore};
use history::HistoryStore;
use models::{CropForm, PredictionRecord};
use notifications::Notifier;
use prediction::{FallbackSynthesizer, PredictionClient, Predictor};
use settings::Settings;
use submission::{SubmissionOrchestrator, SubmissionPhase, SubmitOutcome};

/// The surface a UI talks to: submit forms, read history back.
pub struct App<P = ApiClient, S = Database> {
    orchestrator: SubmissionOrchestrator<P, S>,
}

impl<P: Predictor, S: KeyValueStore> App<P, S> {
    pub fn new(
        client: PredictionClient<P>,
        history: HistoryStore<S>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            orchestrator: SubmissionOrchestrator::new(client, history, notifier),
        }
    }

    pub async fn submit(&self, form: &CropForm) -> SubmitOutcome {
        self.orchestrator.submit(form).await
    }

    pub async fn all(&self) -> Vec<PredictionRecord> {
        self.orchestrator.history().all().await
    }

    pub async fn latest(&self) -> Option<PredictionRecord> {
        self.orchestrator.history().latest().await
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.orchestrator.phase()
    }

    pub fn predictor(&self) -> &P {
        self.orchestrator.client().predictor()
    }
}

impl App<ApiClient, Database> {
    /// Wire the HTTP predictor and the SQLite history from `settings`.
    pub fn open(settings: &Settings, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let db_path = settings.database_path();
        let database = Database::new(db_path.clone())
            .with_context(|| format!("failed to open history at {}", db_path.display()))?;

        let api = ApiClient::new(settings.api_url.clone(), settings.request_timeout());
        let client = PredictionClient::new(
            api,
            FallbackSynthesizer::default(),
            notifier.clone(),
            settings.request_timeout(),
        );

        Ok(Self::new(client, HistoryStore::new(database), notifier))
    }
}

/// CLI entry point used by the `cropsight` binary.
pub fn run() -> Result<()> {
    utils::init_logging();
    commands::run()
}
