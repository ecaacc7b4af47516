//! Command-line front end: the collaborator that submits forms and browses
//! history.

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::{
    api::ApiClient,
    models::{CropForm, PredictionRecord},
    notifications::{Notification, NotificationLevel, Notifier},
    settings::{Settings, SettingsStore},
    submission::SubmitOutcome,
    App,
};

#[derive(Debug, Parser)]
#[command(name = "cropsight", version, about = "Crop yield and health predictions")]
struct Cli {
    /// Settings file (JSON).
    #[arg(long, global = true, default_value = ".cropsight/settings.json")]
    settings: PathBuf,

    /// Override the prediction service base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit field measurements and store the prediction.
    Predict(PredictArgs),
    /// List saved predictions, newest first.
    History,
    /// Show the most recent prediction in detail.
    Latest,
    /// Check whether the prediction service is up.
    Health,
    /// Try credentials against the service.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the settings file, or change the values stored in it.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Store a new prediction service base URL.
    #[arg(long)]
    set_api_url: Option<String>,
    /// Store a new request deadline in milliseconds.
    #[arg(long)]
    set_timeout_ms: Option<u64>,
    /// Store a new directory for the history database.
    #[arg(long)]
    set_data_dir: Option<PathBuf>,
}

impl ConfigArgs {
    fn is_empty(&self) -> bool {
        self.set_api_url.is_none() && self.set_timeout_ms.is_none() && self.set_data_dir.is_none()
    }
}

#[derive(Debug, Args)]
struct PredictArgs {
    #[arg(long)]
    field_name: String,
    #[arg(long)]
    crop_type: Option<String>,
    #[arg(long)]
    soil_type: Option<String>,
    /// Hectares.
    #[arg(long, default_value_t = 1.0)]
    field_size: f64,
    #[arg(long, default_value_t = 6.5)]
    soil_ph: f64,
    #[arg(long, default_value_t = 40.0)]
    nitrogen: f64,
    #[arg(long, default_value_t = 30.0)]
    phosphorus: f64,
    #[arg(long, default_value_t = 25.0)]
    potassium: f64,
    #[arg(long)]
    irrigation: Option<String>,
}

impl From<PredictArgs> for CropForm {
    fn from(args: PredictArgs) -> Self {
        CropForm {
            field_name: args.field_name,
            crop_type: args.crop_type,
            soil_type: args.soil_type,
            field_size: args.field_size,
            soil_ph: args.soil_ph,
            nitrogen_level: args.nitrogen,
            phosphorus_level: args.phosphorus,
            potassium_level: args.potassium,
            irrigation_system: args.irrigation,
        }
    }
}

/// Prints notifications to stderr as they arrive.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let tag = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        match notification.description {
            Some(description) => eprintln!("[{tag}] {} {description}", notification.title),
            None => eprintln!("[{tag}] {}", notification.title),
        }
    }
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    let store = SettingsStore::new(cli.settings.clone())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(dispatch(cli, &store))
}

async fn dispatch(cli: Cli, store: &SettingsStore) -> Result<()> {
    let mut settings = store.settings().with_env_overrides();
    if let Some(url) = cli.api_url.clone() {
        settings.api_url = url;
    }

    match cli.command {
        Command::Predict(args) => {
            let app = App::open(&settings, Arc::new(ConsoleNotifier))?;
            let outcome = app.submit(&args.into()).await;
            match outcome {
                SubmitOutcome::Success { record, source } => {
                    if cli.json {
                        let value = serde_json::json!({
                            "record": record,
                            "source": source,
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    } else {
                        if source.is_synthetic() {
                            println!("(offline estimate, not from the prediction service)");
                        }
                        print_detail(&record);
                    }
                    Ok(())
                }
                SubmitOutcome::Rejected(err) => bail!("invalid input: {err}"),
            }
        }
        Command::History => {
            let app = App::open(&settings, Arc::new(ConsoleNotifier))?;
            let records = app.all().await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No predictions yet. Run `cropsight predict` to create one.");
            } else {
                for record in &records {
                    print_summary(record);
                }
            }
            Ok(())
        }
        Command::Latest => {
            let app = App::open(&settings, Arc::new(ConsoleNotifier))?;
            match app.latest().await {
                Some(record) if cli.json => {
                    println!("{}", serde_json::to_string_pretty(&record)?)
                }
                Some(record) => print_detail(&record),
                None => println!("No predictions yet."),
            }
            Ok(())
        }
        Command::Health => {
            let api = api_client(&settings);
            match api.health_check().await {
                Ok(true) => println!("{} is healthy", api.base_url()),
                Ok(false) => println!("{} responded but is not healthy", api.base_url()),
                Err(err) => bail!("{} is unavailable: {err}", api.base_url()),
            }
            Ok(())
        }
        Command::Login { email, password } => {
            let api = api_client(&settings);
            let response = api
                .login(&email, &password)
                .await
                .context("login failed")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("Signed in as {} <{}>", response.user.name, response.user.email);
            }
            Ok(())
        }
        Command::Config(args) => {
            let saved = apply_config(store, &args)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&saved)?);
            } else {
                println!("Settings file:    {}", store.path().display());
                println!("apiUrl:           {}", saved.api_url);
                println!("requestTimeoutMs: {}", saved.request_timeout_ms);
                println!("dataDir:          {}", saved.data_dir().display());
            }
            Ok(())
        }
    }
}

/// Writes any `--set-*` values to the settings file and returns what is stored.
/// Environment overrides are not folded in, so they never end up on disk.
fn apply_config(store: &SettingsStore, args: &ConfigArgs) -> Result<Settings> {
    if args.is_empty() {
        return Ok(store.settings());
    }

    let mut settings = store.settings();
    if let Some(url) = &args.set_api_url {
        settings.api_url = url.clone();
    }
    if let Some(timeout_ms) = args.set_timeout_ms {
        if timeout_ms == 0 {
            bail!("request timeout must be greater than zero");
        }
        settings.request_timeout_ms = timeout_ms;
    }
    if let Some(dir) = &args.set_data_dir {
        settings.data_dir = Some(dir.clone());
    }

    store.update(settings.clone())?;
    Ok(settings)
}

fn api_client(settings: &Settings) -> ApiClient {
    ApiClient::new(settings.api_url.clone(), settings.request_timeout())
}

fn print_summary(record: &PredictionRecord) {
    println!(
        "{}  {:<20} {:<10} yield {:>6} t  health {:>5}",
        record.date.format("%b %-d, %Y"),
        record.field_name,
        record.crop_type.label(),
        record.result.yield_prediction,
        record.result.health_score
    );
}

fn print_detail(record: &PredictionRecord) {
    println!("{}", record.field_name);
    println!(
        "{} • {}",
        record.crop_type.label(),
        record.date.format("%b %-d, %Y")
    );
    println!("Yield prediction: {} tons", record.result.yield_prediction);
    println!("Health score:     {}/100", record.result.health_score);

    if !record.result.recommendations.is_empty() {
        println!("Recommendations:");
        for item in &record.result.recommendations {
            println!("  - {item}");
        }
    }
    if !record.result.risk_factors.is_empty() {
        println!("Risk factors:");
        for item in &record.result.risk_factors {
            println!("  - {item}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn predict_args_use_form_defaults() {
        let cli = Cli::try_parse_from([
            "cropsight",
            "predict",
            "--field-name",
            "East Field",
            "--crop-type",
            "wheat",
            "--soil-type",
            "clay",
        ])
        .unwrap();

        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        let form: CropForm = args.into();
        assert_eq!(form.field_name, "East Field");
        assert_eq!(form.field_size, 1.0);
        assert_eq!(form.soil_ph, 6.5);
        assert_eq!(form.nitrogen_level, 40.0);
        assert_eq!(form.phosphorus_level, 30.0);
        assert_eq!(form.potassium_level, 25.0);
        assert_eq!(form.irrigation_system, None);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "cropsight",
            "history",
            "--json",
            "--api-url",
            "http://predictor:9000",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.api_url.as_deref(), Some("http://predictor:9000"));
        assert!(matches!(cli.command, Command::History));
    }

    fn config_args(argv: &[&str]) -> ConfigArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        let Command::Config(args) = cli.command else {
            panic!("expected config");
        };
        args
    }

    #[test]
    fn config_set_writes_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let args = config_args(&[
            "cropsight",
            "config",
            "--set-api-url",
            "http://predictor:9000",
            "--set-timeout-ms",
            "2500",
        ]);
        let saved = apply_config(&store, &args).unwrap();

        assert_eq!(saved.api_url, "http://predictor:9000");
        assert_eq!(saved.request_timeout_ms, 2_500);
        assert_eq!(store.path(), path.as_path());
        assert_eq!(SettingsStore::new(path).unwrap().settings(), saved);
    }

    #[test]
    fn config_without_changes_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let shown = apply_config(&store, &config_args(&["cropsight", "config"])).unwrap();

        assert_eq!(shown, Settings::default());
        assert!(!path.exists());
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let args = config_args(&["cropsight", "config", "--set-timeout-ms", "0"]);
        assert!(apply_config(&store, &args).is_err());
        assert!(!path.exists());
    }
}
