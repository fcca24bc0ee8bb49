//! LifeQuest daily task generation - one-shot batch binary.
//!
//! Usage:
//!
//! ```text
//! lifequest [--force] [--dry-run]
//! ```
//!
//! - `--force` regenerates tasks even when today's pair already exists
//! - `--dry-run` uses the mock completion provider instead of OpenAI
//!
//! Prints the batch summary as JSON on stdout. Exits non-zero only when
//! startup or user enumeration fails; per-user failures are reported in
//! the summary.

use std::process::ExitCode;
use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use lifequest::adapters::ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
use lifequest::adapters::postgres::{
    PostgresPatternRepository, PostgresTaskRepository, PostgresUserContextReader,
};
use lifequest::adapters::weather::{CachedWeatherProvider, OpenWeatherConfig, OpenWeatherProvider};
use lifequest::application::handlers::{
    BatchRunner, ContextAggregator, GenerateDailyTasksHandler, WeatherService,
};
use lifequest::config::{AppConfig, RuntimeConfig, ValidationError};
use lifequest::domain::generation::GenerationError;
use lifequest::domain::patterns::KeywordSentimentAnalyzer;
use lifequest::domain::weather::WeatherError;
use lifequest::ports::{AIError, AIProvider, WeatherProvider};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("AI provider setup failed: {0}")]
    Ai(#[from] AIError),

    #[error("Weather provider setup failed: {0}")]
    Weather(#[from] WeatherError),

    #[error("Batch run failed: {0}")]
    Batch(#[from] GenerationError),

    #[error("Failed to encode summary: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
struct Args {
    force: bool,
    dry_run: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = Self::default();
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--force" => args.force = true,
                "--dry-run" => args.dry_run = true,
                other => eprintln!("Ignoring unknown argument: {}", other),
            }
        }
        args
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.runtime);

    match run(config, args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Daily task generation aborted");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(runtime: &RuntimeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(runtime.log_level.as_str()));

    if runtime.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(config: AppConfig, args: Args) -> Result<(), StartupError> {
    // 1. Validate; the completion key is only required for real runs
    if args.dry_run {
        config.validate_without_ai()?;
    } else {
        config.validate()?;
    }

    // 2. Storage
    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let reader = Arc::new(PostgresUserContextReader::new(pool.clone()));
    let tasks = Arc::new(PostgresTaskRepository::new(pool.clone()));
    let patterns = Arc::new(PostgresPatternRepository::new(pool));

    // 3. External services
    let ai: Arc<dyn AIProvider> = match config.ai.openai_api_key.as_ref() {
        Some(key) if !args.dry_run => {
            let openai = OpenAIConfig::new(key.expose_secret().clone())
                .with_model(config.ai.model.clone())
                .with_base_url(config.ai.base_url.clone())
                .with_timeout(config.ai.timeout())
                .with_max_retries(config.ai.max_retries);
            Arc::new(OpenAIProvider::new(openai)?)
        }
        _ => {
            tracing::warn!("Using mock completion provider");
            Arc::new(MockAIProvider::new())
        }
    };

    let openweather = OpenWeatherProvider::new(
        OpenWeatherConfig::new(config.weather.api_key())
            .with_base_url(config.weather.base_url.clone())
            .with_timeout(config.weather.timeout()),
    )?;
    let weather: Arc<dyn WeatherProvider> = Arc::new(CachedWeatherProvider::with_ttl(
        Arc::new(openweather),
        config.weather.cache_ttl(),
    ));

    // 4. Handlers
    let aggregator = Arc::new(
        ContextAggregator::new(
            reader.clone(),
            tasks.clone(),
            patterns,
            Arc::new(KeywordSentimentAnalyzer::new()),
        )
        .with_default_timezone(config.generation.timezone())
        .with_history_days(config.generation.task_history_days),
    );
    let handler = Arc::new(
        GenerateDailyTasksHandler::new(reader.clone(), aggregator, ai, tasks)
            .with_weather(Arc::new(WeatherService::new(weather))),
    );
    let runner = BatchRunner::new(reader, handler, config.generation.scheduling_info())
        .with_concurrency(config.generation.batch_concurrency);

    // 5. Run
    tracing::info!(
        force = args.force,
        dry_run = args.dry_run,
        environment = ?config.runtime.environment,
        "Starting daily task generation"
    );
    let summary = runner.generate_for_all_users(args.force).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
