use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use clima_core::{
    CityQuery, CityRotator, Config, FileConfig, MemoryStore, MongoStore, Overrides, Pipeline,
    RecordStore, Scheduler, Secrets, Variant, WeatherApiProvider, WeatherProvider, WeatherRecord,
    liveness,
};
use tracing::{info, warn};

/// Records kept by `--dry-run` before the oldest are dropped.
const DRY_RUN_CAPACITY: usize = 500;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "clima-pipeline",
    version,
    about = "Poll WeatherAPI.com on a fixed interval and store each reading in MongoDB"
)]
pub struct Cli {
    /// Path to a TOML config file. Defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the poll loop and the liveness server (the default).
    Run(RunArgs),

    /// Fetch one city once and print the record that would be stored.
    Fetch {
        /// City name, e.g. "Bucaramanga".
        city: String,

        /// Country qualifier appended to the query; falls back to the configured one.
        #[arg(long)]
        country: Option<String>,
    },

    /// Print the effective configuration with credentials redacted.
    ShowConfig(SettingsArgs),
}

/// Settings shared by `run` and `show-config`.
#[derive(Debug, Default, Args)]
pub struct SettingsArgs {
    /// Preset: "colombia" (15 cities, every 10s) or "single" (one city, every 60s).
    #[arg(long)]
    pub variant: Option<String>,

    /// Poll only this city.
    #[arg(long)]
    pub city: Option<String>,

    /// Liveness server port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Seconds between poll cycles.
    #[arg(long)]
    pub interval: Option<u64>,
}

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Keep records in memory instead of writing to MongoDB.
    #[arg(long)]
    pub dry_run: bool,
}

impl SettingsArgs {
    fn overrides(&self) -> Result<Overrides> {
        let variant = self.variant.as_deref().map(Variant::try_from).transpose()?;

        Ok(Overrides {
            variant,
            city: self.city.clone(),
            port: self.port,
            interval_secs: self.interval,
        })
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::load_default()?,
        };

        match self.command.unwrap_or_else(|| Command::Run(RunArgs::default())) {
            Command::Run(args) => {
                let config =
                    Config::resolve(file, args.settings.overrides()?, Secrets::from_env())?;
                run_service(config, args.dry_run).await
            }
            Command::Fetch { city, country } => {
                let config = Config::resolve(file, Overrides::default(), Secrets::from_env())?;
                let country = country.or_else(|| config.country.clone());
                fetch_once(&config, &city, country.as_deref()).await
            }
            Command::ShowConfig(args) => {
                let config = Config::resolve(file, args.overrides()?, Secrets::from_env())?;
                println!("{}", config.redacted());
                Ok(())
            }
        }
    }
}

async fn open_store(config: &Config, dry_run: bool) -> Result<Arc<dyn RecordStore>> {
    if dry_run {
        info!("dry run: records are kept in memory only");
        return Ok(Arc::new(MemoryStore::with_capacity_limit(DRY_RUN_CAPACITY)));
    }

    let store = MongoStore::connect(config.mongo_uri()?, &config.database, &config.collection)
        .await
        .context("Failed to create MongoDB client")?;

    // Inserts fail individually later on, so an unreachable server is not fatal here.
    match store.ping().await {
        Ok(()) => info!(namespace = %store.namespace(), "connected to MongoDB"),
        Err(e) => warn!(error = %e, "MongoDB ping failed; continuing"),
    }

    Ok(Arc::new(store))
}

async fn run_service(config: Config, dry_run: bool) -> Result<()> {
    info!(config = ?config, "loaded configuration");

    let provider = WeatherApiProvider::new(config.api_key()?.to_string());
    let store = open_store(&config, dry_run).await?;
    let rotator: CityRotator = config.rotator()?;

    let pipeline = Pipeline::new(Box::new(provider), store, rotator, config.country.clone());
    let scheduler = Scheduler::new(pipeline, config.interval);

    // Detached: the poll loop lives as long as the process.
    tokio::spawn(scheduler.run());

    liveness::serve(config.listen_addr(), liveness::router(config.liveness_message.clone())).await
}

async fn fetch_once(config: &Config, city: &str, country: Option<&str>) -> Result<()> {
    let provider = WeatherApiProvider::new(config.api_key()?.to_string());
    let query = CityQuery::new(city, country)?;

    let conditions = provider
        .fetch_current(&query)
        .await
        .with_context(|| format!("Failed to fetch current weather for '{query}'"))?;

    let record = WeatherRecord::from_conditions(conditions, Utc::now());
    let json = serde_json::to_string_pretty(&record).context("Failed to render record as JSON")?;
    println!("{json}");

    Ok(())
}
