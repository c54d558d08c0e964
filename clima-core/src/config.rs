use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fmt, fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    error::ConfigError,
    liveness,
    rotator::CityRotator,
    store::{DEFAULT_COLLECTION, DEFAULT_DATABASE},
};

pub const API_KEY_VAR: &str = "WEATHER_API_KEY";
pub const MONGO_URI_VAR: &str = "MONGO_URI";

pub const COLOMBIA_CITIES: [&str; 15] = [
    "Bogota",
    "Medellin",
    "Cali",
    "Barranquilla",
    "Cartagena",
    "Bucaramanga",
    "Pereira",
    "Cucuta",
    "Manizales",
    "Santa Marta",
    "Armenia",
    "Popayan",
    "Monteria",
    "Neiva",
    "Villavicencio",
];

/// Built-in presets. Both run the same pipeline and differ only in the city
/// list and the poll period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Rotate through fifteen Colombian cities every 10 seconds.
    #[default]
    Colombia,
    /// Poll one city every 60 seconds.
    Single,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Colombia => "colombia",
            Variant::Single => "single",
        }
    }

    pub const fn all() -> &'static [Variant] {
        &[Variant::Colombia, Variant::Single]
    }

    pub fn default_cities(&self) -> Vec<String> {
        match self {
            Variant::Colombia => COLOMBIA_CITIES.iter().map(|c| c.to_string()).collect(),
            Variant::Single => vec![COLOMBIA_CITIES[0].to_string()],
        }
    }

    pub fn default_interval(&self) -> Duration {
        match self {
            Variant::Colombia => Duration::from_secs(10),
            Variant::Single => Duration::from_secs(60),
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Variant::Colombia => liveness::DEFAULT_MESSAGE,
            Variant::Single => "Weather pipeline is running successfully!",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Variant {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "colombia" => Ok(Variant::Colombia),
            "single" => Ok(Variant::Single),
            _ => Err(ConfigError::UnknownVariant(value.to_string())),
        }
    }
}

/// Optional on-disk settings. Every field overrides the variant preset.
///
/// Example TOML:
/// ```toml
/// variant = "colombia"
/// cities = ["Bogota", "Cali"]
/// country = "Colombia"
/// interval_secs = 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub variant: Option<Variant>,
    pub cities: Option<Vec<String>>,
    pub country: Option<String>,
    pub interval_secs: Option<u64>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub liveness_message: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load from the platform config directory, or return an empty default if
    /// there is no such directory (no home in a container) or no file in it.
    pub fn load_default() -> Result<Self> {
        match Self::config_file_path() {
            Ok(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "clima", "clima-pipeline")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Command-line overrides, applied on top of the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub variant: Option<Variant>,
    pub city: Option<String>,
    pub port: Option<u16>,
    pub interval_secs: Option<u64>,
}

/// Credentials. Only ever read from the environment.
#[derive(Clone, Default)]
pub struct Secrets {
    pub api_key: Option<String>,
    pub mongo_uri: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self { api_key: non_empty(API_KEY_VAR), mongo_uri: non_empty(MONGO_URI_VAR) }
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("api_key", &presence(&self.api_key))
            .field("mongo_uri", &presence(&self.mongo_uri))
            .finish()
    }
}

fn presence(value: &Option<String>) -> &'static str {
    if value.is_some() { "<set>" } else { "<missing>" }
}

/// Effective configuration of a pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    pub variant: Variant,
    pub cities: Vec<String>,
    pub country: Option<String>,
    pub interval: Duration,
    pub port: u16,
    pub database: String,
    pub collection: String,
    pub liveness_message: String,
    secrets: Secrets,
}

impl Config {
    /// Merge preset, file, and overrides, in increasing precedence.
    pub fn resolve(file: FileConfig, overrides: Overrides, secrets: Secrets) -> Result<Self> {
        let variant = overrides.variant.or(file.variant).unwrap_or_default();

        let cities = match overrides.city {
            Some(city) => vec![city],
            None => file.cities.unwrap_or_else(|| variant.default_cities()),
        };

        let country = match file.country {
            Some(c) if c.trim().is_empty() => None,
            Some(c) => Some(c),
            None => Some("Colombia".to_string()),
        };

        let interval = match overrides.interval_secs.or(file.interval_secs) {
            Some(0) => return Err(ConfigError::ZeroInterval.into()),
            Some(secs) => Duration::from_secs(secs),
            None => variant.default_interval(),
        };

        let config = Self {
            variant,
            cities,
            country,
            interval,
            port: overrides.port.or(file.port).unwrap_or(liveness::DEFAULT_PORT),
            database: file.database.unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            collection: file.collection.unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            liveness_message: file
                .liveness_message
                .unwrap_or_else(|| variant.default_message().to_string()),
            secrets,
        };

        config.rotator().context("Invalid city list")?;
        Ok(config)
    }

    pub fn rotator(&self) -> Result<CityRotator, ConfigError> {
        CityRotator::new(self.cities.clone())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        liveness::listen_addr(self.port)
    }

    pub fn api_key(&self) -> Result<&str> {
        self.secrets.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No WeatherAPI key configured.\n\
                 Hint: set {API_KEY_VAR} in the environment or in a .env file."
            )
        })
    }

    pub fn mongo_uri(&self) -> Result<&str> {
        self.secrets.mongo_uri.as_deref().ok_or_else(|| {
            anyhow!(
                "No MongoDB connection string configured.\n\
                 Hint: set {MONGO_URI_VAR}, or pass --dry-run to keep records in memory."
            )
        })
    }

    /// Human-readable summary with credentials reduced to set/missing.
    pub fn redacted(&self) -> String {
        format!(
            "variant:    {}\n\
             cities:     {}\n\
             country:    {}\n\
             interval:   {}s\n\
             port:       {}\n\
             store:      {}.{}\n\
             {API_KEY_VAR}: {}\n\
             {MONGO_URI_VAR}: {}",
            self.variant,
            self.cities.join(", "),
            self.country.as_deref().unwrap_or("-"),
            self.interval.as_secs(),
            self.port,
            self.database,
            self.collection,
            presence(&self.secrets.api_key),
            presence(&self.secrets.mongo_uri),
        )
    }
}
