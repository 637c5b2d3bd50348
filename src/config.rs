use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::{Ranker, DEFAULT_MAX_RESULTS, DEFAULT_MIN_SCORE};
use crate::models::ScoringWeights;
use crate::services::PersistencePolicy;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub eventx: EventxSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub persistence: PersistenceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// EventX catalog API
#[derive(Debug, Clone, Deserialize)]
pub struct EventxSettings {
    #[serde(default = "default_eventx_url")]
    pub base_url: String,
    #[serde(default = "default_event_id")]
    pub event_id: u32,
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EventxSettings {
    fn default() -> Self {
        Self {
            base_url: default_eventx_url(),
            event_id: default_event_id(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_eventx_url() -> String { "https://eventxcrm.com/api".to_string() }
fn default_event_id() -> u32 { 11 }
fn default_timeout_secs() -> u64 { 10 }

/// Saved match store. Without a URL saves are kept in process memory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    /// Scores must be strictly above this to be listed
    #[serde(default = "default_min_score")]
    pub min_score: u8,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_results: default_max_results(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl MatchingSettings {
    pub fn ranker(&self) -> Ranker {
        Ranker::new(self.min_score, self.max_results)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

fn default_min_score() -> u8 { DEFAULT_MIN_SCORE }
fn default_max_results() -> usize { DEFAULT_MAX_RESULTS }
fn default_session_ttl_secs() -> u64 { 3600 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

/// Points awarded per scoring rule
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    pub sector: u32,
    pub country: u32,
    pub interest_per_match: u32,
    pub interest_cap: u32,
    pub sponsor: u32,
    pub sponsor_focus: u32,
    pub partner: u32,
    pub partner_focus: u32,
    pub trending: u32,
    pub trending_min_representatives: u32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        let w = ScoringWeights::default();
        Self {
            sector: w.sector,
            country: w.country,
            interest_per_match: w.interest_per_match,
            interest_cap: w.interest_cap,
            sponsor: w.sponsor,
            sponsor_focus: w.sponsor_focus,
            partner: w.partner,
            partner_focus: w.partner_focus,
            trending: w.trending,
            trending_min_representatives: w.trending_min_representatives,
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(w: &WeightsConfig) -> Self {
        Self {
            sector: w.sector,
            country: w.country,
            interest_per_match: w.interest_per_match,
            interest_cap: w.interest_cap,
            sponsor: w.sponsor,
            sponsor_focus: w.sponsor_focus,
            partner: w.partner,
            partner_focus: w.partner_focus,
            trending: w.trending,
            trending_min_representatives: w.trending_min_representatives,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceSettings {
    #[serde(default = "default_save_retries")]
    pub save_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            save_retries: default_save_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl From<&PersistenceSettings> for PersistencePolicy {
    fn from(p: &PersistenceSettings) -> Self {
        Self {
            save_retries: p.save_retries,
            retry_backoff: Duration::from_millis(p.retry_backoff_ms),
        }
    }
}

fn default_save_retries() -> u32 { 3 }
fn default_retry_backoff_ms() -> u64 { 200 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Output layout of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LoggingSettings {
    /// `json`, `pretty` or `compact`; anything else falls back to compact.
    pub fn log_format(&self) -> LogFormat {
        match self.format.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with EXPO__)
    /// 5. `DATABASE_URL` and `EVENTX_TOKEN`
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., EXPO__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("EXPO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_well_known_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("EXPO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Honour the conventional unprefixed variables used by deploy tooling
fn apply_well_known_env(settings: Config) -> Result<Config, ConfigError> {
    Config::builder()
        .add_source(settings)
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
        .set_override_option("eventx.token", std::env::var("EVENTX_TOKEN").ok())?
        .build()
}
