use anyhow::{ensure, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::recognition::RecognitionConfig;
use crate::session::StatusMessages;

/// Environment variable prefix, e.g. `ITSHOP_VOICE__QUERY__ENDPOINT`
pub const ENV_PREFIX: &str = "ITSHOP_VOICE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub query: QueryConfig,
    pub recognition: RecognitionSettings,
    pub messages: StatusMessages,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "itshop-voice".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Full URL of the voice query endpoint
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/voice".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    pub lang: String,
    pub max_alternatives: u32,
    pub interim_results: bool,
    pub no_speech_timeout_secs: u64,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        let defaults = RecognitionConfig::default();
        Self {
            lang: defaults.lang,
            max_alternatives: defaults.max_alternatives,
            interim_results: defaults.interim_results,
            no_speech_timeout_secs: defaults.no_speech_timeout.as_secs(),
        }
    }
}

impl Config {
    /// Load defaults, then the optional file at `path`, then environment
    /// overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.query.endpoint.trim().is_empty(),
            "query.endpoint must not be empty"
        );
        ensure!(
            self.query.endpoint.starts_with("http://") || self.query.endpoint.starts_with("https://"),
            "query.endpoint must be an http(s) URL, got {}",
            self.query.endpoint
        );
        ensure!(self.query.timeout_secs > 0, "query.timeout_secs must be positive");
        ensure!(
            self.recognition.max_alternatives > 0,
            "recognition.max_alternatives must be at least 1"
        );
        ensure!(
            !self.recognition.lang.trim().is_empty(),
            "recognition.lang must not be empty"
        );
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query.timeout_secs)
    }

    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig {
            lang: self.recognition.lang.clone(),
            max_alternatives: self.recognition.max_alternatives,
            interim_results: self.recognition.interim_results,
            no_speech_timeout: Duration::from_secs(self.recognition.no_speech_timeout_secs),
        }
    }
}
