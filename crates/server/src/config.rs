//! # Application Configuration
//!
//! Both servers are configured purely from environment variables. The
//! `config` crate's `Environment` source maps `BQ_PROJECT_ID` to
//! `bq_project_id` and so on; `.env` loading happens in the binaries via
//! `dotenvy` before this runs.

use config::{Config as ConfigBuilder, Environment};
use serde::Deserialize;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    General(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The application configuration, shared by both server binaries.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT`.
    #[serde(default = "default_port")]
    pub port: u16,

    /// BigQuery project holding the ledger table. Loaded from `BQ_PROJECT_ID`.
    pub bq_project_id: String,
    /// Dataset of the ledger table. Loaded from `BQ_DATASET_ID`.
    pub bq_dataset_id: String,
    /// The ledger table id. Loaded from `BQ_TABLE_ID`.
    #[serde(default = "default_table_id")]
    pub bq_table_id: String,

    /// AI provider type ("gemini" or "local"). Loaded from `AI_PROVIDER`.
    #[serde(default = "default_ai_provider")]
    pub ai_provider: String,
    /// Override for the provider API URL. For Gemini it is derived from the
    /// model name when unset. Loaded from `AI_API_URL`.
    #[serde(default)]
    pub ai_api_url: Option<String>,
    /// API key; required by the gemini provider. Loaded from `AI_API_KEY`.
    #[serde(default)]
    pub ai_api_key: Option<String>,
    /// Model name. Loaded from `AI_MODEL`.
    #[serde(default = "default_ai_model")]
    pub ai_model: String,

    /// Sampling temperature for SQL generation. Loaded from
    /// `SQL_GENERATION_TEMPERATURE`.
    #[serde(default = "default_sql_temperature")]
    pub sql_generation_temperature: f32,
    /// Sampling temperature for summaries and secondary reasoning. Loaded
    /// from `SUMMARY_GENERATION_TEMPERATURE`.
    #[serde(default = "default_summary_temperature")]
    pub summary_generation_temperature: f32,

    /// Endpoint of the managed data-question service. Loaded from
    /// `AGENT_API_URL`; the agent server requires it.
    #[serde(default)]
    pub agent_api_url: Option<String>,
    /// Billing project passed to the agent service. Loaded from
    /// `AGENT_BILLING_PROJECT`.
    #[serde(default)]
    pub agent_billing_project: Option<String>,

    /// Idle lifetime of a conversation history, in seconds. Loaded from
    /// `CONVERSATION_TTL_SECS`.
    #[serde(default = "default_conversation_ttl_secs")]
    pub conversation_ttl_secs: u64,
    /// Maximum number of concurrent conversation histories. Loaded from
    /// `CONVERSATION_CAPACITY`.
    #[serde(default = "default_conversation_capacity")]
    pub conversation_capacity: usize,
}

fn default_port() -> u16 {
    8080
}

fn default_table_id() -> String {
    "master_ledger_US".to_string()
}

fn default_ai_provider() -> String {
    "gemini".to_string()
}

fn default_ai_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_sql_temperature() -> f32 {
    0.1
}

fn default_summary_temperature() -> f32 {
    0.2
}

fn default_conversation_ttl_secs() -> u64 {
    3600
}

fn default_conversation_capacity() -> usize {
    256
}

/// Loads the configuration from environment variables.
pub fn get_config() -> Result<AppConfig, ConfigError> {
    let settings = ConfigBuilder::builder()
        .add_source(Environment::default().try_parsing(true))
        .build()?;
    Ok(settings.try_deserialize()?)
}
