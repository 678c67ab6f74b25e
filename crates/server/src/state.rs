//! # Application State
//!
//! The shared state holds the pipeline client, the data-agent client, and the
//! conversation store. Dependency initialization failures at startup are
//! tolerated: the affected field stays `None`, `/ask` answers 503, and
//! `/health` reports the degraded dependency.

use crate::config::AppConfig;
use ledgerqa::{
    history::ConversationStore,
    prompts::schema,
    providers::{
        agent::{DataAgentProvider, TableRef},
        ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
        db::BigQueryProvider,
    },
    AnswerClient, AnswerClientBuilder,
};
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// The pipeline client; `None` when the AI provider never initialized.
    pub client: Option<Arc<AnswerClient>>,
    /// Whether the storage provider came up at startup.
    pub storage_available: bool,
    /// Client for the managed data-question service (agent server only).
    pub agent: Option<Arc<DataAgentProvider>>,
    pub conversations: Arc<ConversationStore>,
    pub agent_system_instruction: Arc<String>,
    pub table: TableRef,
}

/// Builds the shared application state from the configuration.
///
/// Returns `Err` only for configuration mistakes (an unknown provider name);
/// unreachable dependencies degrade the state instead of failing startup.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let table = TableRef {
        project_id: config.bq_project_id.clone(),
        dataset_id: config.bq_dataset_id.clone(),
        table_id: config.bq_table_id.clone(),
    };

    let ai_provider: Option<Box<dyn AiProvider>> = match config.ai_provider.as_str() {
        "gemini" => match config.ai_api_key.clone() {
            Some(api_key) => {
                let api_url = config.ai_api_url.clone().unwrap_or_else(|| {
                    format!(
                        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                        config.ai_model
                    )
                });
                match GeminiProvider::new(api_url, api_key) {
                    Ok(provider) => Some(Box::new(provider)),
                    Err(e) => {
                        warn!("Failed to initialize the gemini provider: {e}");
                        None
                    }
                }
            }
            None => {
                warn!("AI_API_KEY is not set; the gemini provider is unavailable.");
                None
            }
        },
        "local" => match config.ai_api_url.clone() {
            Some(api_url) => match LocalAiProvider::new(
                api_url,
                config.ai_api_key.clone(),
                Some(config.ai_model.clone()),
            ) {
                Ok(provider) => Some(Box::new(provider)),
                Err(e) => {
                    warn!("Failed to initialize the local provider: {e}");
                    None
                }
            },
            None => {
                warn!("AI_API_URL is not set; the local provider is unavailable.");
                None
            }
        },
        other => {
            return Err(anyhow::anyhow!("Unsupported AI provider: {other}"));
        }
    };

    let storage = match BigQueryProvider::new(config.bq_project_id.clone()).await {
        Ok(provider) => {
            info!("BigQuery client initialized for project {}", config.bq_project_id);
            Some(provider)
        }
        Err(e) => {
            warn!("Failed to initialize the BigQuery client: {e}");
            None
        }
    };
    let storage_available = storage.is_some();

    let client = match ai_provider {
        Some(ai_provider) => {
            let mut builder = AnswerClientBuilder::new()
                .ai_provider(ai_provider)
                .schema_context(schema::schema_description(&table.fqn()))
                .sql_temperature(config.sql_generation_temperature)
                .summary_temperature(config.summary_generation_temperature);
            if let Some(storage) = storage {
                builder = builder.storage_provider(Box::new(storage));
            }
            Some(Arc::new(builder.build()?))
        }
        None => None,
    };

    let agent = match (&config.agent_api_url, &config.agent_billing_project) {
        (Some(api_url), Some(billing_project)) => {
            match DataAgentProvider::new(api_url.clone(), billing_project.clone()) {
                Ok(provider) => Some(Arc::new(provider)),
                Err(e) => {
                    warn!("Failed to initialize the data agent client: {e}");
                    None
                }
            }
        }
        _ => None,
    };

    let conversations = Arc::new(ConversationStore::new(
        Duration::from_secs(config.conversation_ttl_secs),
        config.conversation_capacity,
    ));

    let agent_system_instruction = Arc::new(schema::agent_system_instruction(&table.fqn()));

    Ok(AppState {
        config: Arc::new(config),
        client,
        storage_available,
        agent,
        conversations,
        agent_system_instruction,
        table,
    })
}
