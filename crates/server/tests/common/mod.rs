//! Shared helpers for server integration tests: an in-memory storage stub,
//! state assembly, and a spawned app bound to a random port.
#![allow(dead_code)]

use async_trait::async_trait;
use ledgerqa::{
    errors::PromptError,
    history::ConversationStore,
    providers::{
        agent::{DataAgentProvider, TableRef},
        ai::local::LocalAiProvider,
        db::Storage,
    },
    AnswerClient, AnswerClientBuilder, Row,
};
use ledgerqa_server::{config::AppConfig, AppState};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;

/// Storage stub returning canned rows for every query.
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    pub rows: Vec<Row>,
}

#[async_trait]
impl Storage for MemoryStorage {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn execute_query(&self, _sql: &str) -> Result<Vec<Row>, PromptError> {
        Ok(self.rows.clone())
    }
}

pub fn row(value: serde_json::Value) -> Row {
    value.as_object().expect("row must be an object").clone()
}

pub fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        bq_project_id: "test-project".to_string(),
        bq_dataset_id: "analytics".to_string(),
        bq_table_id: "master_ledger_US".to_string(),
        ai_provider: "local".to_string(),
        ai_api_url: None,
        ai_api_key: None,
        ai_model: "test-model".to_string(),
        sql_generation_temperature: 0.1,
        summary_generation_temperature: 0.2,
        agent_api_url: None,
        agent_billing_project: None,
        conversation_ttl_secs: 3600,
        conversation_capacity: 64,
    }
}

/// Builds an `AnswerClient` against a mocked OpenAI-compatible endpoint.
pub fn answer_client(ai_url: String, storage: Option<MemoryStorage>) -> AnswerClient {
    let provider = LocalAiProvider::new(ai_url, None, None).expect("local provider");
    let mut builder = AnswerClientBuilder::new()
        .ai_provider(Box::new(provider))
        .schema_context("Table: `test-project.analytics.master_ledger_US`".to_string());
    if let Some(storage) = storage {
        builder = builder.storage_provider(Box::new(storage));
    }
    builder.build().expect("client build")
}

pub fn app_state(
    client: Option<AnswerClient>,
    storage_available: bool,
    agent: Option<DataAgentProvider>,
) -> AppState {
    AppState {
        config: Arc::new(test_config()),
        client: client.map(Arc::new),
        storage_available,
        agent: agent.map(Arc::new),
        conversations: Arc::new(ConversationStore::new(Duration::from_secs(3600), 64)),
        agent_system_instruction: Arc::new("You are a data analyst assistant.".to_string()),
        table: TableRef {
            project_id: "test-project".to_string(),
            dataset_id: "analytics".to_string(),
            table_id: "master_ledger_US".to_string(),
        },
    }
}

/// Serves the router on a random local port and returns its base URL.
pub async fn spawn_app(router: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind random port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server run");
    });
    format!("http://{addr}")
}

/// Canned OpenAI-compatible chat completion body.
pub fn chat_completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}
