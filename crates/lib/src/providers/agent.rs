//! # Data Agent Client
//!
//! Client for the managed data-question service. Each request is stateless on
//! the wire: the caller supplies the prior conversation messages, and the
//! service replies with a sequence of system messages (text, data, chart)
//! that this module folds into a single [`AgentReply`].

use crate::{errors::PromptError, Row};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Debug};
use tracing::{debug, info};

// --- Wire types ---

/// A reference to the BigQuery table the agent is allowed to query.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl TableRef {
    /// The fully qualified `project.dataset.table` name.
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

/// One conversation message, either from the user or from the service.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AgentMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<UserMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<SystemMessage>,
}

impl AgentMessage {
    /// Wraps a question as a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            user_message: Some(UserMessage { text: text.into() }),
            system_message: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserMessage {
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SystemMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartMessage>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TextMessage {
    #[serde(default)]
    pub parts: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DataMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<DataResult>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DataResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<DataSchema>,
    #[serde(default)]
    pub data: Vec<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DataSchema {
    #[serde(default)]
    pub fields: Vec<FieldRef>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FieldRef {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ChartMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ChartResult>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ChartResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vega_config: Option<Value>,
}

#[derive(Serialize)]
struct AskQuestionRequest<'a> {
    project: String,
    messages: &'a [AgentMessage],
    context: InlineContext<'a>,
}

#[derive(Serialize)]
struct InlineContext<'a> {
    system_instruction: &'a str,
    datasource_references: DatasourceReferences<'a>,
}

#[derive(Serialize)]
struct DatasourceReferences<'a> {
    bq: BigQueryTableReferences<'a>,
}

#[derive(Serialize)]
struct BigQueryTableReferences<'a> {
    table_references: [&'a TableRef; 1],
}

#[derive(Deserialize, Debug, Default)]
struct AskQuestionResponse {
    #[serde(default)]
    messages: Vec<AgentMessage>,
}

// --- Folded reply ---

/// Tabular data extracted from the agent's data messages.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// The agent's reply folded into one record.
///
/// When the service emits several data or chart messages, the last one wins.
/// `replies` carries the raw service messages for history persistence.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub answer: String,
    pub generated_sql: Option<String>,
    pub table: Option<AgentTable>,
    pub vega_lite_spec: Option<Value>,
    pub replies: Vec<AgentMessage>,
}

// --- Provider ---

/// A client for the managed data-question service.
#[derive(Clone)]
pub struct DataAgentProvider {
    client: ReqwestClient,
    api_url: String,
    billing_project: String,
}

impl DataAgentProvider {
    /// Creates a new `DataAgentProvider`.
    pub fn new(api_url: String, billing_project: String) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            billing_project,
        })
    }

    /// Sends a question plus prior conversation messages and folds the reply.
    pub async fn ask(
        &self,
        question: &str,
        history: &[AgentMessage],
        system_instruction: &str,
        table: &TableRef,
    ) -> Result<AgentReply, PromptError> {
        info!("--> Asking data agent: {question:?}");
        let mut messages: Vec<AgentMessage> = history.to_vec();
        messages.push(AgentMessage::user(question));

        let request_body = AskQuestionRequest {
            project: format!("projects/{}", self.billing_project),
            messages: &messages,
            context: InlineContext {
                system_instruction,
                datasource_references: DatasourceReferences {
                    bq: BigQueryTableReferences {
                        table_references: [table],
                    },
                },
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request_body)
            .send()
            .await
            .map_err(PromptError::AgentRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AgentApi(error_text));
        }

        let agent_response: AskQuestionResponse = response
            .json()
            .await
            .map_err(PromptError::AgentDeserialization)?;

        debug!(
            "<-- Data agent returned {} messages",
            agent_response.messages.len()
        );
        Ok(fold_reply(agent_response.messages))
    }
}

impl Debug for DataAgentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataAgentProvider")
            .field("api_url", &self.api_url)
            .field("billing_project", &self.billing_project)
            .finish_non_exhaustive()
    }
}

/// Folds the service's message sequence into a single reply record.
fn fold_reply(messages: Vec<AgentMessage>) -> AgentReply {
    let mut text_parts: Vec<String> = Vec::new();
    let mut generated_sql: Option<String> = None;
    let mut table: Option<AgentTable> = None;
    let mut vega_lite_spec: Option<Value> = None;

    for message in &messages {
        let Some(system) = &message.system_message else {
            continue;
        };
        if let Some(data) = &system.data {
            if let Some(sql) = &data.generated_sql {
                if !sql.is_empty() {
                    generated_sql = Some(sql.clone());
                }
            }
            if let Some(result) = &data.result {
                table = Some(table_from_result(result));
            }
        }
        if let Some(spec) = system
            .chart
            .as_ref()
            .and_then(|c| c.result.as_ref())
            .and_then(|r| r.vega_config.clone())
        {
            vega_lite_spec = Some(spec);
        }
        if let Some(text) = &system.text {
            text_parts.extend(text.parts.iter().filter(|p| !p.is_empty()).cloned());
        }
    }

    let answer = text_parts.concat().trim().to_string();
    let answer = if !answer.is_empty() {
        answer
    } else if vega_lite_spec.is_some() {
        "[Data agent provided a chart. No additional text summary.]".to_string()
    } else if table.is_some() {
        "[Data agent provided tabular data. No additional text summary.]".to_string()
    } else if generated_sql.is_some() {
        "[Data agent generated SQL. No specific text summary.]".to_string()
    } else {
        "[Data agent provided no specific text, data, or chart output.]".to_string()
    };

    AgentReply {
        answer,
        generated_sql,
        table,
        vega_lite_spec,
        replies: messages,
    }
}

/// Materializes a data result into named columns and object rows.
///
/// Column order follows the result schema; when the schema is absent the
/// first object row supplies the names. Rows may arrive as objects or as
/// positional arrays matching the schema.
fn table_from_result(result: &DataResult) -> AgentTable {
    let mut columns: Vec<String> = result
        .schema
        .as_ref()
        .map(|s| s.fields.iter().map(|f| f.name.clone()).collect())
        .unwrap_or_default();

    if columns.is_empty() {
        if let Some(Value::Object(first)) = result.data.first() {
            columns = first.keys().cloned().collect();
        }
    }

    let mut rows: Vec<Row> = Vec::new();
    for raw in &result.data {
        match raw {
            Value::Object(map) => {
                let mut row = Row::new();
                for name in &columns {
                    row.insert(name.clone(), map.get(name).cloned().unwrap_or(Value::Null));
                }
                rows.push(row);
            }
            Value::Array(values) if values.len() == columns.len() => {
                let mut row = Row::new();
                for (name, value) in columns.iter().zip(values) {
                    row.insert(name.clone(), value.clone());
                }
                rows.push(row);
            }
            _ => {}
        }
    }

    AgentTable { columns, rows }
}
