//! Request and response payloads for both servers.

use ledgerqa::providers::agent::AgentTable;
use ledgerqa::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The request body for the direct server's `/ask` endpoint.
#[derive(Deserialize, Debug)]
pub struct AskRequest {
    pub question: String,
}

/// The request body for the agent server's `/ask` endpoint.
#[derive(Deserialize, Debug)]
pub struct AgentAskRequest {
    pub question: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Elevates per-request diagnostics to info-level log events.
    #[serde(default)]
    pub debug_mode: bool,
    #[serde(default)]
    pub reset_conversation: bool,
    #[serde(default = "default_true")]
    pub enable_secondary_reasoning: bool,
}

fn default_true() -> bool {
    true
}

/// Tabular query results as row objects plus column order.
#[derive(Serialize, Debug)]
pub struct TableContent {
    pub data: Vec<Row>,
    pub columns: Vec<String>,
}

impl TableContent {
    /// Columns are taken from the first row; an empty result keeps them empty.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        Self {
            data: rows,
            columns,
        }
    }
}

impl From<AgentTable> for TableContent {
    fn from(table: AgentTable) -> Self {
        Self {
            data: table.rows,
            columns: table.columns,
        }
    }
}

/// The response body for the direct server's `/ask` endpoint.
#[derive(Serialize, Debug)]
pub struct AskResponse {
    pub query: String,
    pub sql_query: Option<String>,
    pub dataframe_content: Option<TableContent>,
    pub answer: String,
}

/// The response body for the agent server's `/ask` endpoint.
#[derive(Serialize, Debug)]
pub struct AgentAskResponse {
    pub query: String,
    pub sql_query: Option<String>,
    pub dataframe_content: Option<TableContent>,
    pub vega_lite_spec: Option<Value>,
    pub answer: String,
    pub conversation_id: String,
}
