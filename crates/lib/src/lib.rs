//! # Natural Language to SQL with Business Summaries
//!
//! This crate converts natural language business questions into read-only
//! BigQuery SQL using a configurable AI provider, validates the generated
//! query, executes it against a storage provider, and narrates the results
//! for a non-technical reader. It also provides a client for a managed
//! data-question agent with conversation history.

pub mod errors;
pub mod history;
pub mod prompts;
pub mod providers;
pub mod validate;

pub use errors::PromptError;
pub use validate::{validate_sql, ValidationVerdict};

use providers::agent::AgentTable;
use providers::ai::AiProvider;
use providers::db::Storage;
use regex::Regex;
use std::fmt::{self, Debug};
use std::sync::LazyLock;
use tracing::{debug, error, info};

/// A materialized result row.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Maximum rows embedded verbatim in a summarization prompt.
pub const SUMMARY_SAMPLE_ROWS: usize = 10;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:sql|query)?\n?([\s\S]*?)```").expect("valid fence regex"));

/// Extracts the payload from a markdown code fence, or trims the raw text.
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

/// A client that drives the generate-validate-execute-summarize pipeline.
#[derive(Clone)]
pub struct AnswerClient {
    pub(crate) ai_provider: Box<dyn AiProvider>,
    pub(crate) storage_provider: Option<Box<dyn Storage>>,
    pub(crate) schema_context: String,
    pub(crate) sql_temperature: f32,
    pub(crate) summary_temperature: f32,
}

impl Debug for AnswerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerClient")
            .field("ai_provider", &self.ai_provider)
            .field("sql_temperature", &self.sql_temperature)
            .field("summary_temperature", &self.summary_temperature)
            .finish_non_exhaustive()
    }
}

/// A builder for creating `AnswerClient` instances.
#[derive(Default)]
pub struct AnswerClientBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    storage_provider: Option<Box<dyn Storage>>,
    schema_context: String,
    sql_temperature: Option<f32>,
    summary_temperature: Option<f32>,
}

impl AnswerClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the AI provider (required).
    pub fn ai_provider(mut self, provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(provider);
        self
    }

    /// Sets the storage provider used for query execution.
    pub fn storage_provider(mut self, provider: Box<dyn Storage>) -> Self {
        self.storage_provider = Some(provider);
        self
    }

    /// Sets the schema document injected into generation prompts.
    pub fn schema_context(mut self, context: String) -> Self {
        self.schema_context = context;
        self
    }

    /// Sets the sampling temperature for SQL generation (default 0.1).
    pub fn sql_temperature(mut self, temperature: f32) -> Self {
        self.sql_temperature = Some(temperature);
        self
    }

    /// Sets the sampling temperature for summarization (default 0.2).
    pub fn summary_temperature(mut self, temperature: f32) -> Self {
        self.summary_temperature = Some(temperature);
        self
    }

    pub fn build(self) -> Result<AnswerClient, PromptError> {
        let ai_provider = self.ai_provider.ok_or(PromptError::MissingAiProvider)?;
        Ok(AnswerClient {
            ai_provider,
            storage_provider: self.storage_provider,
            schema_context: self.schema_context,
            sql_temperature: self.sql_temperature.unwrap_or(0.1),
            summary_temperature: self.summary_temperature.unwrap_or(0.2),
        })
    }
}

impl AnswerClient {
    /// Converts a natural language question into a candidate SQL query.
    ///
    /// The output has markdown fences stripped but is otherwise unvalidated;
    /// callers pass it through [`validate_sql`] before execution.
    pub async fn generate_sql(&self, question: &str) -> Result<String, PromptError> {
        info!("[generate_sql] received question: {question:?}");
        let user_prompt = prompts::tasks::SQL_GENERATION_USER_PROMPT
            .replace("{context}", &self.schema_context)
            .replace("{prompt}", question);

        let raw = self
            .ai_provider
            .generate(
                prompts::tasks::SQL_GENERATION_SYSTEM_PROMPT,
                &user_prompt,
                self.sql_temperature,
            )
            .await?;
        debug!("<-- Raw generation output: {raw}");

        Ok(strip_code_fences(&raw))
    }

    /// Executes a validated query against the storage provider.
    pub async fn execute(&self, sql: &str) -> Result<Vec<Row>, PromptError> {
        let storage = self
            .storage_provider
            .as_ref()
            .ok_or(PromptError::MissingStorageProvider)?;
        storage.execute_query(sql).await
    }

    /// Produces a business summary of query results.
    ///
    /// This stage never fails the request: a provider error or an empty model
    /// response degrades to a placeholder answer that still reports the row
    /// count.
    pub async fn summarize(&self, question: &str, sql: &str, rows: &[Row]) -> String {
        let num_rows = rows.len();
        let columns: Vec<String> = rows.first().map(|r| r.keys().cloned().collect()).unwrap_or_default();
        let results_context = rows_context(&columns, rows);

        let user_prompt = prompts::tasks::SUMMARY_USER_PROMPT
            .replace("{prompt}", question)
            .replace("{sql}", sql)
            .replace("{results}", &results_context);

        match self
            .ai_provider
            .generate(
                prompts::tasks::SUMMARY_SYSTEM_PROMPT,
                &user_prompt,
                self.summary_temperature,
            )
            .await
        {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                format!("Retrieved {num_rows} records, but could not generate a specific summary.")
            }
            Err(e) => {
                error!("[summarize] provider error: {e}");
                format!(
                    "Successfully retrieved {num_rows} records. An error occurred while generating a business summary: {e}"
                )
            }
        }
    }

    /// Re-reasons over an agent's output to produce a refined answer.
    ///
    /// Like [`summarize`](Self::summarize), failures degrade to a placeholder
    /// that preserves the agent's initial answer.
    pub async fn refine(
        &self,
        question: &str,
        sql: Option<&str>,
        table: Option<&AgentTable>,
        initial_answer: &str,
    ) -> String {
        let results_context = match table {
            Some(table) => rows_context(&table.columns, &table.rows),
            None => "No tabular data was returned or the data format was unexpected.\n".to_string(),
        };

        let user_prompt = prompts::tasks::REFINE_USER_PROMPT
            .replace("{prompt}", question)
            .replace("{sql}", sql.unwrap_or("N/A"))
            .replace("{initial_answer}", initial_answer)
            .replace("{results}", &results_context);

        match self
            .ai_provider
            .generate(
                prompts::tasks::REFINE_SYSTEM_PROMPT,
                &user_prompt,
                self.summary_temperature,
            )
            .await
        {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => format!(
                "Initial answer: '{initial_answer}'. Secondary reasoning could not generate a specific summary."
            ),
            Err(e) => {
                error!("[refine] provider error: {e}");
                format!(
                    "Initial answer: '{initial_answer}'. An error occurred during secondary reasoning: {e}"
                )
            }
        }
    }
}

/// Renders rows into the textual context block used by summarization prompts.
///
/// At most [`SUMMARY_SAMPLE_ROWS`] rows are shown verbatim; the remainder is
/// reported as a count so prompts stay bounded regardless of result size.
pub fn rows_context(columns: &[String], rows: &[Row]) -> String {
    let num_rows = rows.len();
    if num_rows == 0 {
        return "The query returned no data (0 rows).\n".to_string();
    }

    let sample = &rows[..num_rows.min(SUMMARY_SAMPLE_ROWS)];
    let mut context = String::new();
    if !columns.is_empty() {
        context.push_str(&format!("Column Names: {}\n", columns.join(", ")));
    }
    context.push_str(&format!(
        "Sample Data (first {} of {} total rows):\n",
        sample.len(),
        num_rows
    ));
    for (idx, row) in sample.iter().enumerate() {
        let rendered = serde_json::to_string(row).unwrap_or_else(|_| "{}".to_string());
        context.push_str(&format!("Row {}: {}\n", idx + 1, rendered));
    }
    if num_rows > SUMMARY_SAMPLE_ROWS {
        context.push_str(&format!(
            "... and {} more rows.\n",
            num_rows - SUMMARY_SAMPLE_ROWS
        ));
    }
    context.push_str(&format!("Total rows retrieved: {num_rows}\n"));
    context
}
