//! The direct pipeline: generate SQL, validate, execute, summarize.
//!
//! Failures after startup never surface as HTTP errors here. A generation
//! failure, a rejected query, or an execution error all fold into the
//! `answer` field of a 200 response so the caller always gets a narrative,
//! with `sql_query` populated as far as the pipeline got.

use crate::{errors::AppError, state::AppState, types::*};
use axum::{extract::State, Json};
use ledgerqa::validate_sql;
use tracing::{error, info, warn};

pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let question = payload.question;
    info!("Received question: {question:?}");

    let Some(client) = state.client.clone() else {
        return Err(AppError::ServiceUnavailable(
            "AI provider failed to initialize on startup.".to_string(),
        ));
    };
    if !state.storage_available {
        return Err(AppError::ServiceUnavailable(
            "BigQuery client failed to initialize on startup.".to_string(),
        ));
    }

    let generated_sql = match client.generate_sql(&question).await {
        Ok(sql) => sql,
        Err(e) => {
            error!("SQL generation failed: {e}");
            return Ok(Json(AskResponse {
                query: question,
                sql_query: None,
                dataframe_content: None,
                answer: format!("Error generating SQL from LLM: {e}"),
            }));
        }
    };

    let verdict = validate_sql(&generated_sql);
    if !verdict.is_safe() {
        let answer = verdict
            .message
            .unwrap_or_else(|| "Generated SQL failed validation (structure or safety).".to_string());
        warn!("Validation failed: {answer} SQL: {generated_sql:?}");
        // The rejected SQL is returned for debugging; no data is fetched.
        return Ok(Json(AskResponse {
            query: question,
            sql_query: Some(generated_sql),
            dataframe_content: None,
            answer,
        }));
    }

    info!("Generated SQL passed validation. Proceeding with execution.");
    let rows = match client.execute(&generated_sql).await {
        Ok(rows) => rows,
        Err(e) => {
            error!("Query execution failed: {e}");
            return Ok(Json(AskResponse {
                query: question,
                sql_query: Some(generated_sql),
                dataframe_content: None,
                answer: e.to_string(),
            }));
        }
    };

    // Summarization runs even for empty results and degrades internally.
    let answer = client.summarize(&question, &generated_sql, &rows).await;

    Ok(Json(AskResponse {
        query: question,
        sql_query: Some(generated_sql),
        dataframe_content: Some(TableContent::from_rows(rows)),
        answer,
    }))
}
