//! The agent pipeline: conversation lookup, agent ask, optional secondary
//! reasoning, and history persistence.

use crate::{errors::AppError, state::AppState, types::*};
use axum::{extract::State, Json};
use ledgerqa::providers::agent::AgentMessage;
use tracing::{error, info};
use uuid::Uuid;

pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AgentAskRequest>,
) -> Result<Json<AgentAskResponse>, AppError> {
    // A missing id means a fresh conversation; the generated id is returned
    // so the client can continue it.
    let conversation_id = payload
        .conversation_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    info!(
        "Received question (ConvID: {conversation_id}): {:?}",
        payload.question
    );

    let Some(agent) = state.agent.clone() else {
        return Err(AppError::ServiceUnavailable(
            "Core data querying service is unavailable.".to_string(),
        ));
    };

    // Reset only applies to an id the client actually supplied.
    if payload.reset_conversation && payload.conversation_id.is_some() {
        state.conversations.reset(&conversation_id).await;
    }

    let history = state.conversations.history(&conversation_id).await;

    let reply = match agent
        .ask(
            &payload.question,
            &history,
            &state.agent_system_instruction,
            &state.table,
        )
        .await
    {
        Ok(reply) => {
            // Normally debug-level detail; the flag surfaces it per request
            // without touching the process-wide filter.
            if payload.debug_mode {
                info!(
                    "Debug (ConvID: {conversation_id}): history carried {} messages; agent returned sql={:?}, {} table rows, chart={}",
                    history.len(),
                    reply.generated_sql.as_deref(),
                    reply.table.as_ref().map_or(0, |t| t.rows.len()),
                    reply.vega_lite_spec.is_some()
                );
            }
            reply
        }
        Err(e) => {
            error!("Data agent request failed: {e}");
            return Ok(Json(AgentAskResponse {
                query: payload.question,
                sql_query: None,
                dataframe_content: None,
                vega_lite_spec: None,
                answer: format!("Sorry, an error occurred while processing your request: {e}"),
                conversation_id,
            }));
        }
    };

    let mut new_messages = vec![AgentMessage::user(&payload.question)];
    new_messages.extend(reply.replies.iter().cloned());
    state
        .conversations
        .append(&conversation_id, new_messages)
        .await;

    let answer = if payload.enable_secondary_reasoning {
        match &state.client {
            Some(client) => {
                client
                    .refine(
                        &payload.question,
                        reply.generated_sql.as_deref(),
                        reply.table.as_ref(),
                        &reply.answer,
                    )
                    .await
            }
            None => format!(
                "{} (Note: secondary reasoning step skipped as its service is unavailable.)",
                reply.answer
            ),
        }
    } else {
        reply.answer.clone()
    };

    Ok(Json(AgentAskResponse {
        query: payload.question,
        sql_query: reply.generated_sql,
        dataframe_content: reply.table.map(TableContent::from),
        vega_lite_spec: reply.vega_lite_spec,
        answer,
        conversation_id,
    }))
}
