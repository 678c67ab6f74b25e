//! End-to-end tests for the direct pipeline server, with the AI provider
//! served by httpmock and the warehouse replaced by an in-memory stub.

mod common;

use common::{answer_client, app_state, chat_completion, row, spawn_app, MemoryStorage};
use httpmock::prelude::*;
use ledgerqa_server::direct_router;
use serde_json::{json, Value};

const AI_PATH: &str = "/v1/chat/completions";

#[tokio::test]
async fn ask_returns_data_and_summary() {
    let ai = MockServer::start_async().await;
    let generation = ai
        .mock_async(|when, then| {
            when.method(POST).path(AI_PATH).body_contains("SQL Query:");
            then.status(200).json_body(chat_completion(
                "```sql\nSELECT SUM(product_sales) AS total FROM `test-project.analytics.master_ledger_US`\n```",
            ));
        })
        .await;
    let summary = ai
        .mock_async(|when, then| {
            when.method(POST)
                .path(AI_PATH)
                .body_contains("Business Summary:");
            then.status(200)
                .json_body(chat_completion("Total product sales were $1,000."));
        })
        .await;

    let storage = MemoryStorage {
        rows: vec![row(json!({"total": 1000.0}))],
    };
    let client = answer_client(ai.url(AI_PATH), Some(storage));
    let address = spawn_app(direct_router(app_state(Some(client), true, None))).await;

    let response = reqwest::Client::new()
        .post(format!("{address}/ask"))
        .json(&json!({"question": "What were total sales?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["query"], "What were total sales?");
    assert_eq!(
        body["sql_query"],
        "SELECT SUM(product_sales) AS total FROM `test-project.analytics.master_ledger_US`"
    );
    assert_eq!(body["dataframe_content"]["data"], json!([{"total": 1000.0}]));
    assert_eq!(body["dataframe_content"]["columns"], json!(["total"]));
    assert_eq!(body["answer"], "Total product sales were $1,000.");
    generation.assert_async().await;
    summary.assert_async().await;
}

#[tokio::test]
async fn ask_rejects_unsafe_sql_without_executing() {
    let ai = MockServer::start_async().await;
    let generation = ai
        .mock_async(|when, then| {
            when.method(POST).path(AI_PATH).body_contains("SQL Query:");
            then.status(200)
                .json_body(chat_completion("SELECT 1; DROP TABLE master_ledger_US"));
        })
        .await;
    let summary = ai
        .mock_async(|when, then| {
            when.method(POST)
                .path(AI_PATH)
                .body_contains("Business Summary:");
            then.status(200).json_body(chat_completion("unused"));
        })
        .await;

    let storage = MemoryStorage {
        rows: vec![row(json!({"total": 1.0}))],
    };
    let client = answer_client(ai.url(AI_PATH), Some(storage));
    let address = spawn_app(direct_router(app_state(Some(client), true, None))).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{address}/ask"))
        .json(&json!({"question": "drop it"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        body["answer"],
        "Generated SQL contains a disallowed keyword: DROP. Only SELECT queries are permitted."
    );
    assert_eq!(body["sql_query"], "SELECT 1; DROP TABLE master_ledger_US");
    assert!(body["dataframe_content"].is_null());
    generation.assert_async().await;
    assert_eq!(summary.hits_async().await, 0);
}

#[tokio::test]
async fn ask_reports_empty_generation_output() {
    let ai = MockServer::start_async().await;
    ai.mock_async(|when, then| {
        when.method(POST).path(AI_PATH).body_contains("SQL Query:");
        then.status(200).json_body(chat_completion("   "));
    })
    .await;

    let storage = MemoryStorage { rows: vec![] };
    let client = answer_client(ai.url(AI_PATH), Some(storage));
    let address = spawn_app(direct_router(app_state(Some(client), true, None))).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{address}/ask"))
        .json(&json!({"question": "anything"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["answer"], "LLM returned an empty SQL query.");
    assert!(body["dataframe_content"].is_null());
}

#[tokio::test]
async fn summary_failure_degrades_but_keeps_data() {
    let ai = MockServer::start_async().await;
    ai.mock_async(|when, then| {
        when.method(POST).path(AI_PATH).body_contains("SQL Query:");
        then.status(200)
            .json_body(chat_completion("SELECT clicks FROM t"));
    })
    .await;
    ai.mock_async(|when, then| {
        when.method(POST)
            .path(AI_PATH)
            .body_contains("Business Summary:");
        then.status(500).body("model overloaded");
    })
    .await;

    let storage = MemoryStorage {
        rows: vec![row(json!({"clicks": 42}))],
    };
    let client = answer_client(ai.url(AI_PATH), Some(storage));
    let address = spawn_app(direct_router(app_state(Some(client), true, None))).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{address}/ask"))
        .json(&json!({"question": "clicks?"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let answer = body["answer"].as_str().unwrap();
    assert!(answer.starts_with("Successfully retrieved 1 records."));
    assert!(answer.contains("model overloaded"));
    assert_eq!(body["dataframe_content"]["data"], json!([{"clicks": 42}]));
}

#[tokio::test]
async fn ask_is_unavailable_without_initialized_dependencies() {
    // No AI client at all.
    let address = spawn_app(direct_router(app_state(None, true, None))).await;
    let response = reqwest::Client::new()
        .post(format!("{address}/ask"))
        .json(&json!({"question": "q"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "AI provider failed to initialize on startup.");

    // AI up, warehouse down.
    let ai = MockServer::start_async().await;
    let client = answer_client(ai.url(AI_PATH), None);
    let address = spawn_app(direct_router(app_state(Some(client), false, None))).await;
    let response = reqwest::Client::new()
        .post(format!("{address}/ask"))
        .json(&json!({"question": "q"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "BigQuery client failed to initialize on startup."
    );
}

#[tokio::test]
async fn health_probes_the_warehouse() {
    let ai = MockServer::start_async().await;
    let storage = MemoryStorage {
        rows: vec![row(json!({"f0_": 1}))],
    };
    let client = answer_client(ai.url(AI_PATH), Some(storage));
    let address = spawn_app(direct_router(app_state(Some(client), true, None))).await;

    let body: Value = reqwest::Client::new()
        .get(format!("{address}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["services"]["bigquery_client"], "ok");
    assert_eq!(body["services"]["ai_provider"], "ok");
    assert_eq!(body["services"]["bigquery_connectivity"], "ok");
}

#[tokio::test]
async fn health_reports_degraded_dependencies() {
    let address = spawn_app(direct_router(app_state(None, false, None))).await;

    let body: Value = reqwest::Client::new()
        .get(format!("{address}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "error");
    assert_eq!(body["services"]["bigquery_client"], "unavailable");
    assert_eq!(body["services"]["ai_provider"], "unavailable");
    assert_eq!(
        body["services"]["bigquery_connectivity"],
        "not_tested (client unavailable)"
    );
}
