use crate::{errors::PromptError, providers::db::storage::Storage, Row};
use async_trait::async_trait;
use chrono::DateTime;
use gcp_bigquery_client::{
    model::{field_type::FieldType, query_request::QueryRequest, query_response::ResultSet},
    Client,
};
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt::{self, Debug},
};
use tracing::info;

/// Query timeout passed to the jobs API, in milliseconds.
const QUERY_TIMEOUT_MS: i32 = 120_000;

/// A provider for interacting with Google BigQuery.
#[derive(Clone)]
pub struct BigQueryProvider {
    client: Client,
    project_id: String,
}

impl BigQueryProvider {
    /// Creates a new `BigQueryProvider` from application default credentials.
    pub async fn new(project_id: String) -> Result<Self, PromptError> {
        let client = Client::from_application_default_credentials()
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;
        Ok(Self { client, project_id })
    }
}

impl Debug for BigQueryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigQueryProvider")
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Storage for BigQueryProvider {
    fn name(&self) -> &str {
        "BigQuery"
    }

    /// Executes a SQL query on BigQuery and returns coerced JSON rows.
    async fn execute_query(&self, sql: &str) -> Result<Vec<Row>, PromptError> {
        info!("--> Executing BigQuery SQL: {sql}");
        let response = self
            .client
            .job()
            .query(
                &self.project_id,
                QueryRequest {
                    query: sql.to_string(),
                    timeout_ms: Some(QUERY_TIMEOUT_MS),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?;

        // Field types come from the result schema and drive row coercion.
        let field_types: HashMap<String, FieldType> = response
            .schema
            .as_ref()
            .and_then(|schema| schema.fields.as_ref())
            .map(|fields| {
                fields
                    .iter()
                    .map(|f| (f.name.clone(), f.r#type.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let mut results = ResultSet::new_from_query_response(response);
        let column_names = results.column_names();
        let mut rows: Vec<Row> = Vec::new();

        while results.next_row() {
            let mut row_map = Row::new();
            for name in &column_names {
                let value = results
                    .get_json_value_by_name(name)
                    .ok()
                    .flatten()
                    .unwrap_or(Value::Null);
                row_map.insert(name.clone(), coerce_value(field_types.get(name), value));
            }
            rows.push(row_map);
        }

        info!("<-- Retrieved {} records.", rows.len());
        Ok(rows)
    }
}

/// Normalizes a raw result cell into a JSON value suitable for API responses.
///
/// Temporal values become ISO-8601 strings (TIMESTAMP arrives as epoch
/// seconds), numerics become JSON numbers when they parse cleanly and stay
/// strings otherwise, and everything else passes through unchanged.
fn coerce_value(field_type: Option<&FieldType>, value: Value) -> Value {
    if value.is_null() {
        return value;
    }
    match field_type {
        Some(FieldType::Timestamp) => match epoch_seconds(&value) {
            Some(secs) => timestamp_to_rfc3339(secs).map(Value::String).unwrap_or(value),
            None => value,
        },
        // DATE, DATETIME, and TIME already arrive as ISO-8601 strings.
        Some(FieldType::Date | FieldType::Datetime | FieldType::Time) => value,
        Some(
            FieldType::Integer
            | FieldType::Int64
            | FieldType::Float
            | FieldType::Float64
            | FieldType::Numeric
            | FieldType::Bignumeric,
        ) => match &value {
            Value::String(s) => {
                if let Ok(i) = s.parse::<i64>() {
                    Value::Number(i.into())
                } else if let Some(n) = s.parse::<f64>().ok().and_then(serde_json::Number::from_f64)
                {
                    Value::Number(n)
                } else {
                    value
                }
            }
            _ => value,
        },
        Some(FieldType::Boolean | FieldType::Bool) => match &value {
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => value,
            },
            _ => value,
        },
        _ => value,
    }
}

fn epoch_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn timestamp_to_rfc3339(epoch_seconds: f64) -> Option<String> {
    let secs = epoch_seconds.trunc() as i64;
    let nanos = (epoch_seconds.fract().abs() * 1_000_000_000.0).round() as u32;
    DateTime::from_timestamp(secs, nanos).map(|dt| dt.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dates_pass_through_unchanged() {
        let value = coerce_value(Some(&FieldType::Date), json!("2025-06-01"));
        assert_eq!(value, json!("2025-06-01"));
    }

    #[test]
    fn numeric_strings_become_numbers() {
        assert_eq!(
            coerce_value(Some(&FieldType::Numeric), json!("12.50")),
            json!(12.5)
        );
        assert_eq!(
            coerce_value(Some(&FieldType::Int64), json!("42")),
            json!(42)
        );
    }

    #[test]
    fn unparseable_numerics_stay_strings() {
        assert_eq!(
            coerce_value(Some(&FieldType::Numeric), json!("not-a-number")),
            json!("not-a-number")
        );
    }

    #[test]
    fn timestamps_become_rfc3339() {
        let value = coerce_value(Some(&FieldType::Timestamp), json!("1717200000"));
        assert_eq!(value, json!("2024-06-01T00:00:00+00:00"));
    }

    #[test]
    fn booleans_and_nulls() {
        assert_eq!(
            coerce_value(Some(&FieldType::Bool), json!("true")),
            json!(true)
        );
        assert_eq!(coerce_value(Some(&FieldType::Timestamp), Value::Null), Value::Null);
    }

    #[test]
    fn unknown_field_types_pass_through() {
        assert_eq!(coerce_value(None, json!("anything")), json!("anything"));
        assert_eq!(
            coerce_value(Some(&FieldType::String), json!("US")),
            json!("US")
        );
    }
}
