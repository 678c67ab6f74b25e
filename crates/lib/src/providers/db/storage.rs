use crate::{errors::PromptError, Row};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a storage backend.
///
/// Implementations return fully materialized rows so callers can sample,
/// count, and serialize them without re-parsing.
#[async_trait]
pub trait Storage: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "BigQuery").
    fn name(&self) -> &str;

    /// Executes a read-only SQL query against the storage provider.
    async fn execute_query(&self, sql: &str) -> Result<Vec<Row>, PromptError>;
}

dyn_clone::clone_trait_object!(Storage);
