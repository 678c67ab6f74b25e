use thiserror::Error;

/// Custom error types for the application.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Request to AI provider failed: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("Request to the data agent service failed: {0}")]
    AgentRequest(reqwest::Error),
    #[error("Failed to deserialize the data agent response: {0}")]
    AgentDeserialization(reqwest::Error),
    #[error("Data agent service returned an error: {0}")]
    AgentApi(String),
    #[error("Storage provider connection error: {0}")]
    StorageConnection(String),
    #[error("Storage query execution failed: {0}")]
    StorageQueryFailed(String),
    #[error("Failed to serialize result: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error("An AI provider is required to build the client")]
    MissingAiProvider,
    #[error("No storage provider is configured for query execution")]
    MissingStorageProvider,
}
