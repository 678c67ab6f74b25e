pub mod gemini;
pub mod local;

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with an AI provider.
///
/// This trait defines a common interface for generating text from a system and
/// user prompt pair using different Large Language Models (e.g., Gemini, local
/// models). The sampling temperature is supplied per call because the pipeline
/// uses different temperatures for query generation and summarization.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);
