//! # Prompt Documents
//!
//! Static prompt templates and the schema/guidelines documents injected as
//! model context. Templates use `{placeholder}` markers filled by the client.

pub mod schema;
pub mod tasks;
