//! # Question-Answering Servers
//!
//! Two HTTP services over the same library: the direct pipeline server
//! (generate SQL, validate, execute, summarize) and the data-agent server
//! (managed question service with conversation history and an optional
//! secondary reasoning step). Each has its own binary; they share state
//! construction, payload types, and handlers.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

pub use router::{agent_router, direct_router};
pub use state::{build_app_state, AppState};
