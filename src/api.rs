//! HTTP API for the storyteller backend

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::llm::LlmService;
use crate::session::SessionStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn LlmService>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmService>, sessions: Arc<SessionStore>) -> Self {
        Self { llm, sessions }
    }
}
