use std::sync::Arc;

use crate::llm_client::{CompletionService, CompletionSettings};
use crate::matching::vocabulary::MatchVocabulary;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion service used by ranking and estimation. `LlmClient` in production.
    pub completion: Arc<dyn CompletionService>,
    pub settings: CompletionSettings,
    /// Stop words and patterns used by the ATS engine, built once at startup.
    pub vocabulary: Arc<MatchVocabulary>,
}
