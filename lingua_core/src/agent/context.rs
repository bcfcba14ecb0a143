use tracing::{Span, info_span};
use uuid::Uuid;

/// Per-request identity passed explicitly to everything that logs or touches
/// conversation state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Conversation id, stable across requests
    pub thread_id: String,
    /// Interaction id, unique per request
    pub session_id: Uuid,
    span: Span,
}

impl RequestContext {
    #[must_use]
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self::with_session_id(thread_id, Uuid::now_v7())
    }

    #[must_use]
    pub fn with_session_id(thread_id: impl Into<String>, session_id: Uuid) -> Self {
        let thread_id = thread_id.into();
        let span = info_span!("request", thread_id = %thread_id, session_id = %session_id);
        Self {
            thread_id,
            session_id,
            span,
        }
    }

    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }
}
