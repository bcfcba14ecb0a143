use lingua_config::TranslateDefaults;
use lingua_core::TranslateAgent;

/// Shared state handed to every handler.
pub struct ApiState {
    pub agent: TranslateAgent,
    /// Fills in fields a request leaves out
    pub defaults: TranslateDefaults,
}

impl ApiState {
    #[must_use]
    pub const fn new(agent: TranslateAgent, defaults: TranslateDefaults) -> Self {
        Self { agent, defaults }
    }
}
