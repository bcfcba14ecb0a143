//! Translate agent and the request/response shapes it works with.

mod context;
pub mod shaping;
mod translate;

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use uuid::Uuid;

use crate::{HistoryEntry, Language, Model};

pub use context::RequestContext;
pub use translate::TranslateAgent;

/// Default retention bound for a conversation.
pub const DEFAULT_MAX_ENTRIES: NonZeroUsize = NonZeroUsize::MIN.saturating_add(4);

/// Default upper bound on input text, in characters.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 5000;

/// Limits the agent applies to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    /// Entries retained per conversation
    pub max_entries: NonZeroUsize,
    /// Characters of text kept in a history entry before the ellipsis
    pub display_limit: usize,
    /// Longest accepted input text, in characters
    pub max_text_chars: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            display_limit: shaping::DEFAULT_DISPLAY_LIMIT,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    #[default]
    Translate,
    Clear,
}

/// Fully resolved input of one request. Defaults are applied before this
/// value is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateInput {
    pub command: Command,
    pub text: String,
    pub to_language: Language,
    pub model: Model,
}

impl TranslateInput {
    #[must_use]
    pub fn translate(text: impl Into<String>, to_language: Language, model: Model) -> Self {
        Self {
            command: Command::Translate,
            text: text.into(),
            to_language,
            model,
        }
    }

    #[must_use]
    pub fn clear() -> Self {
        Self {
            command: Command::Clear,
            text: String::new(),
            to_language: Language::default(),
            model: Model::default(),
        }
    }
}

/// Result of one request as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateOutput {
    pub translation: String,
    pub thread_id: String,
    pub session_id: Uuid,
    pub translation_count: u64,
    pub tokens: u32,
    pub latency_ms: u64,
    pub history: Vec<HistoryEntry>,
    /// Set when the translation succeeded but its history write failed.
    /// `history` and `translation_count` then show the conversation as it was
    /// before this request, or are blank if it could not be read either.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_error: Option<String>,
}
