//! Turning a request into a provider prompt and a provider answer into a
//! history entry.

use chrono::Utc;
use std::time::Duration;

use crate::agent::{RequestContext, TranslateInput};
use crate::error::{Result, TranslateError};
use crate::{ChatMessage, HistoryEntry, Language, Usage};

/// Characters of text kept in a history entry.
pub const DEFAULT_DISPLAY_LIMIT: usize = 50;

/// Appended to text cut at the display limit.
pub const ELLIPSIS: &str = "...";

/// Shorten `text` to `limit` characters plus [`ELLIPSIS`] when it is longer.
#[must_use]
pub fn truncate_for_display(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[must_use]
pub fn system_prompt(to_language: Language) -> String {
    format!(
        "You are a professional translator. Translate the given text to {to_language}. \
         Respond in JSON: {{ \"translation\": \"translated text\" }}"
    )
}

/// Prompt for the provider. The user message carries the full text.
#[must_use]
pub fn build_messages(text: &str, to_language: Language) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt(to_language)),
        ChatMessage::user(text),
    ]
}

/// Extract the translation from a JSON provider answer.
///
/// No content yields an empty translation. Content that is not a JSON object
/// is a provider error.
pub fn parse_translation(content: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(String::new());
    }

    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| {
        TranslateError::Provider(anyhow::anyhow!("translation is not valid JSON: {e}"))
    })?;

    if !value.is_object() {
        return Err(TranslateError::Provider(anyhow::anyhow!(
            "translation JSON is not an object"
        )));
    }

    Ok(value["translation"].as_str().unwrap_or_default().to_string())
}

/// Token metric recorded on an entry; zero when the provider reported none.
#[must_use]
pub fn total_tokens(usage: Option<&Usage>) -> u32 {
    usage.map_or(0, |u| u.total_tokens)
}

#[must_use]
pub fn build_entry(
    ctx: &RequestContext,
    input: &TranslateInput,
    translation: &str,
    tokens: u32,
    latency: Duration,
    display_limit: usize,
) -> HistoryEntry {
    HistoryEntry {
        text: truncate_for_display(&input.text, display_limit),
        to_language: input.to_language,
        translation: truncate_for_display(translation, display_limit),
        session_id: ctx.session_id,
        timestamp: Utc::now(),
        model: input.model.as_str().to_string(),
        tokens,
        latency_ms: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
    }
}
