//! LLM-as-judge quality checks run after a translation.
//!
//! Evals never influence the response a caller receives: the agent spawns
//! them once the request is answered and only logs their outcome.

mod conciseness;
mod language_match;

use async_trait::async_trait;
use serde::Serialize;

use crate::{ChatMessage, ChatRequest, LLMProvider, Language};

pub use conciseness::ConcisenessEval;
pub use language_match::LanguageMatchEval;

/// Model used by the judges unless configured otherwise.
pub const DEFAULT_JUDGE_MODEL: &str = "gpt-4o-mini";

/// The part of a request an eval looks at.
#[derive(Debug, Clone)]
pub struct EvalInput {
    pub text: String,
    pub to_language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EvalOutcome {
    /// Pass/fail check
    Binary {
        passed: bool,
        metadata: serde_json::Value,
    },
    /// Graded check in `0.0..=1.0`
    Score {
        score: f64,
        metadata: serde_json::Value,
    },
}

#[async_trait]
pub trait Eval: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(&self, input: &EvalInput, translation: &str)
    -> anyhow::Result<EvalOutcome>;
}

/// Ask `provider` for a JSON verdict on `prompt`.
async fn judge(
    provider: &dyn LLMProvider,
    model: &str,
    prompt: String,
) -> anyhow::Result<serde_json::Value> {
    let request = ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system("You are a strict evaluator. Respond only with a JSON object."),
            ChatMessage::user(prompt),
        ],
        json_output: true,
    };

    let response = provider.chat(&request).await?;
    let verdict: serde_json::Value = serde_json::from_str(response.content.trim())
        .map_err(|e| anyhow::anyhow!("judge returned invalid JSON: {e}"))?;

    if !verdict.is_object() {
        anyhow::bail!("judge verdict is not a JSON object");
    }
    Ok(verdict)
}
