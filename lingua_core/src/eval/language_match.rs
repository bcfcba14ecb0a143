use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{DEFAULT_JUDGE_MODEL, Eval, EvalInput, EvalOutcome, judge};
use crate::LLMProvider;

/// Pass when the translation is written in the requested language.
pub struct LanguageMatchEval {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl LanguageMatchEval {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            model: DEFAULT_JUDGE_MODEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

#[async_trait]
impl Eval for LanguageMatchEval {
    fn name(&self) -> &'static str {
        "language-match"
    }

    async fn evaluate(
        &self,
        input: &EvalInput,
        translation: &str,
    ) -> anyhow::Result<EvalOutcome> {
        if translation.trim().is_empty() {
            return Ok(EvalOutcome::Binary {
                passed: false,
                metadata: json!({ "reason": "No translation produced" }),
            });
        }

        let target = input.to_language;
        let prompt = format!(
            "Determine if the following text is written in {target}.\n\n\
             Text to analyze:\n\"{translation}\"\n\n\
             Is this text written in {target}? Respond in JSON: \
             {{ \"isCorrectLanguage\": boolean, \"detectedLanguage\": string, \"reason\": string }}"
        );

        let verdict = judge(self.provider.as_ref(), &self.model, prompt).await?;

        let passed = verdict["isCorrectLanguage"]
            .as_bool()
            .ok_or_else(|| anyhow::anyhow!("verdict is missing isCorrectLanguage"))?;

        Ok(EvalOutcome::Binary {
            passed,
            metadata: json!({
                "reason": verdict["reason"].as_str().unwrap_or_default(),
                "targetLanguage": target.as_str(),
                "detectedLanguage": verdict["detectedLanguage"].as_str().unwrap_or_default(),
            }),
        })
    }
}
