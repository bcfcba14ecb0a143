use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{DEFAULT_JUDGE_MODEL, Eval, EvalInput, EvalOutcome, judge};
use crate::LLMProvider;

/// Score how free the translation is of preamble and filler.
pub struct ConcisenessEval {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl ConcisenessEval {
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
impl Eval for ConcisenessEval {
    fn name(&self) -> &'static str {
        "conciseness"
    }

    async fn evaluate(
        &self,
        input: &EvalInput,
        translation: &str,
    ) -> anyhow::Result<EvalOutcome> {
        let prompt = format!(
            "Request: Translate the following text to {}: \"{}\"\n\n\
             Response: \"{translation}\"\n\n\
             Rate from 0 to 1 how concise the response is. A score of 1 means it contains \
             only the translation, without preamble, commentary or filler. Respond in JSON: \
             {{ \"score\": number, \"reason\": string }}",
            input.to_language, input.text
        );

        let verdict = judge(self.provider.as_ref(), &self.model, prompt).await?;

        let score = verdict["score"]
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("verdict is missing score"))?
            .clamp(0.0, 1.0);

        Ok(EvalOutcome::Score {
            score,
            metadata: json!({ "reason": verdict["reason"].as_str().unwrap_or_default() }),
        })
    }
}
