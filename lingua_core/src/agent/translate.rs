//! The translate agent: validates a request, calls the completion provider,
//! and records the result in conversation history.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, warn};

use crate::agent::{AgentSettings, Command, RequestContext, TranslateInput, TranslateOutput, shaping};
use crate::error::{Result, TranslateError};
use crate::eval::{Eval, EvalInput};
use crate::{ChatRequest, ConversationHistory, HistoryStore, LLMProvider};

pub struct TranslateAgent<P = Arc<dyn LLMProvider>, S = Arc<dyn HistoryStore>>
where
    P: Send + Sync,
    S: Send + Sync,
{
    provider: P,
    store: S,
    settings: AgentSettings,
    evals: Vec<Arc<dyn Eval>>,
    /// Eval runs started by past requests and not yet reaped
    running_evals: Mutex<JoinSet<()>>,
}

impl<P, S> TranslateAgent<P, S>
where
    P: LLMProvider + Send + Sync,
    S: HistoryStore + Send + Sync,
{
    pub fn new(provider: P, store: S, settings: AgentSettings) -> Self {
        Self {
            provider,
            store,
            settings,
            evals: Vec::new(),
            running_evals: Mutex::new(JoinSet::new()),
        }
    }

    /// Quality checks to run in the background after each translation.
    #[must_use]
    pub fn with_evals(mut self, evals: Vec<Arc<dyn Eval>>) -> Self {
        self.evals = evals;
        self
    }

    /// Wait for every eval started so far to finish.
    ///
    /// Call before the runtime shuts down; evals still pending at that point
    /// are cancelled without reporting.
    pub async fn drain_evals(&self) {
        let mut running = std::mem::take(
            &mut *self
                .running_evals
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if running.is_empty() {
            return;
        }

        info!("Waiting for {} running evals", running.len());
        while let Some(result) = running.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "[EVAL] task aborted");
            }
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub async fn handle(&self, ctx: &RequestContext, input: TranslateInput) -> Result<TranslateOutput> {
        async move {
            match input.command {
                Command::Clear => self.clear(ctx).await,
                Command::Translate if input.text.trim().is_empty() => self.current(ctx).await,
                Command::Translate => self.translate(ctx, input).await,
            }
        }
        .instrument(ctx.span().clone())
        .await
    }

    /// History of the request's conversation.
    pub async fn history(&self, ctx: &RequestContext) -> Result<ConversationHistory> {
        Ok(self.store.get(&ctx.thread_id).await?)
    }

    async fn clear(&self, ctx: &RequestContext) -> Result<TranslateOutput> {
        self.store.clear(&ctx.thread_id).await?;
        info!("History cleared");
        Ok(Self::output(ctx, String::new(), 0, 0, ConversationHistory::default(), None))
    }

    async fn current(&self, ctx: &RequestContext) -> Result<TranslateOutput> {
        debug!("Empty text, returning current state");
        let history = self.store.get(&ctx.thread_id).await?;
        Ok(Self::output(ctx, String::new(), 0, 0, history, None))
    }

    fn validate(&self, input: &TranslateInput) -> Result<()> {
        let chars = input.text.chars().count();
        if chars > self.settings.max_text_chars {
            return Err(TranslateError::Validation(format!(
                "text is {chars} characters, limit is {}",
                self.settings.max_text_chars
            )));
        }
        Ok(())
    }

    async fn translate(&self, ctx: &RequestContext, input: TranslateInput) -> Result<TranslateOutput> {
        self.validate(&input)?;

        info!(
            to_language = %input.to_language,
            model = %input.model,
            text_length = input.text.chars().count(),
            "Translation requested"
        );

        let request = ChatRequest {
            model: input.model.as_str().to_string(),
            messages: shaping::build_messages(&input.text, input.to_language),
            json_output: true,
        };

        let started = Instant::now();
        let response = self
            .provider
            .chat(&request)
            .await
            .map_err(TranslateError::Provider)?;
        let latency = started.elapsed();

        let translation = shaping::parse_translation(&response.content)?;
        let tokens = shaping::total_tokens(response.usage.as_ref());
        let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);

        info!(tokens, latency_ms, "Translation completed");

        let stored = if translation.is_empty() {
            debug!("Provider returned no translation, history unchanged");
            self.store.get(&ctx.thread_id).await
        } else {
            let entry = shaping::build_entry(
                ctx,
                &input,
                &translation,
                tokens,
                latency,
                self.settings.display_limit,
            );
            self.store
                .append(&ctx.thread_id, entry, self.settings.max_entries)
                .await
        };

        let (history, history_error) = match stored {
            Ok(history) => (history, None),
            Err(e) => {
                warn!(error = %e, "Translation succeeded but history was not updated");
                let unchanged = self.store.get(&ctx.thread_id).await.unwrap_or_default();
                (unchanged, Some(e.to_string()))
            }
        };

        if !translation.is_empty() {
            self.spawn_evals(ctx, &input, &translation);
        }

        Ok(Self::output(
            ctx,
            translation,
            tokens,
            latency_ms,
            history,
            history_error,
        ))
    }

    fn spawn_evals(&self, ctx: &RequestContext, input: &TranslateInput, translation: &str) {
        if self.evals.is_empty() {
            return;
        }

        let eval_input = EvalInput {
            text: input.text.clone(),
            to_language: input.to_language,
        };

        let mut running = self
            .running_evals
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while running.try_join_next().is_some() {}

        for eval in &self.evals {
            let eval = Arc::clone(eval);
            let eval_input = eval_input.clone();
            let translation = translation.to_string();
            running.spawn(
                async move {
                    match eval.evaluate(&eval_input, &translation).await {
                        Ok(outcome) => info!(eval = eval.name(), ?outcome, "[EVAL] completed"),
                        Err(e) => warn!(eval = eval.name(), error = %e, "[EVAL] failed"),
                    }
                }
                .instrument(ctx.span().clone()),
            );
        }
    }

    fn output(
        ctx: &RequestContext,
        translation: String,
        tokens: u32,
        latency_ms: u64,
        history: ConversationHistory,
        history_error: Option<String>,
    ) -> TranslateOutput {
        TranslateOutput {
            translation,
            thread_id: ctx.thread_id.clone(),
            session_id: ctx.session_id,
            translation_count: history.translation_count,
            tokens,
            latency_ms,
            history: history.entries,
            history_error,
        }
    }
}
