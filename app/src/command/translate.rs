use lingua_config::Config;
use lingua_core::{Language, Model, RequestContext};
use tracing::warn;
use uuid::Uuid;

use super::{build_agent, build_provider, build_store};

#[derive(Debug, Clone)]
pub struct TranslateCliInput {
    pub text: String,
    pub language: Option<Language>,
    pub model: Option<Model>,
    /// Conversation to append to; a new one is started when absent
    pub thread: Option<String>,
}

/// Translates one text and records it in the conversation's history.
#[derive(Debug, Clone, Copy)]
pub struct TranslateStrategy;

impl super::CommandStrategy for TranslateStrategy {
    type Input = TranslateCliInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        let provider = build_provider(&config)?;
        let store = build_store(&config).await?;
        let agent = build_agent(&config, provider, store)?;

        let thread_id = input.thread.unwrap_or_else(|| Uuid::new_v4().to_string());
        let ctx = RequestContext::new(thread_id);
        let request =
            config
                .translate
                .resolve(None, Some(input.text), input.language, input.model);

        let output = agent.handle(&ctx, request).await?;

        if let Some(error) = &output.history_error {
            warn!("Translation not saved to history: {error}");
        }

        println!("{}", output.translation);
        eprintln!(
            "thread {} · {} tokens · {} ms · {} in history",
            output.thread_id,
            output.tokens,
            output.latency_ms,
            output.history.len()
        );

        agent.drain_evals().await;
        Ok(())
    }
}
