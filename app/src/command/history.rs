use lingua_api::contract::v1::HistoryResponse;
use lingua_config::Config;
use lingua_core::HistoryStore;

use super::build_store;

#[derive(Debug, Clone)]
pub struct HistoryInput {
    pub thread: String,
}

/// Prints a conversation's history as JSON.
#[derive(Debug, Clone, Copy)]
pub struct HistoryStrategy;

impl super::CommandStrategy for HistoryStrategy {
    type Input = HistoryInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let store = build_store(&config).await?;

        let history = store.get(&input.thread).await?;
        let response = HistoryResponse {
            thread_id: input.thread,
            translation_count: history.translation_count,
            history: history.entries,
        };

        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }
}
