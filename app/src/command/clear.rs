use lingua_config::Config;
use lingua_core::HistoryStore;
use tracing::info;

use super::build_store;
use super::history::HistoryInput;

/// Drops every entry of a conversation.
#[derive(Debug, Clone, Copy)]
pub struct ClearStrategy;

impl super::CommandStrategy for ClearStrategy {
    type Input = HistoryInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let store = build_store(&config).await?;

        store.clear(&input.thread).await?;
        info!("Cleared conversation {}", input.thread);
        println!("Cleared history of {}", input.thread);
        Ok(())
    }
}
