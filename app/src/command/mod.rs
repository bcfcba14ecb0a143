//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is its own strategy type with its own input, dispatched
//! statically from `main`. The builders below turn a loaded [`Config`] into
//! the provider, store and agent the commands share.

use lingua_config::{Config, StorageBackend};
use lingua_core::{ConcisenessEval, Eval, HistoryStore, LLMProvider, LanguageMatchEval, TranslateAgent};
use lingua_history::{MemoryHistoryStore, SqlHistoryStore};
use lingua_providers::OpenAiProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod clear;
mod history;
mod init;
mod serve;
mod translate;
mod version;

pub use clear::ClearStrategy;
pub use history::{HistoryInput, HistoryStrategy};
pub use init::InitStrategy;
pub use serve::{ServeInput, ServeStrategy};
pub use translate::{TranslateCliInput, TranslateStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type, so parameters are passed
/// without runtime casting or boxing.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn LLMProvider>> {
    if config.provider.api_key.is_empty() {
        anyhow::bail!(
            "No API key configured. Set provider.api_key in {} or export OPENAI_API_KEY",
            Config::config_path()?.display()
        );
    }

    let provider = OpenAiProvider::new(config.provider.api_key.clone())
        .with_base_url(config.provider.base_url.clone())
        .with_default_model(config.translate.model.as_str().to_string())
        .with_retry_delays(config.provider.retry_delays())
        .with_timeout(Duration::from_secs(config.provider.timeout_secs))?;

    Ok(Arc::new(provider))
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn HistoryStore>> {
    let ttl = config.history.ttl();
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory history store");
            Ok(Arc::new(MemoryHistoryStore::new().with_ttl(ttl)))
        }
        StorageBackend::Sql => {
            if config.storage.url.starts_with("sqlite:") {
                Config::ensure_config_dir()?;
            }
            let store = SqlHistoryStore::connect(&config.storage.url).await?;
            Ok(Arc::new(store.with_ttl(ttl)))
        }
    }
}

fn build_evals(config: &Config, provider: &Arc<dyn LLMProvider>) -> Vec<Arc<dyn Eval>> {
    if !config.evals.enabled {
        return Vec::new();
    }

    info!("Evals enabled, judge model: {}", config.evals.judge_model);
    let judge_model = &config.evals.judge_model;
    let language_match: Arc<dyn Eval> =
        Arc::new(LanguageMatchEval::new(Arc::clone(provider)).with_model(judge_model.clone()));
    let conciseness: Arc<dyn Eval> =
        Arc::new(ConcisenessEval::new(Arc::clone(provider)).with_model(judge_model.clone()));
    vec![language_match, conciseness]
}

/// Agent wired from `config`, sharing `store` with the caller.
fn build_agent(
    config: &Config,
    provider: Arc<dyn LLMProvider>,
    store: Arc<dyn HistoryStore>,
) -> anyhow::Result<TranslateAgent> {
    let settings = config.agent_settings()?;
    let evals = build_evals(config, &provider);
    if config.storage.backend == StorageBackend::Memory {
        warn!("History is process-local and will be lost on exit");
    }
    Ok(TranslateAgent::new(provider, store, settings).with_evals(evals))
}
