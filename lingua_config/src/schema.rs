use lingua_core::agent::{DEFAULT_MAX_ENTRIES, DEFAULT_MAX_TEXT_CHARS, shaping};
use lingua_core::eval::DEFAULT_JUDGE_MODEL;
use lingua_core::{AgentSettings, Command, Language, Model, TranslateInput};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const API_KEY_ENV: &str = "OPENAI_API_KEY";
const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub translate: TranslateDefaults,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub evals: EvalsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "ProviderConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ProviderConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pauses between retries of a failed completion call
    #[serde(default = "ProviderConfig::default_retry_delays_ms")]
    pub retry_delays_ms: Vec<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
            retry_delays_ms: Self::default_retry_delays_ms(),
        }
    }
}

impl ProviderConfig {
    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        60
    }

    fn default_retry_delays_ms() -> Vec<u64> {
        vec![1000, 2000, 4000]
    }

    #[must_use]
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }
}

/// Values used when a request leaves a field out.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct TranslateDefaults {
    #[serde(default)]
    pub to_language: Language,
    #[serde(default)]
    pub model: Model,
    #[serde(default = "TranslateDefaults::default_max_text_chars")]
    pub max_text_chars: usize,
}

impl Default for TranslateDefaults {
    fn default() -> Self {
        Self {
            to_language: Language::default(),
            model: Model::default(),
            max_text_chars: Self::default_max_text_chars(),
        }
    }
}

impl TranslateDefaults {
    const fn default_max_text_chars() -> usize {
        DEFAULT_MAX_TEXT_CHARS
    }

    /// Fill in whatever the caller left out.
    #[must_use]
    pub fn resolve(
        &self,
        command: Option<Command>,
        text: Option<String>,
        to_language: Option<Language>,
        model: Option<Model>,
    ) -> TranslateInput {
        TranslateInput {
            command: command.unwrap_or_default(),
            text: text.unwrap_or_default(),
            to_language: to_language.unwrap_or(self.to_language),
            model: model.unwrap_or(self.model),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "HistoryConfig::default_display_limit")]
    pub display_limit: usize,
    /// Idle hours before a conversation's history expires; 0 keeps it forever
    #[serde(default = "HistoryConfig::default_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: Self::default_max_entries(),
            display_limit: Self::default_display_limit(),
            ttl_hours: Self::default_ttl_hours(),
        }
    }
}

impl HistoryConfig {
    const fn default_max_entries() -> usize {
        DEFAULT_MAX_ENTRIES.get()
    }

    const fn default_display_limit() -> usize {
        shaping::DEFAULT_DISPLAY_LIMIT
    }

    const fn default_ttl_hours() -> u64 {
        24
    }

    #[must_use]
    pub const fn ttl(&self) -> Option<Duration> {
        match self.ttl_hours {
            0 => None,
            hours => Some(Duration::from_secs(hours.saturating_mul(3600))),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local, lost on restart
    Memory,
    /// sea-orm database at `storage.url`
    #[default]
    Sql,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "StorageConfig::default_url")]
    pub url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            url: Self::default_url(),
        }
    }
}

impl StorageConfig {
    fn default_url() -> String {
        Config::config_dir().map_or_else(
            |_| "sqlite://lingua-history.db?mode=rwc".to_string(),
            |dir| format!("sqlite://{}?mode=rwc", dir.join("history.db").display()),
        )
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
        }
    }
}

impl ServerConfig {
    fn default_bind() -> String {
        "127.0.0.1:3500".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EvalsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "EvalsConfig::default_judge_model")]
    pub judge_model: String,
}

impl Default for EvalsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            judge_model: Self::default_judge_model(),
        }
    }
}

impl EvalsConfig {
    fn default_judge_model() -> String {
        DEFAULT_JUDGE_MODEL.to_string()
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("lingua"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load `~/lingua/config.json`, falling back to defaults when it does not
    /// exist, then apply environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config at {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Override provider credentials from the environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.provider.api_key = key;
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.is_empty()) {
            self.provider.base_url = url;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.history.max_entries == 0 {
            anyhow::bail!("history.max_entries must be at least 1");
        }
        if self.history.display_limit == 0 {
            anyhow::bail!("history.display_limit must be at least 1");
        }
        Ok(())
    }

    pub fn agent_settings(&self) -> anyhow::Result<AgentSettings> {
        let max_entries = NonZeroUsize::new(self.history.max_entries)
            .ok_or_else(|| anyhow::anyhow!("history.max_entries must be at least 1"))?;

        Ok(AgentSettings {
            max_entries,
            display_limit: self.history.display_limit,
            max_text_chars: self.translate.max_text_chars,
        })
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let template = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(&config_path, template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Add your API key under provider.api_key (or export {API_KEY_ENV})");
        println!("   2. Run 'lingua translate \"Hello\"' to try it");
        println!("   3. Run 'lingua serve' to start the HTTP API");
        println!();
        println!("🔧 Configuration options:");
        println!("   - translate.to_language / translate.model: request defaults");
        println!("   - history.max_entries: translations kept per conversation");
        println!("   - history.ttl_hours: idle hours before a conversation expires");
        println!("   - storage.backend: \"sql\" (default) or \"memory\"");
        println!("   - evals.enabled: run quality checks after each translation");
        println!();
        Ok(())
    }
}
