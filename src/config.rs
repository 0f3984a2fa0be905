use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Startup configuration problems; the service refuses to start on these
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub completion: CompletionSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub conversation: ConversationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionBackendKind {
    /// Remote `{prompt}` -> `{response}` service
    #[default]
    Service,
    /// Chat-completion vendor API called directly
    Chat,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompletionSettings {
    #[serde(default)]
    pub backend: CompletionBackendKind,
    pub service_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatSettings {
    pub base_url: Option<String>,
    pub model_name: Option<String>,
    pub api_version: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    /// Remote record service speaking `/insert` and `/query`
    #[default]
    Http,
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackendKind,
    pub service_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationSettings {
    #[serde(default = "default_game")]
    pub game: String,
    #[serde(default)]
    pub retain_partial_on_failure: bool,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            game: default_game(),
            retain_partial_on_failure: false,
        }
    }
}

fn default_game() -> String { "csgo".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Upstream timeout when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with SQUAD__)
    /// 4. Deployment variables such as CHATGPT_SERVICE_URL and DBSERVICE_URL
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., SQUAD__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SQUAD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = substitute_env_vars(settings)?.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SQUAD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = substitute_env_vars(settings)?.try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Check that the selected backends have their connection parameters
    pub fn validate(&self) -> Result<(), SettingsError> {
        let mut missing = Vec::new();

        match self.completion.backend {
            CompletionBackendKind::Service => {
                if is_blank(&self.completion.service_url) {
                    missing.push("completion.service_url");
                }
            }
            CompletionBackendKind::Chat => {
                if is_blank(&self.chat.base_url) {
                    missing.push("chat.base_url");
                }
                if is_blank(&self.chat.model_name) {
                    missing.push("chat.model_name");
                }
                if is_blank(&self.chat.api_version) {
                    missing.push("chat.api_version");
                }
                if is_blank(&self.chat.access_token) {
                    missing.push("chat.access_token");
                }
            }
        }

        match self.store.backend {
            StoreBackendKind::Http if is_blank(&self.store.service_url) => {
                missing.push("store.service_url");
            }
            StoreBackendKind::Postgres if is_blank(&self.database.url) => {
                missing.push("database.url");
            }
            _ => {}
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SettingsError::Missing(missing))
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Apply the plain environment variables used by existing deployments
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("CHATGPT_SERVICE_URL", "completion.service_url"),
        ("DBSERVICE_URL", "store.service_url"),
        ("DATABASE_URL", "database.url"),
        ("CHATGPT_BASICURL", "chat.base_url"),
        ("CHATGPT_MODELNAME", "chat.model_name"),
        ("CHATGPT_APIVERSION", "chat.api_version"),
        ("CHATGPT_ACCESSTOKEN", "chat.access_token"),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
