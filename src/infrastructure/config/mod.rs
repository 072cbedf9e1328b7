//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::application::errors::ConfigError;
use crate::application::services::roster_store::DEFAULT_ROSTER_KEY;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub announce: AnnounceConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub directory: PathBuf,
    #[serde(default = "default_roster_key")]
    pub roster_key: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    pub verbose: bool,
}

/// Channel that hears about rotations; `None` keeps them private
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnnounceConfig {
    pub channel: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub slack: Option<SlackConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlackConfig {
    pub enabled: bool,
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// Sender id for lines typed at the console
    pub user_id: String,
    #[serde(default)]
    pub users: Vec<ConsoleUser>,
}

/// Entry of the console adapter's user directory
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleUser {
    pub id: String,
    pub name: String,
}

fn default_roster_key() -> String {
    DEFAULT_ROSTER_KEY.to_string()
}

fn default_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "pope-bot".to_string(),
            },
            storage: StorageConfig {
                directory: PathBuf::from("./saveData"),
                roster_key: default_roster_key(),
            },
            logging: LoggingConfig::default(),
            announce: AnnounceConfig::default(),
            adapters: AdaptersConfig {
                slack: Some(SlackConfig {
                    enabled: false,
                    token: None,
                    api_base: default_api_base(),
                    timeout_seconds: default_timeout(),
                }),
                console: Some(ConsoleConfig {
                    enabled: true,
                    user_id: "U0CONSOLE".to_string(),
                    users: vec![ConsoleUser {
                        id: "U0CONSOLE".to_string(),
                        name: "console".to_string(),
                    }],
                }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    /// Parse YAML without validating; environment overrides may still fill gaps
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// The file at `path` with environment overrides applied, or the defaults
    /// plus environment when there is no file. A file that exists but cannot
    /// be read or parsed is an error.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::load_env());
        }
        let mut config = Self::load(path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment overrides on top of whatever was loaded
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("SLACK_TOKEN") {
            self.set_slack_token(token);
        }

        if let Ok(dir) = std::env::var("POPE_BOT_DATA_DIR") {
            self.storage.directory = PathBuf::from(dir);
        }

        if let Ok(channel) = std::env::var("POPE_BOT_ANNOUNCE_CHANNEL") {
            self.announce.channel = Some(channel);
        }
    }

    pub fn set_slack_token(&mut self, token: String) {
        let slack = self.adapters.slack.get_or_insert_with(|| SlackConfig {
            enabled: true,
            token: None,
            api_base: default_api_base(),
            timeout_seconds: default_timeout(),
        });
        slack.token = Some(token);
        slack.enabled = true;
    }

    /// Token of the Slack adapter, when it is enabled
    pub fn slack_token(&self) -> Option<&str> {
        self.adapters
            .slack
            .as_ref()
            .filter(|s| s.enabled)
            .and_then(|s| s.token.as_deref())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = &self.storage.roster_key;
        if key.is_empty() {
            return Err(ConfigError::MissingField("storage.roster-key".to_string()));
        }
        if key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(ConfigError::InvalidValue(format!(
                "storage.roster-key '{}' must be a plain name",
                key
            )));
        }
        if let Some(slack) = self.adapters.slack.as_ref().filter(|s| s.enabled) {
            if slack.token.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::MissingField("adapters.slack.token".to_string()));
            }
        }
        if let Some(console) = self.adapters.console.as_ref().filter(|c| c.enabled) {
            if console.user_id.is_empty() {
                return Err(ConfigError::MissingField("adapters.console.user-id".to_string()));
            }
        }
        Ok(())
    }
}
