//! Configuration for RAGna.
//!
//! Loaded from `~/.ragna/config.toml`. Every section is optional; a missing
//! file means defaults. String values may reference environment variables as
//! `${VAR}`. A handful of environment variables override the file:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `RAGNA_API_URL` | `[backend] base_url` |
//! | `RAGNA_API_KEY` | `[app] api_key` |
//! | `RAGNA_REQUEST_TIMEOUT_SECS` | `[backend] timeout_secs` |
//!
//! ```toml
//! [app]
//! screen = "leetcode"
//! api_key = "${GROQ_API_KEY}"
//!
//! [backend]
//! base_url = "http://localhost:8000/api"
//! timeout_secs = 90
//!
//! [conversation]
//! max_messages = 500
//! send_history = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use ragna_client::BackendSettings;
use ragna_types::{DEFAULT_MAX_MESSAGES, Screen};

pub const ENV_API_URL: &str = "RAGNA_API_URL";
pub const ENV_API_KEY: &str = "RAGNA_API_KEY";
pub const ENV_REQUEST_TIMEOUT: &str = "RAGNA_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Default, Deserialize)]
pub struct RagnaConfig {
    pub app: Option<AppConfig>,
    pub backend: Option<BackendConfig>,
    pub conversation: Option<ConversationConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Default, Deserialize)]
pub struct AppConfig {
    /// `search` or `leetcode`.
    pub screen: Option<String>,
    /// Pre-filled key. It still has to pass validation before use.
    pub api_key: Option<String>,
}

// Manual Debug impl to prevent leaking the API key in logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.api_key.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("AppConfig")
            .field("screen", &self.screen)
            .field("api_key", &key)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConversationConfig {
    pub max_messages: Option<usize>,
    /// Send the whole transcript with each chat turn instead of only the newest message.
    #[serde(default)]
    pub send_history: bool,
}

/// Conversation knobs consumed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationSettings {
    pub max_messages: usize,
    pub send_history: bool,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            send_history: false,
        }
    }
}

/// Fully resolved settings: env overrides, then file values, then defaults.
#[derive(Clone)]
pub struct Settings {
    pub screen: Screen,
    pub backend: BackendSettings,
    pub conversation: ConversationSettings,
    api_key: Option<String>,
}

impl Settings {
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.api_key.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("Settings")
            .field("screen", &self.screen)
            .field("backend", &self.backend)
            .field("conversation", &self.conversation)
            .field("api_key", &key)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        RagnaConfig::default().resolve_with(|_| None)
    }
}

/// Expand `${VAR}` references using `lookup`. Unknown variables expand to
/// the empty string; an unclosed `${` is kept literally.
pub fn expand_env_vars_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&lookup(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

pub fn expand_env_vars(value: &str) -> String {
    expand_env_vars_with(value, |var| std::env::var(var).ok())
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl RagnaConfig {
    /// Load the config from the default location. `Ok(None)` means no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map(Some).map_err(|source| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn resolve(&self) -> Settings {
        self.resolve_with(|var| std::env::var(var).ok())
    }

    /// Resolve against an explicit environment; `env` is used both for the
    /// override variables and for `${VAR}` expansion.
    pub fn resolve_with<F>(&self, env: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let expand = |raw: &str| non_blank(expand_env_vars_with(raw, &env));
        let defaults = BackendSettings::default();
        let backend = self.backend.as_ref();
        let app = self.app.as_ref();

        let base_url = env(ENV_API_URL)
            .and_then(non_blank)
            .or_else(|| backend.and_then(|b| b.base_url.as_deref()).and_then(expand))
            .unwrap_or(defaults.base_url);

        let timeout = match env(ENV_REQUEST_TIMEOUT) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    tracing::warn!("Ignoring invalid {ENV_REQUEST_TIMEOUT}: {raw:?}");
                    None
                }
            },
            None => None,
        }
        .or_else(|| {
            backend
                .and_then(|b| b.timeout_secs)
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
        })
        .unwrap_or(defaults.timeout);

        let connect_timeout = backend
            .and_then(|b| b.connect_timeout_secs)
            .filter(|secs| *secs > 0)
            .map_or(defaults.connect_timeout, Duration::from_secs);

        let screen = app
            .and_then(|a| a.screen.as_deref())
            .and_then(|raw| {
                let parsed = Screen::parse(raw);
                if parsed.is_none() {
                    tracing::warn!("Unknown screen in config: {}", raw);
                }
                parsed
            })
            .unwrap_or_default();

        let api_key = env(ENV_API_KEY)
            .and_then(non_blank)
            .or_else(|| app.and_then(|a| a.api_key.as_deref()).and_then(expand));

        let conversation = self.conversation.as_ref().map_or_else(
            ConversationSettings::default,
            |c| ConversationSettings {
                max_messages: c.max_messages.unwrap_or(DEFAULT_MAX_MESSAGES),
                send_history: c.send_history,
            },
        );

        Settings {
            screen,
            backend: BackendSettings {
                base_url,
                timeout,
                connect_timeout,
            },
            conversation,
            api_key,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ragna").join("config.toml"))
}
