//! Configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! Platform credentials (`API_ID`, `API_HASH`, `BOT_TOKEN`) are never read
//! from the TOML file; they come from the command line or the environment
//! only. A missing TOML file is not fatal: the compiled defaults are used.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::genre::{TopicId, TopicMap};
use crate::{Error, Result};

/// Config file looked up in the working directory when none is given
pub const LOCAL_CONFIG_FILE: &str = "netcloud.toml";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub telegram: TelegramConfig,
    pub sheets: SheetsConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    /// Genre label → topic id overrides
    pub topics: BTreeMap<String, TopicId>,
}

/// Messaging platform settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Chat id of the private storage channel that receives uploads
    pub storage_chat_id: i64,
    /// Public username of the destination channel (without `@`)
    pub destination_channel: String,
    /// Bot API base URL
    pub api_base: String,
    /// Long-poll timeout passed to `getUpdates`
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            storage_chat_id: -1002314286062,
            destination_channel: "NetCloud_Films".to_string(),
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
        }
    }
}

/// Spreadsheet ledger settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Spreadsheet title, resolved to an id through Drive
    pub spreadsheet_name: String,
    /// Explicit spreadsheet id; skips the lookup by name when set
    pub spreadsheet_id: Option<String>,
    /// Service-account JSON key file
    pub credentials_file: PathBuf,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_name: "liste film NETCLOUD TOUS".to_string(),
            spreadsheet_id: None,
            credentials_file: PathBuf::from("service-account.json"),
        }
    }
}

/// Liveness endpoint bind address
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load the config file, falling back to compiled defaults
    ///
    /// An explicitly requested file must exist. Otherwise the first existing
    /// candidate from [`default_config_candidates`] is used, or defaults when
    /// there is none.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        match default_config_candidates().into_iter().find(|p| p.exists()) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Genre routing table with `[topics]` overrides applied
    pub fn topic_map(&self) -> Result<TopicMap> {
        TopicMap::with_overrides(&self.topics)
    }
}

/// Config file locations tried in order when no path is given
pub fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("netcloud").join("config.toml"));
    }
    candidates
}

/// Messaging platform credentials
///
/// All three values are required; the bot refuses to start without them.
#[derive(Clone)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: String,
    pub bot_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Validate raw credential values
    pub fn from_parts(
        api_id: Option<&str>,
        api_hash: Option<&str>,
        bot_token: Option<&str>,
    ) -> Result<Self> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        let missing: Vec<&str> = [
            ("API_ID", present(api_id)),
            ("API_HASH", present(api_hash)),
            ("BOT_TOKEN", present(bot_token)),
        ]
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Missing credentials: {}. Set them in the environment or pass them on the command line.",
                missing.join(", ")
            )));
        }

        // Checked above
        let (api_id, api_hash, bot_token) = (
            present(api_id).unwrap_or_default(),
            present(api_hash).unwrap_or_default(),
            present(bot_token).unwrap_or_default(),
        );

        let api_id = api_id
            .parse::<i32>()
            .map_err(|_| Error::Config(format!("API_ID must be an integer, got '{}'", api_id)))?;

        if !bot_token.contains(':') {
            return Err(Error::Config(
                "BOT_TOKEN is malformed (expected '<bot id>:<secret>')".to_string(),
            ));
        }

        Ok(Self {
            api_id,
            api_hash: api_hash.to_string(),
            bot_token: bot_token.to_string(),
        })
    }
}

/// Ensure a required file exists before anything tries to open it
pub fn require_file(path: &Path, what: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::Config(format!("{} not found: {}", what, path.display())))
    }
}
