use crate::types::{Result, WallError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration of the wall service.
///
/// Every field has a default, so an empty TOML file (or no file at all)
/// yields a service with no sources that simply serves empty snapshots.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub storage_dir: PathBuf,
    pub fetch: FetchConfig,
    pub sessions: SessionsConfig,
    pub posts: PostsConfig,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("./moderation"),
            fetch: FetchConfig::default(),
            sessions: SessionsConfig::default(),
            posts: PostsConfig::default(),
        }
    }
}

impl WallConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: WallConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.sessions.refresh_interval_secs == 0 {
            return Err(WallError::Config(
                "sessions.refresh_interval_secs must be positive".to_string(),
            ));
        }
        if self.posts.refresh_interval_secs == 0 {
            return Err(WallError::Config(
                "posts.refresh_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP settings shared by every connector.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_millis: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Conference-Wall/1.0".to_string(),
            timeout_seconds: 15,
            max_retries: 2,
            retry_delay_millis: 500,
        }
    }
}

/// How a refresh cycle reacts when one of its sources fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keep the previous snapshot if any source fails.
    #[default]
    AbortCycle,
    /// Skip failing sources and publish what the others returned.
    IsolateSources,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub refresh_interval_secs: u64,
    pub merge_policy: MergePolicy,
    pub sessionize: Vec<SessionizeConfig>,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 300,
            merge_policy: MergePolicy::default(),
            sessionize: Vec::new(),
        }
    }
}

impl SessionsConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostsConfig {
    pub refresh_interval_secs: u64,
    pub merge_policy: MergePolicy,
    pub filters: FilterConfig,
    pub mastodon: Vec<MastodonConfig>,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            merge_policy: MergePolicy::default(),
            filters: FilterConfig::default(),
            mastodon: Vec::new(),
        }
    }
}

impl PostsConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

/// Toggles and thresholds for the post filter chain.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub filter_sensitive: bool,
    pub filter_replies: bool,
    /// Maximum plain-text length in characters; zero or negative disables the check.
    pub max_length: i64,
    pub blocked_words: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_sensitive: true,
            filter_replies: true,
            max_length: 500,
            blocked_words: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionizeConfig {
    pub event_id: String,
    #[serde(default = "default_sessionize_url")]
    pub base_url: String,
    /// Offset of the conference's local time from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonConfig {
    pub instance: String,
    pub hashtag: String,
    #[serde(default = "default_mastodon_limit")]
    pub limit: u32,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn default_sessionize_url() -> String {
    "https://sessionize.com".to_string()
}

fn default_mastodon_limit() -> u32 {
    40
}

fn enabled_by_default() -> bool {
    true
}
