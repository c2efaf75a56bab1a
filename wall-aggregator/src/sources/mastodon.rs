use super::base_url;
use crate::config::MastodonConfig;
use crate::types::Result;
use crate::Fetcher;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interfaces::{ImportError, Post, SourcePlugin};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use url::Url;

#[derive(Debug, Deserialize)]
struct Status {
    id: String,
    created_at: DateTime<Utc>,
    in_reply_to_id: Option<String>,
    #[serde(default)]
    sensitive: bool,
    content: String,
    account: Account,
    #[serde(default)]
    media_attachments: Vec<MediaAttachment>,
}

#[derive(Debug, Deserialize)]
struct Account {
    acct: String,
    username: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    avatar: String,
}

#[derive(Debug, Deserialize)]
struct MediaAttachment {
    #[serde(rename = "type")]
    kind: String,
    url: Option<String>,
}

/// Public hashtag timeline of one Mastodon instance.
pub struct MastodonSource {
    hashtag: String,
    host: String,
    url: Url,
    fetcher: Arc<Fetcher>,
    enabled: AtomicBool,
}

impl MastodonSource {
    pub fn new(config: &MastodonConfig, fetcher: Arc<Fetcher>) -> Result<Self> {
        let hashtag = config.hashtag.trim_start_matches('#').to_string();
        let base = base_url(&config.instance)?;
        let host = base.host_str().unwrap_or_default().to_string();

        let mut url = base.join(&format!("api/v1/timelines/tag/{}", hashtag))?;
        url.query_pairs_mut()
            .append_pair("limit", &config.limit.to_string());

        info!(instance = %host, %hashtag, "Configured Mastodon hashtag source");

        Ok(Self {
            hashtag,
            host,
            url,
            fetcher,
            enabled: AtomicBool::new(config.enabled),
        })
    }

    /// Endpoint this source pulls from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Map a timeline payload (a JSON array of statuses) to posts.
    pub fn parse_timeline(&self, body: &str) -> std::result::Result<Vec<Post>, ImportError> {
        let statuses: Vec<Status> =
            serde_json::from_str(body).map_err(|e| ImportError::malformed(self.name(), e))?;

        Ok(statuses.into_iter().map(|status| self.to_post(status)).collect())
    }

    fn to_post(&self, status: Status) -> Post {
        let author = if status.account.display_name.trim().is_empty() {
            status.account.username.clone()
        } else {
            status.account.display_name.clone()
        };

        Post {
            id: status.id,
            timestamp: status.created_at,
            author,
            avatar_url: status.account.avatar,
            profile: self.qualified_handle(&status.account.acct),
            html: status.content,
            images: status
                .media_attachments
                .into_iter()
                .filter(|m| m.kind == "image")
                .filter_map(|m| m.url)
                .collect(),
            is_reply: status.in_reply_to_id.is_some(),
            is_sensitive: status.sensitive,
        }
    }

    /// Local accounts come back without a domain; qualify them so a block
    /// on one instance does not hit a namesake on another.
    fn qualified_handle(&self, acct: &str) -> String {
        if acct.contains('@') || self.host.is_empty() {
            acct.to_string()
        } else {
            format!("{}@{}", acct, self.host)
        }
    }
}

#[async_trait]
impl SourcePlugin<Post> for MastodonSource {
    fn name(&self) -> String {
        format!("mastodon_{}_{}", self.host, self.hashtag)
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn fetch(&self) -> std::result::Result<Vec<Post>, ImportError> {
        let name = self.name();
        let body = self.fetcher.get_text(&name, &self.url).await?;
        let posts = self.parse_timeline(&body)?;
        info!(source = %name, count = posts.len(), "Pulled hashtag timeline");
        Ok(posts)
    }
}
