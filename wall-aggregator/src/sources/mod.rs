pub mod mastodon;
pub mod sessionize;

pub use mastodon::MastodonSource;
pub use sessionize::SessionizeSource;

use crate::config::{MastodonConfig, SessionizeConfig};
use crate::types::Result;
use crate::Fetcher;
use interfaces::{Post, Session, SourcePlugin};
use std::sync::Arc;
use url::Url;

/// Schedule sources for every configured conference.
pub fn session_sources(
    configs: &[SessionizeConfig],
    fetcher: Arc<Fetcher>,
) -> Result<Vec<Arc<dyn SourcePlugin<Session>>>> {
    configs
        .iter()
        .map(|config| {
            let source = SessionizeSource::new(config, fetcher.clone())?;
            Ok(Arc::new(source) as Arc<dyn SourcePlugin<Session>>)
        })
        .collect()
}

/// Post sources for every configured hashtag feed.
pub fn post_sources(
    configs: &[MastodonConfig],
    fetcher: Arc<Fetcher>,
) -> Result<Vec<Arc<dyn SourcePlugin<Post>>>> {
    configs
        .iter()
        .map(|config| {
            let source = MastodonSource::new(config, fetcher.clone())?;
            Ok(Arc::new(source) as Arc<dyn SourcePlugin<Post>>)
        })
        .collect()
}

/// Parse a configured base URL so that relative joins append to its path.
/// `https://host/mastodon` would otherwise lose its last segment.
pub(crate) fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
