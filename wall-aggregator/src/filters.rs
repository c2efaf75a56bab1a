use crate::config::FilterConfig;
use crate::moderation::ModerationStore;
use crate::utils::text::{folded_plain_text, plain_text};
use interfaces::Post;
use std::collections::BTreeMap;
use tracing::debug;

/// One predicate of the filter chain. A post is kept only if every filter accepts it.
pub trait PostFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn accepts(&self, post: &Post, moderation: &ModerationStore) -> bool;
}

/// Drops hidden posts and posts from blocked profiles.
pub struct ModerationFilter;

impl PostFilter for ModerationFilter {
    fn name(&self) -> &'static str {
        "moderation"
    }

    fn accepts(&self, post: &Post, moderation: &ModerationStore) -> bool {
        !moderation.is_hidden(&post.id) && !moderation.is_blocked(&post.profile)
    }
}

pub struct SensitiveFilter;

impl PostFilter for SensitiveFilter {
    fn name(&self) -> &'static str {
        "sensitive"
    }

    fn accepts(&self, post: &Post, _moderation: &ModerationStore) -> bool {
        !post.is_sensitive
    }
}

pub struct ReplyFilter;

impl PostFilter for ReplyFilter {
    fn name(&self) -> &'static str {
        "reply"
    }

    fn accepts(&self, post: &Post, _moderation: &ModerationStore) -> bool {
        !post.is_reply
    }
}

/// Limits the length of the visible text, markup excluded.
pub struct MaxLengthFilter {
    max_chars: usize,
}

impl MaxLengthFilter {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl PostFilter for MaxLengthFilter {
    fn name(&self) -> &'static str {
        "max_length"
    }

    fn accepts(&self, post: &Post, _moderation: &ModerationStore) -> bool {
        plain_text(&post.html).chars().count() <= self.max_chars
    }
}

/// Case-insensitive substring match against a list of words.
pub struct BlocklistFilter {
    words: Vec<String>,
}

impl BlocklistFilter {
    pub fn new(words: &[String]) -> Self {
        let words = words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl PostFilter for BlocklistFilter {
    fn name(&self) -> &'static str {
        "blocklist"
    }

    fn accepts(&self, post: &Post, _moderation: &ModerationStore) -> bool {
        let text = folded_plain_text(&post.html);
        !self.words.iter().any(|word| text.contains(word.as_str()))
    }
}

/// Ordered conjunction of post filters.
pub struct FilterChain {
    filters: Vec<Box<dyn PostFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Box<dyn PostFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// The standard chain: moderation lists first, then the configurable checks.
    pub fn from_config(config: &FilterConfig) -> Self {
        let mut chain = Self::new().with_filter(Box::new(ModerationFilter));

        if config.filter_sensitive {
            chain = chain.with_filter(Box::new(SensitiveFilter));
        }
        if config.filter_replies {
            chain = chain.with_filter(Box::new(ReplyFilter));
        }
        if config.max_length > 0 {
            chain = chain.with_filter(Box::new(MaxLengthFilter::new(config.max_length as usize)));
        }
        let blocklist = BlocklistFilter::new(&config.blocked_words);
        if !blocklist.is_empty() {
            chain = chain.with_filter(Box::new(blocklist));
        }

        chain
    }

    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// True if every filter accepts the post.
    pub fn accepts(&self, post: &Post, moderation: &ModerationStore) -> bool {
        self.rejected_by(post, moderation).is_none()
    }

    fn rejected_by(&self, post: &Post, moderation: &ModerationStore) -> Option<&'static str> {
        self.filters
            .iter()
            .find(|f| !f.accepts(post, moderation))
            .map(|f| f.name())
    }

    pub fn apply(&self, posts: Vec<Post>, moderation: &ModerationStore) -> Vec<Post> {
        let total = posts.len();
        let mut dropped: BTreeMap<&'static str, usize> = BTreeMap::new();

        let kept: Vec<Post> = posts
            .into_iter()
            .filter(|post| match self.rejected_by(post, moderation) {
                Some(name) => {
                    *dropped.entry(name).or_default() += 1;
                    false
                }
                None => true,
            })
            .collect();

        debug!(total, kept = kept.len(), ?dropped, "Applied post filter chain");
        kept
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}
