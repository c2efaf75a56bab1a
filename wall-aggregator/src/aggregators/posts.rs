use super::{fetch_enabled, Lifecycle};
use crate::config::{FilterConfig, MergePolicy};
use crate::filters::FilterChain;
use crate::moderation::{normalize_id, ModerationStore};
use crate::snapshot::{PostSnapshot, SnapshotCell};
use crate::traits::Refreshable;
use crate::types::{AggregatorState, RefreshOutcome, Result};
use async_trait::async_trait;
use chrono::Utc;
use interfaces::{Post, SourcePlugin};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Social posts aggregated from every configured feed, filtered and moderated.
///
/// The moderation lock also covers filtering and publishing of each cycle,
/// so a hide or block made while a cycle is fetching is applied to that
/// cycle's data before it goes out.
pub struct PostAggregator {
    sources: Vec<Arc<dyn SourcePlugin<Post>>>,
    policy: MergePolicy,
    filters: FilterChain,
    moderation: Mutex<ModerationStore>,
    snapshot: SnapshotCell<PostSnapshot>,
    lifecycle: Lifecycle,
}

impl PostAggregator {
    /// Build the aggregator and run its first cycle before returning.
    pub async fn new(
        sources: Vec<Arc<dyn SourcePlugin<Post>>>,
        filters: FilterChain,
        moderation: ModerationStore,
        policy: MergePolicy,
    ) -> Self {
        info!(filters = ?filters.filter_names(), sources = sources.len(), "Creating post aggregator");

        let aggregator = Self {
            sources,
            policy,
            filters,
            moderation: Mutex::new(moderation),
            snapshot: SnapshotCell::new(PostSnapshot::empty()),
            lifecycle: Lifecycle::new(),
        };

        let outcome = aggregator.refresh().await;
        if !outcome.is_published() {
            warn!(?outcome, "Initial post refresh did not publish, starting with no posts");
        }

        aggregator
    }

    /// Load moderation lists from `storage_dir` and build the standard filter chain.
    pub async fn open(
        sources: Vec<Arc<dyn SourcePlugin<Post>>>,
        filter_config: &FilterConfig,
        storage_dir: impl AsRef<Path>,
        policy: MergePolicy,
    ) -> Result<Self> {
        let moderation = ModerationStore::open(storage_dir)?;
        let filters = FilterChain::from_config(filter_config);
        Ok(Self::new(sources, filters, moderation, policy).await)
    }

    /// Up to `limit` posts in display order; zero or negative means all of them.
    pub fn posts(&self, limit: i64) -> Vec<Post> {
        let snapshot = self.snapshot.load_full();
        let posts = &snapshot.posts;

        if limit <= 0 || limit as u64 >= posts.len() as u64 {
            posts.clone()
        } else {
            posts[..limit as usize].to_vec()
        }
    }

    pub fn snapshot(&self) -> Arc<PostSnapshot> {
        self.snapshot.load_full()
    }

    pub fn state(&self) -> AggregatorState {
        self.lifecycle.state()
    }

    /// Remove a post now and keep it hidden from every later cycle.
    pub async fn hide_post(&self, post: &Post) {
        let mut moderation = self.moderation.lock().await;

        let current = self.snapshot.load_full();
        let hidden = normalize_id(&post.id);
        self.snapshot.publish(current.without(|p| normalize_id(&p.id) == hidden));

        if moderation.hide_post(&post.id) {
            info!(post = %post.id, "Post hidden");
        }
    }

    /// Remove every post of the author now and drop their posts from every later cycle.
    pub async fn block_profile(&self, post: &Post) {
        let mut moderation = self.moderation.lock().await;

        let current = self.snapshot.load_full();
        let blocked = normalize_id(&post.profile);
        self.snapshot.publish(current.without(|p| normalize_id(&p.profile) == blocked));

        if moderation.block_profile(&post.profile) {
            info!(profile = %post.profile, "Profile blocked");
        }
    }

    /// Number of hidden posts and blocked profiles.
    pub async fn moderation_counts(&self) -> (usize, usize) {
        let moderation = self.moderation.lock().await;
        (
            moderation.hidden_posts().len(),
            moderation.blocked_profiles().len(),
        )
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        let _cycle = match self.lifecycle.begin("posts") {
            Ok(guard) => guard,
            Err(outcome) => return outcome,
        };

        let merged = match fetch_enabled("posts", &self.sources, self.policy).await {
            Ok(merged) => merged,
            Err(failures) => return RefreshOutcome::Retained { failures },
        };
        let fetched = merged.items.len();

        let moderation = self.moderation.lock().await;
        let mut posts = self.filters.apply(merged.items, &moderation);
        posts.sort_by(Post::cmp_natural);
        let count = posts.len();
        self.snapshot.publish(PostSnapshot {
            posts,
            published_at: Some(Utc::now()),
        });
        drop(moderation);

        info!(fetched, visible = count, "Published post snapshot");
        RefreshOutcome::Published {
            count,
            failures: merged.failures,
        }
    }
}

#[async_trait]
impl Refreshable for PostAggregator {
    fn name(&self) -> &str {
        "posts"
    }

    async fn refresh(&self) -> RefreshOutcome {
        PostAggregator::refresh(self).await
    }

    fn state(&self) -> AggregatorState {
        self.lifecycle.state()
    }

    fn mark_stopped(&self) {
        self.lifecycle.mark_stopped();
    }
}
