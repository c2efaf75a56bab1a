use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use interfaces::{Post, Room, Session};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Sessions of the latest cycle, grouped by room in room-name order.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub rooms: BTreeMap<Room, Vec<Session>>,
    pub published_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn empty() -> Self {
        Self {
            rooms: BTreeMap::new(),
            published_at: None,
        }
    }

    pub fn session_count(&self) -> usize {
        self.rooms.values().map(Vec::len).sum()
    }
}

/// Filtered posts of the latest cycle, in display order.
#[derive(Debug, Clone)]
pub struct PostSnapshot {
    pub posts: Vec<Post>,
    pub published_at: Option<DateTime<Utc>>,
}

impl PostSnapshot {
    pub fn empty() -> Self {
        Self {
            posts: Vec::new(),
            published_at: None,
        }
    }

    /// Copy of this snapshot minus the posts matching `remove`.
    pub fn without(&self, remove: impl Fn(&Post) -> bool) -> Self {
        Self {
            posts: self.posts.iter().filter(|p| !remove(p)).cloned().collect(),
            published_at: self.published_at,
        }
    }
}

/// Holds the currently published snapshot and swaps it atomically.
///
/// Readers get an owned `Arc`, so a view stays consistent even if a refresh
/// publishes a replacement while they are still looking at it. Whoever calls
/// `publish` is responsible for serialising publishers.
pub struct SnapshotCell<T> {
    inner: ArcSwap<T>,
}

impl<T> SnapshotCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: ArcSwap::new(Arc::new(initial)),
        }
    }

    pub fn load_full(&self) -> Arc<T> {
        self.inner.load_full()
    }

    pub fn publish(&self, next: T) {
        self.inner.store(Arc::new(next));
    }
}
