use super::{fetch_enabled, Lifecycle};
use crate::config::MergePolicy;
use crate::snapshot::{SessionSnapshot, SnapshotCell};
use crate::traits::Refreshable;
use crate::types::{AggregatorState, RefreshOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interfaces::{Room, Session, SourcePlugin};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Group sessions by room for display.
///
/// Every room that appears in `sessions` gets an entry, even when all of its
/// sessions have already ended by `now`. Sessions inside a room are in
/// chronological order.
pub fn group_sessions(mut sessions: Vec<Session>, now: DateTime<Utc>) -> BTreeMap<Room, Vec<Session>> {
    sessions.sort_by(Session::cmp_natural);

    let mut grouped: BTreeMap<Room, Vec<Session>> = sessions
        .iter()
        .map(|session| (session.room.clone(), Vec::new()))
        .collect();

    for session in sessions.into_iter().filter(|s| s.end_time > now) {
        grouped.entry(session.room.clone()).or_default().push(session);
    }

    grouped
}

/// Conference schedule aggregated from every configured schedule source.
pub struct SessionAggregator {
    sources: Vec<Arc<dyn SourcePlugin<Session>>>,
    policy: MergePolicy,
    snapshot: SnapshotCell<SessionSnapshot>,
    lifecycle: Lifecycle,
}

impl SessionAggregator {
    /// Build the aggregator and run its first cycle before returning.
    ///
    /// The first cycle always completes; if it fails the aggregator starts
    /// out with an empty schedule.
    pub async fn new(sources: Vec<Arc<dyn SourcePlugin<Session>>>, policy: MergePolicy) -> Self {
        let aggregator = Self {
            sources,
            policy,
            snapshot: SnapshotCell::new(SessionSnapshot::empty()),
            lifecycle: Lifecycle::new(),
        };

        let outcome = aggregator.refresh().await;
        if !outcome.is_published() {
            warn!(?outcome, "Initial session refresh did not publish, starting with an empty schedule");
        }

        aggregator
    }

    /// Copy of the current room to sessions mapping.
    pub fn grouped_sessions(&self) -> BTreeMap<Room, Vec<Session>> {
        self.snapshot.load_full().rooms.clone()
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.snapshot.load_full()
    }

    pub fn state(&self) -> AggregatorState {
        self.lifecycle.state()
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        let _cycle = match self.lifecycle.begin("sessions") {
            Ok(guard) => guard,
            Err(outcome) => return outcome,
        };

        let merged = match fetch_enabled("sessions", &self.sources, self.policy).await {
            Ok(merged) => merged,
            Err(failures) => return RefreshOutcome::Retained { failures },
        };

        let now = Utc::now();
        let fetched = merged.items.len();
        let snapshot = SessionSnapshot {
            rooms: group_sessions(merged.items, now),
            published_at: Some(now),
        };
        let count = snapshot.session_count();
        let rooms = snapshot.rooms.len();
        self.snapshot.publish(snapshot);

        info!(fetched, upcoming = count, rooms, "Published session snapshot");
        RefreshOutcome::Published {
            count,
            failures: merged.failures,
        }
    }
}

#[async_trait]
impl Refreshable for SessionAggregator {
    fn name(&self) -> &str {
        "sessions"
    }

    async fn refresh(&self) -> RefreshOutcome {
        SessionAggregator::refresh(self).await
    }

    fn state(&self) -> AggregatorState {
        self.lifecycle.state()
    }

    fn mark_stopped(&self) {
        self.lifecycle.mark_stopped();
    }
}
