pub mod posts;
pub mod sessions;

pub use posts::PostAggregator;
pub use sessions::{group_sessions, SessionAggregator};

use crate::config::MergePolicy;
use crate::types::{AggregatorState, RefreshOutcome};
use futures::future::join_all;
use interfaces::{ImportError, SourcePlugin};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Everything the enabled sources returned in one cycle.
pub(crate) struct Merged<E> {
    pub items: Vec<E>,
    pub failures: Vec<ImportError>,
}

/// Fetch every enabled source and merge the results.
///
/// Under `AbortCycle` any failure turns the whole cycle into `Err` with the
/// collected failures, so the caller keeps its previous snapshot.
pub(crate) async fn fetch_enabled<E: Send + 'static>(
    aggregator: &str,
    sources: &[Arc<dyn SourcePlugin<E>>],
    policy: MergePolicy,
) -> std::result::Result<Merged<E>, Vec<ImportError>> {
    let (enabled, disabled): (Vec<_>, Vec<_>) = sources.iter().partition(|s| s.enabled());
    for source in &disabled {
        debug!(aggregator, source = %source.name(), "Source disabled, not fetching");
    }

    let results = join_all(enabled.iter().map(|source| source.fetch())).await;

    let mut items = Vec::new();
    let mut failures = Vec::new();
    for (source, result) in enabled.iter().zip(results) {
        match result {
            Ok(mut batch) => {
                debug!(aggregator, source = %source.name(), count = batch.len(), "Fetched from source");
                items.append(&mut batch);
            }
            Err(e) => {
                warn!(aggregator, source = %source.name(), error = %e, "Source import failed");
                failures.push(e);
            }
        }
    }

    if !failures.is_empty() && policy == MergePolicy::AbortCycle {
        info!(aggregator, failed = failures.len(), "Keeping previous snapshot for this cycle");
        return Err(failures);
    }

    Ok(Merged { items, failures })
}

/// Aggregator state plus the exclusion that keeps refresh cycles from overlapping.
pub(crate) struct Lifecycle {
    state: AtomicU8,
    cycle: Mutex<()>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(AggregatorState::Uninitialized.as_u8()),
            cycle: Mutex::new(()),
        }
    }

    pub fn state(&self) -> AggregatorState {
        AggregatorState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn mark_stopped(&self) {
        self.state
            .store(AggregatorState::Stopped.as_u8(), Ordering::SeqCst);
    }

    /// Enter a refresh cycle, or say why not.
    pub fn begin(&self, aggregator: &str) -> std::result::Result<CycleGuard<'_>, RefreshOutcome> {
        let Ok(lock) = self.cycle.try_lock() else {
            debug!(aggregator, "Refresh already in progress, skipping");
            return Err(RefreshOutcome::Skipped);
        };

        let mut current = self.state.load(Ordering::SeqCst);
        loop {
            if AggregatorState::from_u8(current) == AggregatorState::Stopped {
                debug!(aggregator, "Aggregator stopped, not refreshing");
                return Err(RefreshOutcome::Stopped);
            }
            match self.state.compare_exchange(
                current,
                AggregatorState::Refreshing.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        Ok(CycleGuard {
            lifecycle: self,
            _lock: lock,
        })
    }
}

/// Held for the duration of one cycle. Dropping it returns the aggregator to
/// `Ready` unless it was stopped in the meantime.
pub(crate) struct CycleGuard<'a> {
    lifecycle: &'a Lifecycle,
    _lock: MutexGuard<'a, ()>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let _ = self.lifecycle.state.compare_exchange(
            AggregatorState::Refreshing.as_u8(),
            AggregatorState::Ready.as_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}
