use crate::types::{AggregatorState, RefreshOutcome};
use async_trait::async_trait;

/// Something the scheduler can drive: one refresh cycle per call.
#[async_trait]
pub trait Refreshable: Send + Sync {
    /// Name used in scheduler logs
    fn name(&self) -> &str;

    /// Run one fetch-merge-publish cycle. Never fails; problems are reported in the outcome.
    async fn refresh(&self) -> RefreshOutcome;

    fn state(&self) -> AggregatorState;

    /// Refuse every cycle from now on. An in-flight cycle still completes.
    fn mark_stopped(&self);
}
