pub mod aggregators;
pub mod config;
pub mod fetcher;
pub mod filters;
pub mod moderation;
pub mod scheduler;
pub mod snapshot;
pub mod sources;
pub mod traits;
pub mod types;
pub mod utils;

pub use aggregators::{PostAggregator, SessionAggregator};
pub use config::{FetchConfig, FilterConfig, MergePolicy, WallConfig};
pub use fetcher::Fetcher;
pub use filters::FilterChain;
pub use moderation::ModerationStore;
pub use scheduler::{Scheduler, SchedulerHandle};
pub use traits::Refreshable;
pub use types::*;
