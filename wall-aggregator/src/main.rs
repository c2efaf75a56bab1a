use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wall_aggregator::sources::{post_sources, session_sources};
use wall_aggregator::{Fetcher, PostAggregator, Scheduler, SessionAggregator, WallConfig};

#[derive(Debug, Parser)]
#[command(name = "wall-aggregator", about = "Conference schedule and social wall aggregator")]
struct Args {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the moderation lists, overrides the config file
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Seconds between snapshot summaries in the log
    #[arg(long, default_value_t = 60)]
    summary_every: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            WallConfig::from_file(path)?
        }
        None => {
            warn!("No configuration file given, running with defaults and no sources");
            WallConfig::default()
        }
    };
    if let Some(dir) = args.storage_dir {
        config.storage_dir = dir;
    }

    info!("Starting wall aggregator (moderation lists in {})", config.storage_dir.display());

    let fetcher = Arc::new(Fetcher::new(config.fetch.clone())?);

    let sessions = Arc::new(
        SessionAggregator::new(
            session_sources(&config.sessions.sessionize, fetcher.clone())?,
            config.sessions.merge_policy,
        )
        .await,
    );
    let posts = Arc::new(
        PostAggregator::open(
            post_sources(&config.posts.mastodon, fetcher.clone())?,
            &config.posts.filters,
            &config.storage_dir,
            config.posts.merge_policy,
        )
        .await?,
    );

    let session_scheduler = Scheduler::start(sessions.clone(), config.sessions.refresh_interval());
    let post_scheduler = Scheduler::start(posts.clone(), config.posts.refresh_interval());

    let mut summary = tokio::time::interval(Duration::from_secs(args.summary_every.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!("Failed to listen for shutdown signal: {}", e);
                }
                break;
            }
            _ = summary.tick() => log_summary(&sessions, &posts).await,
        }
    }

    info!("Shutting down, waiting for in-flight refreshes");
    session_scheduler.shutdown().await;
    post_scheduler.shutdown().await;

    log_summary(&sessions, &posts).await;
    info!("Wall aggregator finished");
    Ok(())
}

async fn log_summary(sessions: &SessionAggregator, posts: &PostAggregator) {
    let schedule = sessions.snapshot();
    let wall = posts.snapshot();
    let (hidden, blocked) = posts.moderation_counts().await;

    info!(
        rooms = schedule.rooms.len(),
        upcoming_sessions = schedule.session_count(),
        posts = wall.posts.len(),
        hidden,
        blocked,
        "Snapshot summary"
    );
    for (room, room_sessions) in &schedule.rooms {
        if let Some(next) = room_sessions.first() {
            info!("  {}: next up \"{}\" at {}", room.name, next.title, next.start_time);
        }
    }
}
