use interfaces::ImportError;

/// Where an aggregator is in its life. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Uninitialized,
    Ready,
    Refreshing,
    Stopped,
}

impl AggregatorState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Ready => 1,
            Self::Refreshing => 2,
            Self::Stopped => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Ready,
            2 => Self::Refreshing,
            _ => Self::Stopped,
        }
    }
}

/// What a single refresh cycle did to the published snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot went out. `failures` is only non-empty when sources are isolated.
    Published {
        count: usize,
        failures: Vec<ImportError>,
    },
    /// At least one source failed and the previous snapshot was kept.
    Retained { failures: Vec<ImportError> },
    /// Another cycle was already running.
    Skipped,
    /// The aggregator has been shut down.
    Stopped,
}

impl RefreshOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WallError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WallError>;
