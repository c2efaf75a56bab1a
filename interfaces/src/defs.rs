use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
}

impl Room {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub room: Room,
    pub title: String,
    pub speakers: Vec<Speaker>,
    pub language: String,
    pub track: String,
}

impl Session {
    /// Chronological, then by room. The id only breaks ties so that sorting is total.
    pub fn cmp_natural(&self, other: &Self) -> Ordering {
        self.start_time
            .cmp(&other.start_time)
            .then_with(|| self.room.cmp(&other.room))
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub avatar_url: String,
    pub profile: String,
    pub html: String,
    pub images: Vec<String>,
    pub is_reply: bool,
    pub is_sensitive: bool,
}

impl Post {
    /// Newest first, id ascending on equal timestamps.
    pub fn cmp_natural(&self, other: &Self) -> Ordering {
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("{source_name}: network error: {message}")]
    Network { source_name: String, message: String },

    #[error("{source_name}: unexpected HTTP status {status}")]
    Unavailable { source_name: String, status: u16 },

    #[error("{source_name}: malformed payload: {message}")]
    Malformed { source_name: String, message: String },
}

impl ImportError {
    pub fn network(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Network {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn malformed(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Malformed {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn source_name(&self) -> &str {
        match self {
            Self::Network { source_name, .. }
            | Self::Unavailable { source_name, .. }
            | Self::Malformed { source_name, .. } => source_name,
        }
    }
}

// Object style note:
// A plugin talks to exactly one external system. `fetch` may be called
// any number of times and must not keep state between calls that would
// make one result depend on a previous one. A payload that cannot be fully
// mapped is an ImportError, never a partially filled entity.

#[async_trait]
pub trait SourcePlugin<E: Send + 'static>: Send + Sync {
    fn name(&self) -> String;

    /// Checked at the start of every refresh cycle; disabled plugins are never fetched.
    fn enabled(&self) -> bool {
        true
    }

    async fn fetch(&self) -> Result<Vec<E>, ImportError>;
}
