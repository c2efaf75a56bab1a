use super::base_url;
use crate::config::SessionizeConfig;
use crate::types::{Result, WallError};
use crate::Fetcher;
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};
use interfaces::{ImportError, Room, Session, SourcePlugin, Speaker};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Deserialize)]
struct AllView {
    sessions: Vec<SessionizeSession>,
    #[serde(default)]
    speakers: Vec<SessionizeSpeaker>,
    #[serde(default)]
    categories: Vec<SessionizeCategory>,
    #[serde(default)]
    rooms: Vec<SessionizeRoom>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionizeSession {
    id: String,
    title: String,
    starts_at: Option<NaiveDateTime>,
    ends_at: Option<NaiveDateTime>,
    room_id: Option<i64>,
    #[serde(default)]
    speakers: Vec<String>,
    #[serde(default)]
    category_items: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionizeSpeaker {
    id: String,
    full_name: String,
    profile_picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionizeCategory {
    title: String,
    #[serde(default)]
    items: Vec<SessionizeCategoryItem>,
}

#[derive(Debug, Deserialize)]
struct SessionizeCategoryItem {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SessionizeRoom {
    id: i64,
    name: String,
}

/// Conference schedule published through the Sessionize "All" view.
pub struct SessionizeSource {
    event_id: String,
    url: Url,
    offset: FixedOffset,
    fetcher: Arc<Fetcher>,
    enabled: AtomicBool,
}

impl SessionizeSource {
    pub fn new(config: &SessionizeConfig, fetcher: Arc<Fetcher>) -> Result<Self> {
        let offset = config
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                WallError::Config(format!(
                    "utc_offset_minutes {} is out of range for event {}",
                    config.utc_offset_minutes, config.event_id
                ))
            })?;
        let url = base_url(&config.base_url)?.join(&format!("api/v2/{}/view/All", config.event_id))?;

        info!(event = %config.event_id, %url, "Configured Sessionize schedule source");

        Ok(Self {
            event_id: config.event_id.clone(),
            url,
            offset,
            fetcher,
            enabled: AtomicBool::new(config.enabled),
        })
    }

    /// Endpoint this source pulls from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Map an "All" view payload to sessions.
    ///
    /// Unscheduled sessions (no slot or room yet) are left out. A session
    /// pointing at a room or speaker missing from the payload is rejected.
    pub fn parse_schedule(&self, body: &str) -> std::result::Result<Vec<Session>, ImportError> {
        let name = self.name();
        let view: AllView = serde_json::from_str(body).map_err(|e| ImportError::malformed(&name, e))?;

        let rooms: HashMap<i64, &str> = view.rooms.iter().map(|r| (r.id, r.name.as_str())).collect();
        let speakers: HashMap<&str, &SessionizeSpeaker> =
            view.speakers.iter().map(|s| (s.id.as_str(), s)).collect();
        let language = category_lookup(&view.categories, "language");
        let track = category_lookup(&view.categories, "track");

        let mut sessions = Vec::with_capacity(view.sessions.len());
        for raw in &view.sessions {
            let (Some(starts_at), Some(ends_at), Some(room_id)) = (raw.starts_at, raw.ends_at, raw.room_id) else {
                debug!(source = %name, session = %raw.id, "Skipping unscheduled session");
                continue;
            };

            let room = rooms.get(&room_id).ok_or_else(|| {
                ImportError::malformed(&name, format!("session {} references unknown room {}", raw.id, room_id))
            })?;

            let session_speakers = raw
                .speakers
                .iter()
                .map(|id| {
                    speakers
                        .get(id.as_str())
                        .map(|s| Speaker {
                            name: s.full_name.clone(),
                            image: s.profile_picture.clone(),
                        })
                        .ok_or_else(|| {
                            ImportError::malformed(&name, format!("session {} references unknown speaker {}", raw.id, id))
                        })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;

            sessions.push(Session {
                id: raw.id.clone(),
                start_time: self.to_utc(starts_at),
                end_time: self.to_utc(ends_at),
                room: Room::new(*room),
                title: raw.title.clone(),
                speakers: session_speakers,
                language: first_match(&language, &raw.category_items),
                track: first_match(&track, &raw.category_items),
            });
        }

        Ok(sessions)
    }

    fn to_utc(&self, local: NaiveDateTime) -> chrono::DateTime<Utc> {
        // A fixed offset has exactly one mapping for every local time.
        self.offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local))
    }
}

/// Item id to item name for the category group titled `title` (case-insensitive).
fn category_lookup(categories: &[SessionizeCategory], title: &str) -> HashMap<i64, String> {
    categories
        .iter()
        .filter(|c| c.title.eq_ignore_ascii_case(title))
        .flat_map(|c| c.items.iter().map(|item| (item.id, item.name.clone())))
        .collect()
}

fn first_match(lookup: &HashMap<i64, String>, items: &[i64]) -> String {
    items
        .iter()
        .find_map(|id| lookup.get(id).cloned())
        .unwrap_or_default()
}

#[async_trait]
impl SourcePlugin<Session> for SessionizeSource {
    fn name(&self) -> String {
        format!("sessionize_{}", self.event_id)
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn fetch(&self) -> std::result::Result<Vec<Session>, ImportError> {
        let name = self.name();
        let body = self.fetcher.get_text(&name, &self.url).await?;
        let sessions = self.parse_schedule(&body)?;
        info!(source = %name, count = sessions.len(), "Pulled schedule");
        Ok(sessions)
    }
}
