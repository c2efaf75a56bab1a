#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use interfaces::{ImportError, Post, Room, Session, SourcePlugin, Speaker};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::Notify;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Pauses a stub's fetch until the test releases it.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// Scriptable source plugin for tests.
pub struct StubSource<E> {
    name: String,
    response: Mutex<Result<Vec<E>, ImportError>>,
    enabled: AtomicBool,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<std::time::Duration>,
    gate: Gate,
    gated: AtomicBool,
}

impl<E> StubSource<E> {
    pub fn new(name: &str, items: Vec<E>) -> Self {
        Self {
            name: name.to_string(),
            response: Mutex::new(Ok(items)),
            enabled: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: None,
            gate: Gate::default(),
            gated: AtomicBool::new(false),
        }
    }

    pub fn failing(name: &str) -> Self {
        let stub = Self::new(name, Vec::new());
        stub.fail_with_network_error();
        stub
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make the next fetch wait until the returned gate is released.
    pub fn arm_gate(&self) -> Gate {
        self.gated.store(true, Ordering::SeqCst);
        self.gate.clone()
    }

    pub fn set_items(&self, items: Vec<E>) {
        *self.response.lock().unwrap() = Ok(items);
    }

    pub fn fail_with_network_error(&self) {
        *self.response.lock().unwrap() = Err(ImportError::network(self.name.clone(), "connection refused"));
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<E: Clone + Send + Sync + 'static> SourcePlugin<E> for StubSource<E> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn fetch(&self) -> Result<Vec<E>, ImportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        if self.gated.swap(false, Ordering::SeqCst) {
            self.gate.entered.notify_one();
            self.gate.release.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let response = self.response.lock().unwrap().clone();
        response
    }
}

pub fn post(id: &str, hours_ago: i64, profile: &str) -> Post {
    post_at(id, Utc::now() - Duration::hours(hours_ago), profile)
}

pub fn post_at(id: &str, timestamp: DateTime<Utc>, profile: &str) -> Post {
    Post {
        id: id.to_string(),
        timestamp,
        author: format!("Author of {}", profile),
        avatar_url: format!("https://example.social/avatars/{}.png", profile),
        profile: profile.to_string(),
        html: format!("<p>Post {} about <a href=\"#\">#conference</a></p>", id),
        images: Vec::new(),
        is_reply: false,
        is_sensitive: false,
    }
}

/// Ten posts P1..P10, Pn posted n hours ago, each by its own author.
pub fn ten_posts() -> Vec<Post> {
    (1..=10)
        .map(|n| post(&format!("P{}", n), n, &format!("author{}@example.social", n)))
        .collect()
}

pub fn ids(posts: &[Post]) -> Vec<String> {
    posts.iter().map(|p| p.id.clone()).collect()
}

/// A session in `room` starting `start_in` minutes from now and lasting `minutes`.
pub fn session(id: &str, room: &str, start_in: i64, minutes: i64) -> Session {
    let start_time = Utc::now() + Duration::minutes(start_in);
    Session {
        id: id.to_string(),
        start_time,
        end_time: start_time + Duration::minutes(minutes),
        room: Room::new(room),
        title: format!("Talk {}", id),
        speakers: vec![Speaker {
            name: format!("Speaker {}", id),
            image: None,
        }],
        language: "en".to_string(),
        track: "Core".to_string(),
    }
}

pub fn post_sources(stubs: &[Arc<StubSource<Post>>]) -> Vec<Arc<dyn SourcePlugin<Post>>> {
    stubs
        .iter()
        .map(|s| s.clone() as Arc<dyn SourcePlugin<Post>>)
        .collect()
}

pub fn session_sources(stubs: &[Arc<StubSource<Session>>]) -> Vec<Arc<dyn SourcePlugin<Session>>> {
    stubs
        .iter()
        .map(|s| s.clone() as Arc<dyn SourcePlugin<Session>>)
        .collect()
}
