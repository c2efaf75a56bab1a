use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const HIDDEN_POSTS_FILE: &str = "hidden_posts.txt";
pub const BLOCKED_PROFILES_FILE: &str = "blocked_profiles.txt";

/// The form in which post ids and profile handles are stored and compared.
pub fn normalize_id(id: &str) -> &str {
    id.trim()
}

/// A grow-only set of ids mirrored to a text file, one id per line.
#[derive(Debug)]
pub struct PersistedIdSet {
    path: PathBuf,
    ids: BTreeSet<String>,
}

impl PersistedIdSet {
    /// Load the set from `path`. A missing file is an empty set, not an error.
    pub fn load(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let mut ids = BTreeSet::new();

        match File::open(&path) {
            Ok(file) => {
                for line in BufReader::new(file).lines() {
                    let line = line?;
                    let id = normalize_id(&line);
                    if !id.is_empty() {
                        ids.insert(id.to_string());
                    }
                }
                info!(path = %path.display(), count = ids.len(), "Loaded moderation list");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No moderation list on disk yet, starting empty");
            }
            Err(e) => return Err(e),
        }

        Ok(Self { path, ids })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ids are compared trimmed, the same way they are stored and loaded.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(normalize_id(id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Add an id in memory. Returns false if it was already present or cannot be stored.
    pub fn insert(&mut self, id: &str) -> bool {
        let id = normalize_id(id);
        if id.is_empty() || id.contains(['\n', '\r']) {
            warn!(id, "Refusing to store an id that cannot round-trip through a line file");
            return false;
        }
        self.ids.insert(id.to_string())
    }

    /// Overwrite the backing file with the full current set.
    pub fn flush(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        for id in &self.ids {
            writeln!(writer, "{}", id)?;
        }
        writer.flush()?;

        debug!(path = %self.path.display(), count = self.ids.len(), "Flushed moderation list");
        Ok(())
    }

    /// Insert and persist. The in-memory insert stands even if the write fails.
    fn insert_and_flush(&mut self, id: &str) -> bool {
        if !self.insert(id) {
            return false;
        }
        if let Err(e) = self.flush() {
            warn!(path = %self.path.display(), error = %e, "Failed to persist moderation list, keeping in-memory state");
        }
        true
    }
}

/// Hidden post ids and blocked profile handles, kept in a single directory.
#[derive(Debug)]
pub struct ModerationStore {
    hidden_posts: PersistedIdSet,
    blocked_profiles: PersistedIdSet,
}

impl ModerationStore {
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            hidden_posts: PersistedIdSet::load(dir.join(HIDDEN_POSTS_FILE))?,
            blocked_profiles: PersistedIdSet::load(dir.join(BLOCKED_PROFILES_FILE))?,
        })
    }

    pub fn is_hidden(&self, post_id: &str) -> bool {
        self.hidden_posts.contains(post_id)
    }

    pub fn is_blocked(&self, profile: &str) -> bool {
        self.blocked_profiles.contains(profile)
    }

    /// Returns true if the id was not hidden before.
    pub fn hide_post(&mut self, post_id: &str) -> bool {
        self.hidden_posts.insert_and_flush(post_id)
    }

    /// Returns true if the handle was not blocked before.
    pub fn block_profile(&mut self, profile: &str) -> bool {
        self.blocked_profiles.insert_and_flush(profile)
    }

    pub fn hidden_posts(&self) -> &PersistedIdSet {
        &self.hidden_posts
    }

    pub fn blocked_profiles(&self) -> &PersistedIdSet {
        &self.blocked_profiles
    }
}
