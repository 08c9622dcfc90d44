//! Test fixtures.
//!
//! Temporary mirrors with automatic cleanup, and an announcer that records
//! what it was asked to announce.

use cbmirror_localdb::{Announcer, LocalDb, MirrorConfig};
use cbmirror_registry::HookError;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A mirror in a temporary cache directory.
pub struct TestMirror {
    /// Mirror configuration pointing into the temporary directory.
    pub config: MirrorConfig,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl TestMirror {
    /// Creates a configuration in a fresh temporary directory, with sound
    /// effects stored under `sfx/`.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = MirrorConfig::new(temp_dir.path().join("cache"))
            .with_server_url("http://central")
            .with_sfx_dir(temp_dir.path().join("sfx"));
        Self { config, temp_dir }
    }

    /// Opens the mirror without an announcer.
    pub fn open(&self) -> LocalDb {
        LocalDb::open(&self.config).expect("Failed to open mirror")
    }

    /// Opens the mirror with a recording announcer.
    pub fn open_recording(&self) -> (LocalDb, RecordingAnnouncer) {
        let announcer = RecordingAnnouncer::default();
        let db = LocalDb::open_with_announcer(&self.config, announcer.clone())
            .expect("Failed to open mirror");
        (db, announcer)
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Sound effect directory.
    pub fn sfx_dir(&self) -> &Path {
        self.config
            .sfx_dir
            .as_deref()
            .expect("TestMirror always configures an sfx dir")
    }
}

impl Default for TestMirror {
    fn default() -> Self {
        Self::new()
    }
}

/// One recorded announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Court announced.
    pub court: String,
    /// Players announced.
    pub players: Vec<String>,
}

/// Announcer that records every call; clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnnouncer {
    calls: Arc<Mutex<Vec<Announcement>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingAnnouncer {
    /// Announcements made so far.
    pub fn calls(&self) -> Vec<Announcement> {
        self.calls.lock().clone()
    }

    /// Makes every later announcement fail.
    pub fn fail_next(&self) {
        *self.fail.lock() = true;
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce_next_game(&mut self, court: &str, players: &[String]) -> Result<(), HookError> {
        if *self.fail.lock() {
            return Err("announcer unavailable".into());
        }
        self.calls.lock().push(Announcement {
            court: court.to_string(),
            players: players.to_vec(),
        });
        Ok(())
    }
}

/// Runs a test with a freshly opened mirror.
pub fn with_temp_mirror<F, R>(f: F) -> R
where
    F: FnOnce(&mut LocalDb) -> R,
{
    let mirror = TestMirror::new();
    let mut db = mirror.open();
    f(&mut db)
}
