//! In-memory stand-ins for the process table and the history store.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::db::Track;
use crate::error::MonitorError;
use crate::history::HistoryStore;

use super::locator::ProcessTable;
use super::window_titles::WindowEntry;

#[derive(Default)]
struct TableState {
    windows: Vec<WindowEntry>,
    fail: bool,
}

/// Shared handle: clones see the same window list, so a test can change
/// what the sampler observes between ticks.
#[derive(Clone, Default)]
pub struct FakeProcessTable {
    inner: Arc<Mutex<TableState>>,
}

impl FakeProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_windows(&self, windows: &[(u32, &str)]) {
        self.inner.lock().unwrap().windows = windows
            .iter()
            .map(|(pid, title)| WindowEntry {
                pid: *pid,
                title: title.to_string(),
            })
            .collect();
    }

    pub fn play(&self, pid: u32, artist: &str, title: &str) {
        self.set_windows(&[(pid, &format!("Spotify - {artist} – {title}"))]);
    }

    pub fn clear(&self) {
        self.set_windows(&[]);
    }

    pub fn fail_listing(&self, fail: bool) {
        self.inner.lock().unwrap().fail = fail;
    }
}

impl ProcessTable for FakeProcessTable {
    fn windows(&mut self) -> Result<Vec<WindowEntry>> {
        let state = self.inner.lock().unwrap();
        if state.fail {
            bail!("window list backend offline");
        }
        Ok(state.windows.clone())
    }
}

#[derive(Default)]
struct StoreState {
    tracks: Vec<Track>,
    fail_appends: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_appends(&self, fail: bool) {
        self.inner.lock().unwrap().fail_appends = fail;
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.inner.lock().unwrap().tracks.clone()
    }

    pub fn pairs(&self) -> Vec<(String, String)> {
        self.tracks()
            .into_iter()
            .map(|t| (t.artist, t.title))
            .collect()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn append(&self, artist: &str, title: &str) -> Result<Track, MonitorError> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_appends {
            return Err(MonitorError::Persistence("database is locked".to_string()));
        }
        let track = Track {
            id: state.tracks.len() as i64 + 1,
            timestamp: Utc::now(),
            artist: artist.to_string(),
            title: title.to_string(),
        };
        state.tracks.push(track.clone());
        Ok(track)
    }

    async fn all(&self) -> Result<Vec<Track>, MonitorError> {
        Ok(self.tracks())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Track>, MonitorError> {
        let tracks = self.tracks();
        let skip = tracks.len().saturating_sub(limit);
        Ok(tracks.into_iter().skip(skip).collect())
    }

    async fn last(&self) -> Result<Option<Track>, MonitorError> {
        Ok(self.tracks().pop())
    }
}
