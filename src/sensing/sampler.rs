//! Per-tick now-playing state machine.
//!
//! [`sample_once`] takes the session state by value and hands back the next
//! state, so every transition can be driven without a timer:
//!
//! - unresolved: locate the player; on success sample it in the same tick
//! - resolved: read the title of the known pid; if the process vanished,
//!   clear the pid and relocate within the same tick. A live pid showing a
//!   non-track title keeps the target unless another pid shows the player
//!   prefix
//! - a parsed track equal to the last stored one is ignored; a different one
//!   is appended and becomes the new last track
//!
//! The last track only moves after the store has confirmed the append. A
//! failed append is retried on the next tick if the track is still playing.

use std::{mem, sync::Arc};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::db::Track;
use crate::error::MonitorError;
use crate::history::HistoryStore;
use crate::monitor::state::{NowPlayingSnapshot, SamplerStatus};
use crate::settings::RECENT_LIMIT;
use crate::tracks::parse_track_title;

use super::locator::{ProcessLocator, ProcessTable};
use super::scheduler::PollAction;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerPhase {
    Unresolved,
    Resolved(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamplerState {
    pub target_pid: Option<u32>,
    /// Most recently appended record, used only to detect changes.
    pub last_observed: Option<Track>,
}

impl SamplerState {
    /// Starts unresolved, remembering the newest stored record so a restart
    /// does not store the still-playing track again.
    pub fn seeded(last_observed: Option<Track>) -> Self {
        Self {
            target_pid: None,
            last_observed,
        }
    }

    pub fn phase(&self) -> SamplerPhase {
        match self.target_pid {
            Some(pid) => SamplerPhase::Resolved(pid),
            None => SamplerPhase::Unresolved,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Appended(Track),
    Unchanged,
    /// Carries `TargetNotFound`.
    NotRunning(MonitorError),
    /// Carries `MalformedTrackTitle`.
    Unrecognised(MonitorError),
    /// Carries `Persistence`.
    PersistFailed(MonitorError),
}

impl TickOutcome {
    pub fn status(&self) -> SamplerStatus {
        match self {
            TickOutcome::Appended(_) | TickOutcome::Unchanged => SamplerStatus::Listening,
            TickOutcome::NotRunning(_) => SamplerStatus::NotRunning,
            TickOutcome::Unrecognised(MonitorError::MalformedTrackTitle { raw }) => {
                SamplerStatus::UnrecognisedTitle(raw.clone())
            }
            TickOutcome::Unrecognised(err) => SamplerStatus::UnrecognisedTitle(err.to_string()),
            TickOutcome::PersistFailed(err) => SamplerStatus::PersistenceFailed(err.to_string()),
        }
    }
}

/// Runs one sampling tick.
pub async fn sample_once<T, H>(
    mut state: SamplerState,
    locator: &mut ProcessLocator<T>,
    store: &H,
    title_prefix: &str,
) -> (SamplerState, TickOutcome)
where
    T: ProcessTable,
    H: HistoryStore + ?Sized,
{
    if let SamplerPhase::Resolved(pid) = state.phase() {
        match locator.window_title(pid, title_prefix) {
            Ok(raw) if raw.starts_with(title_prefix) => {
                return record_title(state, &raw, store).await
            }
            // Paused, or the pid now belongs to another program. Only a
            // player window under a different pid moves the target.
            Ok(raw) => match locator.locate(title_prefix) {
                Some(other) if other != pid => {
                    log_info!("player moved from pid {pid} to {other}");
                    state.target_pid = None;
                }
                _ => return record_title(state, &raw, store).await,
            },
            Err(vanished) => {
                log_info!("{vanished}; relocating");
                state.target_pid = None;
            }
        }
    }

    let Some(pid) = locator.locate(title_prefix) else {
        let not_found = MonitorError::TargetNotFound {
            prefix: title_prefix.to_string(),
        };
        return (state, TickOutcome::NotRunning(not_found));
    };

    log_info!("player resolved to pid {pid}");
    state.target_pid = Some(pid);

    match locator.window_title(pid, title_prefix) {
        Ok(raw) => record_title(state, &raw, store).await,
        Err(vanished) => {
            // Exited between the two queries
            log_warn!("{vanished} right after it was located");
            state.target_pid = None;
            let not_found = MonitorError::TargetNotFound {
                prefix: title_prefix.to_string(),
            };
            (state, TickOutcome::NotRunning(not_found))
        }
    }
}

async fn record_title<H>(
    mut state: SamplerState,
    raw: &str,
    store: &H,
) -> (SamplerState, TickOutcome)
where
    H: HistoryStore + ?Sized,
{
    let parsed = match parse_track_title(raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            log_debug!("skipping tick: {err}");
            return (state, TickOutcome::Unrecognised(err));
        }
    };

    if let Some(last) = &state.last_observed {
        if last.is_same_as(&parsed) {
            return (state, TickOutcome::Unchanged);
        }
    }

    match store.append(&parsed.artist, &parsed.title).await {
        Ok(track) => {
            log_info!("now playing #{}: {track}", track.id);
            state.last_observed = Some(track.clone());
            (state, TickOutcome::Appended(track))
        }
        Err(err) => {
            log_error!("failed to record {parsed}: {err}");
            (state, TickOutcome::PersistFailed(err))
        }
    }
}

/// The poll action: owns the session state and publishes a fresh
/// [`NowPlayingSnapshot`] after every tick.
pub struct NowPlayingSampler<T: ProcessTable, H: HistoryStore + ?Sized> {
    state: SamplerState,
    locator: ProcessLocator<T>,
    store: Arc<H>,
    title_prefix: String,
    /// Newest tracks of this session, at most `session_limit` of them.
    session_tracks: Vec<Track>,
    session_limit: usize,
    publisher: Arc<watch::Sender<NowPlayingSnapshot>>,
}

impl<T, H> NowPlayingSampler<T, H>
where
    T: ProcessTable,
    H: HistoryStore + ?Sized,
{
    pub fn new(
        state: SamplerState,
        locator: ProcessLocator<T>,
        store: Arc<H>,
        title_prefix: impl Into<String>,
        publisher: Arc<watch::Sender<NowPlayingSnapshot>>,
    ) -> Self {
        Self {
            state,
            locator,
            store,
            title_prefix: title_prefix.into(),
            session_tracks: Vec::new(),
            session_limit: RECENT_LIMIT,
            publisher,
        }
    }

    pub fn with_session_limit(mut self, limit: usize) -> Self {
        self.session_limit = limit.max(1);
        self
    }

    pub fn state(&self) -> &SamplerState {
        &self.state
    }

    pub async fn sample(&mut self) -> TickOutcome {
        let state = mem::take(&mut self.state);
        let (state, outcome) =
            sample_once(state, &mut self.locator, self.store.as_ref(), &self.title_prefix).await;
        self.state = state;

        if let TickOutcome::Appended(track) = &outcome {
            self.session_tracks.push(track.clone());
            let excess = self.session_tracks.len().saturating_sub(self.session_limit);
            self.session_tracks.drain(..excess);
        }
        self.publish(&outcome);
        outcome
    }

    fn publish(&self, outcome: &TickOutcome) {
        let status = outcome.status();
        let target_pid = self.state.target_pid;
        let now_playing = match outcome {
            TickOutcome::Appended(_) | TickOutcome::Unchanged => self.state.last_observed.clone(),
            _ => None,
        };
        let appended = matches!(outcome, TickOutcome::Appended(_));
        let session_tracks = &self.session_tracks;

        self.publisher.send_if_modified(|snapshot| {
            let next_tracks = if appended {
                Arc::new(session_tracks.clone())
            } else {
                Arc::clone(&snapshot.session_tracks)
            };
            let changed = appended
                || snapshot.status != status
                || snapshot.target_pid != target_pid
                || snapshot.now_playing != now_playing;

            snapshot.status = status;
            snapshot.target_pid = target_pid;
            snapshot.now_playing = now_playing;
            snapshot.session_tracks = next_tracks;
            changed
        });
    }
}

#[async_trait]
impl<T, H> PollAction for NowPlayingSampler<T, H>
where
    T: ProcessTable,
    H: HistoryStore + ?Sized + 'static,
{
    async fn tick(&mut self) {
        self.sample().await;
    }
}
