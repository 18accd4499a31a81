use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use tokio::sync::{watch, Mutex};

use crate::{
    db::{Database, Track},
    history::{most_played_artists, ArtistPlays, HistoryStore},
    sensing::{NowPlayingSampler, PollScheduler, ProcessLocator, ProcessTable, SamplerState},
    settings::MonitorSettings,
};

use super::{NowPlayingSnapshot, SamplerStatus, ViewMode};

type Sampler<T> = NowPlayingSampler<T, Database>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "mode", content = "rows")]
pub enum HistoryView {
    RecentSongs(Vec<Track>),
    MostPlayedArtists(Vec<ArtistPlays>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryExport {
    exported_at: DateTime<Utc>,
    tracks: Vec<Track>,
    most_played_artists: Vec<ArtistPlays>,
}

/// Operator-facing handle: start/stop the poll loop and read derived views.
pub struct MonitorController<T: ProcessTable> {
    db: Database,
    scheduler: Arc<Mutex<PollScheduler<Sampler<T>>>>,
    snapshot: Arc<watch::Sender<NowPlayingSnapshot>>,
    settings: Arc<MonitorSettings>,
}

impl<T: ProcessTable> Clone for MonitorController<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            scheduler: Arc::clone(&self.scheduler),
            snapshot: Arc::clone(&self.snapshot),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<T: ProcessTable> MonitorController<T> {
    pub async fn new(db: Database, table: T, settings: MonitorSettings) -> Result<Self> {
        let last = db
            .last()
            .await
            .context("failed to read the newest stored track")?;
        if let Some(track) = &last {
            info!("Resuming after #{}: {track}", track.id);
        }

        let (snapshot_tx, _) = watch::channel(NowPlayingSnapshot::default());
        let snapshot = Arc::new(snapshot_tx);

        let sampler = NowPlayingSampler::new(
            SamplerState::seeded(last),
            ProcessLocator::new(table),
            Arc::new(db.clone()),
            settings.title_prefix.clone(),
            Arc::clone(&snapshot),
        )
        .with_session_limit(settings.recent_limit);
        let scheduler = PollScheduler::new(sampler, settings.poll_interval());

        Ok(Self {
            db,
            scheduler: Arc::new(Mutex::new(scheduler)),
            snapshot,
            settings: Arc::new(settings),
        })
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn subscribe(&self) -> watch::Receiver<NowPlayingSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> NowPlayingSnapshot {
        self.snapshot.borrow().clone()
    }

    pub async fn is_running(&self) -> bool {
        self.scheduler.lock().await.is_running()
    }

    /// Starts polling with an immediate tick. Returns `false` if already
    /// running.
    pub async fn start(&self) -> Result<bool> {
        let mut scheduler = self.scheduler.lock().await;
        if scheduler.is_running() {
            return Ok(false);
        }

        self.snapshot.send_modify(|snapshot| {
            snapshot.running = true;
            if snapshot.status == SamplerStatus::Stopped {
                snapshot.status = SamplerStatus::Idle;
            }
        });

        match scheduler.start() {
            Ok(started) => Ok(started),
            Err(err) => {
                self.snapshot.send_modify(|snapshot| snapshot.running = false);
                Err(err)
            }
        }
    }

    /// Stops polling once the tick in progress, if any, has finished.
    /// Returns `false` if it was not running.
    pub async fn stop(&self) -> Result<bool> {
        let stopped = self.scheduler.lock().await.stop().await?;
        if stopped {
            self.snapshot.send_modify(|snapshot| {
                snapshot.running = false;
                snapshot.status = SamplerStatus::Stopped;
            });
        }
        Ok(stopped)
    }

    /// Flips between running and stopped; returns whether it now runs.
    pub async fn toggle(&self) -> Result<bool> {
        if self.is_running().await {
            self.stop().await?;
            Ok(false)
        } else {
            self.start().await?;
            Ok(true)
        }
    }

    pub async fn view(&self, mode: ViewMode) -> Result<HistoryView> {
        match mode {
            ViewMode::RecentSongs => {
                let tracks = self
                    .db
                    .recent(self.settings.recent_limit)
                    .await
                    .context("failed to load recent tracks")?;
                Ok(HistoryView::RecentSongs(tracks))
            }
            ViewMode::MostPlayedArtists => {
                let history = self
                    .db
                    .all()
                    .await
                    .context("failed to load history")?;
                Ok(HistoryView::MostPlayedArtists(most_played_artists(&history)))
            }
        }
    }

    /// Whole history plus the artist ranking as pretty-printed JSON.
    pub async fn export_json(&self) -> Result<String> {
        let tracks = self
            .db
            .all()
            .await
            .context("failed to load history")?;
        let export = HistoryExport {
            exported_at: Utc::now(),
            most_played_artists: most_played_artists(&tracks),
            tracks,
        };
        serde_json::to_string_pretty(&export).context("failed to serialize history")
    }
}
