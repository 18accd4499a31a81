use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::db::Track;

pub const NOT_RUNNING_MESSAGE: &str = "Spotify not running/not playing a song.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum SamplerStatus {
    /// Nothing sampled yet.
    Idle,
    Stopped,
    /// The player was found and its title read.
    Listening,
    NotRunning,
    UnrecognisedTitle(String),
    PersistenceFailed(String),
}

impl Default for SamplerStatus {
    fn default() -> Self {
        SamplerStatus::Idle
    }
}

impl fmt::Display for SamplerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerStatus::Idle => f.write_str("Waiting for the first sample."),
            SamplerStatus::Stopped => f.write_str("Updating stopped."),
            SamplerStatus::Listening => f.write_str(""),
            SamplerStatus::NotRunning => f.write_str(NOT_RUNNING_MESSAGE),
            SamplerStatus::UnrecognisedTitle(raw) => {
                write!(f, "Could not read a track from window title \"{raw}\".")
            }
            SamplerStatus::PersistenceFailed(reason) => {
                write!(f, "Could not save track: {reason}")
            }
        }
    }
}

/// What the display reads. The sampler publishes it after each tick and the
/// controller flips `running`; readers only see the latest copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlayingSnapshot {
    pub running: bool,
    pub status: SamplerStatus,
    pub target_pid: Option<u32>,
    pub now_playing: Option<Track>,
    /// Newest tracks appended since the program started, oldest first,
    /// capped at the recent-view limit.
    pub session_tracks: Arc<Vec<Track>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    RecentSongs,
    MostPlayedArtists,
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::RecentSongs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_running_message_matches_player_wording() {
        assert_eq!(
            SamplerStatus::NotRunning.to_string(),
            "Spotify not running/not playing a song."
        );
    }

    #[test]
    fn status_serializes_with_kind_tag() {
        let json = serde_json::to_value(SamplerStatus::UnrecognisedTitle("Spotify - Ad".into()))
            .unwrap();
        assert_eq!(json["kind"], "unrecognisedTitle");
        assert_eq!(json["detail"], "Spotify - Ad");
    }

    #[test]
    fn default_snapshot_is_idle_and_stopped() {
        let snapshot = NowPlayingSnapshot::default();
        assert!(!snapshot.running);
        assert_eq!(snapshot.status, SamplerStatus::Idle);
        assert!(snapshot.session_tracks.is_empty());
    }
}
