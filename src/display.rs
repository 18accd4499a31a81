//! Console rendering of the now-playing snapshot and the history views.

use std::fmt::Write as _;

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::db::Track;
use crate::history::ArtistPlays;
use crate::monitor::{HistoryView, NowPlayingSnapshot, SamplerStatus};

pub fn render_track(track: &Track) -> String {
    format!(
        "#{:<5} {}  {}",
        track.id,
        track.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        track
    )
}

pub fn render_tracks(tracks: &[Track]) -> String {
    if tracks.is_empty() {
        return "No tracks recorded yet.\n".to_string();
    }

    let mut out = String::new();
    for track in tracks {
        let _ = writeln!(out, "{}", render_track(track));
    }
    out
}

pub fn render_ranking(ranking: &[ArtistPlays]) -> String {
    if ranking.is_empty() {
        return "No tracks recorded yet.\n".to_string();
    }

    let width = ranking.len().to_string().len();
    let mut out = String::new();
    for (rank, entry) in ranking.iter().enumerate() {
        let plays = if entry.count == 1 { "play" } else { "plays" };
        let _ = writeln!(
            out,
            "{:>width$}. {} ({} {plays})",
            rank + 1,
            entry.artist,
            entry.count,
        );
    }
    out
}

pub fn render_view(view: &HistoryView) -> String {
    match view {
        HistoryView::RecentSongs(tracks) => render_tracks(tracks),
        HistoryView::MostPlayedArtists(ranking) => render_ranking(ranking),
    }
}

pub fn render_status(snapshot: &NowPlayingSnapshot) -> String {
    let updating = if snapshot.running {
        "updating"
    } else {
        "not updating"
    };
    let mut out = format!("[{updating}]");

    match (&snapshot.status, &snapshot.now_playing) {
        (SamplerStatus::Listening, Some(track)) => {
            let _ = write!(out, " now playing: {track}");
        }
        (status, _) => {
            let text = status.to_string();
            if !text.is_empty() {
                let _ = write!(out, " {text}");
            }
        }
    }
    if let Some(pid) = snapshot.target_pid {
        let _ = write!(out, " (pid {pid})");
    }
    out
}

/// Tracks with an id above `printed`, in order. Everything when `printed` is
/// `None`.
fn tracks_after(tracks: &[Track], printed: Option<i64>) -> Vec<&Track> {
    tracks
        .iter()
        .filter(|t| printed.map_or(true, |id| t.id > id))
        .collect()
}

/// Prints each newly recorded track, in order, and every sampling problem.
pub fn spawn_console_display(mut rx: watch::Receiver<NowPlayingSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_printed_id = rx.borrow().session_tracks.last().map(|t| t.id);
        let mut last_status = rx.borrow().status.clone();

        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();

            let fresh = tracks_after(&snapshot.session_tracks, last_printed_id);
            for track in &fresh {
                println!("{}", render_track(track));
            }
            if let Some(track) = fresh.last() {
                last_printed_id = Some(track.id);
            }

            if snapshot.status != last_status {
                // Start and stop are already echoed by the command that caused them
                if !matches!(
                    snapshot.status,
                    SamplerStatus::Listening | SamplerStatus::Idle | SamplerStatus::Stopped
                ) {
                    println!("{}", snapshot.status);
                }
                last_status = snapshot.status;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn track(id: i64, artist: &str, title: &str) -> Track {
        Track {
            id,
            timestamp: Utc::now(),
            artist: artist.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn track_line_contains_id_and_pair() {
        let line = render_track(&track(7, "Mogwai", "Auto Rock"));
        assert!(line.starts_with("#7 "));
        assert!(line.ends_with("Mogwai – Auto Rock"));
    }

    #[test]
    fn only_tracks_after_the_last_printed_id_are_new() {
        let tracks = vec![track(1, "A", "x"), track(2, "B", "y"), track(3, "A", "z")];

        let ids = |printed| -> Vec<i64> {
            tracks_after(&tracks, printed).iter().map(|t| t.id).collect()
        };
        assert_eq!(ids(None), [1, 2, 3]);
        assert_eq!(ids(Some(1)), [2, 3]);
        assert!(ids(Some(3)).is_empty());
    }

    #[tokio::test]
    async fn display_task_follows_snapshot_updates() {
        let (tx, rx) = watch::channel(NowPlayingSnapshot::default());
        let handle = spawn_console_display(rx);

        tx.send_modify(|s| s.session_tracks = Arc::new(vec![track(1, "A", "x")]));
        tx.send_modify(|s| {
            s.session_tracks = Arc::new(vec![track(1, "A", "x"), track(2, "B", "y")])
        });
        drop(tx);

        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn ranking_is_numbered_and_pluralised() {
        let text = render_ranking(&[
            ArtistPlays {
                artist: "A".into(),
                count: 2,
            },
            ArtistPlays {
                artist: "B".into(),
                count: 1,
            },
        ]);
        assert_eq!(text, "1. A (2 plays)\n2. B (1 play)\n");
    }

    #[test]
    fn empty_views_say_so() {
        assert_eq!(render_tracks(&[]), "No tracks recorded yet.\n");
        assert_eq!(render_ranking(&[]), "No tracks recorded yet.\n");
    }

    #[test]
    fn status_line_shows_current_track_or_message() {
        let playing = NowPlayingSnapshot {
            running: true,
            status: SamplerStatus::Listening,
            target_pid: Some(42),
            now_playing: Some(track(1, "A", "x")),
            session_tracks: Arc::new(vec![]),
        };
        assert_eq!(render_status(&playing), "[updating] now playing: A – x (pid 42)");

        let absent = NowPlayingSnapshot {
            running: true,
            status: SamplerStatus::NotRunning,
            ..NowPlayingSnapshot::default()
        };
        assert_eq!(
            render_status(&absent),
            "[updating] Spotify not running/not playing a song."
        );
    }
}
