use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{
    helpers::{format_datetime, parse_datetime, required_text, to_i64, to_u64},
    models::Track,
    Database,
};

type TrackRow = (i64, String, String, String);

fn into_track((id, timestamp, artist, title): TrackRow) -> Result<Track> {
    Ok(Track {
        id,
        timestamp: parse_datetime(&timestamp, "timestamp")?,
        artist,
        title,
    })
}

fn read_rows(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Track>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    })?;

    let mut tracks = Vec::new();
    for row in rows {
        tracks.push(into_track(row?)?);
    }
    Ok(tracks)
}

fn last_track(conn: &Connection) -> Result<Option<Track>> {
    conn.query_row(
        "SELECT id, timestamp, artist, title FROM tracks ORDER BY id DESC LIMIT 1",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
    )
    .optional()?
    .map(into_track)
    .transpose()
}

impl Database {
    /// Inserts a record stamped with the current time and returns it once the
    /// transaction has committed.
    pub async fn append_track(&self, artist: &str, title: &str) -> Result<Track> {
        let artist = required_text(artist, "artist")?.to_string();
        let title = required_text(title, "title")?.to_string();

        self.execute(move |conn| {
            let tx = conn.transaction().context("failed to open append transaction")?;

            // Never stamp a record earlier than the one before it, even if the
            // wall clock was stepped back.
            let mut timestamp = Utc::now();
            if let Some(previous) = last_track(&tx)? {
                timestamp = timestamp.max(previous.timestamp);
            }

            tx.execute(
                "INSERT INTO tracks (timestamp, artist, title) VALUES (?1, ?2, ?3)",
                params![format_datetime(&timestamp), artist, title],
            )
            .with_context(|| "failed to insert track")?;
            let id = tx.last_insert_rowid();

            tx.commit().context("failed to commit track")?;

            Ok(Track {
                id,
                // Reparse so the returned value matches what a later read yields
                timestamp: parse_datetime(&format_datetime(&timestamp), "timestamp")?,
                artist,
                title,
            })
        })
        .await
    }

    /// Whole history, oldest first.
    pub async fn get_all_tracks(&self) -> Result<Vec<Track>> {
        self.execute(|conn| {
            read_rows(
                conn,
                "SELECT id, timestamp, artist, title FROM tracks ORDER BY id ASC",
                [],
            )
        })
        .await
    }

    /// The newest `limit` records, oldest first.
    pub async fn get_recent_tracks(&self, limit: usize) -> Result<Vec<Track>> {
        let limit = to_i64(limit)?;
        self.execute(move |conn| {
            let mut tracks = read_rows(
                conn,
                "SELECT id, timestamp, artist, title FROM tracks ORDER BY id DESC LIMIT ?1",
                params![limit],
            )?;
            tracks.reverse();
            Ok(tracks)
        })
        .await
    }

    pub async fn get_last_track(&self) -> Result<Option<Track>> {
        self.execute(|conn| last_track(conn)).await
    }

    pub async fn count_tracks(&self) -> Result<u64> {
        self.execute(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))?;
            to_u64(count, "count")
        })
        .await
    }
}
