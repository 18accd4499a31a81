//! The append-only play history as seen by the sampler and the views.

mod aggregator;

pub use aggregator::{most_played_artists, ArtistPlays};

use async_trait::async_trait;

use crate::db::{Database, Track};
use crate::error::MonitorError;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persists a new record. Once this returns `Ok` the record is durable.
    async fn append(&self, artist: &str, title: &str) -> Result<Track, MonitorError>;

    /// Every record in append order.
    async fn all(&self) -> Result<Vec<Track>, MonitorError>;

    /// The newest `limit` records, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<Track>, MonitorError>;

    async fn last(&self) -> Result<Option<Track>, MonitorError>;
}

#[async_trait]
impl HistoryStore for Database {
    async fn append(&self, artist: &str, title: &str) -> Result<Track, MonitorError> {
        Ok(self.append_track(artist, title).await?)
    }

    async fn all(&self) -> Result<Vec<Track>, MonitorError> {
        Ok(self.get_all_tracks().await?)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Track>, MonitorError> {
        Ok(self.get_recent_tracks(limit).await?)
    }

    async fn last(&self) -> Result<Option<Track>, MonitorError> {
        Ok(self.get_last_track().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store(dir: &TempDir) -> Database {
        Database::new(dir.path().join("stats.db")).unwrap()
    }

    #[tokio::test]
    async fn database_reads_follow_append_order() {
        let dir = TempDir::new().unwrap();
        let db = store(&dir).await;
        assert_eq!(HistoryStore::last(&db).await.unwrap(), None);

        let first = HistoryStore::append(&db, "A", "x").await.unwrap();
        let second = HistoryStore::append(&db, "B", "y").await.unwrap();

        assert_eq!(HistoryStore::all(&db).await.unwrap(), vec![first, second.clone()]);
        assert_eq!(HistoryStore::recent(&db, 1).await.unwrap(), vec![second.clone()]);
        assert_eq!(HistoryStore::last(&db).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn database_failures_surface_as_persistence_errors() {
        let dir = TempDir::new().unwrap();
        let db = store(&dir).await;
        db.execute(|conn| {
            conn.execute_batch("DROP TABLE tracks")?;
            Ok(())
        })
        .await
        .unwrap();

        let append = HistoryStore::append(&db, "A", "x").await;
        assert!(matches!(append, Err(MonitorError::Persistence(_))), "{append:?}");
        assert!(matches!(
            HistoryStore::all(&db).await,
            Err(MonitorError::Persistence(_))
        ));
        assert!(matches!(
            HistoryStore::last(&db).await,
            Err(MonitorError::Persistence(_))
        ));
    }
}
