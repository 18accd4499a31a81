//! Stored track record.
//!
//! One row per detected track change. Rows are only ever inserted; `id` order
//! is append order and timestamps never decrease along it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::TRACK_SEPARATOR;
use crate::tracks::ParsedTrack;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub artist: String,
    pub title: String,
}

impl Track {
    /// Same artist and title, compared exactly.
    pub fn is_same_as(&self, parsed: &ParsedTrack) -> bool {
        self.artist == parsed.artist && self.title == parsed.title
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.artist, TRACK_SEPARATOR, self.title)
    }
}
