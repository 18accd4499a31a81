//! Turns the player's window title into an artist/title pair.
//!
//! While a track plays the player titles its window
//! `"Spotify - <artist> – <title>"`. The first [`TITLE_LABEL_CHARS`]
//! characters are a fixed label; the rest is split on the first
//! [`TRACK_SEPARATOR`] (an en dash, not an ASCII hyphen, so hyphenated
//! artist names survive).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::settings::{TITLE_LABEL_CHARS, TRACK_SEPARATOR};

/// A track as read from the window title, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedTrack {
    pub artist: String,
    pub title: String,
}

impl ParsedTrack {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

impl fmt::Display for ParsedTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.artist, TRACK_SEPARATOR, self.title)
    }
}

pub fn parse_track_title(raw: &str) -> Result<ParsedTrack, MonitorError> {
    let malformed = || MonitorError::MalformedTrackTitle {
        raw: raw.to_string(),
    };

    // Label length is counted in characters; titles are not ASCII-only.
    let body = match raw.char_indices().nth(TITLE_LABEL_CHARS) {
        Some((offset, _)) => &raw[offset..],
        None => return Err(malformed()),
    };

    let (artist, title) = body.split_once(TRACK_SEPARATOR).ok_or_else(malformed)?;
    let (artist, title) = (artist.trim(), title.trim());
    if artist.is_empty() || title.is_empty() {
        return Err(malformed());
    }

    Ok(ParsedTrack::new(artist, title))
}
