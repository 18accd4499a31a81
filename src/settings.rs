use std::{env, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DATABASE_NAME: &str = "stats.db";
/// Window title prefix of the player while a track is playing.
pub const TITLE_PREFIX: &str = "Spotify - ";
/// Number of leading characters stripped from the title before splitting.
pub const TITLE_LABEL_CHARS: usize = 10;
pub const TRACK_SEPARATOR: char = '–';
pub const RECENT_LIMIT: usize = 20;

pub const DB_PATH_ENV: &str = "SPOTISTATS_DB";
pub const INTERVAL_ENV: &str = "SPOTISTATS_INTERVAL_SECS";
pub const DEBUG_ENV: &str = "SPOTISTATS_DEBUG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSettings {
    pub db_path: PathBuf,
    pub poll_interval_secs: u64,
    pub title_prefix: String,
    pub recent_limit: usize,
    pub debug: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DATABASE_NAME),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            title_prefix: TITLE_PREFIX.to_string(),
            recent_limit: RECENT_LIMIT,
            debug: false,
        }
    }
}

impl MonitorSettings {
    /// Settings from the process environment, plus a message for each
    /// override that was rejected. The caller logs those once logging is up.
    pub fn from_env() -> (Self, Vec<String>) {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Applies overrides from `lookup` on top of the defaults. Bad values are
    /// ignored and reported in the returned list.
    pub fn from_lookup<F>(lookup: F) -> (Self, Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let mut rejected = Vec::new();

        if let Some(path) = lookup(DB_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            settings.db_path = PathBuf::from(path.trim());
        }

        if let Some(raw) = lookup(INTERVAL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs >= 1 => settings.poll_interval_secs = secs,
                _ => rejected.push(format!(
                    "ignoring {INTERVAL_ENV}={raw:?}: expected whole seconds >= 1"
                )),
            }
        }

        settings.debug = lookup(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        (settings, rejected)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
