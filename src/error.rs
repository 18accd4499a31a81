use thiserror::Error;

/// Recoverable conditions raised while sampling the player. None of these
/// stop the poll loop; they are turned into a status for the display.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("no process with a window title starting with \"{prefix}\"")]
    TargetNotFound { prefix: String },

    #[error("process {pid} has no window any more")]
    TargetVanished { pid: u32 },

    #[error("window title \"{raw}\" is not an artist/title pair")]
    MalformedTrackTitle { raw: String },

    #[error("history store failure: {0}")]
    Persistence(String),
}

impl From<anyhow::Error> for MonitorError {
    fn from(err: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line
        MonitorError::Persistence(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn malformed_title_display() {
        let e = MonitorError::MalformedTrackTitle {
            raw: "Spotify - Advertisement".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "window title \"Spotify - Advertisement\" is not an artist/title pair"
        );
    }

    #[test]
    fn vanished_display() {
        let e = MonitorError::TargetVanished { pid: 4242 };
        assert_eq!(e.to_string(), "process 4242 has no window any more");
    }

    #[test]
    fn anyhow_error_becomes_persistence_with_context() {
        let err: anyhow::Result<()> =
            Err(anyhow::anyhow!("disk I/O error")).context("failed to insert track");
        let converted: MonitorError = err.unwrap_err().into();
        assert_eq!(
            converted,
            MonitorError::Persistence("failed to insert track: disk I/O error".to_string())
        );
    }
}
