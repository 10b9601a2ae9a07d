use std::io;
use std::time::Duration;

use thiserror::Error;

/// Error type for discovery, fetch, decode, and session failures.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Every discovery strategy failed.
    #[error("story discovery failed: {0}")]
    DiscoveryFailure(String),
    /// Transport-level failure fetching a dataset.
    #[error("failed to fetch '{display_name}': {reason}")]
    FetchFailure {
        display_name: String,
        reason: String,
    },
    /// Fetched text is not a valid chapter sequence.
    #[error("'{display_name}' is not a valid chapter sequence: {details}")]
    DecodeFailure {
        display_name: String,
        details: String,
    },
    /// A bounded fetch exceeded its timeout.
    #[error("fetching '{display_name}' took longer than {}s", timeout.as_secs())]
    Timeout {
        display_name: String,
        timeout: Duration,
    },
    /// The requested story is not in the catalog.
    #[error("story '{0}' is not in the catalog")]
    UnknownStory(String),
    /// Comparison requested for a story without a raw dataset.
    #[error("story '{0}' has no raw counterpart to compare against")]
    NoRawCounterpart(String),
    /// Operation requires a selected story.
    #[error("no story is selected")]
    NoSelection,
    /// Commit for an action superseded by a newer one.
    #[error("session {token} was superseded by session {current}")]
    StaleSession { token: u64, current: u64 },
    /// Local filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ReaderError {
    /// Replace the transport-level name in fetch/decode/timeout errors with a display name.
    pub fn with_display_name(self, name: &str) -> Self {
        match self {
            Self::FetchFailure { reason, .. } => Self::FetchFailure {
                display_name: name.to_string(),
                reason,
            },
            Self::DecodeFailure { details, .. } => Self::DecodeFailure {
                display_name: name.to_string(),
                details,
            },
            Self::Timeout { timeout, .. } => Self::Timeout {
                display_name: name.to_string(),
                timeout,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_display_name_relabels_transport_errors_only() {
        let fetch = ReaderError::FetchFailure {
            display_name: "stories/a.yaml".into(),
            reason: "HTTP 404".into(),
        }
        .with_display_name("Story A");
        assert_eq!(fetch.to_string(), "failed to fetch 'Story A': HTTP 404");

        let timeout = ReaderError::Timeout {
            display_name: "raw/a.yaml".into(),
            timeout: Duration::from_secs(60),
        }
        .with_display_name("Story A");
        assert_eq!(timeout.to_string(), "fetching 'Story A' took longer than 60s");

        let untouched = ReaderError::NoSelection.with_display_name("Story A");
        assert!(matches!(untouched, ReaderError::NoSelection));
    }
}
