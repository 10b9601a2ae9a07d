use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::errors::ReaderError;
use crate::transport::Transport;
use crate::types::Location;

/// In-memory transport for tests and small embedded libraries.
#[derive(Default)]
pub struct MemoryTransport {
    files: HashMap<Location, String>,
    failures: HashMap<Location, String>,
    fetch_delay: Option<Duration>,
    fetches: AtomicUsize,
    checks: AtomicUsize,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` at `location`.
    pub fn with_file(mut self, location: impl Into<Location>, text: impl Into<String>) -> Self {
        self.files.insert(location.into(), text.into());
        self
    }

    /// Fail every access to `location` with `reason`.
    pub fn with_failure(mut self, location: impl Into<Location>, reason: impl Into<String>) -> Self {
        self.failures.insert(location.into(), reason.into());
        self
    }

    /// Sleep for `delay` before answering each fetch.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Number of `fetch_text` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Number of `exists` calls served so far.
    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::Relaxed)
    }

    fn failure(&self, location: &str) -> Option<ReaderError> {
        self.failures
            .get(location)
            .map(|reason| ReaderError::FetchFailure {
                display_name: location.to_string(),
                reason: reason.clone(),
            })
    }
}

impl Transport for MemoryTransport {
    fn describe(&self) -> String {
        format!("memory ({} files)", self.files.len())
    }

    fn exists(&self, location: &str) -> Result<bool, ReaderError> {
        self.checks.fetch_add(1, Ordering::Relaxed);
        if let Some(err) = self.failure(location) {
            return Err(err);
        }
        Ok(self.files.contains_key(location))
    }

    fn fetch_text(&self, location: &str) -> Result<String, ReaderError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.fetch_delay {
            thread::sleep(delay);
        }
        if let Some(err) = self.failure(location) {
            return Err(err);
        }
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| ReaderError::FetchFailure {
                display_name: location.to_string(),
                reason: "HTTP error status 404".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_files_failures_and_counts_calls() {
        let transport = MemoryTransport::new()
            .with_file("stories/a.yaml", "[]")
            .with_failure("stories/broken.yaml", "connection reset");

        assert!(transport.exists("stories/a.yaml").unwrap());
        assert!(!transport.exists("stories/b.yaml").unwrap());
        assert!(transport.exists("stories/broken.yaml").is_err());
        assert_eq!(transport.check_count(), 3);

        assert_eq!(transport.fetch_text("stories/a.yaml").unwrap(), "[]");
        assert!(transport.fetch_text("stories/b.yaml").is_err());
        assert_eq!(transport.fetch_count(), 2);
    }
}
