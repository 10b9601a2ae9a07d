//! Transports that check for and fetch library datasets.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::constants::comparison::FETCH_WORKER_NAME;
use crate::errors::ReaderError;

/// Filesystem transport rooted at a library directory.
pub mod fs;
/// HTTP transport rooted at a base URL.
#[cfg(feature = "http")]
pub mod http;
/// In-memory transport for tests and embedded libraries.
pub mod memory;

pub use fs::FsTransport;
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use memory::MemoryTransport;

/// Access to manifest and dataset text by library-relative location.
///
/// Implementations report a missing location from `exists` as `Ok(false)`;
/// `Err` means the check itself could not be performed.
pub trait Transport: Send + Sync {
    /// Short description used in logs, e.g. the root path or base URL.
    fn describe(&self) -> String;
    /// Existence check without fetching content.
    fn exists(&self, location: &str) -> Result<bool, ReaderError>;
    /// Fetch the full text at `location`.
    fn fetch_text(&self, location: &str) -> Result<String, ReaderError>;
}

/// Run `job` on a worker thread and wait at most `timeout` for its result.
///
/// On expiry the worker is abandoned: its eventual result is discarded and
/// `ReaderError::Timeout` is returned immediately.
pub fn run_with_timeout<T, F>(display_name: &str, timeout: Duration, job: F) -> Result<T, ReaderError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ReaderError> + Send + 'static,
{
    let (sender, receiver) = mpsc::sync_channel(1);
    let started = Instant::now();
    thread::Builder::new()
        .name(FETCH_WORKER_NAME.to_string())
        .spawn(move || {
            // The receiver is gone once the caller timed out.
            let _ = sender.send(job());
        })?;
    match receiver.recv_timeout(timeout) {
        Ok(result) => {
            debug!(
                display_name,
                elapsed_ms = started.elapsed().as_millis(),
                "bounded fetch finished"
            );
            result
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!(
                "[chapters:fetch] '{}' exceeded {:.1}s; abandoning worker",
                display_name,
                timeout.as_secs_f64()
            );
            Err(ReaderError::Timeout {
                display_name: display_name.to_string(),
                timeout,
            })
        }
        Err(RecvTimeoutError::Disconnected) => Err(ReaderError::FetchFailure {
            display_name: display_name.to_string(),
            reason: "fetch worker stopped before producing a result".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_with_timeout_returns_job_result() {
        let value = run_with_timeout("quick", Duration::from_secs(5), || Ok(7)).unwrap();
        assert_eq!(value, 7);

        let err = run_with_timeout::<(), _>("failing", Duration::from_secs(5), || {
            Err(ReaderError::NoSelection)
        })
        .unwrap_err();
        assert!(matches!(err, ReaderError::NoSelection));
    }

    #[test]
    fn run_with_timeout_surfaces_timeout() {
        let err = run_with_timeout("slow", Duration::from_millis(20), || {
            thread::sleep(Duration::from_millis(500));
            Ok(())
        })
        .unwrap_err();
        match err {
            ReaderError::Timeout {
                display_name,
                timeout,
            } => {
                assert_eq!(display_name, "slow");
                assert_eq!(timeout, Duration::from_millis(20));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn panicking_worker_reports_fetch_failure() {
        let err = run_with_timeout::<(), _>("panics", Duration::from_secs(5), || {
            panic!("worker exploded")
        })
        .unwrap_err();
        assert!(matches!(err, ReaderError::FetchFailure { .. }));
    }
}
