use std::time::Duration;

use tracing::debug;
use ureq::Agent;

use crate::errors::ReaderError;
use crate::transport::Transport;

/// Upper bound for a single response body; raw pools can be tens of megabytes.
const MAX_BODY_BYTES: u64 = 512 * 1024 * 1024;

/// Blocking HTTP transport resolving locations against a base URL.
pub struct HttpTransport {
    base_url: String,
    agent: Agent,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for `base_url` whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            base_url: base_url.into(),
            agent: Agent::new_with_config(config),
            timeout,
        }
    }

    /// Absolute URL for a library-relative location.
    pub fn url_for(&self, location: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            location.trim_start_matches('/')
        )
    }

    fn map_error(&self, location: &str, err: ureq::Error) -> ReaderError {
        match err {
            ureq::Error::StatusCode(status) => ReaderError::FetchFailure {
                display_name: location.to_string(),
                reason: format!("HTTP error status {status}"),
            },
            ureq::Error::Timeout(_) => ReaderError::Timeout {
                display_name: location.to_string(),
                timeout: self.timeout,
            },
            other => ReaderError::FetchFailure {
                display_name: location.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl Transport for HttpTransport {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn exists(&self, location: &str) -> Result<bool, ReaderError> {
        let url = self.url_for(location);
        match self.agent.head(&url).call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::StatusCode(status)) => {
                debug!(url = %url, status, "existence check returned non-success status");
                Ok(false)
            }
            Err(err) => Err(self.map_error(location, err)),
        }
    }

    fn fetch_text(&self, location: &str) -> Result<String, ReaderError> {
        let url = self.url_for(location);
        let mut response = self
            .agent
            .get(&url)
            .call()
            .map_err(|err| self.map_error(location, err))?;
        response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(|err| self.map_error(location, err))
    }
}
