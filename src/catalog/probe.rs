use std::sync::Arc;

use tracing::{debug, warn};

use super::{Discovery, DiscoveryStrategy};
use crate::config::LibraryLayout;
use crate::constants::catalog::PROBE_STRATEGY;
use crate::data::{SizeClass, StoryDescriptor};
use crate::errors::ReaderError;
use crate::transport::Transport;
use crate::types::FileRef;
use crate::utils::format_story_title;

/// Discovery by existence checks over a fixed list of candidate handles.
///
/// Probed stories never report a raw counterpart.
pub struct ProbeDiscovery {
    transport: Arc<dyn Transport>,
    layout: LibraryLayout,
    candidates: Vec<FileRef>,
}

impl ProbeDiscovery {
    /// Probe `candidates` inside the stories directory of `layout`.
    pub fn new(transport: Arc<dyn Transport>, layout: LibraryLayout, candidates: Vec<FileRef>) -> Self {
        Self {
            transport,
            layout,
            candidates,
        }
    }

    fn descriptor(file_ref: &str) -> StoryDescriptor {
        StoryDescriptor {
            file_ref: file_ref.to_string(),
            display_title: format_story_title(file_ref),
            has_raw_counterpart: false,
            size_class: SizeClass::Normal,
            description: None,
            raw_file_ref: None,
            chapter_count: None,
        }
    }
}

impl DiscoveryStrategy for ProbeDiscovery {
    fn name(&self) -> &str {
        PROBE_STRATEGY
    }

    fn discover(&self) -> Result<Discovery, ReaderError> {
        let mut stories = Vec::new();
        let mut last_error = None;
        let mut failed = 0usize;
        for candidate in &self.candidates {
            let location = self.layout.story_location(candidate);
            match self.transport.exists(&location) {
                Ok(true) => stories.push(Self::descriptor(candidate)),
                Ok(false) => debug!(location = %location, "probe candidate absent"),
                Err(err) => {
                    warn!(
                        "[chapters:probe] existence check failed for {}: {}",
                        location, err
                    );
                    failed += 1;
                    last_error = Some(err);
                }
            }
        }
        if !self.candidates.is_empty()
            && failed == self.candidates.len()
            && let Some(err) = last_error
        {
            return Err(ReaderError::DiscoveryFailure(format!(
                "every existence check on {} failed; last error: {}",
                self.transport.describe(),
                err
            )));
        }
        Ok(Discovery {
            stories,
            has_raw_support: false,
        })
    }
}
