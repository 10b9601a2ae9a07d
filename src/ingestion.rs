//! Progressive exposure of a large chapter sequence.
//!
//! State machine per dataset session:
//! - `Idle` → `Loading` when a dataset is selected.
//! - `Loading` → `PartiallyLoaded` after the first window when more remain,
//!   otherwise straight to `FullyLoaded`.
//! - `PartiallyLoaded` grows by up to `batch_size` per `request_more` and
//!   becomes `FullyLoaded` once every chapter is exposed.
//! - Any state → `Idle` on `reset`, discarding all records.
//!
//! The window is append-only: exposed chapters are never re-fetched or
//! re-emitted, and `loaded_count` only grows within a session.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::ChapterRecord;
use crate::errors::ReaderError;

/// Loader lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    /// No dataset selected.
    Idle,
    /// Dataset selected, records not installed yet.
    Loading,
    /// Some chapters remain unexposed.
    PartiallyLoaded,
    /// Every chapter is exposed.
    FullyLoaded,
}

/// Whether a dataset is exposed window-by-window or all at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadMode {
    /// Expose `batch_size` chapters per step.
    Windowed,
    /// Expose every chapter on load.
    Full,
}

/// Materialized prefix of the current dataset.
///
/// `loaded_count <= total_count` and `batch_size > 0` always hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadWindow {
    /// Chapters exposed so far.
    pub loaded_count: usize,
    /// Chapters in the dataset.
    pub total_count: usize,
    /// Chapters exposed per step.
    pub batch_size: usize,
}

impl LoadWindow {
    /// Chapters not yet exposed.
    pub fn remaining(&self) -> usize {
        self.total_count - self.loaded_count
    }

    /// True once every chapter is exposed.
    pub fn is_complete(&self) -> bool {
        self.loaded_count == self.total_count
    }
}

/// Exposes a decoded chapter sequence through a growing window.
#[derive(Debug)]
pub struct ProgressiveLoader {
    batch_size: usize,
    state: LoadState,
    records: Vec<ChapterRecord>,
    loaded: usize,
}

impl ProgressiveLoader {
    /// Create an idle loader exposing `batch_size` chapters per step.
    pub fn new(batch_size: usize) -> Result<Self, ReaderError> {
        if batch_size == 0 {
            return Err(ReaderError::Configuration(
                "loader batch_size must be greater than zero".into(),
            ));
        }
        Ok(Self {
            batch_size,
            state: LoadState::Idle,
            records: Vec::new(),
            loaded: 0,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Chapters exposed per step.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Discard any previous dataset and enter `Loading`.
    pub fn begin(&mut self) {
        self.clear();
        self.state = LoadState::Loading;
    }

    /// Install a decoded dataset and expose its first window.
    ///
    /// Starts a fresh session when called outside `Loading`. Returns the
    /// initially exposed chapters.
    pub fn load(&mut self, records: Vec<ChapterRecord>, mode: LoadMode) -> &[ChapterRecord] {
        if self.state != LoadState::Loading {
            self.begin();
        }
        let total = records.len();
        self.records = records;
        self.loaded = match mode {
            LoadMode::Windowed => self.batch_size.min(total),
            LoadMode::Full => total,
        };
        self.settle();
        debug!(
            total,
            loaded = self.loaded,
            batch_size = self.batch_size,
            state = ?self.state,
            "dataset loaded"
        );
        &self.records[..self.loaded]
    }

    /// Expose up to `batch_size` more chapters.
    ///
    /// Returns only the newly exposed chapters; empty when `Idle`, `Loading`,
    /// or `FullyLoaded`.
    pub fn request_more(&mut self) -> &[ChapterRecord] {
        if self.state != LoadState::PartiallyLoaded {
            return &[];
        }
        let start = self.loaded;
        self.loaded = (start + self.batch_size).min(self.records.len());
        self.settle();
        &self.records[start..self.loaded]
    }

    /// Expose every remaining chapter at once.
    pub fn load_all(&mut self) -> &[ChapterRecord] {
        if self.state != LoadState::PartiallyLoaded {
            return &[];
        }
        let start = self.loaded;
        self.loaded = self.records.len();
        self.settle();
        &self.records[start..self.loaded]
    }

    /// Return to `Idle`, discarding all records.
    pub fn reset(&mut self) {
        self.clear();
        self.state = LoadState::Idle;
    }

    /// Chapters exposed so far.
    pub fn visible(&self) -> &[ChapterRecord] {
        &self.records[..self.loaded]
    }

    /// Current window, once a dataset has been installed.
    pub fn window(&self) -> Option<LoadWindow> {
        match self.state {
            LoadState::Idle | LoadState::Loading => None,
            LoadState::PartiallyLoaded | LoadState::FullyLoaded => Some(LoadWindow {
                loaded_count: self.loaded,
                total_count: self.records.len(),
                batch_size: self.batch_size,
            }),
        }
    }

    fn settle(&mut self) {
        self.state = if self.loaded < self.records.len() {
            LoadState::PartiallyLoaded
        } else {
            LoadState::FullyLoaded
        };
    }

    fn clear(&mut self) {
        self.records = Vec::new();
        self.loaded = 0;
    }
}
