//! Reader session: the single owner of catalog, loader, and comparison state.
//!
//! Long fetches are split into `begin_*`, a fetch on the pending handle, and
//! `commit_*`, so a host can run the fetch off its event loop. Every `begin_*`
//! (and every other state-replacing action) takes a new session token; a
//! commit carrying a superseded token is rejected without touching state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::alignment::AlignmentReport;
use crate::catalog::{Catalog, CatalogResolver};
use crate::config::ReaderConfig;
use crate::data::{ChapterRecord, MatchResult, StoryDescriptor};
use crate::decode::{DatasetFormat, decode_chapters};
use crate::errors::ReaderError;
use crate::ingestion::{LoadMode, LoadState, LoadWindow, ProgressiveLoader};
use crate::matcher::NormalizedPool;
use crate::transport::{Transport, run_with_timeout};
use crate::types::{DisplayTitle, Location};
use crate::utils::default_raw_ref;

/// Monotonically increasing identifier of a session-changing action.
pub type SessionToken = u64;

/// Shared, immutable raw chapter pool.
pub type RawPool = Arc<Vec<ChapterRecord>>;

fn fetch_dataset(
    transport: &dyn Transport,
    location: &str,
    display_name: &str,
) -> Result<Vec<ChapterRecord>, ReaderError> {
    transport
        .fetch_text(location)
        .and_then(|text| decode_chapters(&text, DatasetFormat::from_location(location), location))
        .map_err(|err| err.with_display_name(display_name))
}

/// A selection whose dataset has not been fetched yet.
#[derive(Clone, Debug)]
pub struct PendingSelection {
    token: SessionToken,
    descriptor: StoryDescriptor,
    location: Location,
}

impl PendingSelection {
    /// Token this selection was started with.
    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// Story being selected.
    pub fn descriptor(&self) -> &StoryDescriptor {
        &self.descriptor
    }

    /// Transport location of the edited dataset.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Fetch and decode the edited dataset.
    pub fn fetch(&self, transport: &dyn Transport) -> Result<Vec<ChapterRecord>, ReaderError> {
        fetch_dataset(transport, &self.location, &self.descriptor.display_title)
    }
}

/// A comparison whose raw pool has not been fetched yet.
#[derive(Clone, Debug)]
pub struct PendingComparison {
    token: SessionToken,
    display_name: DisplayTitle,
    location: Location,
    timeout: Duration,
    cached: Option<RawPool>,
}

impl PendingComparison {
    /// Token this comparison was started with.
    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// Transport location of the raw dataset.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns `true` when the raw pool is already cached and no fetch is needed.
    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Fetch and decode the raw pool, bounded by the configured timeout.
    pub fn fetch(&self, transport: &Arc<dyn Transport>) -> Result<RawPool, ReaderError> {
        if let Some(pool) = &self.cached {
            return Ok(Arc::clone(pool));
        }
        let transport = Arc::clone(transport);
        let location = self.location.clone();
        let display_name = self.display_name.clone();
        run_with_timeout(&self.display_name, self.timeout, move || {
            fetch_dataset(transport.as_ref(), &location, &display_name).map(Arc::new)
        })
    }
}

#[derive(Debug)]
struct Comparison {
    raw_pool: RawPool,
    report: AlignmentReport,
}

#[derive(Debug)]
struct ActiveStory {
    descriptor: StoryDescriptor,
    comparison: Option<Comparison>,
    // Raw pool kept after closing a comparison; dropped with the story.
    cached_pool: Option<RawPool>,
}

/// Align newly exposed edited chapters, narrowing large pools first.
fn extend_report(
    report: &mut AlignmentReport,
    edited: &[ChapterRecord],
    raw_pool: &[ChapterRecord],
    prefilter_threshold: usize,
) {
    if edited.is_empty() {
        return;
    }
    let pool = if raw_pool.len() > prefilter_threshold {
        NormalizedPool::narrowed_for(edited, raw_pool)
    } else {
        NormalizedPool::new(raw_pool)
    };
    debug!(
        edited = edited.len(),
        pool = raw_pool.len(),
        candidates = pool.len(),
        "extending alignment report"
    );
    report.extend(edited, &pool);
}

/// Orchestrates discovery, progressive loading, and comparison for one reader.
pub struct ReaderSession {
    config: ReaderConfig,
    transport: Arc<dyn Transport>,
    resolver: CatalogResolver,
    catalog: Catalog,
    token: SessionToken,
    loader: ProgressiveLoader,
    active: Option<ActiveStory>,
}

impl ReaderSession {
    /// Create a session over `transport` with manifest-then-probe discovery.
    ///
    /// The catalog starts empty; call `refresh_catalog` to populate it.
    pub fn new(transport: Arc<dyn Transport>, config: ReaderConfig) -> Result<Self, ReaderError> {
        config.validate()?;
        let resolver = CatalogResolver::for_library(Arc::clone(&transport), &config);
        let loader = ProgressiveLoader::new(config.batch_size)?;
        Ok(Self {
            config,
            transport,
            resolver,
            catalog: Catalog::default(),
            token: 0,
            loader,
            active: None,
        })
    }

    /// Replace the discovery strategies.
    pub fn with_resolver(mut self, resolver: CatalogResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Session configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Transport used for every fetch.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Run discovery and replace the catalog wholesale.
    pub fn refresh_catalog(&mut self) -> &Catalog {
        self.catalog = self.resolver.discover();
        &self.catalog
    }

    /// Most recently discovered catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Token of the latest session-changing action.
    pub fn current_token(&self) -> SessionToken {
        self.token
    }

    fn next_token(&mut self) -> SessionToken {
        self.token += 1;
        self.token
    }

    fn ensure_current(&self, token: SessionToken) -> Result<(), ReaderError> {
        if token == self.token {
            return Ok(());
        }
        debug!(token, current = self.token, "rejecting superseded commit");
        Err(ReaderError::StaleSession {
            token,
            current: self.token,
        })
    }

    /// Select a story and expose its first window.
    pub fn select(&mut self, file_ref: &str) -> Result<&[ChapterRecord], ReaderError> {
        let pending = self.begin_select(file_ref)?;
        let fetched = pending.fetch(self.transport.as_ref());
        self.commit_select(pending, fetched)
    }

    /// Start selecting a catalog story, discarding the current one.
    pub fn begin_select(&mut self, file_ref: &str) -> Result<PendingSelection, ReaderError> {
        let descriptor = self
            .catalog
            .find(file_ref)
            .cloned()
            .ok_or_else(|| ReaderError::UnknownStory(file_ref.to_string()))?;
        Ok(self.begin_select_descriptor(descriptor))
    }

    /// Start selecting an explicit descriptor, discarding the current story.
    pub fn begin_select_descriptor(&mut self, descriptor: StoryDescriptor) -> PendingSelection {
        let token = self.next_token();
        self.active = None;
        self.loader.begin();
        let location = self.config.layout.story_location(&descriptor.file_ref);
        debug!(token, location = %location, "selection started");
        PendingSelection {
            token,
            descriptor,
            location,
        }
    }

    /// Install a fetched dataset for a pending selection.
    ///
    /// A fetch error resets the session to `Idle` and is returned. A
    /// superseded token yields `StaleSession` and leaves state untouched.
    pub fn commit_select(
        &mut self,
        pending: PendingSelection,
        fetched: Result<Vec<ChapterRecord>, ReaderError>,
    ) -> Result<&[ChapterRecord], ReaderError> {
        self.ensure_current(pending.token)?;
        let records = match fetched {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "[chapters:session] failed to load {}: {}",
                    pending.descriptor.display_title, err
                );
                self.loader.reset();
                self.active = None;
                return Err(err);
            }
        };
        let mode = if self.config.load_policy.windows(pending.descriptor.size_class) {
            LoadMode::Windowed
        } else {
            LoadMode::Full
        };
        info!(
            "[chapters:session] loaded {} ({} chapters, {:?})",
            pending.descriptor.display_title,
            records.len(),
            mode
        );
        self.active = Some(ActiveStory {
            descriptor: pending.descriptor,
            comparison: None,
            cached_pool: None,
        });
        Ok(self.loader.load(records, mode))
    }

    /// Drop the current story and return to `Idle`.
    pub fn deselect(&mut self) {
        self.next_token();
        self.active = None;
        self.loader.reset();
    }

    /// Expose the next window; an open comparison is extended to match.
    pub fn request_more(&mut self) -> &[ChapterRecord] {
        let start = self.loader.visible().len();
        let added = self.loader.request_more().len();
        self.extend_comparison(start, added)
    }

    /// Expose every remaining chapter; an open comparison is extended to match.
    pub fn load_all(&mut self) -> &[ChapterRecord] {
        let start = self.loader.visible().len();
        let added = self.loader.load_all().len();
        self.extend_comparison(start, added)
    }

    fn extend_comparison(&mut self, start: usize, added: usize) -> &[ChapterRecord] {
        let exposed = &self.loader.visible()[start..start + added];
        if let Some(comparison) = self
            .active
            .as_mut()
            .and_then(|active| active.comparison.as_mut())
        {
            extend_report(
                &mut comparison.report,
                exposed,
                &comparison.raw_pool,
                self.config.prefilter_threshold,
            );
        }
        exposed
    }

    /// Fetch the raw counterpart and align the visible chapters against it.
    pub fn compare(&mut self) -> Result<&AlignmentReport, ReaderError> {
        let pending = self.begin_compare()?;
        let fetched = pending.fetch(&self.transport);
        self.commit_compare(pending, fetched)
    }

    /// Start a comparison for the current story.
    pub fn begin_compare(&mut self) -> Result<PendingComparison, ReaderError> {
        let active = self.active.as_ref().ok_or(ReaderError::NoSelection)?;
        let descriptor = &active.descriptor;
        if !descriptor.has_raw_counterpart {
            return Err(ReaderError::NoRawCounterpart(
                descriptor.display_title.clone(),
            ));
        }
        let raw_ref = descriptor
            .raw_file_ref
            .clone()
            .unwrap_or_else(|| default_raw_ref(&descriptor.file_ref));
        let location = self.config.layout.raw_location(&raw_ref);
        let display_name = descriptor.display_title.clone();
        let cached = active.cached_pool.clone();
        let token = self.next_token();
        debug!(
            token,
            location = %location,
            cached = cached.is_some(),
            "comparison started"
        );
        Ok(PendingComparison {
            token,
            display_name,
            location,
            timeout: self.config.raw_fetch_timeout,
            cached,
        })
    }

    /// Align the visible chapters against a fetched raw pool.
    ///
    /// A fetch error closes the comparison and is returned. A superseded
    /// token yields `StaleSession` and leaves state untouched.
    pub fn commit_compare(
        &mut self,
        pending: PendingComparison,
        fetched: Result<RawPool, ReaderError>,
    ) -> Result<&AlignmentReport, ReaderError> {
        self.ensure_current(pending.token)?;
        let active = self.active.as_mut().ok_or(ReaderError::NoSelection)?;
        let raw_pool = match fetched {
            Ok(raw_pool) => raw_pool,
            Err(err) => {
                warn!(
                    "[chapters:session] comparison for {} failed: {}",
                    pending.display_name, err
                );
                active.comparison = None;
                return Err(err);
            }
        };
        if self.config.cache_raw_pool {
            active.cached_pool = Some(Arc::clone(&raw_pool));
        }
        let mut report = AlignmentReport::default();
        extend_report(
            &mut report,
            self.loader.visible(),
            &raw_pool,
            self.config.prefilter_threshold,
        );
        info!(
            "[chapters:session] compared {} chapters of {} against {} raw chapters ({} matched)",
            report.len(),
            pending.display_name,
            raw_pool.len(),
            report.summary.matched()
        );
        let comparison = active.comparison.insert(Comparison { raw_pool, report });
        Ok(&comparison.report)
    }

    /// Close the comparison; the raw pool stays cached for the current story when enabled.
    pub fn close_comparison(&mut self) {
        self.next_token();
        if let Some(active) = self.active.as_mut() {
            active.comparison = None;
        }
    }

    /// Drop the raw pool cached for the current story.
    pub fn clear_raw_cache(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.cached_pool = None;
        }
    }

    /// Loader lifecycle state.
    pub fn state(&self) -> LoadState {
        self.loader.state()
    }

    /// Current window of the selected story.
    pub fn window(&self) -> Option<LoadWindow> {
        self.loader.window()
    }

    /// Chapters exposed so far.
    pub fn visible(&self) -> &[ChapterRecord] {
        self.loader.visible()
    }

    /// Descriptor of the selected story.
    pub fn active_story(&self) -> Option<&StoryDescriptor> {
        self.active.as_ref().map(|active| &active.descriptor)
    }

    /// Returns `true` while a comparison is open.
    pub fn is_comparing(&self) -> bool {
        self.report().is_some()
    }

    /// Report of the open comparison.
    pub fn report(&self) -> Option<&AlignmentReport> {
        self.active
            .as_ref()
            .and_then(|active| active.comparison.as_ref())
            .map(|comparison| &comparison.report)
    }

    /// Visible chapters zipped with their match results.
    pub fn paired(&self) -> Vec<(&ChapterRecord, &MatchResult)> {
        match self.report() {
            Some(report) => self.visible().iter().zip(report.results.iter()).collect(),
            None => Vec::new(),
        }
    }
}
