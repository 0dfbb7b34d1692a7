use crate::config::{Entries, PreloadConfig};
use crate::error::Result;
use crate::loader::{CompletionCallback, ImageFetcher, ImageHandle, LoadBatch, Loader};
use crate::sheet::sheet_tree::StyleDocument;
use crate::style::tree_walker;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloaderState {
    /// Just constructed or just reset.
    Idle,
    Configured,
    /// Only observable from inside `run`.
    Running,
}

/// Finds state-dependent background images in a document and preloads them.
///
/// Configuration calls return `&mut Self` so they chain:
///
/// ```ignore
/// let handles = preloader.add_selector(".b").ignore_image("big.png").run();
/// ```
pub struct Preloader {
    document: StyleDocument,
    config: PreloadConfig,
    loader: Loader,
    callback: Option<CompletionCallback>,
    sources: Vec<String>,
    batch: Option<Arc<LoadBatch>>,
    state: PreloaderState,
}

impl Preloader {
    pub fn new(document: StyleDocument, fetcher: Arc<dyn ImageFetcher>) -> Result<Self> {
        Self::with_config(document, PreloadConfig::default(), fetcher)
    }

    /// Start from an existing configuration, e.g. one read from YAML.
    pub fn with_config(
        document: StyleDocument,
        config: PreloadConfig,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Result<Self> {
        let loader = Loader::new(fetcher, config.threads)?;
        let state = if config.is_empty() {
            PreloaderState::Idle
        } else {
            PreloaderState::Configured
        };
        Ok(Preloader {
            document,
            config,
            loader,
            callback: None,
            sources: Vec::new(),
            batch: None,
            state,
        })
    }

    pub fn add_selector(&mut self, selectors: impl Into<Entries>) -> &mut Self {
        self.config.selectors.add(selectors);
        self.configured()
    }

    pub fn ignore_selector(&mut self, selectors: impl Into<Entries>) -> &mut Self {
        self.config.selectors.ignore(selectors);
        self.configured()
    }

    pub fn add_image(&mut self, names: impl Into<Entries>) -> &mut Self {
        self.config.images.add(names);
        self.configured()
    }

    pub fn ignore_image(&mut self, names: impl Into<Entries>) -> &mut Self {
        self.config.images.ignore(names);
        self.configured()
    }

    pub fn ignore_file(&mut self, names: impl Into<Entries>) -> &mut Self {
        self.config.files.ignore(names);
        self.configured()
    }

    /// Registers the callback fired once all images of a run have loaded.
    /// A later registration replaces an earlier one.
    pub fn on_completion<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&[ImageHandle]) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self.configured()
    }

    /// Walks the document and returns the sources that `run` would load.
    pub fn get_sources(&mut self) -> Vec<String> {
        self.sources = tree_walker::collect_sources(&self.document, &self.config);
        self.sources.clone()
    }

    /// Collects sources and starts loading them. Returns the handles immediately.
    pub fn run(&mut self) -> Vec<ImageHandle> {
        let previous = self.state;
        self.state = PreloaderState::Running;

        self.detach_batch();
        self.get_sources();
        let batch = self.loader.load(&self.sources, self.callback.clone());
        let handles = batch.handles().to_vec();
        self.batch = Some(batch);

        self.state = previous;
        handles
    }

    /// Forgets every user entry, the sources, and the callback. Loads still in
    /// flight finish but no longer count.
    pub fn reset(&mut self) -> &mut Self {
        self.detach_batch();
        self.config.clear();
        self.sources.clear();
        self.callback = None;
        self.state = PreloaderState::Idle;
        self
    }

    pub fn state(&self) -> PreloaderState {
        self.state
    }

    pub fn config(&self) -> &PreloadConfig {
        &self.config
    }

    pub fn document(&self) -> &StyleDocument {
        &self.document
    }

    /// The document is read at every `get_sources`/`run`, so edits show up there.
    pub fn document_mut(&mut self) -> &mut StyleDocument {
        &mut self.document
    }

    /// Sources found by the last `get_sources` or `run`.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Images of the current run that have loaded so far.
    pub fn loaded_count(&self) -> usize {
        self.batch.as_ref().map_or(0, |batch| batch.loaded_count())
    }

    fn configured(&mut self) -> &mut Self {
        self.state = PreloaderState::Configured;
        self
    }

    fn detach_batch(&mut self) {
        if let Some(batch) = self.batch.take() {
            batch.detach();
        }
    }
}
