//! Issues one load task per source and reports when all of them have loaded.

use crate::error::{PreloadError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// The host's image-loading primitive.
///
/// `fetch` runs on a loader thread; returning `Ok` marks the image as loaded.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<()>;
}

/// Called once with every handle of a run, in issue order.
pub type CompletionCallback = Arc<dyn Fn(&[ImageHandle]) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
}

struct HandleInner {
    src: String,
    loaded: AtomicBool,
}

/// One image being preloaded. Cloning shares the same underlying load.
#[derive(Clone)]
pub struct ImageHandle {
    inner: Arc<HandleInner>,
}

impl ImageHandle {
    fn new(src: &str) -> Self {
        ImageHandle {
            inner: Arc::new(HandleInner {
                src: src.to_string(),
                loaded: AtomicBool::new(false),
            }),
        }
    }

    pub fn src(&self) -> &str {
        &self.inner.src
    }

    pub fn state(&self) -> LoadState {
        if self.is_loaded() {
            LoadState::Loaded
        } else {
            LoadState::Loading
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.load(Ordering::Acquire)
    }

    /// Loading -> Loaded. Only the first call returns true.
    fn mark_loaded(&self) -> bool {
        self.inner
            .loaded
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("src", &self.src())
            .field("state", &self.state())
            .finish()
    }
}

/// Completion tracking for the handles issued by one run.
pub struct LoadBatch {
    handles: Vec<ImageHandle>,
    loaded: AtomicUsize,
    detached: AtomicBool,
    callback: Mutex<Option<CompletionCallback>>,
}

impl LoadBatch {
    fn new(handles: Vec<ImageHandle>, callback: Option<CompletionCallback>) -> Self {
        LoadBatch {
            handles,
            loaded: AtomicUsize::new(0),
            detached: AtomicBool::new(false),
            callback: Mutex::new(callback),
        }
    }

    pub fn handles(&self) -> &[ImageHandle] {
        &self.handles
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn is_complete(&self) -> bool {
        self.loaded_count() == self.handles.len()
    }

    /// Stops counting: completions arriving afterwards are ignored and the
    /// callback is dropped without being called.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::Release);
        self.callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    fn complete(&self, handle: &ImageHandle) {
        if !handle.mark_loaded() || self.is_detached() {
            return;
        }
        let loaded = self.loaded.fetch_add(1, Ordering::AcqRel) + 1;
        if loaded == self.handles.len() {
            self.finish();
        }
    }

    fn finish(&self) {
        let callback = self
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(callback) = callback {
            callback(&self.handles);
        }
    }
}

impl fmt::Debug for LoadBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadBatch")
            .field("handles", &self.handles.len())
            .field("loaded", &self.loaded_count())
            .field("detached", &self.is_detached())
            .finish()
    }
}

/// Runs fetches on its own rayon pool.
pub struct Loader {
    pool: ThreadPool,
    fetcher: Arc<dyn ImageFetcher>,
}

impl Loader {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, threads: Option<usize>) -> Result<Self> {
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|index| format!("autopreload-{}", index));
        if let Some(threads) = threads {
            builder = builder.num_threads(threads);
        }
        Ok(Loader {
            pool: builder.build()?,
            fetcher,
        })
    }

    /// Creates one handle per source and spawns its fetch. Returns without waiting.
    ///
    /// With no sources the callback runs right away with an empty slice.
    pub fn load(
        &self,
        sources: &[String],
        callback: Option<CompletionCallback>,
    ) -> Arc<LoadBatch> {
        let handles: Vec<ImageHandle> = sources.iter().map(|src| ImageHandle::new(src)).collect();
        let batch = Arc::new(LoadBatch::new(handles, callback));

        if batch.handles.is_empty() {
            batch.finish();
            return batch;
        }

        for handle in batch.handles.iter().cloned() {
            let batch = Arc::clone(&batch);
            let fetcher = Arc::clone(&self.fetcher);
            self.pool.spawn(move || match fetcher.fetch(handle.src()) {
                Ok(()) => batch.complete(&handle),
                Err(err) => log::warn!("Preload of {} failed: {}", handle.src(), err),
            });
        }
        log::info!("Preloading {} images", batch.handles.len());
        batch
    }
}

/// Fetches `file://` sources by reading them from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl ImageFetcher for FileFetcher {
    fn fetch(&self, url: &str) -> Result<()> {
        let Some(path) = url.strip_prefix("file://") else {
            return Err(PreloadError::Fetch {
                url: url.to_string(),
                reason: "only file:// sources can be read".to_string(),
            });
        };
        let bytes = fs::read(path)?;
        log::debug!("Read {} bytes for {}", bytes.len(), url);
        Ok(())
    }
}
