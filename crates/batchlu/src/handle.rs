//! Library handle and its execution stream.

use batchlu_core::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Default batch size from which instances fan out over the thread pool.
pub const DEFAULT_PARALLEL_MIN_BATCH: usize = 16;

const MAX_ALLOCATION: usize = isize::MAX as usize;

/// Configuration for a [`Handle`].
#[derive(Debug, Clone)]
pub struct HandleConfig {
    /// Minimum batch count before instances run in parallel.
    pub parallel_min_batch: usize,
    /// Cap on workspace bytes live at once, `None` for unlimited.
    pub memory_limit: Option<usize>,
    /// Record every launch on the stream.
    pub trace_launches: bool,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            parallel_min_batch: DEFAULT_PARALLEL_MIN_BATCH,
            memory_limit: None,
            trace_launches: false,
        }
    }
}

impl HandleConfig {
    pub fn with_parallel_min_batch(mut self, min_batch: usize) -> Self {
        self.parallel_min_batch = min_batch;
        self
    }

    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    pub fn with_trace_launches(mut self, enabled: bool) -> Self {
        self.trace_launches = enabled;
        self
    }
}

/// One recorded kernel launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Launch {
    pub kernel: &'static str,
    pub grid: [usize; 3],
}

/// Ordered execution queue.
///
/// Launches run on the calling thread and complete before [`Stream::launch`]
/// returns, so issue order is execution order.
#[derive(Debug)]
pub struct Stream {
    closed: AtomicBool,
    tracing: bool,
    trace: Mutex<Vec<Launch>>,
}

impl Stream {
    fn new(tracing: bool) -> Self {
        Self {
            closed: AtomicBool::new(false),
            tracing,
            trace: Mutex::new(Vec::new()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Tear the stream down. Every later call on the owning handle fails
    /// with `InvalidHandle`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Wait for all queued work.
    pub fn synchronize(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::InvalidHandle);
        }
        Ok(())
    }

    /// Run `kernel` over `grid`.
    pub(crate) fn launch<R>(
        &self,
        kernel: &'static str,
        grid: [usize; 3],
        f: impl FnOnce() -> R,
    ) -> Result<R> {
        if self.is_closed() {
            return Err(Error::InvalidHandle);
        }
        log::trace!("launch {kernel} grid={grid:?}");
        if self.tracing {
            self.trace
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(Launch { kernel, grid });
        }
        Ok(f())
    }

    /// Launches recorded so far (empty unless tracing is enabled).
    pub fn launches(&self) -> Vec<Launch> {
        self.trace
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_launches(&self) {
        self.trace
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Library handle: configuration, stream and workspace accounting.
#[derive(Debug)]
pub struct Handle {
    config: HandleConfig,
    stream: Stream,
    in_use: AtomicUsize,
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl Handle {
    pub fn new() -> Self {
        Self::with_config(HandleConfig::default())
    }

    pub fn with_config(config: HandleConfig) -> Self {
        let stream = Stream::new(config.trace_launches);
        Self {
            config,
            stream,
            in_use: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &HandleConfig {
        &self.config
    }

    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    /// Workspace bytes currently allocated against this handle.
    pub fn memory_in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.stream.is_closed() {
            Err(Error::InvalidHandle)
        } else {
            Ok(())
        }
    }

    /// Reserve `bytes` against the memory limit.
    ///
    /// Without a configured limit the ceiling is `isize::MAX`, the largest
    /// allocation the global allocator accepts.
    pub(crate) fn charge(&self, bytes: usize) -> Result<()> {
        let cap = self
            .config
            .memory_limit
            .map_or(MAX_ALLOCATION, |limit| limit.min(MAX_ALLOCATION));
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(bytes).filter(|&next| next <= cap)
            })
            .map(|_| ())
            .map_err(|used| Error::MemoryError {
                requested: bytes,
                available: cap.saturating_sub(used),
            })
    }

    pub(crate) fn release(&self, bytes: usize) {
        self.in_use.fetch_sub(bytes, Ordering::AcqRel);
    }

    /// Whether a launch over `batch` instances fans out in parallel.
    pub(crate) fn fan_out(&self, kernel: &str, batch: usize) -> bool {
        let parallel = cfg!(feature = "parallel") && batch >= self.config.parallel_min_batch;
        log::debug!("{kernel}: {batch} instances, parallel={parallel}");
        parallel
    }
}
