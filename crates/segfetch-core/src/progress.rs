//! Progress notification.
//!
//! A `Progress` handle is called once with the probed total size and then once
//! per chunk of body bytes accepted by any transfer, from whichever thread
//! drives that transfer. Consumers keep their own running totals; a
//! `ProgressTally` does that for the common case.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// One progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Sent before any body byte; `None` when the size is unknown.
    Started { total: Option<u64> },
    /// `bytes` more bytes arrived for segment `index` (`None` for a whole fetch).
    Received { index: Option<usize>, bytes: u64 },
}

/// Shared progress callback. Cheap to clone.
#[derive(Clone)]
pub struct Progress(Arc<dyn Fn(ProgressEvent) + Send + Sync>);

impl Progress {
    pub fn new(f: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        (self.0)(event)
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Progress(..)")
    }
}

/// Running totals fed by a `Progress` handle.
#[derive(Debug, Default)]
pub struct ProgressTally {
    total: Mutex<Option<u64>>,
    bytes_done: AtomicU64,
}

impl ProgressTally {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A `Progress` handle that updates this tally.
    pub fn handle(self: &Arc<Self>) -> Progress {
        let tally = Arc::clone(self);
        Progress::new(move |event| tally.record(event))
    }

    pub fn record(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total } => {
                *self.total.lock().unwrap_or_else(|e| e.into_inner()) = total;
                self.bytes_done.store(0, Ordering::Relaxed);
            }
            ProgressEvent::Received { bytes, .. } => {
                self.bytes_done.fetch_add(bytes, Ordering::Relaxed);
            }
        }
    }

    pub fn bytes_done(&self) -> u64 {
        self.bytes_done.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> Option<u64> {
        *self.total.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fraction complete in [0.0, 1.0]; `None` while the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        match self.total()? {
            0 => Some(1.0),
            total => Some((self.bytes_done() as f64 / total as f64).min(1.0)),
        }
    }
}
