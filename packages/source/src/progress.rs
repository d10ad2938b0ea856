//! Progress reporting for multi-request fetch runs.
//!
//! The fetch loop reports through [`ProgressCallback`] so that it stays
//! independent of how progress is shown. The CLI plugs in an `indicatif`
//! bar; tests and scripted runs use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a fetch run.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of requests the run will make.
    fn set_total(&self, total: u64);

    /// Marks `delta` more requests as done.
    fn inc(&self, delta: u64);

    /// Shows what is being fetched right now.
    fn set_message(&self, msg: String);

    /// Records a request that failed and was counted as empty.
    fn request_failed(&self) {}

    /// Ends the run with a summary line.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
