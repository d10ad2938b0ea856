#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal output for the fishing zones CLI.
//!
//! Fetch runs report through [`ProgressCallback`]; this crate backs it
//! with `indicatif` bars. [`init_logger`] routes `log` output through
//! `indicatif-log-bridge` so log lines don't tear the bars.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use fishing_zones_source::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style to switch to once `set_total()` provides a known length.
    bar_style: ProgressStyle,
    /// Requests that failed so far, shown in the bar's prefix.
    failed: AtomicU64,
}

impl IndicatifProgress {
    fn requests(bar: ProgressBar, query: &str) -> Self {
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}: planning requests")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(query.to_string());
        bar.set_prefix("0 failed");

        let bar_style = ProgressStyle::with_template(
            "  {msg:<32} {wide_bar:.cyan/dim} {pos}/{len} requests, {prefix:.red} [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Self {
            bar,
            bar_style,
            failed: AtomicU64::new(0),
        }
    }

    /// Progress over the Overpass requests of one query.
    ///
    /// Spins until [`ProgressCallback::set_total()`] gives the request
    /// count, then shows requests done and how many of them failed.
    #[must_use]
    pub fn requests_bar(multi: &MultiProgress, query: &str) -> Arc<dyn ProgressCallback> {
        Arc::new(Self::requests(multi.add(ProgressBar::new_spinner()), query))
    }

    /// Progress over the queries of a fetch run.
    #[must_use]
    pub fn queries_bar(multi: &MultiProgress, total: u64) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new(total));
        let bar_style = ProgressStyle::with_template(
            "Queries {wide_bar:.green/dim} {pos}/{len} [{elapsed_precise}] {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
        bar.set_style(bar_style.clone());

        Arc::new(Self {
            bar,
            bar_style,
            failed: AtomicU64::new(0),
        })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn request_failed(&self) {
        let failed = self.failed.fetch_add(1, Ordering::Relaxed) + 1;
        self.bar.set_prefix(format!("{failed} failed"));
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge`.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // Already set when called twice (tests).
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    #[test]
    fn failed_requests_are_counted_in_the_prefix() {
        let progress = IndicatifProgress::requests(
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden()),
            "reservoirs",
        );
        progress.set_total(3);
        assert_eq!(progress.bar.prefix(), "0 failed");

        progress.request_failed();
        progress.inc(1);
        progress.request_failed();
        progress.inc(1);

        assert_eq!(progress.bar.prefix(), "2 failed");
        assert_eq!(progress.bar.position(), 2);
        assert_eq!(progress.bar.length(), Some(3));
        assert_eq!(progress.bar.message(), "reservoirs");
    }
}
