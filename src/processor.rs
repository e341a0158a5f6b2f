//! Windowed batch processing pipeline
//!
//! Drives the fetcher across a manifest in fixed-size windows, keeping
//! per-record success/failure accounting and reporting progress and log
//! lines through caller-supplied hooks. Windowing is pacing only: records
//! are processed sequentially in manifest order regardless of window size.

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::FetchError;
use crate::fetcher::Fetcher;
use crate::filename::derive_filename;
use crate::resolver::resolve;
use crate::types::{FetchOutcome, FetchStatus, LogFn, ProgressFn};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Caller-supplied observation hooks for a run
///
/// The library never owns presentation state; progress fractions and
/// user-visible log lines flow out through these callbacks, and an optional
/// cancellation token flows in. All hooks are optional.
///
/// # Examples
///
/// ```
/// use ipfs_batch_dl::RunHooks;
///
/// let hooks = RunHooks::new()
///     .on_progress(|fraction| println!("{:.0}%", fraction * 100.0))
///     .on_log(|line| println!("{line}"));
/// ```
#[derive(Default)]
pub struct RunHooks {
    progress: Option<Box<ProgressFn>>,
    log: Option<Box<LogFn>>,
    cancel: Option<CancellationToken>,
}

impl RunHooks {
    /// Hooks that observe nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the progress callback, called with `processed / total` after
    /// every record (skipped rows included)
    #[must_use]
    pub fn on_progress(mut self, f: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// Set the log callback, called once per user-visible line
    #[must_use]
    pub fn on_log(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.log = Some(Box::new(f));
        self
    }

    /// Attach a cancellation token, checked between records
    ///
    /// Cancellation stops the run before the next record starts; the
    /// in-flight fetch is bounded by the fetch timeout.
    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn emit_progress(&self, fraction: f64) {
        if let Some(f) = &self.progress {
            f(fraction);
        }
    }

    pub(crate) fn emit_log(&self, line: &str) {
        if let Some(f) = &self.log {
            f(line);
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }
}

/// Accounting produced by one [`BatchProcessor::run`]
#[derive(Debug, Default)]
pub struct RunResult {
    /// Records fetched successfully
    pub success_count: usize,
    /// Records whose fetch failed
    pub fail_count: usize,
    /// Records seen, skipped rows included
    pub processed_count: usize,
    /// Total manifest rows
    pub total_records: usize,
    /// Per-record outcomes, in manifest order (skipped-field rows excluded)
    pub outcomes: Vec<FetchOutcome>,
    /// User-visible log lines, in emission order
    pub log: Vec<String>,
    /// Whether the run stopped early (missing columns or cancellation)
    pub aborted: bool,
}

/// The batch pipeline: manifest in, outcomes out
pub struct BatchProcessor {
    fetcher: Fetcher,
    gateway_base: String,
    batch_size: usize,
    inter_batch_pause: Duration,
}

impl BatchProcessor {
    /// Build a processor from the run configuration and a fetch client
    pub fn new(config: &Config, fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            gateway_base: config.fetch.gateway_base.clone(),
            batch_size: config.batch.batch_size.max(1),
            inter_batch_pause: config.batch.inter_batch_pause,
        }
    }

    /// Process every manifest row, sequentially, in windows of `batch_size`
    ///
    /// Validates the required columns before touching any row; a
    /// structurally invalid manifest yields zero counts, an error log line
    /// naming the missing columns, and `aborted = true`. Row-level failures
    /// never stop the run.
    pub async fn run(&self, dataset: &Dataset, hooks: &RunHooks) -> RunResult {
        let mut result = RunResult {
            total_records: dataset.len(),
            ..Default::default()
        };

        let missing = dataset.missing_required_columns();
        if !missing.is_empty() {
            self.emit(
                &mut result,
                hooks,
                &format!(
                    "[ERROR] CSV is missing required columns: {}",
                    missing.join(", ")
                ),
            );
            result.aborted = true;
            return result;
        }

        let total = dataset.len();
        self.emit(
            &mut result,
            hooks,
            &format!(
                "[INFO] Processing {} items in batches of {}",
                total, self.batch_size
            ),
        );

        let window_count = total.div_ceil(self.batch_size);
        'windows: for (window_index, window) in
            dataset.records().chunks(self.batch_size).enumerate()
        {
            let window_start = window_index * self.batch_size;
            let window_end = window_start + window.len();
            self.emit(
                &mut result,
                hooks,
                &format!(
                    "[BATCH] Processing items {}-{} of {}",
                    window_start + 1,
                    window_end,
                    total
                ),
            );

            for record in window {
                if hooks.is_cancelled() {
                    let message = format!(
                        "[CANCELLED] Run cancelled after {} of {} items",
                        result.processed_count, total
                    );
                    self.emit(&mut result, hooks, &message);
                    result.aborted = true;
                    break 'windows;
                }

                result.processed_count += 1;
                hooks.emit_progress(result.processed_count as f64 / total as f64);

                if !record.has_required_fields() {
                    tracing::debug!(
                        row = result.processed_count,
                        "Skipping row with missing required fields"
                    );
                    continue;
                }

                let filename = derive_filename(record);

                let Some(url) = resolve(&record.source_uri, &self.gateway_base) else {
                    self.emit(
                        &mut result,
                        hooks,
                        &format!("[WARNING] Skipping non-IPFS URL: {}", record.source_uri),
                    );
                    result.outcomes.push(FetchOutcome {
                        filename,
                        status: FetchStatus::SkippedScheme,
                        payload: None,
                    });
                    continue;
                };

                self.emit(
                    &mut result,
                    hooks,
                    &format!("[DOWNLOAD] Retrieving: {}", filename),
                );

                match self.fetcher.fetch(&url).await {
                    Ok(payload) => {
                        result.success_count += 1;
                        self.emit(
                            &mut result,
                            hooks,
                            &format!("[SUCCESS] Downloaded: {}", filename),
                        );
                        result.outcomes.push(FetchOutcome {
                            filename,
                            status: FetchStatus::Success,
                            payload: Some(payload),
                        });
                    }
                    Err(err) => {
                        result.fail_count += 1;
                        self.emit(
                            &mut result,
                            hooks,
                            &format!(
                                "[ERROR] Failed to download {}: {}",
                                record.source_uri, err
                            ),
                        );
                        result.outcomes.push(FetchOutcome {
                            filename,
                            status: fetch_error_status(err),
                            payload: None,
                        });
                    }
                }
            }

            let message = format!(
                "[BATCH_COMPLETE] Batch {} finished. Success: {}, Failed: {}",
                window_index + 1,
                result.success_count,
                result.fail_count
            );
            self.emit(&mut result, hooks, &message);

            // Pause between windows only; nothing to pace after the last one
            if window_index + 1 < window_count {
                tokio::time::sleep(self.inter_batch_pause).await;
            }
        }

        if !result.aborted {
            self.emit(
                &mut result,
                hooks,
                &format!("[ALL_BATCHES_COMPLETE] All {} items processed", total),
            );
        }

        result
    }

    /// Append a log line and forward it to the log hook
    fn emit(&self, result: &mut RunResult, hooks: &RunHooks, line: &str) {
        tracing::debug!(line, "batch log");
        result.log.push(line.to_string());
        hooks.emit_log(line);
    }
}

/// Map a fetch error onto the outcome status taxonomy
fn fetch_error_status(err: FetchError) -> FetchStatus {
    match err {
        FetchError::Http { status } => FetchStatus::Http(status),
        FetchError::Timeout => FetchStatus::Timeout,
        FetchError::Network(reason) => FetchStatus::Network(reason),
    }
}
