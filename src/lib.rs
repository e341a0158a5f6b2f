//! # ipfs-batch-dl
//!
//! Batch retrieval library for collections of content-addressed assets:
//! a CSV manifest goes in, gateway-fetched payloads come out, written to a
//! directory or packaged into size-bounded ZIP parts.
//!
//! ## Design Philosophy
//!
//! ipfs-batch-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Callback-driven** - The caller observes progress and log lines
//!   through hooks; the library never owns presentation state
//! - **Sensible defaults** - Works against the public ipfs.io gateway with
//!   zero configuration
//! - **Predictable** - Sequential fetches, deterministic filenames and
//!   archive part boundaries, no hidden retries
//!
//! ## Quick Start
//!
//! ```no_run
//! use ipfs_batch_dl::{BatchDownloader, Config, RunHooks, report};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = BatchDownloader::new(Config::default())?;
//!
//!     let hooks = RunHooks::new()
//!         .on_progress(|fraction| println!("{:.0}%", fraction * 100.0))
//!         .on_log(|line| println!("{line}"));
//!
//!     let session = downloader
//!         .run_csv_path(Path::new("collection.csv"), &hooks)
//!         .await?;
//!
//!     println!("{}", report::summarize(&session));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// CSV manifest ingestion
pub mod dataset;
/// Batch downloader facade
pub mod downloader;
/// Error types
pub mod error;
/// Single-payload gateway retrieval
pub mod fetcher;
/// Output filename derivation
pub mod filename;
/// Size-bounded archive packaging
pub mod packager;
/// Windowed batch processing pipeline
pub mod processor;
/// Session summary rendering
pub mod report;
/// Content-addressed URI resolution
pub mod resolver;
/// Core domain types
pub mod types;

// Re-export commonly used types
pub use config::{BatchConfig, Config, FetchConfig, OutputConfig, OutputMode};
pub use dataset::Dataset;
pub use downloader::BatchDownloader;
pub use error::{Error, FetchError, Result};
pub use packager::{ArchivePackager, PackOutcome};
pub use processor::{BatchProcessor, RunHooks, RunResult};
pub use types::{ArchiveHandle, AssetRecord, BatchSession, FetchOutcome, FetchStatus};
