//! Minimal usage: fetch a CSV manifest into a local directory.
//!
//! Run with: cargo run --example basic_fetch -- collection.csv

use ipfs_batch_dl::{BatchDownloader, Config, RunHooks, report};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let manifest = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "collection.csv".to_string());

    let downloader = BatchDownloader::new(Config::default())?;

    let hooks = RunHooks::new()
        .on_progress(|fraction| print!("\rprogress: {:>3.0}%", fraction * 100.0))
        .on_log(|line| println!("{line}"));

    let session = downloader.run_csv_path(Path::new(&manifest), &hooks).await?;

    println!();
    println!("{}", report::summarize(&session));
    Ok(())
}
