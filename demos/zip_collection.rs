//! Archive mode: package a whole collection into size-bounded ZIP parts.
//!
//! Run with: cargo run --example zip_collection -- collection.csv

use ipfs_batch_dl::{BatchDownloader, Config, OutputConfig, OutputMode, RunHooks, report};
use std::path::Path;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "collection.csv".to_string());

    let config = Config {
        output: OutputConfig {
            mode: OutputMode::Archive,
            output_dir: "packaged".into(),
            archive_stem: "collection".into(),
            max_part_bytes: 50 * 1024 * 1024,
        },
        ..Default::default()
    };

    let downloader = BatchDownloader::new(config)?;

    // Ctrl+C stops the run between records; whatever was already fetched
    // still gets packaged.
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let hooks = RunHooks::new()
        .on_log(|line| println!("{line}"))
        .with_cancel(cancel);

    let session = downloader.run_csv_path(Path::new(&manifest), &hooks).await?;

    println!("{}", report::summarize(&session));
    for part in &session.archives {
        println!("part {} -> {}", part.sequence_index, part.path.display());
    }
    Ok(())
}
