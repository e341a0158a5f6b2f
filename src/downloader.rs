//! Batch downloader facade
//!
//! Ties the pipeline together: manifest in, processed session out. The
//! facade is callable synchronously from any async context; callers wanting
//! a responsive surface spawn the run onto a background task and watch the
//! hooks.

use crate::config::{Config, OutputMode};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::packager::ArchivePackager;
use crate::processor::{BatchProcessor, RunHooks, RunResult};
use crate::types::BatchSession;
use chrono::Utc;
use std::path::Path;

/// Batch retrieval entry point
///
/// Owns the validated configuration and the shared HTTP client. One
/// instance can serve multiple runs; each run gets an independent
/// [`BatchSession`]. Concurrent runs against the same output directory are
/// the caller's to serialize.
///
/// # Examples
///
/// ```no_run
/// use ipfs_batch_dl::{BatchDownloader, Config, RunHooks};
/// use std::path::Path;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = BatchDownloader::new(Config::default())?;
///     let hooks = RunHooks::new().on_log(|line| println!("{line}"));
///     let session = downloader
///         .run_csv_path(Path::new("collection.csv"), &hooks)
///         .await?;
///     println!("{}", ipfs_batch_dl::report::summarize(&session));
///     Ok(())
/// }
/// ```
pub struct BatchDownloader {
    config: Config,
    fetcher: Fetcher,
}

impl BatchDownloader {
    /// Validate the configuration and build the shared HTTP client
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(&config.fetch)?;
        tracing::info!(
            gateway = %config.fetch.gateway_base,
            batch_size = config.batch.batch_size,
            mode = ?config.output.mode,
            "Batch downloader initialized"
        );
        Ok(Self { config, fetcher })
    }

    /// The configuration this downloader was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the pipeline over a CSV manifest on disk
    ///
    /// Returns `Err` only when the manifest cannot be read or parsed at
    /// all; everything that happens after the manifest loads is reported
    /// inside the returned session.
    pub async fn run_csv_path(&self, path: &Path, hooks: &RunHooks) -> Result<BatchSession> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            crate::error::Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read manifest '{}': {}", path.display(), e),
            ))
        })?;
        let dataset = Dataset::from_reader(bytes.as_slice())?;
        Ok(self.run_dataset(&dataset, hooks).await)
    }

    /// Run the pipeline over an already-loaded manifest
    ///
    /// Never fails at the API level: structural manifest problems, fetch
    /// failures, and output write failures all end up as counts and log
    /// lines in the session.
    pub async fn run_dataset(&self, dataset: &Dataset, hooks: &RunHooks) -> BatchSession {
        let mut session = BatchSession {
            started_at: Some(Utc::now()),
            total_records: dataset.len(),
            ..Default::default()
        };

        let processor = BatchProcessor::new(&self.config, self.fetcher.clone());
        let run = processor.run(dataset, hooks).await;
        self.deliver_payloads(run, &mut session, hooks).await;

        session.finished_at = Some(Utc::now());
        tracing::info!(
            total = session.total_records,
            success = session.success_count,
            failed = session.fail_count,
            aborted = session.aborted,
            "Batch run finished"
        );
        session
    }

    /// Move fetched payloads to their destination and fold the run's
    /// accounting into the session
    ///
    /// Runs even after a cancellation: whatever was fetched before the stop
    /// still reaches the output, mirroring the best-effort packaging
    /// contract.
    async fn deliver_payloads(
        &self,
        mut run: RunResult,
        session: &mut BatchSession,
        hooks: &RunHooks,
    ) {
        session.processed_count = run.processed_count;
        session.success_count = run.success_count;
        session.fail_count = run.fail_count;
        session.aborted = run.aborted;
        session.log.append(&mut run.log);

        let payloads: Vec<(String, Vec<u8>)> = run
            .outcomes
            .iter_mut()
            .filter_map(|outcome| {
                outcome
                    .payload
                    .take()
                    .map(|bytes| (outcome.filename.clone(), bytes))
            })
            .collect();

        if payloads.is_empty() {
            return;
        }

        match self.config.output.mode {
            OutputMode::Directory => {
                self.write_directory(payloads, session, hooks).await;
            }
            OutputMode::Archive => {
                let packager = ArchivePackager::new(&self.config.output);
                let mut packed = packager.pack(payloads, hooks);
                session.log.append(&mut packed.log);
                session.archives = packed.archives;
            }
        }
    }

    /// Directory mode: one file per payload, last write wins on collisions
    async fn write_directory(
        &self,
        payloads: Vec<(String, Vec<u8>)>,
        session: &mut BatchSession,
        hooks: &RunHooks,
    ) {
        let dir = &self.config.output.output_dir;
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            let line = format!(
                "[ERROR] Cannot create output directory {}: {}",
                dir.display(),
                e
            );
            hooks.emit_log(&line);
            session.log.push(line);
            return;
        }

        for (filename, bytes) in payloads {
            let path = dir.join(&filename);
            if let Err(e) = tokio::fs::write(&path, &bytes).await {
                let line = format!("[ERROR] Failed to write {}: {}", path.display(), e);
                hooks.emit_log(&line);
                session.log.push(line);
            }
        }

        let line = format!("[SYSTEM] Files saved to local folder: {}", dir.display());
        hooks.emit_log(&line);
        session.log.push(line);
        session.output_dir = Some(dir.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{BatchConfig, FetchConfig, OutputConfig};
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, dir: &TempDir, mode: OutputMode) -> Config {
        Config {
            fetch: FetchConfig {
                gateway_base: format!("{}/ipfs/", server.uri()),
                timeout: Duration::from_secs(5),
            },
            batch: BatchConfig {
                batch_size: 2,
                inter_batch_pause: Duration::from_millis(1),
            },
            output: OutputConfig {
                mode,
                output_dir: dir.path().to_path_buf(),
                ..Default::default()
            },
        }
    }

    async fn mount_payload(server: &MockServer, cid: &str, body: &[u8]) {
        Mock::given(method("GET"))
            .and(url_path(format!("/ipfs/{}", cid)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn directory_mode_writes_individual_files() {
        let server = MockServer::start().await;
        mount_payload(&server, "Qm1", b"first").await;
        mount_payload(&server, "Qm2", b"second").await;

        let dir = TempDir::new().unwrap();
        let downloader =
            BatchDownloader::new(config_for(&server, &dir, OutputMode::Directory)).unwrap();

        let manifest = "\
name,unit-name,url,metadata_mime_type
Skull,001,ipfs://Qm1,image/jpeg
Skull,002,ipfs://Qm2,
";
        let dataset = crate::dataset::dataset_from_str(manifest).unwrap();
        let session = downloader.run_dataset(&dataset, &RunHooks::new()).await;

        assert_eq!(session.success_count, 2);
        assert_eq!(session.fail_count, 0);
        assert_eq!(session.output_dir.as_deref(), Some(dir.path()));
        assert_eq!(
            std::fs::read(dir.path().join("Skull_001.jpg")).unwrap(),
            b"first"
        );
        assert_eq!(
            std::fs::read(dir.path().join("Skull_002.png")).unwrap(),
            b"second"
        );
        assert!(session.archives.is_empty());
    }

    #[tokio::test]
    async fn archive_mode_produces_parts() {
        let server = MockServer::start().await;
        mount_payload(&server, "Qm1", b"payload-one").await;
        mount_payload(&server, "Qm2", b"payload-two").await;

        let dir = TempDir::new().unwrap();
        let downloader =
            BatchDownloader::new(config_for(&server, &dir, OutputMode::Archive)).unwrap();

        let manifest = "\
name,unit-name,url
a,1,ipfs://Qm1
b,2,ipfs://Qm2
";
        let dataset = crate::dataset::dataset_from_str(manifest).unwrap();
        let session = downloader.run_dataset(&dataset, &RunHooks::new()).await;

        assert_eq!(session.success_count, 2);
        assert_eq!(session.archives.len(), 1);
        assert_eq!(session.archives[0].member_count, 2);
        assert!(session.archives[0].path.exists());
        assert!(session.output_dir.is_none());
    }

    #[tokio::test]
    async fn colliding_filenames_last_write_wins() {
        let server = MockServer::start().await;
        mount_payload(&server, "Qm1", b"first").await;
        mount_payload(&server, "Qm2", b"second").await;

        let dir = TempDir::new().unwrap();
        let downloader =
            BatchDownloader::new(config_for(&server, &dir, OutputMode::Directory)).unwrap();

        // Both rows derive the same filename
        let manifest = "\
name,unit-name,url
Skull,001,ipfs://Qm1
Skull,001,ipfs://Qm2
";
        let dataset = crate::dataset::dataset_from_str(manifest).unwrap();
        let session = downloader.run_dataset(&dataset, &RunHooks::new()).await;

        assert_eq!(session.success_count, 2);
        assert_eq!(
            std::fs::read(dir.path().join("Skull_001.png")).unwrap(),
            b"second"
        );
    }

    #[tokio::test]
    async fn missing_columns_yield_aborted_session() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let downloader =
            BatchDownloader::new(config_for(&server, &dir, OutputMode::Directory)).unwrap();

        let dataset = crate::dataset::dataset_from_str("name,rarity\nSkull,rare\n").unwrap();
        let session = downloader.run_dataset(&dataset, &RunHooks::new()).await;

        assert!(session.aborted);
        assert_eq!(session.success_count, 0);
        assert_eq!(session.fail_count, 0);
        assert!(session.output_dir.is_none());
        assert!(session.started_at.is_some() && session.finished_at.is_some());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_up_front() {
        let config = Config {
            fetch: FetchConfig {
                gateway_base: "not a url".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(BatchDownloader::new(config).is_err());
    }
}
