//! End-to-end pipeline tests: CSV manifest on disk, mock gateway, real
//! filesystem output.

use ipfs_batch_dl::{
    BatchConfig, BatchDownloader, Config, FetchConfig, OutputConfig, OutputMode, RunHooks, report,
};
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, out_dir: &TempDir, mode: OutputMode, max_part_bytes: u64) -> Config {
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
            output_dir: out_dir.path().to_path_buf(),
            archive_stem: "ipfs_downloads".to_string(),
            max_part_bytes,
        },
    }
}

async fn mount_payload(server: &MockServer, cid: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/ipfs/{}", cid)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

fn write_manifest(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("collection.csv");
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn csv_to_directory_end_to_end() {
    let server = MockServer::start().await;
    mount_payload(&server, "Qm1", b"one".to_vec()).await;
    mount_payload(&server, "Qm2", b"two".to_vec()).await;
    mount_payload(&server, "Qm3", b"three".to_vec()).await;

    let work = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let manifest = write_manifest(
        &work,
        "\
name,unit-name,url,metadata_mime_type,rarity
Cyber Skull,SKULL001,ipfs://Qm1#i,image/jpeg,legendary
Cyber Skull,SKULL002,ipfs://Qm2,image/gif,rare
Cyber Skull,SKULL003,ipfs://Qm3,,common
",
    );

    let downloader =
        BatchDownloader::new(config(&server, &out, OutputMode::Directory, 80 << 20)).unwrap();

    let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let hooks = RunHooks::new().on_log(move |line| sink.lock().unwrap().push(line.to_string()));

    let session = downloader.run_csv_path(&manifest, &hooks).await.unwrap();

    assert_eq!(session.total_records, 3);
    assert_eq!(session.success_count, 3);
    assert_eq!(session.fail_count, 0);
    assert!(!session.aborted);

    // Fragment stripped, extensions inferred, payloads intact
    assert_eq!(
        std::fs::read(out.path().join("Cyber Skull_SKULL001.jpg")).unwrap(),
        b"one"
    );
    assert_eq!(
        std::fs::read(out.path().join("Cyber Skull_SKULL002.gif")).unwrap(),
        b"two"
    );
    assert_eq!(
        std::fs::read(out.path().join("Cyber Skull_SKULL003.png")).unwrap(),
        b"three"
    );

    // The hook saw the same lines the session kept, in the same order
    assert_eq!(*lines.lock().unwrap(), session.log);

    let summary = report::summarize(&session);
    assert!(summary.contains("Successfully downloaded: 3"));
    assert!(summary.contains("Failed: 0"));
}

#[tokio::test]
async fn csv_to_split_archives_end_to_end() {
    let server = MockServer::start().await;
    // Two payloads of 60 bytes against an 80-byte part threshold: one part each
    mount_payload(&server, "Qm1", vec![1u8; 60]).await;
    mount_payload(&server, "Qm2", vec![2u8; 60]).await;

    let work = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let manifest = write_manifest(
        &work,
        "\
name,unit-name,url
a,1,ipfs://Qm1
b,2,ipfs://Qm2
",
    );

    let downloader =
        BatchDownloader::new(config(&server, &out, OutputMode::Archive, 80)).unwrap();
    let session = downloader
        .run_csv_path(&manifest, &RunHooks::new())
        .await
        .unwrap();

    assert_eq!(session.success_count, 2);
    assert_eq!(session.archives.len(), 2);
    assert_eq!(session.archives[0].sequence_index, 1);
    assert_eq!(session.archives[1].sequence_index, 2);

    for (handle, expected_name, fill) in [
        (&session.archives[0], "a_1.png", 1u8),
        (&session.archives[1], "b_2.png", 2u8),
    ] {
        let file = std::fs::File::open(&handle.path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), expected_name);
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, vec![fill; 60]);
    }

    let summary = report::summarize(&session);
    assert!(summary.contains("ipfs_downloads_part1.zip"));
    assert!(summary.contains("ipfs_downloads_part2.zip"));
}

#[tokio::test]
async fn mixed_manifest_accounting_end_to_end() {
    let server = MockServer::start().await;
    mount_payload(&server, "QmOk", b"fine".to_vec()).await;
    Mock::given(method("GET"))
        .and(path("/ipfs/QmGone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let work = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    // One success, one 404, one foreign scheme, one row with a missing field
    let manifest = write_manifest(
        &work,
        "\
name,unit-name,url
good,1,ipfs://QmOk
gone,2,ipfs://QmGone
foreign,3,https://example.com/x.png
incomplete,,ipfs://QmOk
",
    );

    let downloader =
        BatchDownloader::new(config(&server, &out, OutputMode::Directory, 80 << 20)).unwrap();
    let session = downloader
        .run_csv_path(&manifest, &RunHooks::new())
        .await
        .unwrap();

    assert_eq!(session.total_records, 4);
    assert_eq!(session.processed_count, 4);
    assert_eq!(session.success_count, 1);
    assert_eq!(session.fail_count, 1);

    assert!(session.log.iter().any(|l| l.contains("HTTP 404")));
    assert!(
        session
            .log
            .iter()
            .any(|l| l.contains("[WARNING] Skipping non-IPFS URL: https://example.com/x.png"))
    );
    assert!(out.path().join("good_1.png").exists());
}

#[tokio::test]
async fn unreadable_manifest_is_a_hard_error() {
    let out = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let downloader =
        BatchDownloader::new(config(&server, &out, OutputMode::Directory, 80 << 20)).unwrap();

    let missing = out.path().join("does_not_exist.csv");
    let err = downloader
        .run_csv_path(&missing, &RunHooks::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("does_not_exist.csv"));
}

#[tokio::test]
async fn progress_reaches_one_across_windows() {
    let server = MockServer::start().await;
    for cid in ["Qm1", "Qm2", "Qm3", "Qm4", "Qm5"] {
        mount_payload(&server, cid, b"x".to_vec()).await;
    }

    let work = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let manifest = write_manifest(
        &work,
        "\
name,unit-name,url
a,1,ipfs://Qm1
b,2,ipfs://Qm2
c,3,ipfs://Qm3
d,4,ipfs://Qm4
e,5,ipfs://Qm5
",
    );

    let downloader =
        BatchDownloader::new(config(&server, &out, OutputMode::Directory, 80 << 20)).unwrap();

    let fractions: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = fractions.clone();
    let hooks = RunHooks::new().on_progress(move |f| sink.lock().unwrap().push(f));

    downloader.run_csv_path(&manifest, &hooks).await.unwrap();

    let fractions = fractions.lock().unwrap();
    assert_eq!(fractions.len(), 5);
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*fractions.last().unwrap(), 1.0);
}
