use std::path::Path;
use std::time::Duration;

use bytesize::ByteSize;

use benchblob_cli::config::{Config, StrategyChoice};
use benchblob_cli::pipeline;
use benchblob_service::resume::MARKER_FILE;

fn test_config(output_dir: &Path) -> Config {
    Config {
        output_dir: output_dir.to_path_buf(),
        sizes: vec![ByteSize::kib(64), ByteSize::kib(256)],
        strategy: StrategyChoice::Rng,
        chunk_size: ByteSize::kib(16),
        reserve: ByteSize::b(0),
        progress_interval: Duration::from_secs(5),
        ..Config::default()
    }
}

#[tokio::test]
async fn generate_produces_files_and_index() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    pipeline::generate(&config).await.unwrap();

    let small = std::fs::metadata(dir.path().join("64KiB.bin")).unwrap();
    let large = std::fs::metadata(dir.path().join("256KiB.bin")).unwrap();
    assert_eq!(small.len(), 64 * 1024);
    assert_eq!(large.len(), 256 * 1024);

    let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(html.contains("64KiB.bin"));
    assert!(html.contains("256KiB.bin"));

    let manifest = std::fs::read_to_string(dir.path().join("manifest.txt")).unwrap();
    assert_eq!(manifest.lines().count(), 2);

    // A finished run leaves no resume marker behind.
    assert!(!dir.path().join(MARKER_FILE).exists());

    pipeline::verify(&config).await.unwrap();
}

#[tokio::test]
async fn generate_regenerates_a_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    pipeline::generate(&config).await.unwrap();

    let path = dir.path().join("64KiB.bin");
    std::fs::write(&path, b"truncated").unwrap();
    assert!(pipeline::verify(&config).await.is_err());

    pipeline::generate(&config).await.unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 64 * 1024);
    pipeline::verify(&config).await.unwrap();
}

#[tokio::test]
async fn generate_reuses_complete_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    pipeline::generate(&config).await.unwrap();
    let before = std::fs::read(dir.path().join("64KiB.bin")).unwrap();

    // A second run reuses complete files instead of rewriting them.
    pipeline::generate(&config).await.unwrap();
    let after = std::fs::read(dir.path().join("64KiB.bin")).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn verify_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    assert!(pipeline::verify(&config).await.is_err());
}

#[tokio::test]
async fn clean_removes_everything() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    pipeline::generate(&config).await.unwrap();
    pipeline::clean(&config).await.unwrap();

    assert!(!dir.path().join("64KiB.bin").exists());
    assert!(!dir.path().join("256KiB.bin").exists());
    assert!(!dir.path().join("index.html").exists());
    assert!(!dir.path().join("manifest.txt").exists());
    assert!(!dir.path().join(MARKER_FILE).exists());

    // Cleaning an already clean directory is fine.
    pipeline::clean(&config).await.unwrap();
}
