//! Integration tests: download and verification runs against a local HTTP server.
//!
//! Each test writes a manifest, serves some of its files, runs an entry point
//! through the real curl transport and checks outcomes, files on disk and
//! report files.

mod common;

use bulkfetch_core::checksum::md5_path;
use bulkfetch_core::config::{FetchConfig, HttpConfig};
use bulkfetch_core::fetch::{CurlTransport, FailureKind, Transport};
use bulkfetch_core::pipeline::{run_download, run_verify, RunOptions};
use bulkfetch_core::report::{write_reports, RunMode};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::tempdir;

const HEADER: &str = "fileMD5,fileURL";

fn md5_hex(data: &[u8]) -> String {
    let dir = tempdir().unwrap();
    let p = dir.path().join("blob");
    fs::write(&p, data).unwrap();
    md5_path(&p).unwrap()
}

fn body(i: usize) -> Vec<u8> {
    format!("netcdf payload #{}\n", i).repeat(100 + i).into_bytes()
}

fn write_manifest(dir: &Path, rows: &[(String, String)]) -> PathBuf {
    let mut text = format!("{}\n", HEADER);
    for (sum, url) in rows {
        text.push_str(&format!("{},{}\n", sum, url));
    }
    let path = dir.join("files.csv");
    fs::write(&path, text).unwrap();
    path
}

fn config(root: &Path, prefix: Option<String>) -> FetchConfig {
    FetchConfig {
        dataset_root: root.to_path_buf(),
        source_prefix: prefix,
        download_concurrency: 3,
        verify_concurrency: 4,
        report_dir: None,
        http: Some(HttpConfig {
            connect_timeout_secs: 5,
            timeout_secs: 30,
            ..HttpConfig::default()
        }),
    }
}

fn transport(cfg: &FetchConfig) -> CurlTransport {
    CurlTransport::new(cfg.http())
}

/// `n` served files and manifest rows with matching checksums.
fn served_dataset(n: usize) -> (common::file_server::FileServer, Vec<(String, String)>) {
    let mut files = HashMap::new();
    let mut paths = Vec::new();
    for i in 0..n {
        let path = format!("NEX-GDDP-CMIP6/model/ssp245/tas_day_{}.nc", i);
        files.insert(path.clone(), body(i));
        paths.push(path);
    }
    let server = common::file_server::start(files);
    let rows = paths
        .iter()
        .enumerate()
        .map(|(i, p)| (md5_hex(&body(i)), server.url(p)))
        .collect();
    (server, rows)
}

#[test]
fn fresh_download_verifies_every_file() {
    let (server, rows) = served_dataset(5);
    let work = tempdir().unwrap();
    let root = work.path().join("data");
    let manifest = write_manifest(work.path(), &rows);
    let cfg = config(&root, None);
    let opts = RunOptions {
        manifest,
        ..RunOptions::default()
    };

    let summary = run_download(&cfg, &opts, transport(&cfg)).unwrap();
    assert_eq!(summary.mode, RunMode::Download);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.verified, 5);
    assert_eq!(summary.failures(), 0);
    assert_eq!(server.gets(), 5);

    for i in 0..5 {
        let p = root.join(format!("NEX-GDDP-CMIP6/model/ssp245/tas_day_{}.nc", i));
        assert_eq!(fs::read(&p).unwrap(), body(i));
        let mut part = p.into_os_string();
        part.push(".part");
        assert!(!PathBuf::from(part).exists());
    }
}

#[test]
fn second_run_skips_everything_without_network() {
    let (server, rows) = served_dataset(6);
    let work = tempdir().unwrap();
    let root = work.path().join("data");
    let cfg = config(&root, None);
    let opts = RunOptions {
        manifest: write_manifest(work.path(), &rows),
        ..RunOptions::default()
    };

    let first = run_download(&cfg, &opts, transport(&cfg)).unwrap();
    assert_eq!(first.verified, 6);
    let gets_after_first = server.gets();

    let second = run_download(&cfg, &opts, transport(&cfg)).unwrap();
    assert_eq!(second.total, 6);
    assert_eq!(second.skipped, 6);
    assert_eq!(second.verified, 0);
    assert_eq!(server.gets(), gets_after_first, "second run must not hit the network");
}

#[test]
fn repeated_destination_is_fetched_once() {
    let (server, mut rows) = served_dataset(2);
    let repeat = rows[0].clone();
    rows.push(repeat.clone());
    rows.push(repeat);

    let work = tempdir().unwrap();
    let root = work.path().join("data");
    let cfg = config(&root, None);
    let opts = RunOptions {
        manifest: write_manifest(work.path(), &rows),
        ..RunOptions::default()
    };
    let summary = run_download(&cfg, &opts, transport(&cfg)).unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.verified, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(server.gets(), 2);
    let path = root.join("NEX-GDDP-CMIP6/model/ssp245/tas_day_0.nc");
    assert_eq!(fs::read(&path).unwrap(), body(0));
    assert!(!root.join("NEX-GDDP-CMIP6/model/ssp245/tas_day_0.nc.part").exists());
}

#[test]
fn missing_remote_file_is_reported_as_download_error() {
    let (server, mut rows) = served_dataset(2);
    let missing_url = server.url("NEX-GDDP-CMIP6/model/ssp245/absent.nc");
    rows.push((md5_hex(b"whatever"), missing_url.clone()));

    let work = tempdir().unwrap();
    let root = work.path().join("data");
    let cfg = config(&root, None);
    let opts = RunOptions {
        manifest: write_manifest(work.path(), &rows),
        ..RunOptions::default()
    };

    let summary = run_download(&cfg, &opts, transport(&cfg)).unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.verified, 2);
    assert_eq!(summary.download_failed, 1);
    assert_eq!(summary.download_errors, [missing_url.clone()]);
    assert!(!root.join("NEX-GDDP-CMIP6/model/ssp245/absent.nc").exists());
    assert!(!root.join("NEX-GDDP-CMIP6/model/ssp245/absent.nc.part").exists());

    let reports = work.path().join("reports");
    fs::create_dir_all(&reports).unwrap();
    let written = write_reports(&summary, &reports, "20240131").unwrap();
    assert_eq!(written, [reports.join("download_error_files_20240131.txt")]);
    assert_eq!(fs::read_to_string(&written[0]).unwrap(), format!("{}\n", missing_url));
}

#[test]
fn corrupt_download_is_reported_as_checksum_error() {
    let (server, mut rows) = served_dataset(3);
    // Reference checksum of different content than what the server returns.
    rows[1].0 = md5_hex(b"the bytes we expected");
    let bad_url = rows[1].1.clone();

    let work = tempdir().unwrap();
    let root = work.path().join("data");
    let cfg = config(&root, None);
    let opts = RunOptions {
        manifest: write_manifest(work.path(), &rows),
        ..RunOptions::default()
    };

    let summary = run_download(&cfg, &opts, transport(&cfg)).unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.verified, 2);
    assert_eq!(summary.checksum_failed, 1);
    assert_eq!(summary.checksum_errors, [bad_url.clone()]);
    assert_eq!(server.gets(), 3);

    let written = write_reports(&summary, work.path(), "20240131").unwrap();
    assert_eq!(written, [work.path().join("checksum_error_files_20240131.txt")]);
    assert_eq!(fs::read_to_string(&written[0]).unwrap(), format!("{}\n", bad_url));
}

#[test]
fn unreachable_host_is_download_error_not_abort() {
    let (_server, mut rows) = served_dataset(2);
    // Port 9 on localhost: connection refused.
    rows.push((md5_hex(b"x"), "http://127.0.0.1:9/NEX-GDDP-CMIP6/x.nc".to_string()));

    let work = tempdir().unwrap();
    let cfg = config(&work.path().join("data"), None);
    let opts = RunOptions {
        manifest: write_manifest(work.path(), &rows),
        ..RunOptions::default()
    };
    let summary = run_download(&cfg, &opts, transport(&cfg)).unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.verified, 2);
    assert_eq!(summary.download_errors, ["http://127.0.0.1:9/NEX-GDDP-CMIP6/x.nc"]);
}

/// Short limits so a silent server is abandoned within a couple of seconds.
fn impatient(cfg: FetchConfig) -> FetchConfig {
    FetchConfig {
        http: Some(HttpConfig {
            connect_timeout_secs: 2,
            timeout_secs: 3,
            low_speed_time_secs: 1,
            ..HttpConfig::default()
        }),
        ..cfg
    }
}

#[test]
fn stalled_server_times_out_as_timeout() {
    let base = common::file_server::start_stalled();
    let work = tempdir().unwrap();
    let cfg = impatient(config(work.path(), None));
    let started = Instant::now();
    let err = transport(&cfg)
        .fetch(&format!("{}/x.nc", base), &work.path().join("x.nc.part"))
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Timeout, "{}", err);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn stalled_record_fails_while_siblings_verify() {
    let (_server, mut rows) = served_dataset(3);
    let stalled = format!("{}/NEX-GDDP-CMIP6/stuck.nc", common::file_server::start_stalled());
    rows.insert(1, (md5_hex(b"never sent"), stalled.clone()));

    let work = tempdir().unwrap();
    let cfg = impatient(config(&work.path().join("data"), None));
    let opts = RunOptions {
        manifest: write_manifest(work.path(), &rows),
        ..RunOptions::default()
    };
    let summary = run_download(&cfg, &opts, transport(&cfg)).unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.verified, 3);
    assert_eq!(summary.download_failed, 1);
    assert_eq!(summary.download_errors, [stalled]);
    assert!(!work.path().join("data/NEX-GDDP-CMIP6/stuck.nc").exists());
    assert!(!work.path().join("data/NEX-GDDP-CMIP6/stuck.nc.part").exists());
}

#[test]
fn offset_and_only_restrict_the_run() {
    let (server, rows) = served_dataset(6);
    let work = tempdir().unwrap();
    let cfg = config(&work.path().join("data"), None);

    let with_offset = RunOptions {
        manifest: write_manifest(work.path(), &rows),
        offset: 4,
        ..RunOptions::default()
    };
    let summary = run_download(&cfg, &with_offset, transport(&cfg)).unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(server.gets(), 2);

    let list = work.path().join("download_error_files_20240131.txt");
    fs::write(&list, format!("{}\n{}\n", rows[0].1, rows[2].1)).unwrap();
    let only = RunOptions {
        manifest: work.path().join("files.csv"),
        only: Some(list),
        ..RunOptions::default()
    };
    let summary = run_download(&cfg, &only, transport(&cfg)).unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.verified, 2);
    assert_eq!(server.gets(), 4);
}

#[test]
fn malformed_manifest_aborts_before_any_download() {
    let (server, rows) = served_dataset(2);
    let work = tempdir().unwrap();
    let manifest = work.path().join("files.csv");
    fs::write(
        &manifest,
        format!("{}\n{},{}\n{}\n", HEADER, rows[0].0, rows[0].1, rows[1].1),
    )
    .unwrap();
    let cfg = config(&work.path().join("data"), None);
    let opts = RunOptions {
        manifest,
        ..RunOptions::default()
    };
    let err = run_download(&cfg, &opts, transport(&cfg)).unwrap_err();
    assert!(format!("{:#}", err).contains("line 3"));
    assert_eq!(server.gets(), 0);
}

#[test]
fn verification_reports_missing_files() {
    let prefix = "https://nex-gddp-cmip6.s3.us-west-2.amazonaws.com";
    let work = tempdir().unwrap();
    let root = work.path().join("data");
    let mut rows = Vec::new();
    let mut missing = Vec::new();
    for i in 0..10 {
        let rel = format!("NEX-GDDP-CMIP6/model/historical/pr_day_{}.nc", i);
        let local = root.join(&rel);
        if i % 3 == 1 {
            missing.push(local.to_string_lossy().into_owned());
        } else {
            fs::create_dir_all(local.parent().unwrap()).unwrap();
            fs::write(&local, body(i)).unwrap();
        }
        rows.push((md5_hex(&body(i)), format!("{}/{}", prefix, rel)));
    }
    assert_eq!(missing.len(), 3);

    let cfg = config(&root, Some(prefix.to_string()));
    let opts = RunOptions {
        manifest: write_manifest(work.path(), &rows),
        ..RunOptions::default()
    };
    let summary = run_verify(&cfg, &opts).unwrap();
    assert_eq!(summary.mode, RunMode::Verify);
    assert_eq!(summary.total, 10);
    assert_eq!(summary.not_present, 3);
    assert_eq!(summary.verified, 7);
    assert_eq!(summary.checksum_failed, 0);

    let mut reported = summary.download_errors.clone();
    reported.sort();
    missing.sort();
    assert_eq!(reported, missing);

    let reports = work.path().join("reports");
    fs::create_dir_all(&reports).unwrap();
    let written = write_reports(&summary, &reports, "20240131").unwrap();
    let listed = fs::read_to_string(reports.join("download_error_files_20240131.txt")).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(listed.lines().count(), 3);
}

#[test]
fn verification_flags_corrupt_file_and_writes_nothing() {
    let prefix = "https://example.com";
    let work = tempdir().unwrap();
    let root = work.path().join("data");
    let local = root.join("set/a.nc");
    fs::create_dir_all(local.parent().unwrap()).unwrap();
    fs::write(&local, b"abd").unwrap();
    let rows = vec![
        (md5_hex(b"abc"), format!("{}/set/a.nc", prefix)),
        (md5_hex(b"abc"), format!("{}/other/b.nc", prefix)),
    ];
    let cfg = config(&root, Some(prefix.to_string()));
    let opts = RunOptions {
        manifest: write_manifest(work.path(), &rows),
        ..RunOptions::default()
    };
    let summary = run_verify(&cfg, &opts).unwrap();
    assert_eq!(summary.checksum_errors, [local.to_string_lossy().into_owned()]);
    assert_eq!(summary.not_present, 1);
    // Read-only: no directory created for the missing file.
    assert!(!root.join("other").exists());
    assert_eq!(fs::read(&local).unwrap(), b"abd");
}
