// tests/smoke_naming.rs
//
// Local naming rules: populate batch keys, upload keys, download targets.

use std::fs;
use tempfile::TempDir;

use s3smoke::{download_target, populate_keys, remote_upload_key};

#[test]
fn populate_batch_names_match_the_harness_convention() {
    let keys = populate_keys("smoke-", 3);
    assert_eq!(keys, vec!["smoke-1.bin", "smoke-2.bin", "smoke-3.bin"]);
}

#[test]
fn upload_key_lands_under_the_remote_dir() {
    assert_eq!(remote_upload_key("backups/2020", "db.dump"), "backups/2020/db.dump");
    // Empty remote dir means the bucket root, with no leading delimiter.
    assert_eq!(remote_upload_key("", "db.dump"), "db.dump");
}

#[test]
fn downloaded_file_keeps_the_final_key_segment() {
    let dir = TempDir::new().unwrap();

    let target = download_target(dir.path(), "img/2020/photo.jpg");
    fs::write(&target, b"pixels").unwrap();

    assert_eq!(target.file_name().unwrap(), "photo.jpg");
    assert_eq!(fs::read(dir.path().join("photo.jpg")).unwrap(), b"pixels");
}

#[test]
fn bare_key_downloads_straight_into_the_directory() {
    let dir = TempDir::new().unwrap();

    let target = download_target(dir.path(), "plain.txt");
    assert_eq!(target, dir.path().join("plain.txt"));
}
