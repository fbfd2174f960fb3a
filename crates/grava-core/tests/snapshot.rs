use std::io::Write;

use grava_core::provider::{PackageDb, SourceMetadata};
use grava_core::snapshot::{MetadataCache, SyncDbSnapshot};
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn sync_db_loads_from_json_file() {
    let file = write_temp(
        r#"[
            {"name": "glibc", "version": "2.40"},
            {"name": "openssl", "version": "3.3.1", "depends": ["glibc"], "provides": ["libssl.so"]}
        ]"#,
    );
    let db = SyncDbSnapshot::from_path(file.path()).unwrap();
    assert_eq!(db.len(), 2);

    let pkg = db.lookup("libssl.so").unwrap().unwrap();
    assert_eq!(pkg.name, "openssl");
    assert_eq!(pkg.depends, vec!["glibc".to_string()]);
}

#[test]
fn sync_db_rejects_malformed_json() {
    let file = write_temp(r#"{"not": "an array"}"#);
    let err = SyncDbSnapshot::from_path(file.path()).unwrap_err();
    assert!(err.to_string().contains("malformed metadata"), "got: {err}");
}

#[test]
fn sync_db_missing_file_is_io_error() {
    let err = SyncDbSnapshot::from_path(std::path::Path::new("/nonexistent/sync.json")).unwrap_err();
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[tokio::test]
async fn metadata_cache_loads_from_json_file() {
    let file = write_temp(
        r#"[
            {
                "name": "paclight",
                "version": "2.1.0",
                "depends": ["curl", "meson:build", {"name": "pytest", "kind": "check"}],
                "provides": ["paclight-git"]
            }
        ]"#,
    );
    let cache = MetadataCache::from_path(file.path()).unwrap();
    assert_eq!(cache.len(), 1);

    let pkg = cache.lookup("paclight-git").await.unwrap().unwrap();
    assert_eq!(pkg.name, "paclight");
    assert_eq!(pkg.requests().len(), 3);
}
