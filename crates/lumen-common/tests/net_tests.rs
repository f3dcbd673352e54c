//! Integration tests for source classification and fetching.

use std::io::Write;

use lumen_common::net::{DataUrl, to_data_url};
use lumen_common::{FetchError, FetchOptions, SourceKind, classify_source, fetch_bytes, fetch_text};

#[test]
fn test_classify_accepted_kinds() {
    assert_eq!(classify_source("data:image/png;base64,AAAA"), SourceKind::Data);
    assert_eq!(classify_source("https://example.com/a.svg"), SourceKind::Remote);
    assert_eq!(classify_source("HTTP://example.com/a.svg"), SourceKind::Remote);
    assert_eq!(classify_source("/tmp/logo.svg"), SourceKind::Local);
    assert_eq!(classify_source("assets/logo.svg"), SourceKind::Local);
    assert_eq!(classify_source("C:\\assets\\logo.svg"), SourceKind::Local);
    assert_eq!(classify_source("   "), SourceKind::Empty);
}

#[test]
fn test_classify_rejected_schemes() {
    assert_eq!(classify_source("javascript:alert(1)"), SourceKind::Rejected);
    assert_eq!(classify_source("ftp://host/file.svg"), SourceKind::Rejected);
    assert_eq!(classify_source("file:///etc/passwd"), SourceKind::Rejected);
    assert!(!SourceKind::Rejected.is_fetchable());
}

#[test]
fn test_data_url_base64() {
    let url = to_data_url("image/svg+xml", b"<svg/>");
    let parsed = DataUrl::parse(&url).unwrap();
    assert_eq!(parsed.media_type, "image/svg+xml");
    assert!(parsed.base64);
    assert_eq!(parsed.decode().unwrap(), b"<svg/>".to_vec());
}

#[test]
fn test_data_url_percent_encoded() {
    let text = fetch_text("data:image/svg+xml,%3Csvg%2F%3E", &FetchOptions::default()).unwrap();
    assert_eq!(text, "<svg/>");
}

#[test]
fn test_data_url_missing_comma() {
    assert!(matches!(
        DataUrl::parse("data:image/png;base64"),
        Err(FetchError::DataUrl(_))
    ));
}

#[test]
fn test_rejected_scheme_never_fetches() {
    let err = fetch_bytes("javascript:alert(1)", &FetchOptions::default()).unwrap_err();
    assert_eq!(
        err,
        FetchError::UnsupportedScheme("javascript:alert(1)".to_string())
    );
}

#[test]
fn test_remote_disabled() {
    let options = FetchOptions {
        allow_remote: false,
        ..FetchOptions::default()
    };
    let err = fetch_bytes("https://example.invalid/a.png", &options).unwrap_err();
    assert!(matches!(err, FetchError::RemoteDisabled(_)));
}

#[test]
fn test_local_file_relative_to_base_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("shape.svg")).unwrap();
    file.write_all(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>")
        .unwrap();

    let options = FetchOptions {
        base_dir: Some(dir.path().to_path_buf()),
        ..FetchOptions::default()
    };
    let text = fetch_text("shape.svg", &options).unwrap();
    assert!(text.starts_with("<svg"));
}

#[test]
fn test_missing_local_file() {
    let err = fetch_bytes("/definitely/not/here.png", &FetchOptions::default()).unwrap_err();
    assert!(matches!(err, FetchError::Io { .. }));
}
