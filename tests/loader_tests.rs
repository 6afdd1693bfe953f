//! Integration tests for artifact loading and format detection

use std::io::{Cursor, Read};
use std::path::PathBuf;

use hsts_engine_r::{
    load_from_binary, load_from_text, Context, HstsError, HstsErrorKind, LoadOptions, Table,
};

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

fn artifact(version: &str, payload: &[u8]) -> Vec<u8> {
    let mut data = format!(".DAFSA@HSTS_{:<3}\n", version).into_bytes();
    data.extend_from_slice(payload);
    data
}

/// Endless stream of one repeated byte
struct Endless(u8);

impl Read for Endless {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        buf.fill(self.0);
        Ok(buf.len())
    }
}

#[test]
fn test_load_file_binary() {
    let ctx = Context::load_file(testdata("hsts.dafsa")).unwrap();
    assert!(matches!(ctx.table(), Table::Compact(_)));
    assert!(ctx.search("sub.fan.gov").unwrap().has_include_subdomains());
    assert!(ctx.search("www.tumblr.com").is_none());
    assert_eq!(ctx.rule_count(), None);
}

#[test]
fn test_load_file_text() {
    let ctx = Context::load_file(testdata("rules.txt")).unwrap();
    assert!(matches!(ctx.table(), Table::Vector(_)));
    assert!(ctx.search("www.ck").unwrap().is_exception());
    assert!(ctx.rule_count().unwrap() >= 9);
}

#[test]
fn test_load_file_missing() {
    let err = Context::load_file(testdata("does-not-exist.dafsa")).unwrap_err();
    assert_eq!(err.kind(), HstsErrorKind::Io);
}

#[test]
fn test_rejects_nonzero_version() {
    for version in ["1", "10", "255"] {
        let err = load_from_binary(Cursor::new(artifact(version, &[0x80]))).unwrap_err();
        assert_eq!(err.kind(), HstsErrorKind::UnsupportedVersion, "{}", version);
    }
}

#[test]
fn test_rejects_wrong_tag() {
    let err = load_from_binary(Cursor::new(b".DAFSA@PSL_0   \n\x80".to_vec())).unwrap_err();
    assert_eq!(err.kind(), HstsErrorKind::Format);
}

#[test]
fn test_empty_payload_yields_empty_context() {
    let ctx = load_from_binary(Cursor::new(artifact("0", &[]))).unwrap();
    for domain in ["com", "fan.gov", "", "."] {
        assert!(ctx.search(domain).is_none());
    }
}

#[test]
fn test_binary_size_ceiling() {
    let options = LoadOptions::new().with_max_size(1024);
    let reader = Cursor::new(artifact("0", &[])).chain(Endless(0x80));
    match Context::from_binary_with(reader, &options) {
        Err(HstsError::TooLarge { limit }) => assert_eq!(limit, 1024),
        other => panic!("expected TooLarge, got {:?}", other),
    }
}

#[test]
fn test_text_size_ceiling() {
    let options = LoadOptions::new().with_max_size(4096);
    let rules = "example.com\n".repeat(1000);
    let err = Context::load_with(rules.as_bytes(), &options).unwrap_err();
    assert_eq!(err.kind(), HstsErrorKind::TooLarge);
}

#[test]
fn test_text_invalid_utf8() {
    let err = load_from_text(&b"com\n\xff\xfe.net\n"[..]).unwrap_err();
    match err {
        HstsError::Format(msg) => assert!(msg.contains("line 2"), "{}", msg),
        other => panic!("expected Format, got {:?}", other),
    }
}

#[test]
fn test_text_wildcard_scenario() {
    let ctx = load_from_text("*.foo.bar\n".as_bytes()).unwrap();

    let entry = ctx.search("foo.bar").unwrap();
    assert!(entry.is_wildcard());

    let entry = ctx.search("x.foo.bar").unwrap();
    assert!(entry.is_wildcard());
    assert!(!entry.is_exception());
}

#[test]
fn test_text_without_sections() {
    let ctx = load_from_text("com\n!www.com\n".as_bytes()).unwrap();
    assert_eq!(ctx.search("com").unwrap().section(), None);
    assert!(ctx.search("www.com").unwrap().is_exception());
}

#[test]
fn test_header_only_first_line_is_text() {
    // A truncated header line is not a header; the stream is read as text
    let ctx = Context::load(".DAFSA@HSTS_0\ncom\n".as_bytes()).unwrap();
    assert!(matches!(ctx.table(), Table::Vector(_)));
    assert!(ctx.search("com").is_some());
}
