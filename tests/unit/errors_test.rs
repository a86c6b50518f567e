//! Display formatting of the crate's error types.

use zentabs::types::errors::{BookmarkError, RewriteError, SettingsError, TabError};

#[test]
fn test_tab_error_display() {
    assert_eq!(TabError::NotFound("t1".into()).to_string(), "Tab not found: t1");
    assert_eq!(
        TabError::InvalidOrder("expected 2 ids, got 1".into()).to_string(),
        "Invalid tab order: expected 2 ids, got 1"
    );
}

#[test]
fn test_rewrite_error_display() {
    assert_eq!(RewriteError::Encode("empty url".into()).to_string(), "Encode failed: empty url");
    assert_eq!(RewriteError::Decode("bad base64".into()).to_string(), "Decode failed: bad base64");
    assert_eq!(
        RewriteError::Unrecognized("https://example.com/".into()).to_string(),
        "Unrecognized frame URL: https://example.com/"
    );
}

#[test]
fn test_bookmark_error_display() {
    assert_eq!(
        BookmarkError::NotFound("https://a.example/".into()).to_string(),
        "Bookmark not found: https://a.example/"
    );
    assert_eq!(
        BookmarkError::DuplicateUrl("https://a.example/".into()).to_string(),
        "Duplicate bookmark URL: https://a.example/"
    );
}

#[test]
fn test_settings_error_display() {
    assert_eq!(SettingsError::Io("denied".into()).to_string(), "Settings I/O error: denied");
    assert_eq!(
        SettingsError::Serialization("eof".into()).to_string(),
        "Settings serialization error: eof"
    );
}

#[test]
fn test_errors_are_std_errors() {
    fn assert_error<E: std::error::Error>(_: &E) {}
    assert_error(&TabError::NotFound(String::new()));
    assert_error(&RewriteError::Encode(String::new()));
    assert_error(&BookmarkError::NotFound(String::new()));
    assert_error(&SettingsError::Io(String::new()));
}
