use thiserror::Error;

// === TabError ===

/// Errors related to tab store operations.
///
/// Only surfaced by a store built in strict mode; the default store logs and
/// ignores these conditions.
#[derive(Debug, Error, PartialEq)]
pub enum TabError {
    /// Tab with the given ID was not found.
    #[error("Tab not found: {0}")]
    NotFound(String),
    /// A reorder request was not a permutation of the current tab ids.
    #[error("Invalid tab order: {0}")]
    InvalidOrder(String),
}

// === RewriteError ===

/// Errors reported by a URL rewriting service.
#[derive(Debug, Error, PartialEq)]
pub enum RewriteError {
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    /// The frame URL does not carry any known rewriting prefix.
    #[error("Unrecognized frame URL: {0}")]
    Unrecognized(String),
}

// === BookmarkError ===

/// Errors related to bookmark management operations.
#[derive(Debug, Error, PartialEq)]
pub enum BookmarkError {
    /// No bookmark exists for the given URL.
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    /// A bookmark with the same URL already exists.
    #[error("Duplicate bookmark URL: {0}")]
    DuplicateUrl(String),
}

// === SettingsError ===

/// Errors related to loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(String),
    #[error("Settings serialization error: {0}")]
    Serialization(String),
}
