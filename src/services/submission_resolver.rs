//! Address-bar submission resolution.
//!
//! Turns raw input into either an internal action or a logical URL. Pure:
//! storing the result and encoding it is up to the caller.

use url::Url;

use crate::services::settings_engine::SettingsStore;
use crate::types::settings::SearchEngine;
use crate::types::tab::{INTERNAL_SCHEME, NEW_TAB_URL, SETTINGS_URL};

/// Action requested through an internal pseudo-URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalAction {
    /// Focus the settings tab, opening it if needed.
    OpenSettings,
    /// Open a fresh blank tab.
    OpenNewTab,
    /// Unknown internal address; swallowed without navigating.
    Unknown,
}

/// Result of resolving address-bar input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Internal(InternalAction),
    Navigate(String),
}

/// Resolves address-bar input. Returns `None` for blank input.
pub fn resolve_submission(raw_input: &str, settings: &dyn SettingsStore) -> Option<Submission> {
    let input = raw_input.trim();
    if input.is_empty() {
        return None;
    }

    let lowered = input.to_lowercase();
    if lowered.starts_with(INTERNAL_SCHEME) {
        return Some(Submission::Internal(internal_action(&lowered)));
    }

    if has_http_scheme(input) {
        return Some(Submission::Navigate(normalize_url(input)));
    }

    if input.contains('.') && !input.contains(char::is_whitespace) {
        return Some(Submission::Navigate(normalize_url(input)));
    }

    Some(Submission::Navigate(search_url(input, settings.search_engine())))
}

fn internal_action(lowered: &str) -> InternalAction {
    match lowered {
        SETTINGS_URL => InternalAction::OpenSettings,
        NEW_TAB_URL => InternalAction::OpenNewTab,
        _ => InternalAction::Unknown,
    }
}

fn has_http_scheme(input: &str) -> bool {
    let lowered = input.to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

/// Adds `https://` when no scheme is present and normalizes through URL
/// parsing. Unparseable input comes back trimmed but otherwise unchanged.
pub fn normalize_url(input: &str) -> String {
    let input = input.trim();
    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    match Url::parse(&candidate) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::debug!(input = %input, error = %e, "input is not a valid URL, keeping it as typed");
            input.to_string()
        }
    }
}

/// Builds the engine's search URL for `query`.
pub fn search_url(query: &str, engine: SearchEngine) -> String {
    engine.template().replace("%s", &urlencoding::encode(query))
}
