use serde::Serialize;
use uuid::Uuid;

use crate::managers::history_stack::HistoryStack;

/// Logical URL of a fresh, empty tab.
pub const BLANK_URL: &str = "about:blank";

/// Title shown until the content frame supplies a document title.
pub const DEFAULT_TITLE: &str = "New Tab";

/// Prefix of the internal pseudo-URL scheme.
pub const INTERNAL_SCHEME: &str = "zen://";

/// Internal address of the settings page.
pub const SETTINGS_URL: &str = "zen://settings";

/// Internal directive that opens a fresh blank tab.
pub const NEW_TAB_URL: &str = "zen://newtab";

/// Returns true for URLs that are never sent through the rewriting service.
pub fn is_passthrough_url(url: &str) -> bool {
    url == BLANK_URL
        || url
            .get(..INTERNAL_SCHEME.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(INTERNAL_SCHEME))
}

/// Represents a browser tab with its navigation state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Tab {
    pub id: String,
    /// User-facing URL shown in the address bar and recorded in history.
    pub url: String,
    /// Rewritten URL currently loaded into the content frame.
    pub frame_url: String,
    pub title: String,
    pub favicon: Option<String>,
    pub loading: bool,
    pub history: HistoryStack,
}

impl Tab {
    /// Creates a tab with a fresh id whose history is seeded with `url`.
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            frame_url: url.to_string(),
            title: title.to_string(),
            favicon: None,
            loading: false,
            history: HistoryStack::new(url),
        }
    }

    /// A blank `New Tab`.
    pub fn blank() -> Self {
        Self::new(BLANK_URL, DEFAULT_TITLE)
    }

    pub fn is_blank(&self) -> bool {
        self.url == BLANK_URL
    }

    pub fn is_internal(&self) -> bool {
        is_passthrough_url(&self.url) && !self.is_blank()
    }
}

/// Partial set of fields merged into a tab by `TabStore::update_tab`.
///
/// Only `url` can move the history stack; every other field is a plain replace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabUpdate {
    pub url: Option<String>,
    pub frame_url: Option<String>,
    pub title: Option<String>,
    pub favicon: Option<Option<String>>,
    pub loading: Option<bool>,
}

impl TabUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn frame_url(mut self, frame_url: impl Into<String>) -> Self {
        self.frame_url = Some(frame_url.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn favicon(mut self, favicon: Option<String>) -> Self {
        self.favicon = Some(favicon);
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = Some(loading);
        self
    }
}
