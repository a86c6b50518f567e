use serde::{Deserialize, Serialize};

/// User settings consumed by the tab core.
///
/// Selectors are kept as plain strings so that a settings file written by a
/// newer front-end still loads; unknown names resolve to the first variant of
/// the matching enum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserSettings {
    #[serde(default = "default_search_engine")]
    pub search_engine: String,
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(default = "default_transport")]
    pub transport: String,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_search_engine() -> String {
    SearchEngine::Google.name().to_string()
}

fn default_service() -> String {
    ProxyService::Ultraviolet.name().to_string()
}

fn default_transport() -> String {
    ProxyTransport::Libcurl.name().to_string()
}

fn default_theme() -> String {
    "mocha".to_string()
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            search_engine: default_search_engine(),
            service: default_service(),
            transport: default_transport(),
            theme: default_theme(),
        }
    }
}

/// Search engines offered for address-bar queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEngine {
    Google,
    DuckDuckGo,
    Bing,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 3] = [
        SearchEngine::Google,
        SearchEngine::DuckDuckGo,
        SearchEngine::Bing,
    ];

    /// Parses a settings name, falling back to Google for anything unknown.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|engine| engine.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(SearchEngine::Google)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchEngine::Google => "google",
            SearchEngine::DuckDuckGo => "duckduckgo",
            SearchEngine::Bing => "bing",
        }
    }

    /// Query template; `%s` is replaced with the percent-encoded query.
    pub fn template(&self) -> &'static str {
        match self {
            SearchEngine::Google => "https://www.google.com/search?q=%s",
            SearchEngine::DuckDuckGo => "https://duckduckgo.com/?q=%s",
            SearchEngine::Bing => "https://www.bing.com/search?q=%s",
        }
    }
}

/// Backend engine the rewriting service routes frames through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyService {
    Ultraviolet,
    Rammerhead,
    Scramjet,
}

impl ProxyService {
    pub const ALL: [ProxyService; 3] = [
        ProxyService::Ultraviolet,
        ProxyService::Rammerhead,
        ProxyService::Scramjet,
    ];

    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|service| service.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(ProxyService::Ultraviolet)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProxyService::Ultraviolet => "ultraviolet",
            ProxyService::Rammerhead => "rammerhead",
            ProxyService::Scramjet => "scramjet",
        }
    }
}

/// Wire transport used by the rewriting backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyTransport {
    Libcurl,
    Epoxy,
}

impl ProxyTransport {
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("epoxy") {
            ProxyTransport::Epoxy
        } else {
            ProxyTransport::Libcurl
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProxyTransport::Libcurl => "libcurl",
            ProxyTransport::Epoxy => "epoxy",
        }
    }
}
