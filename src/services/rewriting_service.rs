//! URL rewriting capability.
//!
//! The rewriting proxy itself lives outside this crate. The core only needs
//! `encode`/`decode` plus a small key/value store the proxy reads its backend
//! selectors from. `PrefixRewriter` is a self-contained implementation of the
//! path-prefix + base64 scheme used by the bundled service worker.

use std::cell::RefCell;
use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::services::settings_engine::SettingsStore;
use crate::types::errors::RewriteError;
use crate::types::settings::ProxyService;
use crate::types::tab::is_passthrough_url;

/// Store key holding the active backend name.
pub const SERVICE_KEY: &str = "service";
/// Store key holding the active transport name.
pub const TRANSPORT_KEY: &str = "transport";
/// Store key holding the active search engine name.
pub const SEARCH_ENGINE_KEY: &str = "searchEngine";

/// Options passed along with every `encode` call.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    pub service: ProxyService,
    /// Upgrade scheme-less input to `https://`.
    pub auto_https: bool,
    /// Search template the proxy uses for input that is not a URL.
    pub search_engine_template: String,
}

impl EncodeOptions {
    pub fn from_settings(settings: &dyn SettingsStore) -> Self {
        Self {
            service: settings.service(),
            auto_https: true,
            search_engine_template: settings.search_engine().template().to_string(),
        }
    }
}

/// Capability interface of the external rewriting proxy.
#[allow(async_fn_in_trait)]
pub trait RewritingService {
    /// Turns a logical URL into a URL loadable by the content frame.
    async fn encode(&self, url: &str, options: &EncodeOptions) -> Result<String, RewriteError>;
    /// Recovers the logical URL from a frame URL.
    async fn decode(&self, frame_url: &str) -> Result<String, RewriteError>;
    fn get_store(&self, key: &str) -> Option<String>;
    fn set_store(&self, key: &str, value: &str);
}

/// Rewriter producing `<prefix><base64url(url)>` frame URLs.
#[derive(Debug, Default)]
pub struct PrefixRewriter {
    /// Prepended to every frame URL, e.g. `http://localhost:3000`.
    origin: String,
    store: RefCell<HashMap<String, String>>,
}

impl PrefixRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            store: RefCell::new(HashMap::new()),
        }
    }

    /// Path prefix that marks a frame URL as belonging to `service`.
    pub fn prefix(service: ProxyService) -> &'static str {
        match service {
            ProxyService::Ultraviolet => "/uv/service/",
            ProxyService::Rammerhead => "/rh/",
            ProxyService::Scramjet => "/scramjet/",
        }
    }

    fn upgrade(url: &str, options: &EncodeOptions) -> Result<String, RewriteError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RewriteError::Encode("empty url".to_string()));
        }
        if url.contains("://") || !options.auto_https {
            return Ok(url.to_string());
        }
        if url.contains('.') && !url.contains(char::is_whitespace) {
            return Ok(format!("https://{}", url));
        }
        Ok(options
            .search_engine_template
            .replace("%s", &urlencoding::encode(url)))
    }
}

impl RewritingService for PrefixRewriter {
    async fn encode(&self, url: &str, options: &EncodeOptions) -> Result<String, RewriteError> {
        if is_passthrough_url(url) {
            return Ok(url.to_string());
        }
        let target = Self::upgrade(url, options)?;
        let (target, fragment) = match target.split_once('#') {
            Some((base, fragment)) => (base.to_string(), Some(fragment.to_string())),
            None => (target, None),
        };

        let mut frame_url = format!(
            "{}{}{}",
            self.origin,
            Self::prefix(options.service),
            URL_SAFE_NO_PAD.encode(target.as_bytes())
        );
        if let Some(fragment) = fragment {
            frame_url.push('#');
            frame_url.push_str(&fragment);
        }
        Ok(frame_url)
    }

    async fn decode(&self, frame_url: &str) -> Result<String, RewriteError> {
        if is_passthrough_url(frame_url) {
            return Ok(frame_url.to_string());
        }

        let (encoded, fragment) = ProxyService::ALL
            .into_iter()
            .find_map(|service| {
                let prefix = Self::prefix(service);
                frame_url
                    .find(prefix)
                    .map(|idx| &frame_url[idx + prefix.len()..])
            })
            .map(|rest| match rest.split_once('#') {
                Some((encoded, fragment)) => (encoded, Some(fragment)),
                None => (rest, None),
            })
            .ok_or_else(|| RewriteError::Unrecognized(frame_url.to_string()))?;

        let encoded = encoded.split(['?', '/']).next().unwrap_or(encoded);
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| RewriteError::Decode(e.to_string()))?;
        let mut url = String::from_utf8(bytes).map_err(|e| RewriteError::Decode(e.to_string()))?;

        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(fragment);
        }
        Ok(url)
    }

    fn get_store(&self, key: &str) -> Option<String> {
        self.store.borrow().get(key).cloned()
    }

    fn set_store(&self, key: &str, value: &str) {
        self.store
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}
