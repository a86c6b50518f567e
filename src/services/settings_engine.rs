// Zentabs Settings Engine
// Loads the front-end settings the tab core reads: search engine, rewriting
// backend, transport and theme. Settings are read from a JSON file; writing
// them back is the front-end's job.

use std::env;
use std::fs;
use std::path::Path;

use crate::types::errors::SettingsError;
use crate::types::settings::{BrowserSettings, ProxyService, ProxyTransport, SearchEngine};

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV_VAR: &str = "ZENTABS_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "settings.json";

/// Read-only view of the settings the core depends on.
pub trait SettingsStore {
    fn search_engine(&self) -> SearchEngine;
    fn service(&self) -> ProxyService;
    fn transport(&self) -> ProxyTransport;
    fn theme(&self) -> &str;
}

impl SettingsStore for BrowserSettings {
    fn search_engine(&self) -> SearchEngine {
        SearchEngine::from_name(&self.search_engine)
    }

    fn service(&self) -> ProxyService {
        ProxyService::from_name(&self.service)
    }

    fn transport(&self) -> ProxyTransport {
        ProxyTransport::from_name(&self.transport)
    }

    fn theme(&self) -> &str {
        &self.theme
    }
}

/// Settings engine backed by a JSON file on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: BrowserSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise uses `$ZENTABS_CONFIG`, then `settings.json` in the working directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override
            .or_else(|| env::var(CONFIG_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        Self {
            config_path,
            settings: BrowserSettings::default(),
        }
    }

    /// Wraps already-known settings without touching the filesystem.
    pub fn from_settings(settings: BrowserSettings) -> Self {
        Self {
            config_path: DEFAULT_CONFIG_FILE.to_string(),
            settings,
        }
    }

    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings.
    /// If the file exists but is malformed, returns a serialization error.
    pub fn load(&mut self) -> Result<BrowserSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            tracing::debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = BrowserSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::Io(format!("Failed to read config file: {}", e)))?;

        let settings: BrowserSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::Serialization(format!("Failed to parse config file: {}", e))
        })?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    pub fn get_settings(&self) -> &BrowserSettings {
        &self.settings
    }

    pub fn get_config_path(&self) -> &str {
        &self.config_path
    }
}

impl SettingsStore for SettingsEngine {
    fn search_engine(&self) -> SearchEngine {
        self.settings.search_engine()
    }

    fn service(&self) -> ProxyService {
        self.settings.service()
    }

    fn transport(&self) -> ProxyTransport {
        self.settings.transport()
    }

    fn theme(&self) -> &str {
        self.settings.theme()
    }
}
