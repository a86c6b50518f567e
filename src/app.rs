//! App Core for Zentabs.
//!
//! Composition root: owns the tab store, bookmarks and settings, and wires
//! address-bar submissions through the rewriting service into the store. The
//! rewriting service is injected, so tests can substitute a double.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::tab_store::{SharedTabStore, TabStore, TabStoreTrait};
use crate::services::address_bar::{address_bar_view, AddressBarView};
use crate::services::navigation_sync::{FrameAttachment, NavigationSynchronizer};
use crate::services::rewriting_service::{
    EncodeOptions, RewritingService, SEARCH_ENGINE_KEY, SERVICE_KEY, TRANSPORT_KEY,
};
use crate::services::settings_engine::{SettingsEngine, SettingsStore};
use crate::services::submission_resolver::{resolve_submission, InternalAction, Submission};
use crate::types::errors::{BookmarkError, RewriteError};
use crate::types::settings::BrowserSettings;
use crate::types::tab::{is_passthrough_url, TabUpdate, BLANK_URL, DEFAULT_TITLE, SETTINGS_URL};

/// Favicon shown for the settings tab.
pub const SETTINGS_ICON: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24' fill='none' stroke='white' stroke-width='2'%3E%3Ccircle cx='12' cy='12' r='3'/%3E%3Ccircle cx='12' cy='12' r='9'/%3E%3C/svg%3E";

/// What a submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input.
    Ignored,
    Internal(InternalAction),
    Navigated { url: String, frame_url: String },
    /// Encoding failed; the tab kept its previous state.
    Failed,
    /// The tab was closed or navigated again before encoding finished.
    Stale,
}

/// Central application struct holding the store and its collaborators.
pub struct App<R: RewritingService> {
    pub store: SharedTabStore,
    pub bookmarks: BookmarkManager,
    pub sync: NavigationSynchronizer<R>,
    rewriter: Rc<R>,
    settings: RefCell<SettingsEngine>,
    nav_seq: RefCell<HashMap<String, u64>>,
}

impl<R: RewritingService> App<R> {
    pub fn new(rewriter: R, settings: SettingsEngine) -> Self {
        Self::with_store(TabStore::new(), rewriter, settings)
    }

    /// Builds the app around a pre-configured store (e.g. `TabStore::strict()`).
    pub fn with_store(store: TabStore, rewriter: R, settings: SettingsEngine) -> Self {
        let store = store.into_shared();
        let rewriter = Rc::new(rewriter);
        let options = EncodeOptions::from_settings(&settings);
        let sync = NavigationSynchronizer::new(Rc::clone(&store), Rc::clone(&rewriter), options);

        let app = Self {
            store,
            bookmarks: BookmarkManager::new(),
            sync,
            rewriter,
            settings: RefCell::new(settings),
            nav_seq: RefCell::new(HashMap::new()),
        };
        app.publish_settings();
        app
    }

    pub fn rewriter(&self) -> &R {
        &self.rewriter
    }

    pub fn settings(&self) -> BrowserSettings {
        self.settings.borrow().get_settings().clone()
    }

    /// Replaces the active settings and pushes the selectors to the rewriter.
    pub fn apply_settings(&self, settings: BrowserSettings) {
        *self.settings.borrow_mut() = SettingsEngine::from_settings(settings);
        self.sync.set_encode_options(self.encode_options());
        self.publish_settings();
    }

    fn publish_settings(&self) {
        let settings = self.settings.borrow();
        self.rewriter.set_store(SERVICE_KEY, settings.service().name());
        self.rewriter.set_store(TRANSPORT_KEY, settings.transport().name());
        self.rewriter
            .set_store(SEARCH_ENGINE_KEY, settings.search_engine().name());
    }

    fn encode_options(&self) -> EncodeOptions {
        EncodeOptions::from_settings(&*self.settings.borrow())
    }

    /// Opens a blank tab and activates it.
    pub fn new_tab(&self) -> String {
        self.store.borrow_mut().add_tab(BLANK_URL, DEFAULT_TITLE)
    }

    /// Focuses the settings tab, opening one if none exists.
    pub fn open_settings(&self) -> String {
        let mut store = self.store.borrow_mut();
        if let Some(tab) = store.find_by_url(SETTINGS_URL) {
            let _ = store.set_active_tab(&tab.id);
            return tab.id.clone();
        }

        let id = store.add_tab(SETTINGS_URL, "Settings");
        let _ = store.update_tab(&id, TabUpdate::new().favicon(Some(SETTINGS_ICON.to_string())));
        tracing::info!(tab_id = %id, "opened settings tab");
        id
    }

    pub fn close_tab(&self, tab_id: &str) {
        let _ = self.store.borrow_mut().remove_tab(tab_id);
        self.sync.forget(tab_id);
        self.nav_seq.borrow_mut().remove(tab_id);
    }

    pub fn attach_frame(&self, tab_id: &str) -> FrameAttachment {
        self.sync.attach(tab_id)
    }

    /// Asks for the tab's current frame URL to be loaded again.
    pub fn reload(&self, tab_id: &str) -> Option<String> {
        let frame_url = self.sync.request_reload(tab_id)?;
        let _ = self.store.borrow_mut().set_loading(tab_id, true);
        Some(frame_url)
    }

    /// Address bar contents for the active tab.
    pub fn address_bar(&self) -> AddressBarView {
        address_bar_view(&self.store.borrow().get_active_tab())
    }

    /// Bookmarks the tab's current page. Returns the bookmark id.
    pub fn bookmark_tab(&mut self, tab_id: &str) -> Result<String, BookmarkError> {
        let tab = self
            .store
            .borrow()
            .get_tab(tab_id)
            .ok_or_else(|| BookmarkError::NotFound(tab_id.to_string()))?;
        self.bookmarks
            .add_bookmark(&tab.url, &tab.title, tab.favicon.as_deref())
    }

    /// Handles text submitted from the address bar of `tab_id`.
    pub async fn submit(&self, tab_id: &str, input: &str) -> SubmitOutcome {
        let submission = {
            let settings = self.settings.borrow();
            resolve_submission(input, &*settings)
        };

        match submission {
            None => SubmitOutcome::Ignored,
            Some(Submission::Internal(action)) => {
                match action {
                    InternalAction::OpenSettings => {
                        self.open_settings();
                    }
                    InternalAction::OpenNewTab => {
                        self.new_tab();
                    }
                    InternalAction::Unknown => {
                        tracing::debug!(input = %input.trim(), "ignoring unknown internal address");
                    }
                }
                SubmitOutcome::Internal(action)
            }
            Some(Submission::Navigate(url)) => self.navigate(tab_id, &url).await,
        }
    }

    /// Records `url` as a new navigation of `tab_id` and encodes its frame URL.
    pub async fn navigate(&self, tab_id: &str, url: &str) -> SubmitOutcome {
        if self.store.borrow().get_tab(tab_id).is_none() {
            return SubmitOutcome::Stale;
        }
        let token = self.begin_navigation(tab_id);
        let _ = self.store.borrow_mut().set_loading(tab_id, true);

        let frame_url = match self.frame_url_for(url).await {
            Ok(frame_url) => frame_url,
            Err(e) => {
                tracing::warn!(tab_id = %tab_id, url = %url, error = %e, "failed to encode url");
                if self.is_latest(tab_id, token) {
                    let _ = self.store.borrow_mut().set_loading(tab_id, false);
                }
                return SubmitOutcome::Failed;
            }
        };

        if !self.is_latest(tab_id, token) {
            tracing::debug!(tab_id = %tab_id, url = %url, "dropping stale navigation");
            return SubmitOutcome::Stale;
        }

        let update = TabUpdate::new()
            .url(url)
            .frame_url(frame_url.as_str())
            .title(url)
            .favicon(None)
            .loading(!is_passthrough_url(url));
        if self.store.borrow_mut().update_tab(tab_id, update).is_err() {
            return SubmitOutcome::Stale;
        }
        tracing::info!(tab_id = %tab_id, url = %url, "navigating");

        SubmitOutcome::Navigated {
            url: url.to_string(),
            frame_url,
        }
    }

    /// Steps back in the tab's history and loads that entry.
    pub async fn go_back(&self, tab_id: &str) -> bool {
        let moved = self.store.borrow_mut().go_back(tab_id).unwrap_or(false);
        if moved {
            self.load_current(tab_id).await;
        }
        moved
    }

    /// Steps forward in the tab's history and loads that entry.
    pub async fn go_forward(&self, tab_id: &str) -> bool {
        let moved = self.store.borrow_mut().go_forward(tab_id).unwrap_or(false);
        if moved {
            self.load_current(tab_id).await;
        }
        moved
    }

    /// Encodes the tab's current logical URL into its frame URL.
    async fn load_current(&self, tab_id: &str) {
        let Some(url) = self.store.borrow().get_tab(tab_id).map(|t| t.url.clone()) else {
            return;
        };
        let token = self.begin_navigation(tab_id);
        let _ = self.store.borrow_mut().set_loading(tab_id, true);

        let result = self.frame_url_for(&url).await;
        if !self.is_latest(tab_id, token) {
            tracing::debug!(tab_id = %tab_id, url = %url, "dropping stale history load");
            return;
        }

        let mut store = self.store.borrow_mut();
        match result {
            Ok(frame_url) if store.get_tab(tab_id).is_some_and(|t| t.url == url) => {
                let update = TabUpdate::new()
                    .frame_url(frame_url)
                    .loading(!is_passthrough_url(&url));
                let _ = store.update_tab(tab_id, update);
            }
            Ok(_) => {
                tracing::debug!(tab_id = %tab_id, url = %url, "tab moved on, dropping history load");
            }
            Err(e) => {
                tracing::warn!(tab_id = %tab_id, url = %url, error = %e, "failed to encode history entry");
                let _ = store.set_loading(tab_id, false);
            }
        }
    }

    async fn frame_url_for(&self, url: &str) -> Result<String, RewriteError> {
        if is_passthrough_url(url) {
            return Ok(url.to_string());
        }
        let options = self.encode_options();
        let frame_url = self.rewriter.encode(url, &options).await?;
        if frame_url.trim().is_empty() {
            return Err(RewriteError::Encode(format!("empty frame url for {}", url)));
        }
        Ok(frame_url)
    }

    fn begin_navigation(&self, tab_id: &str) -> u64 {
        let mut seq = self.nav_seq.borrow_mut();
        let token = seq.entry(tab_id.to_string()).or_insert(0);
        *token += 1;
        *token
    }

    fn is_latest(&self, tab_id: &str, token: u64) -> bool {
        self.nav_seq.borrow().get(tab_id) == Some(&token)
    }
}
