//! Tab Entity Store.
//!
//! Sole owner of the tab collection and the active-tab pointer. Tabs are held
//! behind `Arc` and replaced copy-on-write, so a snapshot handed out by
//! `get_tab` never observes a later mutation.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use crate::types::errors::TabError;
use crate::types::tab::{Tab, TabUpdate};

/// Store handle shared by the app and the navigation synchronizer.
pub type SharedTabStore = Rc<RefCell<TabStore>>;

/// Trait defining the tab store interface.
pub trait TabStoreTrait {
    fn add_tab(&mut self, url: &str, title: &str) -> String;
    fn remove_tab(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn update_tab(&mut self, tab_id: &str, update: TabUpdate) -> Result<(), TabError>;
    fn set_active_tab(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn set_loading(&mut self, tab_id: &str, loading: bool) -> Result<(), TabError>;
    fn reorder_tabs(&mut self, new_order: &[String]) -> Result<(), TabError>;
    fn go_back(&mut self, tab_id: &str) -> Result<bool, TabError>;
    fn go_forward(&mut self, tab_id: &str) -> Result<bool, TabError>;
    fn add_to_history(&mut self, tab_id: &str, url: &str) -> Result<(), TabError>;
    fn get_tab(&self, tab_id: &str) -> Option<Arc<Tab>>;
    fn get_all_tabs(&self) -> Vec<Arc<Tab>>;
    fn get_active_tab(&self) -> Arc<Tab>;
    fn active_tab_id(&self) -> &str;
    fn tab_count(&self) -> usize;
    fn get_tab_order(&self) -> Vec<String>;
    fn history(&self, tab_id: &str) -> Vec<String>;
}

/// In-memory tab store.
///
/// Holds at least one tab at all times and `active_tab_id` always names one of
/// them.
#[derive(Debug)]
pub struct TabStore {
    tabs: Vec<Arc<Tab>>,
    active_tab_id: String,
    strict: bool,
}

impl TabStore {
    /// Creates a store seeded with one blank tab. Violations are logged and ignored.
    pub fn new() -> Self {
        let tab = Tab::blank();
        Self {
            active_tab_id: tab.id.clone(),
            tabs: vec![Arc::new(tab)],
            strict: false,
        }
    }

    /// Like `new`, but unknown ids and bad reorders are returned as errors.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::new()
        }
    }

    pub fn into_shared(self) -> SharedTabStore {
        Rc::new(RefCell::new(self))
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns the first tab whose logical URL equals `url`.
    pub fn find_by_url(&self, url: &str) -> Option<Arc<Tab>> {
        self.tabs.iter().find(|t| t.url == url).cloned()
    }

    fn find_tab_index(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    fn violation(&self, err: TabError) -> Result<(), TabError> {
        if self.strict {
            return Err(err);
        }
        tracing::debug!(error = %err, "ignoring tab store violation");
        Ok(())
    }

    /// Applies `f` to a private copy of the tab and swaps it in.
    fn modify<T>(
        &mut self,
        tab_id: &str,
        f: impl FnOnce(&mut Tab) -> T,
    ) -> Result<Option<T>, TabError> {
        match self.find_tab_index(tab_id) {
            Some(idx) => Ok(Some(f(Arc::make_mut(&mut self.tabs[idx])))),
            None => self
                .violation(TabError::NotFound(tab_id.to_string()))
                .map(|_| None),
        }
    }

    /// Re-seeds the collection with a blank tab if it is empty.
    fn ensure_tab_exists(&mut self) {
        if self.tabs.is_empty() {
            let tab = Tab::blank();
            tracing::info!(tab_id = %tab.id, "collection emptied, opening blank tab");
            self.active_tab_id = tab.id.clone();
            self.tabs.push(Arc::new(tab));
        }
    }
}

/// The single history-push primitive behind every navigating mutation.
fn push_history(tab: &mut Tab, url: &str) {
    if tab.url == url {
        return;
    }
    tab.history.push(url);
    tab.url = url.to_string();
}

impl Default for TabStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TabStoreTrait for TabStore {
    /// Creates a tab at the front of the collection and activates it.
    /// Returns the new tab's ID.
    fn add_tab(&mut self, url: &str, title: &str) -> String {
        let tab = Tab::new(url, title);
        let id = tab.id.clone();
        tracing::info!(tab_id = %id, url = %url, "opened tab");
        self.tabs.insert(0, Arc::new(tab));
        self.active_tab_id = id.clone();
        id
    }

    /// Closes a tab. An active tab hands activation to the tab before it,
    /// or to the first tab; closing the last tab opens a blank one.
    fn remove_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        let Some(idx) = self.find_tab_index(tab_id) else {
            return self.violation(TabError::NotFound(tab_id.to_string()));
        };

        self.tabs.remove(idx);
        tracing::info!(tab_id = %tab_id, "closed tab");

        if self.tabs.is_empty() {
            self.ensure_tab_exists();
            return Ok(());
        }

        if self.active_tab_id == tab_id {
            let next = idx.saturating_sub(1).min(self.tabs.len() - 1);
            self.active_tab_id = self.tabs[next].id.clone();
        }
        Ok(())
    }

    /// Merges `update` into the tab. A `url` different from the current one
    /// is a navigation and pushes history; everything else is a plain replace.
    fn update_tab(&mut self, tab_id: &str, update: TabUpdate) -> Result<(), TabError> {
        self.modify(tab_id, |tab| {
            if let Some(url) = update.url.as_deref() {
                push_history(tab, url);
            }
            if let Some(frame_url) = update.frame_url {
                tab.frame_url = frame_url;
            }
            if let Some(title) = update.title {
                tab.title = title;
            }
            if let Some(favicon) = update.favicon {
                tab.favicon = favicon;
            }
            if let Some(loading) = update.loading {
                tab.loading = loading;
            }
        })
        .map(|_| ())
    }

    fn set_active_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        if self.find_tab_index(tab_id).is_none() {
            return self.violation(TabError::NotFound(tab_id.to_string()));
        }
        self.active_tab_id = tab_id.to_string();
        Ok(())
    }

    fn set_loading(&mut self, tab_id: &str, loading: bool) -> Result<(), TabError> {
        self.modify(tab_id, |tab| tab.loading = loading).map(|_| ())
    }

    /// Replaces the collection order. `new_order` must be a permutation of
    /// the current ids; anything else leaves the order untouched.
    fn reorder_tabs(&mut self, new_order: &[String]) -> Result<(), TabError> {
        if new_order.len() != self.tabs.len() {
            tracing::warn!(expected = self.tabs.len(), got = new_order.len(), "rejected tab reorder");
            return self.violation(TabError::InvalidOrder(format!(
                "expected {} ids, got {}",
                self.tabs.len(),
                new_order.len()
            )));
        }

        let mut seen = HashSet::new();
        let mut reordered = Vec::with_capacity(new_order.len());
        for id in new_order {
            let tab = self.tabs.iter().find(|t| &t.id == id);
            match tab {
                Some(tab) if seen.insert(id.as_str()) => reordered.push(Arc::clone(tab)),
                _ => {
                    tracing::warn!(tab_id = %id, "rejected tab reorder");
                    return self.violation(TabError::InvalidOrder(format!(
                        "unknown or repeated id {}",
                        id
                    )));
                }
            }
        }

        self.tabs = reordered;
        Ok(())
    }

    /// Moves the history pointer back. Returns whether it moved.
    fn go_back(&mut self, tab_id: &str) -> Result<bool, TabError> {
        self.modify(tab_id, |tab| match tab.history.back() {
            Some(url) => {
                tab.url = url.to_string();
                true
            }
            None => false,
        })
        .map(|moved| moved.unwrap_or(false))
    }

    /// Moves the history pointer forward. Returns whether it moved.
    fn go_forward(&mut self, tab_id: &str) -> Result<bool, TabError> {
        self.modify(tab_id, |tab| match tab.history.forward() {
            Some(url) => {
                tab.url = url.to_string();
                true
            }
            None => false,
        })
        .map(|moved| moved.unwrap_or(false))
    }

    /// Navigates the tab to `url` through the same push as `update_tab`.
    fn add_to_history(&mut self, tab_id: &str, url: &str) -> Result<(), TabError> {
        self.modify(tab_id, |tab| push_history(tab, url)).map(|_| ())
    }

    fn get_tab(&self, tab_id: &str) -> Option<Arc<Tab>> {
        self.tabs.iter().find(|t| t.id == tab_id).cloned()
    }

    fn get_all_tabs(&self) -> Vec<Arc<Tab>> {
        self.tabs.clone()
    }

    fn get_active_tab(&self) -> Arc<Tab> {
        match self.get_tab(&self.active_tab_id) {
            Some(tab) => tab,
            // Unreachable while the invariants hold; fall back to the first tab.
            None => Arc::clone(&self.tabs[0]),
        }
    }

    fn active_tab_id(&self) -> &str {
        &self.active_tab_id
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    fn get_tab_order(&self) -> Vec<String> {
        self.tabs.iter().map(|t| t.id.clone()).collect()
    }

    /// Copy of the tab's history; empty for an unknown id.
    fn history(&self, tab_id: &str) -> Vec<String> {
        self.get_tab(tab_id)
            .map(|t| t.history.entries().to_vec())
            .unwrap_or_default()
    }
}
