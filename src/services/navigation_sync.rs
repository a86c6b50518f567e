//! Navigation Synchronizer.
//!
//! Bridges what the content frame actually shows to the logical model in the
//! tab store. Every navigation signal from a frame (load, history API calls,
//! pop/hash navigation, link activation) is reconciled by decoding the frame's
//! raw location back to a logical URL.
//!
//! Reconciliation is serialized per tab: a signal that arrives while a pass is
//! in flight is parked and only the latest parked snapshot is processed once
//! the pass settles. Every `await` is followed by a fresh lookup of the tab by
//! id, so a tab closed or re-navigated in the meantime turns the pass into a
//! no-op.
//!
//! A frame must be attached before its signals are processed. The returned
//! [`FrameAttachment`] is the observation handle for that frame instance and
//! tears down the per-frame state when dropped.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use url::Url;

use crate::managers::tab_store::{SharedTabStore, TabStoreTrait};
use crate::services::rewriting_service::{EncodeOptions, RewritingService};
use crate::types::frame::{FrameSnapshot, NavigationSignal, ReadyState};
use crate::types::tab::{is_passthrough_url, Tab, TabUpdate, DEFAULT_TITLE};

/// Reloads attempted for a document that completes with no content.
pub const MAX_EMPTY_RELOADS: u8 = 1;

/// Result of handling one navigation signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The store now reflects the frame. `ready` is false while the document
    /// is still loading.
    Applied { url_changed: bool, ready: bool },
    /// The frame completed empty; the host should assign `frame_url` again.
    Reload { frame_url: String },
    /// A pass was already running; this snapshot will be handled after it.
    Coalesced,
    /// The tab was closed, detached or navigated elsewhere mid-pass.
    Discarded,
    /// The frame location could not be decoded. Store left untouched.
    Skipped,
    /// No frame is attached for this tab.
    Ignored,
}

#[derive(Debug)]
struct FrameState {
    epoch: u64,
    /// Frame URL last loaded into this frame instance.
    last_applied: Option<String>,
    updating: bool,
    pending: Option<(NavigationSignal, FrameSnapshot)>,
    initial: bool,
    empty_reloads: u8,
}

impl FrameState {
    fn new(epoch: u64) -> Self {
        Self {
            epoch,
            last_applied: None,
            updating: false,
            pending: None,
            initial: true,
            empty_reloads: 0,
        }
    }
}

type FrameMap = Rc<RefCell<HashMap<String, FrameState>>>;

/// Observation handle for one attached content frame.
///
/// Dropping it detaches the frame: in-flight passes for it are discarded and
/// later signals are ignored until the tab is attached again.
#[derive(Debug)]
pub struct FrameAttachment {
    tab_id: String,
    epoch: u64,
    frames: Weak<RefCell<HashMap<String, FrameState>>>,
}

impl FrameAttachment {
    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }
}

impl Drop for FrameAttachment {
    fn drop(&mut self) {
        let Some(frames) = self.frames.upgrade() else {
            return;
        };
        let mut frames = frames.borrow_mut();
        // A newer attachment for the same tab owns the entry now.
        if frames.get(&self.tab_id).is_some_and(|s| s.epoch == self.epoch) {
            frames.remove(&self.tab_id);
            tracing::debug!(tab_id = %self.tab_id, "frame detached");
        }
    }
}

/// Per-tab controller keeping the store in step with content frames.
pub struct NavigationSynchronizer<R: RewritingService> {
    store: SharedTabStore,
    rewriter: Rc<R>,
    options: RefCell<EncodeOptions>,
    frames: FrameMap,
    next_epoch: Cell<u64>,
}

impl<R: RewritingService> NavigationSynchronizer<R> {
    pub fn new(store: SharedTabStore, rewriter: Rc<R>, options: EncodeOptions) -> Self {
        Self {
            store,
            rewriter,
            options: RefCell::new(options),
            frames: Rc::new(RefCell::new(HashMap::new())),
            next_epoch: Cell::new(1),
        }
    }

    pub fn set_encode_options(&self, options: EncodeOptions) {
        *self.options.borrow_mut() = options;
    }

    /// Starts observing the content frame of `tab_id`.
    ///
    /// Re-attaching replaces the previous frame state; the first signal after
    /// attaching is treated as the initial navigation.
    pub fn attach(&self, tab_id: &str) -> FrameAttachment {
        let epoch = self.next_epoch.get();
        self.next_epoch.set(epoch + 1);
        self.frames
            .borrow_mut()
            .insert(tab_id.to_string(), FrameState::new(epoch));
        tracing::debug!(tab_id = %tab_id, epoch, "frame attached");

        FrameAttachment {
            tab_id: tab_id.to_string(),
            epoch,
            frames: Rc::downgrade(&self.frames),
        }
    }

    /// Drops all frame state for a closed tab.
    pub fn forget(&self, tab_id: &str) {
        self.frames.borrow_mut().remove(tab_id);
    }

    pub fn is_attached(&self, tab_id: &str) -> bool {
        self.frames.borrow().contains_key(tab_id)
    }

    pub fn is_updating(&self, tab_id: &str) -> bool {
        self.frames
            .borrow()
            .get(tab_id)
            .is_some_and(|s| s.updating)
    }

    /// Frame URL last loaded into the tab's frame instance.
    pub fn last_applied(&self, tab_id: &str) -> Option<String> {
        self.frames
            .borrow()
            .get(tab_id)
            .and_then(|s| s.last_applied.clone())
    }

    /// Frame URL the host still has to assign, if the store's `frame_url`
    /// differs from what the frame last loaded.
    pub fn pending_frame_load(&self, tab_id: &str) -> Option<String> {
        let tab = self.store.borrow().get_tab(tab_id)?;
        let frames = self.frames.borrow();
        let state = frames.get(tab_id)?;
        match state.last_applied.as_deref() {
            Some(applied) if applied == tab.frame_url => None,
            _ => Some(tab.frame_url.clone()),
        }
    }

    /// Records that the host assigned `frame_url` to the tab's frame.
    pub fn mark_applied(&self, tab_id: &str, frame_url: &str) {
        if let Some(state) = self.frames.borrow_mut().get_mut(tab_id) {
            state.last_applied = Some(frame_url.to_string());
        }
    }

    /// Forgets the last-applied marker so the current frame URL is loaded
    /// again. Returns that URL.
    pub fn request_reload(&self, tab_id: &str) -> Option<String> {
        let tab = self.store.borrow().get_tab(tab_id)?;
        let mut frames = self.frames.borrow_mut();
        let state = frames.get_mut(tab_id)?;
        state.last_applied = None;
        state.empty_reloads = 0;
        Some(tab.frame_url.clone())
    }

    /// Handles an error event from the frame: loading stops, metadata stays.
    pub fn on_frame_error(&self, tab_id: &str) {
        if !self.is_attached(tab_id) {
            return;
        }
        tracing::warn!(tab_id = %tab_id, "content frame reported an error");
        let _ = self
            .store
            .borrow_mut()
            .update_tab(tab_id, TabUpdate::new().loading(false));
    }

    /// Reconciles the store with the frame state captured in `snapshot`.
    pub async fn on_navigation(
        &self,
        tab_id: &str,
        signal: NavigationSignal,
        snapshot: FrameSnapshot,
    ) -> SyncOutcome {
        let epoch = {
            let mut frames = self.frames.borrow_mut();
            let Some(state) = frames.get_mut(tab_id) else {
                tracing::debug!(tab_id = %tab_id, ?signal, "signal for unattached frame");
                return SyncOutcome::Ignored;
            };
            if state.updating {
                tracing::trace!(tab_id = %tab_id, ?signal, "coalescing navigation signal");
                state.pending = Some((signal, snapshot));
                return SyncOutcome::Coalesced;
            }
            state.updating = true;
            state.epoch
        };

        let mut current = (signal, snapshot);
        loop {
            let outcome = self.reconcile(tab_id, epoch, current.0, &current.1).await;

            let next = {
                let mut frames = self.frames.borrow_mut();
                match frames.get_mut(tab_id) {
                    Some(state) if state.epoch == epoch => {
                        let next = state.pending.take();
                        if next.is_none() {
                            state.updating = false;
                        }
                        next
                    }
                    _ => None,
                }
            };

            match next {
                Some(parked) => current = parked,
                None => return outcome,
            }
        }
    }

    fn is_current(&self, tab_id: &str, epoch: u64) -> bool {
        self.frames
            .borrow()
            .get(tab_id)
            .is_some_and(|s| s.epoch == epoch)
    }

    async fn reconcile(
        &self,
        tab_id: &str,
        epoch: u64,
        signal: NavigationSignal,
        snapshot: &FrameSnapshot,
    ) -> SyncOutcome {
        let Some(before) = self.store.borrow().get_tab(tab_id) else {
            return SyncOutcome::Discarded;
        };

        let initial = match self.frames.borrow_mut().get_mut(tab_id) {
            Some(state) => std::mem::replace(&mut state.initial, false),
            None => return SyncOutcome::Discarded,
        };
        if !initial {
            let _ = self.store.borrow_mut().set_loading(tab_id, true);
        }

        tracing::debug!(tab_id = %tab_id, ?signal, location = %snapshot.location, "reconciling frame");

        let Some(logical) = self.decode_location(tab_id, &snapshot.location).await else {
            self.restore_loading(tab_id, &before);
            return SyncOutcome::Skipped;
        };

        let document = snapshot.document.as_ref();
        let icon_href = document
            .and_then(|d| d.icon_href.as_deref())
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string);
        let icon = match icon_href {
            Some(href) => Some(href),
            None => self.default_favicon(&logical).await,
        };

        // Everything below runs against the store as it is now.
        if !self.is_current(tab_id, epoch) {
            tracing::debug!(tab_id = %tab_id, "frame detached mid-pass, dropping result");
            self.restore_loading(tab_id, &before);
            return SyncOutcome::Discarded;
        }
        let mut store = self.store.borrow_mut();
        let Some(tab) = store.get_tab(tab_id) else {
            tracing::debug!(tab_id = %tab_id, "tab closed mid-pass, dropping result");
            return SyncOutcome::Discarded;
        };
        // Back/forward moves `url` and the history pointer before the new
        // frame URL is known.
        let frame_moved = tab.frame_url != before.frame_url && tab.frame_url != snapshot.location;
        if frame_moved || tab.url != before.url || tab.history.index() != before.history.index() {
            tracing::debug!(tab_id = %tab_id, "tab navigated mid-pass, dropping result");
            return SyncOutcome::Discarded;
        }

        let url_changed = logical != tab.url;
        let title = match document.and_then(|d| d.title.as_deref()).map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ if !url_changed && tab.title != DEFAULT_TITLE && !tab.title.is_empty() => {
                tab.title.clone()
            }
            _ => logical.clone(),
        };
        let favicon = match icon {
            Some(icon) => Some(icon),
            None if !url_changed => tab.favicon.clone(),
            None => None,
        };

        let mut update = TabUpdate::new()
            .frame_url(snapshot.location.as_str())
            .title(title)
            .favicon(favicon);
        if url_changed {
            update = update.url(logical.as_str());
        }

        let outcome = {
            let mut frames = self.frames.borrow_mut();
            let Some(state) = frames.get_mut(tab_id) else {
                return SyncOutcome::Discarded;
            };
            state.last_applied = Some(snapshot.location.clone());
            if url_changed {
                state.empty_reloads = 0;
            }

            match document {
                Some(doc) if doc.ready_state != ReadyState::Complete => {
                    update = update.loading(true);
                    SyncOutcome::Applied { url_changed, ready: false }
                }
                Some(doc) if !doc.is_populated() && state.empty_reloads < MAX_EMPTY_RELOADS => {
                    state.empty_reloads += 1;
                    state.last_applied = None;
                    update = update.loading(true);
                    tracing::debug!(tab_id = %tab_id, "frame completed empty, reloading");
                    SyncOutcome::Reload {
                        frame_url: snapshot.location.clone(),
                    }
                }
                Some(doc) if !doc.is_populated() => {
                    tracing::warn!(tab_id = %tab_id, url = %logical, "frame still empty after reload, giving up");
                    state.empty_reloads = 0;
                    update = update.loading(false);
                    SyncOutcome::Applied { url_changed, ready: true }
                }
                _ => {
                    state.empty_reloads = 0;
                    update = update.loading(false);
                    SyncOutcome::Applied { url_changed, ready: true }
                }
            }
        };

        let _ = store.update_tab(tab_id, update);
        outcome
    }

    /// Puts `loading` back to its value before the pass, unless the tab has
    /// been navigated since.
    fn restore_loading(&self, tab_id: &str, before: &Tab) {
        let mut store = self.store.borrow_mut();
        let unmoved = store.get_tab(tab_id).is_some_and(|tab| {
            tab.url == before.url
                && tab.frame_url == before.frame_url
                && tab.history.index() == before.history.index()
        });
        if unmoved {
            let _ = store.set_loading(tab_id, before.loading);
        }
    }

    /// Decodes the frame location, logging and returning `None` on failure.
    async fn decode_location(&self, tab_id: &str, location: &str) -> Option<String> {
        match self.rewriter.decode(location).await {
            Ok(url) if url.trim().is_empty() => {
                tracing::warn!(tab_id = %tab_id, location = %location, "decode returned an empty url");
                None
            }
            Ok(url) if url == location && !is_passthrough_url(location) => {
                tracing::warn!(tab_id = %tab_id, location = %location, "decode returned the frame url unchanged");
                None
            }
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(tab_id = %tab_id, location = %location, error = %e, "failed to decode frame location");
                None
            }
        }
    }

    /// Rewritten `/favicon.ico` of the page's origin.
    async fn default_favicon(&self, logical: &str) -> Option<String> {
        let origin = Url::parse(logical)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))?
            .origin()
            .ascii_serialization();
        let options = self.options.borrow().clone();

        match self
            .rewriter
            .encode(&format!("{}/favicon.ico", origin), &options)
            .await
        {
            Ok(frame_url) if !frame_url.is_empty() => Some(frame_url),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "failed to encode default favicon");
                None
            }
        }
    }
}
