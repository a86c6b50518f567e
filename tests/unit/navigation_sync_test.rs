//! Unit tests for the NavigationSynchronizer.
//!
//! Frames are simulated by handing snapshots to `on_navigation`. Races are
//! driven with `tokio::join!`: the rewriter double parks a decode on a oneshot
//! gate while the second branch mutates the store and then opens the gate.

mod support;

use std::rc::Rc;

use support::{default_options, frame_for, GatedRewriter};
use zentabs::managers::tab_store::{SharedTabStore, TabStore, TabStoreTrait};
use zentabs::services::navigation_sync::{NavigationSynchronizer, SyncOutcome};
use zentabs::types::frame::{FrameDocument, FrameSnapshot, NavigationSignal, ReadyState};
use zentabs::types::tab::{TabUpdate, BLANK_URL};

const EXAMPLE: &str = "https://example.com/";

struct Fixture {
    store: SharedTabStore,
    rewriter: Rc<GatedRewriter>,
    sync: NavigationSynchronizer<GatedRewriter>,
    tab_id: String,
}

fn fixture() -> Fixture {
    let store = TabStore::new().into_shared();
    let rewriter = Rc::new(GatedRewriter::new());
    let sync = NavigationSynchronizer::new(Rc::clone(&store), Rc::clone(&rewriter), default_options());
    let tab_id = store.borrow().active_tab_id().to_string();
    Fixture {
        store,
        rewriter,
        sync,
        tab_id,
    }
}

impl Fixture {
    fn tab(&self) -> std::sync::Arc<zentabs::types::tab::Tab> {
        self.store.borrow().get_tab(&self.tab_id).unwrap()
    }

    /// Loads `url` into the frame as a complete document titled `title`.
    async fn load(&self, url: &str, title: &str) -> SyncOutcome {
        let location = frame_for(url).await;
        self.sync
            .on_navigation(
                &self.tab_id,
                NavigationSignal::Load,
                FrameSnapshot::new(&location, FrameDocument::complete(title)),
            )
            .await
    }
}

#[tokio::test]
async fn test_load_applies_url_title_and_history() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);

    let outcome = f.load(EXAMPLE, "Example Domain").await;

    assert_eq!(outcome, SyncOutcome::Applied { url_changed: true, ready: true });
    let tab = f.tab();
    assert_eq!(tab.url, EXAMPLE);
    assert_eq!(tab.title, "Example Domain");
    assert_eq!(tab.frame_url, frame_for(EXAMPLE).await);
    assert!(!tab.loading);
    assert_eq!(tab.history.entries(), &[BLANK_URL, EXAMPLE]);
}

#[tokio::test]
async fn test_same_url_signal_does_not_push_history() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);

    f.load(EXAMPLE, "Example").await;
    let outcome = f.load(EXAMPLE, "Example, again").await;

    assert_eq!(outcome, SyncOutcome::Applied { url_changed: false, ready: true });
    let tab = f.tab();
    assert_eq!(tab.history.len(), 2);
    assert_eq!(tab.title, "Example, again");
}

#[tokio::test]
async fn test_hash_change_records_fragment_url() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);
    f.load(EXAMPLE, "Example").await;

    let location = frame_for("https://example.com/#section").await;
    let outcome = f
        .sync
        .on_navigation(
            &f.tab_id,
            NavigationSignal::HashChange,
            FrameSnapshot::new(&location, FrameDocument::complete("Example")),
        )
        .await;

    assert_eq!(outcome, SyncOutcome::Applied { url_changed: true, ready: true });
    assert_eq!(f.tab().url, "https://example.com/#section");
    assert_eq!(f.tab().history.len(), 3);
}

#[tokio::test]
async fn test_missing_title_falls_back() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);
    let location = frame_for(EXAMPLE).await;

    f.sync
        .on_navigation(&f.tab_id, NavigationSignal::Load, FrameSnapshot::opaque(&location))
        .await;
    // New URL and no document title: the URL itself.
    assert_eq!(f.tab().title, EXAMPLE);

    f.store
        .borrow_mut()
        .update_tab(&f.tab_id, TabUpdate::new().title("Kept"))
        .unwrap();
    f.sync
        .on_navigation(&f.tab_id, NavigationSignal::ReplaceState, FrameSnapshot::opaque(&location))
        .await;
    // Same URL: the previous title survives.
    assert_eq!(f.tab().title, "Kept");
}

#[tokio::test]
async fn test_favicon_from_document_icon() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);
    let location = frame_for(EXAMPLE).await;

    f.sync
        .on_navigation(
            &f.tab_id,
            NavigationSignal::Load,
            FrameSnapshot::new(&location, FrameDocument::complete("Example").with_icon("/uv/service/icon")),
        )
        .await;

    assert_eq!(f.tab().favicon.as_deref(), Some("/uv/service/icon"));
}

#[tokio::test]
async fn test_favicon_defaults_to_rewritten_origin_icon() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);

    f.load("https://example.com/some/page?x=1", "Page").await;

    let expected = frame_for("https://example.com/favicon.ico").await;
    assert_eq!(f.tab().favicon, Some(expected));
}

#[tokio::test]
async fn test_loading_document_keeps_tab_loading() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);
    let location = frame_for(EXAMPLE).await;

    let outcome = f
        .sync
        .on_navigation(
            &f.tab_id,
            NavigationSignal::Load,
            FrameSnapshot::new(
                &location,
                FrameDocument::complete("Example").with_ready_state(ReadyState::Interactive),
            ),
        )
        .await;
    assert_eq!(outcome, SyncOutcome::Applied { url_changed: true, ready: false });
    assert!(f.tab().loading);

    let outcome = f.load(EXAMPLE, "Example").await;
    assert_eq!(outcome, SyncOutcome::Applied { url_changed: false, ready: true });
    assert!(!f.tab().loading);
}

#[tokio::test]
async fn test_empty_document_reloads_once_then_gives_up() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);
    let location = frame_for(EXAMPLE).await;
    let empty = FrameSnapshot::new(&location, FrameDocument::empty());

    let first = f.sync.on_navigation(&f.tab_id, NavigationSignal::Load, empty.clone()).await;
    assert_eq!(first, SyncOutcome::Reload { frame_url: location.clone() });
    assert!(f.tab().loading);
    assert_eq!(f.sync.pending_frame_load(&f.tab_id), Some(location.clone()));

    f.sync.mark_applied(&f.tab_id, &location);
    let second = f.sync.on_navigation(&f.tab_id, NavigationSignal::Load, empty).await;
    assert_eq!(second, SyncOutcome::Applied { url_changed: false, ready: true });
    assert!(!f.tab().loading);
}

#[tokio::test]
async fn test_decode_failure_leaves_store_untouched() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);
    f.load(EXAMPLE, "Example").await;
    let before = f.tab();

    f.rewriter.fail_decode.set(true);
    let outcome = f.load("https://other.example/", "Other").await;

    assert_eq!(outcome, SyncOutcome::Skipped);
    assert_eq!(f.tab(), before);
}

#[tokio::test]
async fn test_unrecognized_frame_location_is_skipped() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);

    let outcome = f
        .sync
        .on_navigation(
            &f.tab_id,
            NavigationSignal::Load,
            FrameSnapshot::new("http://localhost:3000/not-rewritten", FrameDocument::complete("?")),
        )
        .await;

    assert_eq!(outcome, SyncOutcome::Skipped);
    assert_eq!(f.tab().url, BLANK_URL);
}

#[tokio::test]
async fn test_signal_without_attachment_is_ignored() {
    let f = fixture();
    assert_eq!(f.load(EXAMPLE, "Example").await, SyncOutcome::Ignored);

    let frame = f.sync.attach(&f.tab_id);
    assert!(f.sync.is_attached(&f.tab_id));
    drop(frame);
    assert!(!f.sync.is_attached(&f.tab_id));
    assert_eq!(f.load(EXAMPLE, "Example").await, SyncOutcome::Ignored);
    assert_eq!(f.rewriter.decode_calls.get(), 0);
}

#[tokio::test]
async fn test_dropping_old_attachment_keeps_newer_one() {
    let f = fixture();
    let old = f.sync.attach(&f.tab_id);
    let _new = f.sync.attach(&f.tab_id);

    drop(old);

    assert!(f.sync.is_attached(&f.tab_id));
}

#[tokio::test]
async fn test_result_discarded_when_tab_navigates_mid_decode() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);
    let other_frame = frame_for("https://other.example/").await;
    let gate = f.rewriter.hold_next_decode();

    let store = Rc::clone(&f.store);
    let tab_id = f.tab_id.clone();
    let (outcome, _) = tokio::join!(f.load(EXAMPLE, "Example"), async move {
        tokio::task::yield_now().await;
        store
            .borrow_mut()
            .update_tab(
                &tab_id,
                TabUpdate::new().url("https://other.example/").frame_url(other_frame),
            )
            .unwrap();
        gate.send(()).unwrap();
    });

    assert_eq!(outcome, SyncOutcome::Discarded);
    let tab = f.tab();
    assert_eq!(tab.url, "https://other.example/");
    assert_eq!(tab.title, "New Tab");
}

#[tokio::test]
async fn test_result_discarded_when_tab_closes_mid_decode() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);
    let gate = f.rewriter.hold_next_decode();

    let store = Rc::clone(&f.store);
    let tab_id = f.tab_id.clone();
    let (outcome, _) = tokio::join!(f.load(EXAMPLE, "Example"), async move {
        tokio::task::yield_now().await;
        store.borrow_mut().remove_tab(&tab_id).unwrap();
        gate.send(()).unwrap();
    });

    assert_eq!(outcome, SyncOutcome::Discarded);
    assert!(f.store.borrow().get_tab(&f.tab_id).is_none());
    assert_eq!(f.store.borrow().tab_count(), 1);
}

#[tokio::test]
async fn test_result_discarded_when_frame_detaches_mid_decode() {
    let f = fixture();
    let frame = f.sync.attach(&f.tab_id);
    let gate = f.rewriter.hold_next_decode();

    let (outcome, _) = tokio::join!(f.load(EXAMPLE, "Example"), async move {
        tokio::task::yield_now().await;
        drop(frame);
        gate.send(()).unwrap();
    });

    assert_eq!(outcome, SyncOutcome::Discarded);
    assert_eq!(f.tab().url, BLANK_URL);
}

#[tokio::test]
async fn test_signals_during_a_pass_are_coalesced_to_the_latest() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);
    let gate = f.rewriter.hold_next_decode();

    let a = frame_for("https://a.example/").await;
    let b = frame_for("https://b.example/").await;
    let c = frame_for("https://c.example/").await;

    let sync = &f.sync;
    let tab_id = f.tab_id.as_str();
    let (outcome, parked) = tokio::join!(
        sync.on_navigation(tab_id, NavigationSignal::Load, FrameSnapshot::new(&a, FrameDocument::complete("A"))),
        async move {
            tokio::task::yield_now().await;
            assert!(sync.is_updating(tab_id));
            let first = sync
                .on_navigation(tab_id, NavigationSignal::PushState, FrameSnapshot::new(&b, FrameDocument::complete("B")))
                .await;
            let second = sync
                .on_navigation(tab_id, NavigationSignal::PushState, FrameSnapshot::new(&c, FrameDocument::complete("C")))
                .await;
            gate.send(()).unwrap();
            (first, second)
        }
    );

    assert_eq!(parked, (SyncOutcome::Coalesced, SyncOutcome::Coalesced));
    assert_eq!(outcome, SyncOutcome::Applied { url_changed: true, ready: true });
    // A, then only the latest parked snapshot.
    assert_eq!(f.rewriter.decode_calls.get(), 2);
    let tab = f.tab();
    assert_eq!(tab.url, "https://c.example/");
    assert_eq!(tab.history.entries(), &[BLANK_URL, "https://a.example/", "https://c.example/"]);
    assert!(!f.sync.is_updating(&f.tab_id));
}

#[tokio::test]
async fn test_pending_frame_load_tracks_last_applied() {
    let f = fixture();
    assert_eq!(f.sync.pending_frame_load(&f.tab_id), None);

    let _frame = f.sync.attach(&f.tab_id);
    assert_eq!(f.sync.pending_frame_load(&f.tab_id), Some(BLANK_URL.to_string()));
    f.sync.mark_applied(&f.tab_id, BLANK_URL);
    assert_eq!(f.sync.pending_frame_load(&f.tab_id), None);

    let location = frame_for(EXAMPLE).await;
    f.store
        .borrow_mut()
        .update_tab(&f.tab_id, TabUpdate::new().url(EXAMPLE).frame_url(location.as_str()))
        .unwrap();
    assert_eq!(f.sync.pending_frame_load(&f.tab_id), Some(location.clone()));

    // A frame-driven update marks its own location as applied, so the host
    // does not reassign it.
    f.load(EXAMPLE, "Example").await;
    assert_eq!(f.sync.last_applied(&f.tab_id), Some(location));
    assert_eq!(f.sync.pending_frame_load(&f.tab_id), None);
}

#[tokio::test]
async fn test_request_reload_forgets_last_applied() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);
    f.load(EXAMPLE, "Example").await;
    let location = frame_for(EXAMPLE).await;

    assert_eq!(f.sync.request_reload(&f.tab_id), Some(location.clone()));
    assert_eq!(f.sync.pending_frame_load(&f.tab_id), Some(location));
}

#[tokio::test]
async fn test_frame_error_stops_loading_only() {
    let f = fixture();
    let _frame = f.sync.attach(&f.tab_id);
    f.load(EXAMPLE, "Example").await;
    f.store.borrow_mut().set_loading(&f.tab_id, true).unwrap();

    f.sync.on_frame_error(&f.tab_id);

    let tab = f.tab();
    assert!(!tab.loading);
    assert_eq!(tab.title, "Example");
    assert_eq!(tab.url, EXAMPLE);
}

#[tokio::test]
async fn test_detach_mid_decode_restores_loading() {
    let f = fixture();
    let frame = f.sync.attach(&f.tab_id);
    f.load(EXAMPLE, "Example").await;
    assert!(!f.tab().loading);
    let gate = f.rewriter.hold_next_decode();

    let (outcome, _) = tokio::join!(f.load("https://other.example/", "Other"), async move {
        tokio::task::yield_now().await;
        drop(frame);
        gate.send(()).unwrap();
    });

    assert_eq!(outcome, SyncOutcome::Discarded);
    let tab = f.tab();
    assert!(!tab.loading);
    assert_eq!(tab.url, EXAMPLE);
}
