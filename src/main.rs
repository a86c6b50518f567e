//! Zentabs demo. Drives the tab core end to end against the bundled
//! prefix rewriter, playing the part of the content-frame host.

use tracing_subscriber::EnvFilter;

use zentabs::app::{App, SubmitOutcome};
use zentabs::managers::tab_store::TabStoreTrait;
use zentabs::services::rewriting_service::PrefixRewriter;
use zentabs::services::settings_engine::SettingsEngine;
use zentabs::types::frame::{FrameDocument, FrameSnapshot, NavigationSignal};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zentabs=info")),
        )
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime");

    runtime.block_on(run());
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

async fn run() {
    println!();
    println!("  Zentabs v{} — Demo Mode", env!("CARGO_PKG_VERSION"));
    println!();

    let mut settings = SettingsEngine::new(None);
    if let Err(e) = settings.load() {
        tracing::warn!(error = %e, "falling back to default settings");
    }
    let app = App::new(PrefixRewriter::with_origin("http://localhost:3000"), settings);
    let tab_id = app.store.borrow().active_tab_id().to_string();
    let _frame = app.attach_frame(&tab_id);

    section("Submission");
    for input in ["example.com", "rust ownership", "zen://settings", "   "] {
        let outcome = app.submit(&tab_id, input).await;
        println!("  {:<18} -> {:?}", format!("{:?}", input), outcome);
    }

    section("Frame synchronization");
    if let Some(frame_url) = app.sync.pending_frame_load(&tab_id) {
        println!("  host loads {}", frame_url);
        app.sync.mark_applied(&tab_id, &frame_url);
        let page = FrameDocument::complete("Example Domain");
        let outcome = app
            .sync
            .on_navigation(&tab_id, NavigationSignal::Load, FrameSnapshot::new(&frame_url, page))
            .await;
        println!("  load -> {:?}", outcome);
    }
    let tab = app.store.borrow().get_tab(&tab_id);
    if let Some(tab) = tab {
        println!("  title = {:?}, loading = {}", tab.title, tab.loading);
        println!("  history = {:?}", tab.history.entries());
    }

    let _ = app.store.borrow_mut().set_active_tab(&tab_id);

    section("History");
    if let SubmitOutcome::Navigated { url, .. } =
        app.submit(&tab_id, "https://www.rust-lang.org").await
    {
        println!("  navigated to {}", url);
    }
    app.go_back(&tab_id).await;
    println!("  back    -> {}", app.address_bar().text);
    app.go_forward(&tab_id).await;
    println!("  forward -> {}", app.address_bar().text);

    section("Tabs");
    let count = app.store.borrow().tab_count();
    println!("  open tabs: {}", count);
    let tabs = app.store.borrow().get_all_tabs();
    for tab in tabs {
        app.close_tab(&tab.id);
    }
    let store = app.store.borrow();
    println!(
        "  after closing all: {} tab(s), active = {}",
        store.tab_count(),
        store.get_active_tab().url
    );
    println!();
}
