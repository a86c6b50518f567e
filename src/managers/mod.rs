// Zentabs state managers
// Managers own mutable state: the tab collection, per-tab history and bookmarks.

pub mod bookmark_manager;
pub mod history_stack;
pub mod tab_store;
