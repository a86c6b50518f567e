// Zentabs services
// Services turn input into navigations and keep content frames and the tab store in step.

pub mod address_bar;
pub mod navigation_sync;
pub mod rewriting_service;
pub mod settings_engine;
pub mod submission_resolver;
