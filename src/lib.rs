//! Zentabs: tab session core for a web front-end whose content frames are
//! served through an external URL-rewriting proxy.
//!
//! This library crate exposes all modules for use by the demo binary and integration tests.

pub mod app;
pub mod managers;
pub mod services;
pub mod types;
