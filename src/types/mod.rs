// Zentabs shared type definitions
// Each submodule defines types used across the tab core.

pub mod bookmark;
pub mod errors;
pub mod frame;
pub mod settings;
pub mod tab;
