//! Core application setup and shared state.
//!
//! Builds the Bevy app for native and WASM targets and holds the resources
//! the frame systems share.

/// Application setup: plugins, resources and the frame schedule.
pub mod app_setup;

/// Shared viewer resources: entity handles, viewport size and update counters.
pub mod app_state;

/// The viewer's primary window: a titled desktop window natively, the page's
/// `#bevy` canvas sized to its parent in the browser.
pub mod window_config;
