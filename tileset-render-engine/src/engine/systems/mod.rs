//! Per-frame runtime systems: window resize handling and the tile update loop.

/// Window resize handling for the camera projection and viewport state.
pub mod resize;

/// Tileset and cache update driven once per frame, with the error policy.
pub mod frame_update;
