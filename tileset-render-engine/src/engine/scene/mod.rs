//! Scene composition and tile visualisation.

/// One-time scene setup: background, lights, camera and the tileset node.
pub mod setup;

/// Gizmo outlines for tiles whose content is resident.
pub mod tile_bounds;
