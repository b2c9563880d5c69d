//! Literal configuration shared by the tileset viewer.
//!
//! Everything here is fixed at compile time; the viewer reads no config files
//! and no environment variables of its own.

/// Axis convention correction between the tileset frame and the engine frame.
pub mod coordinate_system;

/// Camera, lighting and clear colour settings for the viewer scene.
pub mod render_settings;

/// Tileset endpoints and streaming parameters.
pub mod tileset;
