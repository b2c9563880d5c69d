//! Camera navigation: orbit controls and one-time framing of the tileset.

/// Orbit controller component and its input/update systems.
pub mod orbit_camera;

/// Reframing the camera when the tileset finishes its first load.
pub mod auto_frame;
