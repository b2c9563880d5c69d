/// Rotation about +X (radians) applied once to the tileset node.
/// The tileset is authored Z-up, the engine renders Y-up.
pub const TILESET_UP_CORRECTION: f32 = -std::f32::consts::FRAC_PI_2;
