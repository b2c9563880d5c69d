use bevy::color::Color;
use bevy::math::Vec3;

/// Scene clear colour.
pub const BACKGROUND_COLOUR: Color = Color::WHITE;

/// Vertical field of view in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 60.0;
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 80_000.0;

/// Camera position before the tileset has loaded; it looks at the origin.
pub const CAMERA_INITIAL_POSITION: Vec3 = Vec3::new(-20.0, 15.0, -30.0);

/// Ambient light brightness (cd/m²), a flat fill so untextured tiles stay readable.
pub const AMBIENT_LIGHT_BRIGHTNESS: f32 = 1100.0;

/// Weak key light; position only sets its direction towards the origin.
pub const DIRECTIONAL_LIGHT_ILLUMINANCE: f32 = 1600.0;
pub const DIRECTIONAL_LIGHT_POSITION: Vec3 = Vec3::new(1.0, 1.0, 0.15);

/// Orbit controller tuning.
pub const ORBIT_ROTATE_SPEED: f32 = 1.0;
pub const ORBIT_PAN_SPEED: f32 = 1.0;
pub const ORBIT_ZOOM_STEP: f32 = 0.95;
pub const ORBIT_DAMPING_FACTOR: f32 = 0.1;
pub const ORBIT_MIN_DISTANCE: f32 = 1.0;
pub const ORBIT_MAX_DISTANCE: f32 = 60_000.0;

/// Colour of resident tile bounds.
pub const TILE_BOUNDS_COLOUR: Color = Color::srgb(0.15, 0.35, 0.8);
