use bevy::prelude::*;

/// Entities the frame systems address directly, recorded once at startup.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ViewerContext {
    pub camera: Entity,
    pub tileset_root: Entity,
}

/// Current drawable size of the primary window, in logical pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            scale_factor: 1.0,
        }
    }
}

impl ViewportState {
    pub fn physical_height(&self) -> f32 {
        self.height * self.scale_factor
    }
}

/// Running counters for the per-frame tile update.
#[derive(Resource, Debug, Default, Clone)]
pub struct TileUpdateStats {
    pub frames: u64,
    pub cancellations: u64,
    pub errors_logged: u64,
    pub last_error: Option<String>,
}
