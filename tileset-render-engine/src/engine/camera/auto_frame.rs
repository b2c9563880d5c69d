use bevy::prelude::*;

use super::orbit_camera::OrbitController;
use crate::engine::core::app_state::ViewerContext;
use crate::engine::tileset::bounds::BoundingBox;
use crate::engine::tileset::streamer::{TilesetLoaded, TilesetNode};

/// Camera pose that puts a whole bounding volume in view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFraming {
    pub position: Vec3,
    pub target: Vec3,
}

/// Back off by half the box diagonal along +X and +Z, and half that along +Y.
pub fn frame_camera(bounds: &BoundingBox) -> CameraFraming {
    let distance = (bounds.size() * 0.5) as f32;
    let target = bounds.center_f32();

    CameraFraming {
        position: target + Vec3::new(distance, distance * 0.5, distance),
        target,
    }
}

/// Reframe the camera the first time the tileset reports it has loaded.
/// The pose is written in world space, straight from the reported bounds.
pub fn auto_frame_on_load(
    mut loaded: EventReader<TilesetLoaded>,
    tileset: Res<TilesetNode>,
    context: Res<ViewerContext>,
    mut cameras: Query<(&mut Transform, &mut OrbitController)>,
) {
    for _ in loaded.read() {
        info!("✓ Tileset ready");

        let Some(bounds) = tileset.bounding_volume() else {
            debug!("Tileset has no bounding volume, keeping current camera");
            continue;
        };

        let Ok((mut transform, mut controller)) = cameras.get_mut(context.camera) else {
            warn!("Viewer camera missing, cannot frame tileset");
            continue;
        };

        let framing = frame_camera(&bounds);
        transform.translation = framing.position;
        transform.look_at(framing.target, Vec3::Y);
        controller.target = framing.target;
        controller.sync_from_pose(&transform);

        info!(
            "→ Camera framed at {:?}, target {:?}, size {:.1}",
            framing.position,
            framing.target,
            bounds.size()
        );
    }
}
