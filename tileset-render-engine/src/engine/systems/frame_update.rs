use bevy::prelude::*;
use bevy::render::camera::CameraProjection;

use crate::engine::core::app_state::{TileUpdateStats, ViewerContext, ViewportState};
use crate::engine::tileset::config::TilesetConfig;
use crate::engine::tileset::error::StreamError;
use crate::engine::tileset::streamer::{
    CameraState, TileCache, TileCacheManager, TilesetLoaded, TilesetNode,
};

/// Startup log of the streaming limits actually in effect.
pub fn report_streaming_config(config: Res<TilesetConfig>, cache: Res<TileCache>) {
    info!("→ {}", streaming_summary(&config, cache.0.as_ref()));
}

pub fn streaming_summary(config: &TilesetConfig, cache: &dyn TileCacheManager) -> String {
    format!(
        "Tile cache holds {} payloads, refining above {:.1} px, loading outside view: {}",
        cache.capacity(),
        config.refinement_threshold(),
        config.load_outside_view
    )
}

/// Advance the tileset with this frame's camera, then let the cache settle
/// its fetches. A tileset failure skips the cache step for the frame.
pub fn update_tileset_frame(
    context: Res<ViewerContext>,
    viewport: Res<ViewportState>,
    cameras: Query<(&GlobalTransform, &Projection)>,
    nodes: Query<&GlobalTransform>,
    mut tileset: ResMut<TilesetNode>,
    mut cache: ResMut<TileCache>,
    mut stats: ResMut<TileUpdateStats>,
    mut loaded: EventWriter<TilesetLoaded>,
) {
    let Ok((camera_transform, projection)) = cameras.get(context.camera) else {
        return;
    };
    let node_transform = nodes
        .get(context.tileset_root)
        .copied()
        .unwrap_or(GlobalTransform::IDENTITY);

    let fov_y = match projection {
        Projection::Perspective(perspective) => perspective.fov,
        _ => PerspectiveProjection::default().fov,
    };
    let camera = CameraState::from_world(
        camera_transform,
        projection.get_clip_from_view(),
        fov_y,
        viewport.physical_height(),
        &node_transform,
    );

    let result = tileset
        .update(&camera, cache.0.as_mut())
        .and_then(|()| cache.0.update());
    report_frame_result(result, &mut stats);

    if tileset.take_load_notification() {
        loaded.write(TilesetLoaded);
    }
}

/// Cancellations are expected while the camera moves and are only counted.
/// Anything else is logged once for the frame.
pub fn report_frame_result(result: Result<(), StreamError>, stats: &mut TileUpdateStats) {
    stats.frames += 1;

    let Err(error) = result else {
        return;
    };

    if error.is_cancellation() {
        stats.cancellations += 1;
        return;
    }

    error!("Tile update failed: {error}");
    stats.errors_logged += 1;
    stats.last_error = Some(error.to_string());
}
