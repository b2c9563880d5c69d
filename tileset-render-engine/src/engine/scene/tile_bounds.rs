use bevy::prelude::*;
use constants::render_settings::TILE_BOUNDS_COLOUR;

use crate::engine::core::app_state::ViewerContext;
use crate::engine::tileset::bounds::BoundingBox;
use crate::engine::tileset::streamer::TilesetNode;

/// World transform of the unit cube covering a tile, placed under the tileset node.
pub fn tile_box_transform(node: &GlobalTransform, bounds: &BoundingBox) -> GlobalTransform {
    node.mul_transform(Transform::from_translation(bounds.center_f32()).with_scale(bounds.size_f32()))
}

pub fn draw_tile_bounds(
    mut gizmos: Gizmos,
    tileset: Res<TilesetNode>,
    context: Res<ViewerContext>,
    nodes: Query<&GlobalTransform>,
) {
    let node = nodes
        .get(context.tileset_root)
        .copied()
        .unwrap_or(GlobalTransform::IDENTITY);

    for bounds in tileset.resident_tiles() {
        gizmos.cuboid(tile_box_transform(&node, bounds), TILE_BOUNDS_COLOUR);
    }
}
