use std::sync::Arc;

use bevy::log::LogPlugin;
use bevy::prelude::*;

use crate::engine::camera::auto_frame::auto_frame_on_load;
use crate::engine::camera::orbit_camera::{orbit_camera_input, orbit_camera_update};
use crate::engine::core::app_state::{TileUpdateStats, ViewportState};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::http_client::{HttpClient, ReqwestClient, SharedHttpClient};
use crate::engine::loading::terrain_layer::{
    TerrainLayerProbe, poll_terrain_layer_probe, start_terrain_layer_probe,
};
use crate::engine::scene::setup::setup_scene;
use crate::engine::scene::tile_bounds::draw_tile_bounds;
use crate::engine::systems::frame_update::{report_streaming_config, update_tileset_frame};
use crate::engine::systems::resize::{handle_window_resize, init_viewport};
use crate::engine::tileset::config::TilesetConfig;
use crate::engine::tileset::create_tileset;
use crate::engine::tileset::error::FetchError;
use crate::engine::tileset::streamer::TilesetLoaded;

pub fn create_app() -> Result<App, FetchError> {
    let client: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new()?);
    let config = TilesetConfig::default();

    let mut app = App::new();
    app.add_plugins(create_default_plugins());
    configure_viewer(&mut app, client, config);

    Ok(app)
}

/// Register the viewer's resources and systems on an app that already has
/// windowing and rendering.
pub fn configure_viewer(app: &mut App, client: Arc<dyn HttpClient>, config: TilesetConfig) {
    println!("→ Streaming tileset from {}", config.url);
    let (tileset, cache) = create_tileset(config.clone(), client.clone());

    app.insert_resource(config)
        .insert_resource(SharedHttpClient(client))
        .insert_resource(tileset)
        .insert_resource(cache)
        .init_resource::<ViewportState>()
        .init_resource::<TileUpdateStats>()
        .init_resource::<TerrainLayerProbe>()
        .add_event::<TilesetLoaded>();

    app.add_systems(
        Startup,
        (
            setup_scene,
            init_viewport,
            report_streaming_config,
            start_terrain_layer_probe,
        ),
    );

    // Frame order: input, camera, tileset, cache, then reframe and draw.
    app.add_systems(
        Update,
        (
            handle_window_resize,
            orbit_camera_input,
            orbit_camera_update,
            update_tileset_frame,
            auto_frame_on_load,
            draw_tile_bounds,
        )
            .chain(),
    )
    .add_systems(
        Update,
        poll_terrain_layer_probe.run_if(|probe: Res<TerrainLayerProbe>| !probe.is_finished()),
    );
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let log_config = LogPlugin {
        filter: "wgpu=error,naga=warn".into(),
        ..default()
    };

    DefaultPlugins.set(window_config).set(log_config)
}
