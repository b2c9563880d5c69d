//! Tile streaming capability and its reference implementation.
//!
//! The application only talks to [`streamer::TilesetNode`] and
//! [`streamer::TileCache`]; anything implementing the two traits can be
//! swapped in behind them.

use std::sync::Arc;

use bevy::log::warn;

use crate::engine::loading::http_client::{HttpClient, concurrent_fetch_limit};

/// Bounding box type used for framing, culling and distance estimates.
pub mod bounds;

/// Least-recently-used payload cache with bounded concurrent fetches.
pub mod cache;

/// Construction options for the tileset and cache.
pub mod config;

/// 3D Tiles descriptor parsing into a flat tile graph.
pub mod descriptor;

/// Fetch, descriptor and per-frame stream errors.
pub mod error;

/// HTTP-backed reference streamer with screen-space error refinement.
pub mod http_tileset;

/// Capability traits, camera snapshot and the app-facing tileset handle.
pub mod streamer;

/// Construct the tileset handle and its cache from one config.
pub fn create_tileset(
    config: config::TilesetConfig,
    client: Arc<dyn HttpClient>,
) -> (streamer::TilesetNode, streamer::TileCache) {
    let max_concurrent = concurrent_fetch_limit(config.max_concurrent_requests);
    if max_concurrent < config.max_concurrent_requests {
        warn!(
            "Limiting tile fetches to {} of {} requested to keep IO threads free",
            max_concurrent, config.max_concurrent_requests
        );
    }
    let cache =
        cache::LruTileCache::new(client.clone(), config.max_cached_items, max_concurrent);
    let tileset = http_tileset::HttpTileset::new(config, client);

    (
        streamer::TilesetNode::new(tileset),
        streamer::TileCache::new(cache),
    )
}
