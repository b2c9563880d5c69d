use bevy::prelude::*;
use constants::tileset::{
    CENTER_MODEL, DESCRIPTOR_RETRY_FRAMES, DESCRIPTOR_RETRY_LIMIT, GEOMETRIC_ERROR_MULTIPLIER,
    LOAD_OUTSIDE_VIEW, MAX_CACHED_ITEMS, MAX_CONCURRENT_REQUESTS, MAX_SCREEN_SPACE_ERROR,
    TILESET_URL,
};

/// Construction options for a streamed tileset and its cache.
#[derive(Resource, Debug, Clone)]
pub struct TilesetConfig {
    pub url: String,
    /// Scales the refinement threshold; lower values request detail sooner.
    pub geometric_error_multiplier: f64,
    pub max_screen_space_error: f64,
    pub load_outside_view: bool,
    pub center_model: bool,
    pub max_cached_items: usize,
    pub max_concurrent_requests: usize,
    pub descriptor_retry_limit: u32,
    pub descriptor_retry_frames: u32,
}

impl Default for TilesetConfig {
    fn default() -> Self {
        Self {
            url: TILESET_URL.to_string(),
            geometric_error_multiplier: GEOMETRIC_ERROR_MULTIPLIER,
            max_screen_space_error: MAX_SCREEN_SPACE_ERROR,
            load_outside_view: LOAD_OUTSIDE_VIEW,
            center_model: CENTER_MODEL,
            max_cached_items: MAX_CACHED_ITEMS,
            max_concurrent_requests: MAX_CONCURRENT_REQUESTS,
            descriptor_retry_limit: DESCRIPTOR_RETRY_LIMIT,
            descriptor_retry_frames: DESCRIPTOR_RETRY_FRAMES,
        }
    }
}

impl TilesetConfig {
    /// Screen-space error in pixels above which a tile is refined.
    pub fn refinement_threshold(&self) -> f64 {
        self.max_screen_space_error * self.geometric_error_multiplier
    }
}
