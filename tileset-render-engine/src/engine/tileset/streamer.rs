use bevy::math::{DVec3, Mat4};
use bevy::prelude::*;
use bevy::render::primitives::Frustum;

use super::bounds::BoundingBox;
use super::error::StreamError;

/// Camera snapshot handed to the tileset each frame, expressed in the
/// tileset node's local frame.
#[derive(Debug, Clone)]
pub struct CameraState {
    pub position: DVec3,
    pub frustum: Frustum,
    pub fov_y: f32,
    pub viewport_height: f32,
}

impl CameraState {
    /// Build the local-frame snapshot from world-space camera and node transforms.
    pub fn from_world(
        camera_transform: &GlobalTransform,
        clip_from_view: Mat4,
        fov_y: f32,
        viewport_height: f32,
        node_transform: &GlobalTransform,
    ) -> Self {
        let world_from_local = node_transform.compute_matrix();
        let view_from_world = camera_transform.compute_matrix().inverse();
        let clip_from_local = clip_from_view * view_from_world * world_from_local;
        let position = world_from_local
            .inverse()
            .transform_point3(camera_transform.translation());

        Self {
            position: position.as_dvec3(),
            frustum: Frustum::from_clip_from_world(&clip_from_local),
            fov_y,
            viewport_height,
        }
    }

    /// Projected size in pixels of `geometric_error` seen from `distance`.
    pub fn screen_space_error(&self, geometric_error: f64, distance: f64) -> f64 {
        let half_fov_tan = (self.fov_y as f64 * 0.5).tan();
        geometric_error * self.viewport_height as f64 / (distance * 2.0 * half_fov_tan)
    }

    pub fn sees(&self, bounds: &BoundingBox) -> bool {
        self.frustum.intersects_sphere(&bounds.bounding_sphere(), false)
    }
}

/// Where a requested payload currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Queued,
    Pending,
    Resident,
}

/// Capacity-bounded store of tile payloads that also owns their fetches.
pub trait TileCacheManager: Send + Sync + 'static {
    /// Ask for `url`; repeated calls keep the entry warm.
    fn request(&mut self, url: &str) -> RequestState;

    /// Drop interest in `url`. An in-flight fetch is aborted.
    fn cancel(&mut self, url: &str);

    fn payload(&self, url: &str) -> Option<&[u8]>;

    /// Service finished fetches, start queued ones, evict over capacity.
    fn update(&mut self) -> Result<(), StreamError>;

    fn capacity(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One streamed tileset. Implementations are swappable.
pub trait TileStreamer: Send + Sync + 'static {
    /// Decide what to load and show for this camera. Must not block.
    fn update(
        &mut self,
        camera: &CameraState,
        cache: &mut dyn TileCacheManager,
    ) -> Result<(), StreamError>;

    /// Root bounding volume, once the descriptor has been read.
    fn bounding_volume(&self) -> Option<BoundingBox>;

    fn is_loaded(&self) -> bool;

    /// Bounds of tiles whose payload is resident and currently selected.
    fn resident_tiles(&self) -> &[BoundingBox];
}

/// Sent once when the tileset's root has loaded.
#[derive(Event, Debug, Clone, Copy)]
pub struct TilesetLoaded;

/// The tileset handle held by the app. Guards the load notification so it
/// fires at most once per tileset lifetime.
#[derive(Resource)]
pub struct TilesetNode {
    streamer: Box<dyn TileStreamer>,
    load_reported: bool,
}

impl TilesetNode {
    pub fn new(streamer: impl TileStreamer) -> Self {
        Self {
            streamer: Box::new(streamer),
            load_reported: false,
        }
    }

    pub fn update(
        &mut self,
        camera: &CameraState,
        cache: &mut dyn TileCacheManager,
    ) -> Result<(), StreamError> {
        self.streamer.update(camera, cache)
    }

    /// True exactly once, on the first call after the streamer reports loaded.
    pub fn take_load_notification(&mut self) -> bool {
        if self.load_reported || !self.streamer.is_loaded() {
            return false;
        }
        self.load_reported = true;
        true
    }

    pub fn bounding_volume(&self) -> Option<BoundingBox> {
        self.streamer.bounding_volume()
    }

    pub fn resident_tiles(&self) -> &[BoundingBox] {
        self.streamer.resident_tiles()
    }
}

/// Resource wrapper so any cache implementation can be swapped in.
#[derive(Resource, Deref, DerefMut)]
pub struct TileCache(pub Box<dyn TileCacheManager>);

impl TileCache {
    pub fn new(cache: impl TileCacheManager) -> Self {
        Self(Box::new(cache))
    }
}
