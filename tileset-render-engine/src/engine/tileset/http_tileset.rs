use std::collections::HashSet;
use std::sync::Arc;

use bevy::math::DVec3;
use bevy::prelude::*;
use bevy::tasks::{Task, block_on, futures_lite::future};

use super::bounds::BoundingBox;
use super::config::TilesetConfig;
use super::descriptor::{Refine, TileGraph, parse_tileset};
use super::error::{FetchError, StreamError};
use super::streamer::{CameraState, RequestState, TileCacheManager, TileStreamer};
use crate::engine::loading::http_client::{HttpClient, spawn_fetch};

enum DescriptorState {
    Waiting { attempts: u32, frames_left: u32 },
    Fetching {
        attempts: u32,
        task: Task<Result<Vec<u8>, FetchError>>,
    },
    Ready(TileGraph),
    Failed,
}

/// Reference streamer: reads a 3D Tiles descriptor over HTTP, refines by
/// screen-space error and pulls tile content through the cache manager.
pub struct HttpTileset {
    config: TilesetConfig,
    client: Arc<dyn HttpClient>,
    descriptor: DescriptorState,
    model_offset: DVec3,
    requested: HashSet<String>,
    resident: Vec<BoundingBox>,
}

impl HttpTileset {
    pub fn new(config: TilesetConfig, client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            client,
            descriptor: DescriptorState::Waiting {
                attempts: 0,
                frames_left: 0,
            },
            model_offset: DVec3::ZERO,
            requested: HashSet::new(),
            resident: Vec::new(),
        }
    }

    fn poll_descriptor(&mut self) -> Result<(), StreamError> {
        match &mut self.descriptor {
            DescriptorState::Waiting {
                attempts,
                frames_left,
            } => {
                if *frames_left > 0 {
                    *frames_left -= 1;
                    return Ok(());
                }
                info!("Loading tileset from: {}", self.config.url);
                self.descriptor = DescriptorState::Fetching {
                    attempts: *attempts + 1,
                    task: spawn_fetch(self.client.as_ref(), &self.config.url),
                };
                Ok(())
            }
            DescriptorState::Fetching { attempts, task } => {
                let Some(result) = block_on(future::poll_once(task)) else {
                    return Ok(());
                };
                let attempts = *attempts;

                let bytes = match result {
                    Ok(bytes) => bytes,
                    Err(error) => {
                        self.retry_or_fail(attempts);
                        return Err(error.into());
                    }
                };

                match parse_tileset(&bytes, &self.config.url) {
                    Ok(graph) => {
                        self.accept(graph);
                        Ok(())
                    }
                    Err(source) => {
                        self.retry_or_fail(attempts);
                        Err(StreamError::Descriptor {
                            url: self.config.url.clone(),
                            source,
                        })
                    }
                }
            }
            DescriptorState::Ready(_) | DescriptorState::Failed => Ok(()),
        }
    }

    fn retry_or_fail(&mut self, attempts: u32) {
        if attempts < self.config.descriptor_retry_limit {
            warn!(
                "Tileset descriptor attempt {}/{} failed, retrying",
                attempts, self.config.descriptor_retry_limit
            );
            self.descriptor = DescriptorState::Waiting {
                attempts,
                frames_left: self.config.descriptor_retry_frames,
            };
        } else {
            error!(
                "Giving up on tileset {} after {} attempts",
                self.config.url, attempts
            );
            self.descriptor = DescriptorState::Failed;
        }
    }

    fn accept(&mut self, graph: TileGraph) {
        let root = graph.root().bounds;
        if self.config.center_model {
            self.model_offset = -root.center;
        }
        println!(
            "✓ Tileset loaded: version {}, {} tiles, geometric error {}",
            graph.version,
            graph.len(),
            graph.geometric_error
        );
        self.descriptor = DescriptorState::Ready(graph);
    }
}

impl TileStreamer for HttpTileset {
    fn update(
        &mut self,
        camera: &CameraState,
        cache: &mut dyn TileCacheManager,
    ) -> Result<(), StreamError> {
        self.poll_descriptor()?;

        let DescriptorState::Ready(graph) = &self.descriptor else {
            return Ok(());
        };

        let selection = select_tiles(graph, camera, &self.config, self.model_offset, cache);

        let mut wanted = HashSet::with_capacity(selection.len());
        self.resident.clear();
        for index in selection {
            let tile = &graph.tiles[index];
            let Some(url) = &tile.content_url else {
                continue;
            };
            if cache.request(url) == RequestState::Resident {
                self.resident.push(tile.bounds.translated(self.model_offset));
            }
            wanted.insert(url.clone());
        }

        for stale in self.requested.difference(&wanted) {
            cache.cancel(stale);
        }
        self.requested = wanted;

        Ok(())
    }

    fn bounding_volume(&self) -> Option<BoundingBox> {
        match &self.descriptor {
            DescriptorState::Ready(graph) => Some(graph.root().bounds.translated(self.model_offset)),
            _ => None,
        }
    }

    fn is_loaded(&self) -> bool {
        matches!(self.descriptor, DescriptorState::Ready(_))
    }

    fn resident_tiles(&self) -> &[BoundingBox] {
        &self.resident
    }
}

/// Pick the tiles to show for this camera.
///
/// A tile is refined while its screen-space error exceeds the configured
/// threshold. Replace-refined parents stay selected until every child with
/// content is resident, so partially loaded levels still draw something.
pub(crate) fn select_tiles(
    graph: &TileGraph,
    camera: &CameraState,
    config: &TilesetConfig,
    model_offset: DVec3,
    cache: &dyn TileCacheManager,
) -> Vec<usize> {
    let threshold = config.refinement_threshold();
    let mut selected = Vec::new();
    let mut stack = vec![0];

    while let Some(index) = stack.pop() {
        let tile = &graph.tiles[index];
        let bounds = tile.bounds.translated(model_offset);

        if !config.load_outside_view && !camera.sees(&bounds) {
            continue;
        }

        let distance = bounds.distance_to(camera.position);
        let error = camera.screen_space_error(tile.geometric_error, distance);
        if error <= threshold || tile.children.is_empty() {
            selected.push(index);
            continue;
        }

        let keep_parent = match tile.refine {
            Refine::Add => true,
            Refine::Replace => !children_resident(graph, &tile.children, cache),
        };
        if keep_parent {
            selected.push(index);
        }
        stack.extend(tile.children.iter().rev());
    }

    selected
}

fn children_resident(graph: &TileGraph, children: &[usize], cache: &dyn TileCacheManager) -> bool {
    children
        .iter()
        .filter_map(|&child| graph.tiles[child].content_url.as_deref())
        .all(|url| cache.payload(url).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::loading::http_client::tests::MockHttpClient;
    use crate::engine::tileset::descriptor::tests::SAMPLE_TILESET;
    use crate::engine::tileset::streamer::tests::{NullCache, test_camera};
    use bevy::tasks::{IoTaskPool, TaskPool};
    use std::time::{Duration, Instant};

    const URL: &str = "https://tiles.example.ch/v1/tileset.json";

    fn config() -> TilesetConfig {
        TilesetConfig {
            url: URL.to_string(),
            descriptor_retry_frames: 0,
            ..default()
        }
    }

    fn graph() -> TileGraph {
        parse_tileset(SAMPLE_TILESET.as_bytes(), URL).unwrap()
    }

    /// Camera on the +Z axis, `distance` units from the origin, looking at it.
    fn camera_at(distance: f64) -> CameraState {
        let mut camera = test_camera();
        camera.position = DVec3::new(0.0, 0.0, distance);
        camera
    }

    fn update_until(
        tileset: &mut HttpTileset,
        cache: &mut dyn TileCacheManager,
        mut done: impl FnMut(&HttpTileset) -> bool,
    ) -> Vec<StreamError> {
        IoTaskPool::get_or_init(TaskPool::new);
        let deadline = Instant::now() + Duration::from_secs(5);
        let camera = test_camera();
        let mut errors = Vec::new();
        while !done(tileset) {
            if let Err(error) = tileset.update(&camera, cache) {
                errors.push(error);
            }
            assert!(Instant::now() < deadline, "tileset did not settle");
            std::thread::sleep(Duration::from_millis(1));
        }
        errors
    }

    #[test]
    fn loads_descriptor_and_centres_model() {
        let client = MockHttpClient::default().with(URL, SAMPLE_TILESET.as_bytes());
        let mut tileset = HttpTileset::new(config(), Arc::new(client));
        assert!(tileset.bounding_volume().is_none());

        let errors = update_until(&mut tileset, &mut NullCache::default(), |t| t.is_loaded());
        assert!(errors.is_empty());

        let bounds = tileset.bounding_volume().unwrap();
        assert_eq!(bounds.center, DVec3::ZERO);
        assert_eq!(bounds.half_extents, DVec3::new(100.0, 100.0, 20.0));
    }

    #[test]
    fn keeps_raw_centre_without_center_model() {
        let json = SAMPLE_TILESET.replace("[0, 0, 0, 100", "[5, 6, 7, 100");
        let client = MockHttpClient::default().with(URL, json.as_bytes());
        let mut tileset = HttpTileset::new(
            TilesetConfig {
                center_model: false,
                ..config()
            },
            Arc::new(client),
        );

        update_until(&mut tileset, &mut NullCache::default(), |t| t.is_loaded());
        assert_eq!(
            tileset.bounding_volume().unwrap().center,
            DVec3::new(5.0, 6.0, 7.0)
        );
    }

    #[test]
    fn gives_up_after_retry_limit() {
        let client = Arc::new(MockHttpClient::default().failing(URL, 503));
        let mut tileset = HttpTileset::new(
            TilesetConfig {
                descriptor_retry_limit: 2,
                ..config()
            },
            client.clone(),
        );

        let errors = update_until(&mut tileset, &mut NullCache::default(), |t| {
            matches!(t.descriptor, DescriptorState::Failed)
        });

        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| !e.is_cancellation()));
        assert_eq!(client.request_count(), 2);
        assert!(!tileset.is_loaded());
    }

    #[test]
    fn far_camera_selects_root_only() {
        let selected = select_tiles(
            &graph(),
            &camera_at(1.0e6),
            &config(),
            DVec3::ZERO,
            &NullCache::default(),
        );
        assert_eq!(selected, vec![0]);
    }

    #[test]
    fn near_camera_refines_and_keeps_unloaded_parent() {
        let selected = select_tiles(
            &graph(),
            &camera_at(50.0),
            &config(),
            DVec3::ZERO,
            &NullCache::default(),
        );
        assert_eq!(selected, vec![0, 1, 2]);
    }

    #[test]
    fn lower_multiplier_refines_sooner() {
        // Root error is ~16 px at this distance: above 16 * 0.5, below 16 * 2.0.
        let camera = camera_at(143.0 + 100.0 * 800.0 / (16.0 * 2.0 * (30f64).to_radians().tan()));
        let eager = TilesetConfig {
            geometric_error_multiplier: 0.5,
            ..config()
        };
        let lazy = TilesetConfig {
            geometric_error_multiplier: 2.0,
            ..config()
        };
        let cache = NullCache::default();

        assert!(select_tiles(&graph(), &camera, &eager, DVec3::ZERO, &cache).len() > 1);
        assert_eq!(
            select_tiles(&graph(), &camera, &lazy, DVec3::ZERO, &cache),
            vec![0]
        );
    }

    #[test]
    fn culls_outside_view_when_configured() {
        let mut camera = camera_at(50.0);
        // Offset pushes every tile behind the camera.
        let offset = DVec3::new(0.0, 0.0, 10_000.0);
        let culling = TilesetConfig {
            load_outside_view: false,
            ..config()
        };
        let cache = NullCache::default();

        assert!(select_tiles(&graph(), &camera, &culling, offset, &cache).is_empty());
        camera.position = DVec3::new(0.0, 0.0, 1.0e6);
        assert_eq!(
            select_tiles(&graph(), &camera, &config(), offset, &cache),
            vec![0]
        );
    }
}
