use bevy::prelude::*;
use bevy::tasks::{Task, block_on, futures_lite::future};
use constants::tileset::TERRAIN_LAYER_URL;
use thiserror::Error;

use crate::engine::loading::http_client::{SharedHttpClient, spawn_fetch};
use crate::engine::tileset::error::FetchError;

#[derive(Debug, Error)]
pub enum LayerProbeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid layer.json: {0}")]
    Json(#[from] serde_json::Error),
}

/// One-shot diagnostic fetch of the terrain layer descriptor.
/// Its content is logged and otherwise unused.
#[derive(Resource)]
pub struct TerrainLayerProbe {
    pub url: String,
    task: Option<Task<Result<Vec<u8>, FetchError>>>,
    pub keys: Option<Vec<String>>,
    pub failed: bool,
}

impl Default for TerrainLayerProbe {
    fn default() -> Self {
        Self::new(TERRAIN_LAYER_URL)
    }
}

impl TerrainLayerProbe {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            task: None,
            keys: None,
            failed: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.keys.is_some() || self.failed
    }
}

pub fn start_terrain_layer_probe(
    mut probe: ResMut<TerrainLayerProbe>,
    client: Res<SharedHttpClient>,
) {
    let task = spawn_fetch(client.0.as_ref(), &probe.url);
    probe.task = Some(task);
}

pub fn poll_terrain_layer_probe(mut probe: ResMut<TerrainLayerProbe>) {
    let Some(task) = probe.task.as_mut() else {
        return;
    };
    let Some(result) = block_on(future::poll_once(task)) else {
        return;
    };
    probe.task = None;

    match result.map_err(LayerProbeError::from).and_then(|bytes| describe_layer(&bytes)) {
        Ok((document, keys)) => {
            info!("🏔️ Terrain layer.json structure: {}", document);
            info!("🏔️ Available properties: {:?}", keys);
            probe.keys = Some(keys);
        }
        Err(error) => {
            error!("Failed to fetch terrain layer.json: {}", error);
            probe.failed = true;
        }
    }
}

/// Parse the layer document and list its top-level keys.
pub fn describe_layer(bytes: &[u8]) -> Result<(serde_json::Value, Vec<String>), LayerProbeError> {
    let document: serde_json::Value = serde_json::from_slice(bytes)?;
    let keys = document
        .as_object()
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default();
    Ok((document, keys))
}
