//! 3D Tiles tileset descriptor (`tileset.json`) and its flattened tile graph.

use reqwest::Url;
use serde::Deserialize;

use super::bounds::BoundingBox;
use super::error::DescriptorError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetDescriptor {
    pub asset: AssetInfo,
    pub geometric_error: f64,
    pub root: TileDescriptor,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub version: String,
    #[serde(default)]
    pub tileset_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileDescriptor {
    pub bounding_volume: BoundingVolume,
    pub geometric_error: f64,
    #[serde(default)]
    pub refine: Option<Refine>,
    #[serde(default)]
    pub content: Option<ContentDescriptor>,
    #[serde(default)]
    pub children: Vec<TileDescriptor>,
}

/// Exactly one of the three shapes is expected. `box` wins over `sphere`,
/// which wins over `region`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoundingVolume {
    #[serde(rename = "box", default)]
    pub oriented_box: Option<[f64; 12]>,
    #[serde(default)]
    pub sphere: Option<[f64; 4]>,
    #[serde(default)]
    pub region: Option<[f64; 6]>,
}

impl BoundingVolume {
    pub fn to_bounding_box(&self) -> Option<BoundingBox> {
        if let Some(values) = &self.oriented_box {
            return Some(BoundingBox::from_oriented_box(values));
        }
        if let Some(values) = &self.sphere {
            return Some(BoundingBox::from_sphere(values));
        }
        self.region.as_ref().map(BoundingBox::from_region)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Refine {
    Add,
    #[default]
    Replace,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentDescriptor {
    /// 3D Tiles 1.0 pre-release tilesets still spell this `url`.
    #[serde(alias = "url")]
    pub uri: String,
}

/// One tile of the flattened graph. Index 0 is the root.
#[derive(Debug, Clone)]
pub struct TileNode {
    pub bounds: BoundingBox,
    pub geometric_error: f64,
    pub refine: Refine,
    pub content_url: Option<String>,
    pub children: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct TileGraph {
    pub version: String,
    pub geometric_error: f64,
    pub tiles: Vec<TileNode>,
}

impl TileGraph {
    pub fn root(&self) -> &TileNode {
        &self.tiles[0]
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Flatten the descriptor depth-first, resolving content against `base_url`.
    /// Tiles with an empty bounding volume inherit their parent's bounds.
    pub fn from_descriptor(
        descriptor: TilesetDescriptor,
        base_url: &str,
    ) -> Result<Self, DescriptorError> {
        let base = Url::parse(base_url).map_err(|_| DescriptorError::Uri {
            base: base_url.to_string(),
            uri: String::new(),
        })?;

        let mut tiles: Vec<TileNode> = Vec::new();
        // (tile, parent index, inherited bounds, inherited refine)
        let mut stack = vec![(descriptor.root, None, None, Refine::default())];

        while let Some((tile, parent, inherited_bounds, inherited_refine)) = stack.pop() {
            let index = tiles.len();
            let bounds = tile
                .bounding_volume
                .to_bounding_box()
                .or(inherited_bounds)
                .ok_or(DescriptorError::MissingBounds(index))?;
            let refine = tile.refine.unwrap_or(inherited_refine);
            let content_url = tile
                .content
                .as_ref()
                .map(|content| resolve_uri(&base, &content.uri))
                .transpose()?;

            tiles.push(TileNode {
                bounds,
                geometric_error: tile.geometric_error,
                refine,
                content_url,
                children: Vec::with_capacity(tile.children.len()),
            });

            if let Some(parent) = parent {
                let parent_node: &mut TileNode = &mut tiles[parent];
                parent_node.children.push(index);
            }

            for child in tile.children.into_iter().rev() {
                stack.push((child, Some(index), Some(bounds), refine));
            }
        }

        Ok(Self {
            version: descriptor.asset.version,
            geometric_error: descriptor.geometric_error,
            tiles,
        })
    }
}

/// Parse raw `tileset.json` bytes fetched from `url`.
pub fn parse_tileset(bytes: &[u8], url: &str) -> Result<TileGraph, DescriptorError> {
    let descriptor: TilesetDescriptor = serde_json::from_slice(bytes)?;
    TileGraph::from_descriptor(descriptor, url)
}

fn resolve_uri(base: &Url, uri: &str) -> Result<String, DescriptorError> {
    base.join(uri)
        .map(String::from)
        .map_err(|_| DescriptorError::Uri {
            base: base.to_string(),
            uri: uri.to_string(),
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bevy::math::DVec3;

    pub(crate) const SAMPLE_TILESET: &str = r#"{
        "asset": { "version": "1.0" },
        "geometricError": 500.0,
        "root": {
            "boundingVolume": { "box": [0, 0, 0, 100, 0, 0, 0, 100, 0, 0, 0, 20] },
            "geometricError": 100.0,
            "refine": "REPLACE",
            "content": { "uri": "root.b3dm" },
            "children": [
                {
                    "boundingVolume": { "box": [-50, 0, 0, 50, 0, 0, 0, 100, 0, 0, 0, 20] },
                    "geometricError": 10.0,
                    "content": { "uri": "tiles/0/0.b3dm" }
                },
                {
                    "boundingVolume": { "box": [50, 0, 0, 50, 0, 0, 0, 100, 0, 0, 0, 20] },
                    "geometricError": 10.0,
                    "refine": "ADD",
                    "content": { "url": "/shared/1.b3dm" }
                }
            ]
        }
    }"#;

    const BASE: &str = "https://tiles.example.ch/layer/v1/tileset.json?v=3";

    #[test]
    fn flattens_children_in_order() {
        let graph = parse_tileset(SAMPLE_TILESET.as_bytes(), BASE).unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.version, "1.0");
        assert_eq!(graph.root().children, vec![1, 2]);
        assert_eq!(graph.tiles[1].bounds.center, DVec3::new(-50.0, 0.0, 0.0));
    }

    #[test]
    fn resolves_relative_and_absolute_content() {
        let graph = parse_tileset(SAMPLE_TILESET.as_bytes(), BASE).unwrap();

        assert_eq!(
            graph.root().content_url.as_deref(),
            Some("https://tiles.example.ch/layer/v1/root.b3dm")
        );
        assert_eq!(
            graph.tiles[1].content_url.as_deref(),
            Some("https://tiles.example.ch/layer/v1/tiles/0/0.b3dm")
        );
        assert_eq!(
            graph.tiles[2].content_url.as_deref(),
            Some("https://tiles.example.ch/shared/1.b3dm")
        );
    }

    #[test]
    fn inherits_refine() {
        let graph = parse_tileset(SAMPLE_TILESET.as_bytes(), BASE).unwrap();

        assert_eq!(graph.tiles[1].refine, Refine::Replace);
        assert_eq!(graph.tiles[2].refine, Refine::Add);
    }

    #[test]
    fn empty_volume_inherits_parent_bounds() {
        let json = r#"{
            "asset": { "version": "1.0" },
            "geometricError": 10.0,
            "root": {
                "boundingVolume": { "sphere": [1, 2, 3, 40] },
                "geometricError": 10.0,
                "children": [{ "boundingVolume": {}, "geometricError": 1.0 }]
            }
        }"#;

        let graph = parse_tileset(json.as_bytes(), BASE).unwrap();
        assert_eq!(graph.tiles[1].bounds, graph.root().bounds);
    }

    #[test]
    fn region_volumes_become_ecef_boxes() {
        let json = r#"{
            "asset": { "version": "1.0" },
            "geometricError": 5000.0,
            "root": {
                "boundingVolume": { "region": [0.1305, 0.8025, 0.1825, 0.8365, 190, 4800] },
                "geometricError": 1000.0,
                "children": [{
                    "boundingVolume": { "region": [0.1305, 0.8025, 0.1565, 0.8195, 190, 2400] },
                    "geometricError": 100.0,
                    "content": { "uri": "0/0/0.b3dm" }
                }]
            }
        }"#;

        let graph = parse_tileset(json.as_bytes(), BASE).unwrap();
        let root = graph.root().bounds;
        let child = graph.tiles[1].bounds;

        // Switzerland sits roughly 6370 km from the earth's centre.
        assert!((root.center.length() - 6.37e6).abs() < 2.0e4);
        assert_ne!(child, root);
        assert!(child.radius() < root.radius());
        assert!(
            ((child.center - root.center).abs() + child.half_extents - root.half_extents)
                .max_element()
                <= 1e-6
        );
    }

    #[test]
    fn tile_without_any_volume_is_rejected() {
        let json = r#"{
            "asset": { "version": "1.0" },
            "geometricError": 1.0,
            "root": {
                "boundingVolume": {},
                "geometricError": 1.0
            }
        }"#;

        let error = parse_tileset(json.as_bytes(), BASE).unwrap_err();
        assert!(matches!(error, DescriptorError::MissingBounds(0)));
    }

    #[test]
    fn malformed_json_is_reported() {
        let error = parse_tileset(b"{ not json", BASE).unwrap_err();
        assert!(matches!(error, DescriptorError::Json(_)));
    }
}
