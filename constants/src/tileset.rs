/// Swiss TLM3D objects (buildings, bridges, vegetation).
pub const TILESET_URL: &str = "https://3d.geo.admin.ch/ch.swisstopo.swisstlm3d.3d/v1/tileset.json";

/// Terrain layer descriptor, fetched only for diagnostic logging.
pub const TERRAIN_LAYER_URL: &str = "https://3d.geo.admin.ch/ch.swisstopo.terrain.3d/v1/layer.json";

/// Scales the screen-space error threshold. Lower values refine sooner.
pub const GEOMETRIC_ERROR_MULTIPLIER: f64 = 0.5;

/// Keep loading tiles that fall outside the camera frustum.
pub const LOAD_OUTSIDE_VIEW: bool = true;

/// Recentre the tileset so its root bounding volume sits at the node origin.
pub const CENTER_MODEL: bool = true;

/// Maximum number of resident tile payloads.
pub const MAX_CACHED_ITEMS: usize = 1000;

/// Maximum number of tile fetches in flight at once.
pub const MAX_CONCURRENT_REQUESTS: usize = 8;

/// Screen-space error (pixels) above which a tile is refined, before the multiplier.
pub const MAX_SCREEN_SPACE_ERROR: f64 = 16.0;

/// Descriptor fetch attempts before the tileset gives up.
pub const DESCRIPTOR_RETRY_LIMIT: u32 = 3;

/// Frames to wait between descriptor fetch attempts.
pub const DESCRIPTOR_RETRY_FRAMES: u32 = 120;
