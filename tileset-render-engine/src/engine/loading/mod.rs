//! Network access outside the tile streamer.
//!
//! Provides the HTTP client abstraction shared with the streamer and the
//! startup diagnostic fetch of the terrain layer descriptor.

/// HTTP GET abstraction with reqwest-backed native and WASM clients.
pub mod http_client;

/// One-shot terrain layer descriptor fetch, logged for diagnostics.
pub mod terrain_layer;
