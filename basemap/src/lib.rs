//! Basemap - slippy-map tile engine for desktop geovisualization
//!
//! This library turns a geographic viewport into a composited basemap
//! bitmap: it picks a zoom level, plans the covering 256×256 tile set
//! (Web Mercator, antimeridian wraparound, polar clipping), fetches
//! tiles through a write-through disk cache with bounded concurrency,
//! and composites whatever is available on every redraw.
//!
//! # High-Level API
//!
//! The [`controller`] module provides the facade the host canvas talks to:
//!
//! ```ignore
//! use basemap::config::EngineConfig;
//! use basemap::controller::BasemapController;
//! use basemap::coord::GeoExtent;
//! use basemap::provider::TileProvider;
//! use basemap::viewport::ViewportPixels;
//!
//! let provider = TileProvider::new(
//!     "osm",
//!     "standard",
//!     "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
//! );
//! let mut basemap = BasemapController::new(EngineConfig::default(), provider)?;
//!
//! basemap.enable(GeoExtent::world(), ViewportPixels::new(1024, 768));
//! // on every frame:
//! let bitmap = basemap.redraw();
//! ```

pub mod cache;
pub mod compose;
pub mod config;
pub mod controller;
pub mod coord;
pub mod executor;
pub mod fetch;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod viewport;
pub mod zoom;

/// Version of the basemap library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
