//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and fractional Web Mercator tile coordinates used by slippy-map tile
//! servers.
//!
//! The conversions here are total: latitude is clamped to the Mercator
//! limit and longitude is wrapped into [-180, 180) before projecting, so
//! there are no error cases.

mod types;

pub use types::{GeoExtent, TileIndex, TilePoint, MAX_LAT, MAX_ZOOM, MIN_LAT, MIN_ZOOM, TILE_SIZE};

use std::f64::consts::PI;

/// Wraps a longitude into the canonical [-180, 180) range.
#[inline]
pub fn wrap_lng(lng: f64) -> f64 {
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can return 360.0 for inputs a hair below the boundary
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Converts geographic coordinates to fractional tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees; clamped to ±85.05112878
/// * `lng` - Longitude in degrees; wrapped into [-180, 180)
/// * `zoom` - Zoom level (0 to 18)
///
/// # Returns
///
/// The fractional tile position, `x` in `[0, 2^zoom)`, `y` in `[0, 2^zoom]`.
#[inline]
pub fn forward(lat: f64, lng: f64, zoom: u8) -> TilePoint {
    let lat = lat.clamp(MIN_LAT, MAX_LAT);
    let lng = wrap_lng(lng);

    let n = 2.0_f64.powi(zoom as i32);
    let x = (lng + 180.0) / 360.0 * n;
    let lat_rad = lat.to_radians();
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;

    TilePoint { x, y }
}

/// Converts fractional tile coordinates back to geographic coordinates.
///
/// Inverse of [`forward`]; returns `(lat, lng)` in degrees.
#[inline]
pub fn inverse(point: TilePoint, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);
    let lng = point.x / n * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * point.y / n)).sinh().atan();
    (lat_rad.to_degrees(), lng)
}

/// Returns the latitude/longitude of a tile's northwest corner.
///
/// This is the raw pyramid-space helper; positioning a coordinate inside a
/// planned viewport (including any host CRS adjustment) is
/// [`crate::viewport::Viewport::display_lat_lng_to_pixel`].
#[inline]
pub fn raw_tile_to_lat_lng(tile: &TileIndex) -> (f64, f64) {
    inverse(
        TilePoint {
            x: tile.x as f64,
            y: tile.y as f64,
        },
        tile.zoom,
    )
}
