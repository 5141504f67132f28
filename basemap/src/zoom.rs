//! Zoom level selection.
//!
//! Maps a continuous viewport (geographic span + pixel size) onto the
//! discrete zoom levels of the tile pyramid. Pure and deterministic.

use crate::coord::{GeoExtent, MAX_LAT, MAX_ZOOM, TILE_SIZE};
use crate::viewport::ViewportPixels;

/// Guard against `ceil` tipping an exact power of two over by one ULP.
const LOG2_EPSILON: f64 = 1e-9;

/// Picks the zoom level at which the extent best fills the viewport.
///
/// Each axis asks: how many times must the world be doubled before the
/// portion covered by the extent spans at least the viewport's pixels?
/// The horizontal axis measures against the full 360° of longitude, the
/// vertical against the fixed 2×85.05112878° of the Mercator square. The
/// smaller axis answer wins so the whole extent stays visible; an axis
/// with no positive answer (extent larger than the viewport can show at
/// zoom 0) defers to the other. Clamped to `[0, 18]`.
pub fn select_zoom(extent: &GeoExtent, pixels: ViewportPixels) -> u8 {
    let zoom_h = axis_zoom(360.0, extent.width_deg(), pixels.width);
    let zoom_v = axis_zoom(2.0 * MAX_LAT, extent.height_deg(), pixels.height);

    let zoom = match (zoom_h, zoom_v) {
        (Some(h), Some(v)) => h.min(v),
        (Some(h), None) => h,
        (None, Some(v)) => v,
        (None, None) => 0,
    };

    zoom.min(MAX_ZOOM as i32).max(0) as u8
}

/// Zoom demanded by one axis, or `None` when the axis has no non-negative
/// answer (degenerate span or pixel size).
fn axis_zoom(world_deg: f64, span_deg: f64, span_px: u32) -> Option<i32> {
    if span_deg <= 0.0 || span_px == 0 {
        return None;
    }
    let ratio = world_deg / span_deg * span_px as f64 / TILE_SIZE as f64;
    if ratio <= 0.0 {
        return None;
    }
    let zoom = (ratio.log2() - LOG2_EPSILON).ceil() as i32;
    if zoom >= 0 {
        Some(zoom)
    } else {
        None
    }
}
