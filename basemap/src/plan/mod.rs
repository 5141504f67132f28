//! Tile address planning.
//!
//! Turns a geographic viewport and a chosen zoom level into the set of
//! tile addresses covering it, each with its destination pixel position.
//! Planning is a pure function: every viewport mutation produces a fresh
//! [`TilePlan`] that fully replaces the previous one.
//!
//! The tricky parts live here:
//! - antimeridian wraparound: a viewport straddling ±180° produces a
//!   contiguous column range in unwrapped space, and each tile's column is
//!   normalized into `[0, 2^zoom)` afterwards;
//! - polar clipping: rows outside the pyramid are not planned, leaving
//!   blank regions near the poles;
//! - centering: when the requested extent (or the whole world) is smaller
//!   than the viewport, the grid is centered via a nonnegative offset;
//! - degenerate fits: when the extent cannot fit the viewport at the
//!   requested zoom, planning retries at `zoom - 1`, bounded at zoom 1,
//!   where an imperfect fit is accepted.

use tracing::debug;

use crate::coord::{self, GeoExtent, TileIndex, TilePoint, MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use crate::viewport::ViewportPixels;

/// Zoom floor for the fit-retry recursion.
const MIN_PLAN_ZOOM: u8 = 1;

/// One tile of a plan: the pyramid address plus where its top-left corner
/// lands on the drawing surface. Destinations may be negative or extend
/// past the surface; the compositor clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedTile {
    pub index: TileIndex,
    pub dest_x: i32,
    pub dest_y: i32,
}

/// The covering tile set for one viewport at one zoom level.
#[derive(Debug, Clone)]
pub struct TilePlan {
    zoom: u8,
    pixels: ViewportPixels,
    /// Fractional tile coordinate sitting at surface pixel (0, 0).
    origin: TilePoint,
    tiles: Vec<PlannedTile>,
}

impl TilePlan {
    /// Zoom level the plan was computed at (may be lower than requested
    /// when the extent did not fit).
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn pixels(&self) -> ViewportPixels {
        self.pixels
    }

    pub fn tiles(&self) -> &[PlannedTile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Position of a geographic coordinate on the drawing surface, in
    /// fractional pixels. Wraps the shorter way around the antimeridian.
    pub fn lat_lng_to_pixel(&self, lat: f64, lng: f64) -> (f64, f64) {
        let n = 2.0_f64.powi(self.zoom as i32);
        let point = coord::forward(lat, lng, self.zoom);

        let mut dx = point.x - self.origin.x;
        // Choose the representative of x within half a world of the origin
        if dx < -n / 2.0 {
            dx += n;
        } else if dx > n / 2.0 {
            dx -= n;
        }

        (
            dx * TILE_SIZE as f64,
            (point.y - self.origin.y) * TILE_SIZE as f64,
        )
    }
}

/// Computes the covering tile plan for a viewport.
///
/// `zoom` is the level picked by [`crate::zoom::select_zoom`]; the planner
/// may settle on a lower one when the extent does not fit (see module
/// docs). The result is minimal: every tile's destination rectangle
/// intersects the surface.
pub fn plan_viewport(extent: &GeoExtent, pixels: ViewportPixels, zoom: u8) -> TilePlan {
    let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    if pixels.width == 0 || pixels.height == 0 {
        return TilePlan {
            zoom,
            pixels,
            origin: TilePoint { x: 0.0, y: 0.0 },
            tiles: Vec::new(),
        };
    }
    plan_at(extent, pixels, zoom)
}

fn plan_at(extent: &GeoExtent, pixels: ViewportPixels, zoom: u8) -> TilePlan {
    let n = 1i64 << zoom;
    let tile_px = TILE_SIZE as f64;
    let world_px = n * TILE_SIZE as i64;

    let nw = coord::forward(extent.north, extent.west, zoom);
    let se = coord::forward(extent.south, extent.east, zoom);

    // Fractional extent span in tile units; antimeridian shows up as a
    // non-positive raw x span
    let mut span_x = se.x - nw.x;
    if span_x <= 0.0 {
        span_x += n as f64;
    }
    let span_y = se.y - nw.y;

    // Center the extent in the viewport. A negative offset means the
    // extent overflows the surface at this zoom; step down and retry.
    let off_x = (pixels.width as f64 - span_x * tile_px) / 2.0;
    let off_y = (pixels.height as f64 - span_y * tile_px) / 2.0;
    if (off_x < 0.0 || off_y < 0.0) && zoom > MIN_PLAN_ZOOM {
        debug!(zoom, "extent overflows viewport, retrying one level down");
        return plan_at(extent, pixels, zoom - 1);
    }

    // Fractional tile coordinate at surface pixel (0, 0)
    let left = nw.x - off_x / tile_px;
    let top = nw.y - off_y / tile_px;

    // Columns covering [0, width). When the world itself is narrower than
    // the surface there is nothing more to cover than one copy of it.
    let (col_start, col_end) = if world_px <= pixels.width as i64 {
        (0, n - 1)
    } else {
        let start = left.floor() as i64;
        let end = (left + pixels.width as f64 / tile_px).ceil() as i64 - 1;
        (start, end)
    };

    // Rows likewise, additionally clipped to the pyramid
    let row_start = (top.floor() as i64).max(0);
    let row_end = ((top + pixels.height as f64 / tile_px).ceil() as i64 - 1).min(n - 1);

    // Snap the grid origin once so tile edges stay seam-free
    let grid_x = (col_start as f64 - left) * tile_px;
    let grid_y = (row_start as f64 - top) * tile_px;

    let mut tiles = Vec::new();
    for row in row_start..=row_end {
        let dest_y = (grid_y + (row - row_start) as f64 * tile_px).round() as i32;
        for col in col_start..=col_end {
            let dest_x = (grid_x + (col - col_start) as f64 * tile_px).round() as i32;
            // Column wraps; rows were already clipped above
            if let Some(index) = TileIndex::normalized(zoom, col, row) {
                tiles.push(PlannedTile {
                    index,
                    dest_x,
                    dest_y,
                });
            }
        }
    }

    debug!(
        zoom,
        tiles = tiles.len(),
        cols = col_end - col_start + 1,
        rows = (row_end - row_start + 1).max(0),
        "planned viewport"
    );

    TilePlan {
        zoom,
        pixels,
        origin: TilePoint { x: left, y: top },
        tiles,
    }
}
