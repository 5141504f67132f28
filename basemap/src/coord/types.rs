//! Core coordinate types for the tile pyramid.

/// Maximum latitude representable in the Web Mercator projection, degrees.
pub const MAX_LAT: f64 = 85.051_128_78;

/// Minimum latitude representable in the Web Mercator projection, degrees.
pub const MIN_LAT: f64 = -85.051_128_78;

/// Minimum zoom level of the tile pyramid.
pub const MIN_ZOOM: u8 = 0;

/// Maximum zoom level of the tile pyramid.
pub const MAX_ZOOM: u8 = 18;

/// Edge length of a raster tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// A tile address in the slippy-map pyramid.
///
/// `x` is the column (west to east), `y` the row (north to south). At zoom
/// `z` both axes hold `2^z` tiles; `x` wraps modulo `2^z` across the
/// antimeridian while `y` is never wrapped (the poles are simply not
/// covered by the projection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    /// Zoom level.
    pub zoom: u8,
    /// Tile column.
    pub x: u32,
    /// Tile row.
    pub y: u32,
}

impl TileIndex {
    /// Create a tile index from possibly out-of-range axis values.
    ///
    /// The column is wrapped modulo `2^zoom`; a row outside `[0, 2^zoom)`
    /// yields `None` since rows do not wrap.
    pub fn normalized(zoom: u8, x: i64, y: i64) -> Option<Self> {
        let n = 1i64 << zoom;
        if y < 0 || y >= n {
            return None;
        }
        Some(Self {
            zoom,
            x: x.rem_euclid(n) as u32,
            y: y as u32,
        })
    }
}

/// A fractional position in tile coordinate space.
///
/// Unlike [`TileIndex`] this keeps the sub-tile fraction, so `x = 2.25`
/// means a quarter of the way into column 2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePoint {
    pub x: f64,
    pub y: f64,
}

/// A geographic bounding box in degrees.
///
/// Invariant: `south < north`. `east < west` is legal and means the extent
/// straddles the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoExtent {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoExtent {
    /// The full Web Mercator square.
    pub fn world() -> Self {
        Self {
            north: MAX_LAT,
            south: MIN_LAT,
            east: 180.0,
            west: -180.0,
        }
    }

    /// Longitudinal span in degrees, accounting for antimeridian wrap.
    pub fn width_deg(&self) -> f64 {
        let w = self.east - self.west;
        if w <= 0.0 {
            w + 360.0
        } else {
            w
        }
    }

    /// Latitudinal span in degrees.
    pub fn height_deg(&self) -> f64 {
        self.north - self.south
    }

    /// Whether the extent straddles the 180° meridian.
    pub fn crosses_antimeridian(&self) -> bool {
        self.east < self.west
    }
}
