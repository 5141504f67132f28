//! Viewport state for the basemap canvas.
//!
//! A [`Viewport`] pairs the visible geographic extent with the pixel size
//! of the drawing surface. The host application mutates it on pan, zoom
//! and resize gestures (it hands us already-computed pixel deltas); every
//! mutation invalidates the current tile plan, so the controller replans.
//!
//! An optional [`CrsTransform`] lets the host interpose its own display
//! coordinate adjustment. The helpers are deliberately split:
//! [`crate::coord::raw_tile_to_lat_lng`] works purely in pyramid space,
//! while [`Viewport::display_lat_lng_to_pixel`] applies the host
//! adjustment first.

use std::sync::Arc;

use crate::coord::{self, GeoExtent, TilePoint};
use crate::plan::TilePlan;

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportPixels {
    pub width: u32,
    pub height: u32,
}

impl ViewportPixels {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Coordinate adjustment supplied by the host application.
///
/// Implementations must be pure; the engine calls them from the controller
/// thread only.
pub trait CrsTransform: Send + Sync {
    /// Map a geographic coordinate into the host's display CRS.
    fn to_display(&self, lat: f64, lng: f64) -> (f64, f64);

    /// Map a display-CRS coordinate back to geographic.
    fn from_display(&self, lat: f64, lng: f64) -> (f64, f64);
}

/// The currently visible geographic bounding box plus pixel dimensions.
#[derive(Clone)]
pub struct Viewport {
    extent: GeoExtent,
    pixels: ViewportPixels,
    crs: Option<Arc<dyn CrsTransform>>,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("extent", &self.extent)
            .field("pixels", &self.pixels)
            .field("crs", &self.crs.as_ref().map(|_| "<host transform>"))
            .finish()
    }
}

impl Viewport {
    /// Create a viewport from the current map extent.
    pub fn new(extent: GeoExtent, pixels: ViewportPixels) -> Self {
        Self {
            extent,
            pixels,
            crs: None,
        }
    }

    /// Attach a host display-CRS adjustment.
    pub fn with_crs(mut self, crs: Arc<dyn CrsTransform>) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn extent(&self) -> &GeoExtent {
        &self.extent
    }

    pub fn pixels(&self) -> ViewportPixels {
        self.pixels
    }

    /// Shift the extent by a pixel delta at the current scale.
    ///
    /// Positive `dx` pans the view east, positive `dy` pans it south.
    /// Latitude is kept inside the Mercator square; longitude wraps.
    pub fn pan_pixels(&mut self, dx: f64, dy: f64) {
        // Work in zoom-0 fractional tile space: the world is one unit wide,
        // so one viewport-width of pixels spans `span_x` world units.
        let nw = coord::forward(self.extent.north, self.extent.west, 0);
        let se = coord::forward(self.extent.south, self.extent.east, 0);

        let mut span_x = se.x - nw.x;
        if span_x <= 0.0 {
            span_x += 1.0;
        }
        let span_y = se.y - nw.y;

        let shift_x = dx * span_x / self.pixels.width.max(1) as f64;
        let shift_y = dy * span_y / self.pixels.height.max(1) as f64;

        let (mut new_north, new_west) = coord::inverse(
            TilePoint {
                x: nw.x + shift_x,
                y: (nw.y + shift_y).clamp(0.0, 1.0),
            },
            0,
        );
        let (mut new_south, new_east) = coord::inverse(
            TilePoint {
                x: se.x + shift_x,
                y: (se.y + shift_y).clamp(0.0, 1.0),
            },
            0,
        );
        let new_west = coord::wrap_lng(new_west);
        let new_east = coord::wrap_lng(new_east);

        // A clamped edge must not invert the extent
        if new_south >= new_north {
            new_north = self.extent.north;
            new_south = self.extent.south;
        }

        self.extent = GeoExtent {
            north: new_north,
            south: new_south,
            east: new_east,
            west: new_west,
        };
    }

    /// Halve the visible extent about its center.
    pub fn zoom_in(&mut self) {
        self.scale_about_center(0.5);
    }

    /// Double the visible extent about its center, clamped to the world.
    pub fn zoom_out(&mut self) {
        self.scale_about_center(2.0);
    }

    /// Update the pixel dimensions after a window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pixels = ViewportPixels { width, height };
    }

    /// Replace the extent wholesale (the host's "reset view" action).
    pub fn reset(&mut self, extent: GeoExtent) {
        self.extent = extent;
    }

    /// Project a display-CRS coordinate to a pixel position in `plan`.
    ///
    /// Applies the host adjustment (if any), then positions the resulting
    /// geographic coordinate within the planned viewport. Returns fractional
    /// pixels; callers clip to the surface themselves.
    pub fn display_lat_lng_to_pixel(&self, plan: &TilePlan, lat: f64, lng: f64) -> (f64, f64) {
        let (lat, lng) = match &self.crs {
            Some(crs) => crs.from_display(lat, lng),
            None => (lat, lng),
        };
        plan.lat_lng_to_pixel(lat, lng)
    }

    fn scale_about_center(&mut self, factor: f64) {
        let nw = coord::forward(self.extent.north, self.extent.west, 0);
        let se = coord::forward(self.extent.south, self.extent.east, 0);

        let mut span_x = se.x - nw.x;
        if span_x <= 0.0 {
            span_x += 1.0;
        }
        let span_y = se.y - nw.y;

        let center_x = nw.x + span_x / 2.0;
        let center_y = nw.y + span_y / 2.0;

        let half_x = (span_x * factor / 2.0).min(0.5);
        let half_y = span_y * factor / 2.0;

        let top = (center_y - half_y).clamp(0.0, 1.0);
        let bottom = (center_y + half_y).clamp(0.0, 1.0);

        let (north, west) = coord::inverse(TilePoint { x: center_x - half_x, y: top }, 0);
        let (south, east) = coord::inverse(TilePoint { x: center_x + half_x, y: bottom }, 0);

        if south < north {
            self.extent = GeoExtent {
                north,
                south,
                east: coord::wrap_lng(east),
                west: coord::wrap_lng(west),
            };
        }
    }
}
