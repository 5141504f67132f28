//! Tile compositing.
//!
//! Draws whatever tiles the cache currently holds into the display
//! bitmap. Order-independent: jobs may land in any order, and a redraw
//! simply picks up whatever is decodable right now. Missing or corrupt
//! tiles leave their region blank; no placeholder, no retry trigger.

use image::RgbaImage;
use tracing::debug;

use crate::cache::TileDiskCache;
use crate::executor::CountersSnapshot;
use crate::plan::TilePlan;
use crate::provider::TileProvider;

/// Composite the current plan's cached tiles into a fresh bitmap.
///
/// Tiles with destinations partially outside the surface are clipped.
pub fn composite(
    plan: &TilePlan,
    cache: &TileDiskCache,
    provider: &TileProvider,
    ext: &str,
) -> RgbaImage {
    let pixels = plan.pixels();
    let mut canvas = RgbaImage::new(pixels.width, pixels.height);

    let mut drawn = 0usize;
    for tile in plan.tiles() {
        let path = cache.tile_path(provider, &tile.index, ext);
        if !TileDiskCache::is_valid_file(&path) {
            continue;
        }

        match image::open(&path) {
            Ok(img) => {
                image::imageops::overlay(
                    &mut canvas,
                    &img.to_rgba8(),
                    tile.dest_x as i64,
                    tile.dest_y as i64,
                );
                drawn += 1;
            }
            // A truncated or corrupt file renders as a blank region
            Err(err) => debug!(index = ?tile.index, %err, "undecodable tile skipped"),
        }
    }

    debug!(drawn, planned = plan.len(), "composited viewport");
    canvas
}

/// Whether the current round has finished fetching.
pub fn is_round_complete(snapshot: CountersSnapshot) -> bool {
    snapshot.is_complete()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileIndex;
    use crate::executor::FetchCounters;
    use crate::plan::plan_viewport;
    use crate::viewport::ViewportPixels;
    use crate::coord::GeoExtent;

    fn provider() -> TileProvider {
        TileProvider::new("osm", "standard", "https://x/{z}/{x}/{y}.png")
    }

    fn solid_tile(r: u8, g: u8, b: u8) -> RgbaImage {
        RgbaImage::from_pixel(256, 256, image::Rgba([r, g, b, 255]))
    }

    fn world_plan() -> TilePlan {
        plan_viewport(
            &GeoExtent {
                north: 85.0,
                south: -85.0,
                east: 180.0,
                west: -180.0,
            },
            ViewportPixels::new(256, 256),
            0,
        )
    }

    #[test]
    fn test_composite_draws_cached_tile() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TileDiskCache::open(dir.path()).unwrap();
        let p = provider();
        let plan = world_plan();

        let tile = TileIndex { zoom: 0, x: 0, y: 0 };
        solid_tile(200, 30, 10)
            .save(cache.tile_path(&p, &tile, "png"))
            .unwrap();

        let bitmap = composite(&plan, &cache, &p, "png");
        let px = bitmap.get_pixel(128, 128);
        assert_eq!(px.0, [200, 30, 10, 255]);
    }

    #[test]
    fn test_missing_tile_leaves_blank_region() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TileDiskCache::open(dir.path()).unwrap();
        let plan = world_plan();

        let bitmap = composite(&plan, &cache, &provider(), "png");
        // Untouched canvas is fully transparent
        assert_eq!(bitmap.get_pixel(128, 128).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_corrupt_tile_skipped_silently() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TileDiskCache::open(dir.path()).unwrap();
        let p = provider();
        let plan = world_plan();

        let tile = TileIndex { zoom: 0, x: 0, y: 0 };
        std::fs::write(cache.tile_path(&p, &tile, "png"), b"definitely not a png").unwrap();

        let bitmap = composite(&plan, &cache, &p, "png");
        assert_eq!(bitmap.get_pixel(128, 128).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_offscreen_overhang_is_clipped() {
        // A plan whose first tile starts above-left of the surface must
        // not panic and must fill the visible part
        let dir = tempfile::tempdir().unwrap();
        let cache = TileDiskCache::open(dir.path()).unwrap();
        let p = provider();

        let plan = plan_viewport(
            &GeoExtent {
                north: 55.0,
                south: 45.0,
                east: 15.0,
                west: 5.0,
            },
            ViewportPixels::new(300, 300),
            6,
        );

        for tile in plan.tiles() {
            solid_tile(0, 120, 240)
                .save(cache.tile_path(&p, &tile.index, "png"))
                .unwrap();
        }

        let bitmap = composite(&plan, &cache, &p, "png");
        assert_eq!(bitmap.get_pixel(0, 0).0, [0, 120, 240, 255]);
        assert_eq!(bitmap.get_pixel(299, 299).0, [0, 120, 240, 255]);
    }

    #[test]
    fn test_round_completion_report() {
        let counters = FetchCounters::new_round(2);
        assert!(!is_round_complete(counters.snapshot()));
        counters.mark_completed();
        counters.mark_completed();
        assert!(is_round_complete(counters.snapshot()));
    }
}
