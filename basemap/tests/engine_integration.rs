//! Integration tests for the basemap engine.
//!
//! These tests verify the complete flow through the public API:
//! - enable → plan → fetch → composite → Ready
//! - cache warm-up across engine restarts
//! - viewport mutations superseding in-flight rounds
//!
//! Run with: `cargo test --test engine_integration`

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbaImage;

use basemap::config::EngineConfig;
use basemap::controller::{BasemapController, BasemapState};
use basemap::coord::GeoExtent;
use basemap::provider::{HttpClient, HttpError, TileProvider};
use basemap::viewport::ViewportPixels;

// ============================================================================
// Helper Functions
// ============================================================================

/// Stub tile server: answers every download with the same solid PNG and
/// counts requests.
struct StubTileServer {
    png: Vec<u8>,
    downloads: AtomicUsize,
}

impl StubTileServer {
    fn new(r: u8, g: u8, b: u8) -> Self {
        let tile = RgbaImage::from_pixel(256, 256, image::Rgba([r, g, b, 255]));
        let mut png = Vec::new();
        tile.write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageFormat::Png,
        )
        .expect("encode stub tile");
        Self {
            png,
            downloads: AtomicUsize::new(0),
        }
    }

    fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

impl HttpClient for StubTileServer {
    fn download(&self, _url: &str, dest: &Path) -> Result<(), HttpError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        std::fs::write(dest, &self.png)?;
        Ok(())
    }

    fn probe_content_type(&self, _url: &str) -> Result<Option<String>, HttpError> {
        Ok(Some("image/png".to_string()))
    }
}

fn osm_provider() -> TileProvider {
    TileProvider::new(
        "osm",
        "standard",
        "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
    )
}

fn engine(cache_dir: &Path, server: Arc<StubTileServer>) -> BasemapController {
    let config = EngineConfig::default()
        .with_cache_dir(cache_dir)
        .with_workers(4);
    BasemapController::with_http_client(config, osm_provider(), server).unwrap()
}

fn wait_until_ready(controller: &mut BasemapController) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while controller.poll() != BasemapState::Ready {
        assert!(Instant::now() < deadline, "engine never became ready");
        std::thread::sleep(Duration::from_millis(5));
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

/// The complete happy path: enable a viewport, wait for the fetch round,
/// composite, and verify the bitmap is fully painted.
#[test]
fn test_enable_fetch_composite_round() {
    let dir = tempfile::tempdir().unwrap();
    let server = Arc::new(StubTileServer::new(40, 90, 160));
    let mut controller = engine(dir.path(), server.clone());

    controller.enable(
        GeoExtent {
            north: 55.0,
            south: 45.0,
            east: 15.0,
            west: 5.0,
        },
        ViewportPixels::new(640, 480),
    );
    assert_eq!(controller.state(), BasemapState::Fetching);

    wait_until_ready(&mut controller);

    let bitmap = controller.redraw().expect("bitmap after enable");
    assert_eq!((bitmap.width(), bitmap.height()), (640, 480));
    for &(x, y) in &[(0u32, 0u32), (639, 0), (0, 479), (639, 479), (320, 240)] {
        assert_eq!(
            bitmap.get_pixel(x, y).0,
            [40, 90, 160, 255],
            "pixel ({x}, {y}) not painted"
        );
    }

    let planned = controller.plan().unwrap().len();
    assert_eq!(server.download_count(), planned);
    controller.shutdown();
}

/// A restarted engine finds every tile on disk and issues no downloads.
#[test]
fn test_cache_survives_engine_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = Arc::new(StubTileServer::new(10, 10, 10));
    let mut controller = engine(dir.path(), first.clone());
    controller.enable(GeoExtent::world(), ViewportPixels::new(512, 512));
    wait_until_ready(&mut controller);
    controller.shutdown();
    assert!(first.download_count() > 0);

    let second = Arc::new(StubTileServer::new(10, 10, 10));
    let mut controller = engine(dir.path(), second.clone());
    controller.enable(GeoExtent::world(), ViewportPixels::new(512, 512));
    wait_until_ready(&mut controller);
    controller.shutdown();

    assert_eq!(second.download_count(), 0, "warm cache must fetch nothing");
}

/// Panning mid-fetch supersedes the round; the engine still converges and
/// the superseded jobs' cache writes remain usable.
#[test]
fn test_pan_supersedes_round_and_converges() {
    let dir = tempfile::tempdir().unwrap();
    let server = Arc::new(StubTileServer::new(100, 100, 100));
    let mut controller = engine(dir.path(), server.clone());

    controller.enable(
        GeoExtent {
            north: 55.0,
            south: 45.0,
            east: 15.0,
            west: 5.0,
        },
        ViewportPixels::new(640, 480),
    );

    // Interactive burst: several mutations before anything finishes
    controller.pan(120.0, 0.0);
    controller.pan(120.0, 40.0);
    controller.zoom_out();

    assert_eq!(controller.state(), BasemapState::Fetching);
    wait_until_ready(&mut controller);

    let bitmap = controller.redraw().expect("bitmap after mutations");
    assert_eq!(bitmap.get_pixel(320, 240).0, [100, 100, 100, 255]);
    controller.shutdown();
}

/// Scenario: the full world on a single-tile screen plans exactly (0,0,0).
#[test]
fn test_world_viewport_plans_single_root_tile() {
    let dir = tempfile::tempdir().unwrap();
    let server = Arc::new(StubTileServer::new(1, 2, 3));
    let mut controller = engine(dir.path(), server.clone());

    controller.enable(
        GeoExtent {
            north: 85.0,
            south: -85.0,
            east: 180.0,
            west: -180.0,
        },
        ViewportPixels::new(256, 256),
    );

    let plan = controller.plan().unwrap();
    assert_eq!(plan.zoom(), 0);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.tiles()[0].index.x, 0);
    assert_eq!(plan.tiles()[0].index.y, 0);

    wait_until_ready(&mut controller);
    assert_eq!(server.download_count(), 1);
    controller.shutdown();
}
