//! Basemap CLI - Command-line interface
//!
//! Renders the basemap for a bounding box to a PNG file, exercising the
//! full enable → plan → fetch → composite path of the library.

use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::info;

use basemap::config::EngineConfig;
use basemap::controller::{BasemapController, BasemapState};
use basemap::coord::GeoExtent;
use basemap::logging::{default_log_dir, default_log_file, init_logging};
use basemap::provider::{load_catalog, TileProvider};
use basemap::viewport::ViewportPixels;

/// Default provider when no catalog is given.
const DEFAULT_PROVIDER_LINE: (&str, &str, &str) = (
    "osm",
    "standard",
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
);

#[derive(Parser)]
#[command(name = "basemap")]
#[command(version = basemap::VERSION)]
#[command(about = "Render slippy-map tiles for a bounding box to a PNG", long_about = None)]
struct Args {
    /// Bounding box as west,south,east,north in decimal degrees
    #[arg(long)]
    bbox: String,

    /// Output size in pixels, e.g. 1024x768
    #[arg(long, default_value = "1024x768")]
    size: String,

    /// Provider id (group.name) to pick from the catalog
    #[arg(long, default_value = "osm.standard")]
    provider: String,

    /// Catalog file with one `group.name,urlTemplate` entry per line
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Tile cache directory (defaults to the user cache dir)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Worker thread count (defaults to cores minus one)
    #[arg(long)]
    workers: Option<usize>,

    /// Give up waiting for tiles after this many seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,
}

fn main() {
    let args = Args::parse();

    let _log_guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error initializing logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let extent = parse_bbox(&args.bbox)?;
    let pixels = parse_size(&args.size)?;
    let provider = resolve_provider(&args)?;

    info!(provider = %provider.id(), bbox = %args.bbox, "rendering basemap");

    let mut config = EngineConfig::default();
    if let Some(dir) = args.cache_dir {
        config = config.with_cache_dir(dir);
    }
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }

    let mut controller = BasemapController::new(config, provider)?;
    controller.enable(extent, pixels);

    // The engine never blocks; poll until the round completes or the
    // deadline passes, then render whatever made it into the cache
    let deadline = Instant::now() + Duration::from_secs(args.timeout);
    while controller.poll() != BasemapState::Ready && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(50));
    }
    if controller.state() != BasemapState::Ready {
        eprintln!(
            "Warning: not all tiles arrived within {}s, missing regions stay blank",
            args.timeout
        );
    }

    let bitmap = controller
        .redraw()
        .ok_or("no viewport, nothing to render")?;
    bitmap.save(&args.output)?;
    controller.shutdown();

    println!("Wrote {}", args.output.display());
    Ok(())
}

fn parse_bbox(text: &str) -> Result<GeoExtent, String> {
    let parts: Vec<f64> = text
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid bbox '{}': {}", text, e))?;

    let [west, south, east, north] = parts[..] else {
        return Err(format!(
            "invalid bbox '{}': expected west,south,east,north",
            text
        ));
    };
    if south >= north {
        return Err(format!("invalid bbox '{}': south must be below north", text));
    }

    Ok(GeoExtent {
        north,
        south,
        east,
        west,
    })
}

fn parse_size(text: &str) -> Result<ViewportPixels, String> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{}': expected WxH", text))?;
    let width: u32 = w.trim().parse().map_err(|e| format!("invalid width: {}", e))?;
    let height: u32 = h.trim().parse().map_err(|e| format!("invalid height: {}", e))?;
    if width == 0 || height == 0 {
        return Err("size must be non-zero".to_string());
    }
    Ok(ViewportPixels::new(width, height))
}

fn resolve_provider(args: &Args) -> Result<TileProvider, String> {
    match &args.catalog {
        Some(path) => {
            let providers = load_catalog(path).map_err(|e| e.to_string())?;
            providers
                .into_iter()
                .find(|p| p.id() == args.provider)
                .ok_or_else(|| format!("provider '{}' not found in catalog", args.provider))
        }
        None => {
            let (group, name, template) = DEFAULT_PROVIDER_LINE;
            if args.provider != format!("{}.{}", group, name) {
                return Err(format!(
                    "provider '{}' requires --catalog (built-in: {}.{})",
                    args.provider, group, name
                ));
            }
            Ok(TileProvider::new(group, name, template))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let extent = parse_bbox("5.0, 45.0, 15.0, 55.0").unwrap();
        assert_eq!(extent.west, 5.0);
        assert_eq!(extent.south, 45.0);
        assert_eq!(extent.east, 15.0);
        assert_eq!(extent.north, 55.0);
    }

    #[test]
    fn test_parse_bbox_rejects_inverted_latitudes() {
        assert!(parse_bbox("5,55,15,45").is_err());
    }

    #[test]
    fn test_parse_bbox_rejects_wrong_arity() {
        assert!(parse_bbox("5,45,15").is_err());
        assert!(parse_bbox("garbage").is_err());
    }

    #[test]
    fn test_parse_bbox_allows_antimeridian() {
        let extent = parse_bbox("170,-10,-170,10").unwrap();
        assert!(extent.crosses_antimeridian());
    }

    #[test]
    fn test_parse_size() {
        let px = parse_size("1024x768").unwrap();
        assert_eq!((px.width, px.height), (1024, 768));
        assert!(parse_size("0x768").is_err());
        assert!(parse_size("1024").is_err());
    }
}
