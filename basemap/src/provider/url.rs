//! Tile URL template expansion.
//!
//! Templates carry `{z}`, `{x}`, `{y}` for the tile address, `{s}` for a
//! load-balancing subdomain, and arbitrary credential placeholders (e.g.
//! `{apikey}`) filled from the host's key/value store.

use std::collections::HashMap;
use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

use super::TileProvider;
use crate::coord::TileIndex;

/// Subdomains used when the hostname matches none of the known CDNs.
///
/// The a/b/c scheme is the de-facto convention across OSM-style servers.
const DEFAULT_SUBDOMAINS: &[&str] = &["a", "b", "c"];

/// Known CDN hostname patterns and their subdomain pools.
fn cdn_pools() -> &'static [(Regex, &'static [&'static str])] {
    static POOLS: OnceLock<Vec<(Regex, &'static [&'static str])>> = OnceLock::new();
    POOLS
        .get_or_init(|| {
            [
                (r"tile\.openstreetmap\.org$", &["a", "b", "c"][..]),
                (r"basemaps\.cartocdn\.com$", &["a", "b", "c", "d"][..]),
                (r"tile\.opentopomap\.org$", &["a", "b", "c"][..]),
                (r"tile\.thunderforest\.com$", &["a", "b", "c"][..]),
                (r"\.googleapis\.com$", &["mt0", "mt1", "mt2", "mt3"][..]),
            ]
            .into_iter()
            .map(|(pattern, pool)| (Regex::new(pattern).expect("static pattern"), pool))
            .collect()
        })
        .as_slice()
}

/// The subdomain pool for a hostname.
pub fn subdomain_pool(host: &str) -> &'static [&'static str] {
    for (pattern, pool) in cdn_pools() {
        if pattern.is_match(host) {
            return pool;
        }
    }
    DEFAULT_SUBDOMAINS
}

/// Provider-specific User-Agent, chosen by hostname substring match.
///
/// OSM-family servers require an identifying agent; everything else gets
/// the generic one.
pub fn user_agent_for(host: &str) -> &'static str {
    const OSM_AGENT: &str = "basemap-engine/0.1 (+https://github.com/basemap-rs/basemap)";
    const GENERIC_AGENT: &str = "basemap-engine/0.1";

    if host.contains("openstreetmap") || host.contains("opentopomap") {
        OSM_AGENT
    } else {
        GENERIC_AGENT
    }
}

/// Expand a provider's template for one tile.
///
/// `{z}`/`{x}`/`{y}` come from the address, credential placeholders from
/// the supplied map, and `{s}` is drawn uniformly at random from the
/// hostname's subdomain pool to spread load across the CDN.
pub fn build_tile_url(
    provider: &TileProvider,
    index: &TileIndex,
    credentials: &HashMap<String, String>,
) -> String {
    let mut url = provider
        .url_template
        .replace("{z}", &index.zoom.to_string())
        .replace("{x}", &index.x.to_string())
        .replace("{y}", &index.y.to_string());

    for (token, value) in credentials {
        url = url.replace(&format!("{{{token}}}"), value);
    }

    if url.contains("{s}") {
        let pool = subdomain_pool(host_of(&url).unwrap_or_default());
        let pick = pool[rand::rng().random_range(0..pool.len())];
        url = url.replace("{s}", pick);
    }

    url
}

/// Hostname portion of a URL, with any `{s}.` prefix stripped so CDN
/// patterns match the stable suffix.
fn host_of(url: &str) -> Option<&str> {
    let after_scheme = url.split_once("://").map(|(_, rest)| rest)?;
    let host = after_scheme
        .split(['/', '?'])
        .next()?
        .split('@')
        .next_back()?
        .split(':')
        .next()?;
    Some(host.strip_prefix("{s}.").unwrap_or(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(zoom: u8, x: u32, y: u32) -> TileIndex {
        TileIndex { zoom, x, y }
    }

    #[test]
    fn test_zxy_substitution() {
        let provider = TileProvider::new("osm", "standard", "https://tiles.example.com/{z}/{x}/{y}.png");
        let url = build_tile_url(&provider, &tile(7, 66, 43), &HashMap::new());
        assert_eq!(url, "https://tiles.example.com/7/66/43.png");
    }

    #[test]
    fn test_credential_token_substitution() {
        let provider = TileProvider::new(
            "sat",
            "aerial",
            "https://tiles.example.com/{z}/{x}/{y}?key={apikey}",
        );
        let mut credentials = HashMap::new();
        credentials.insert("apikey".to_string(), "secret123".to_string());

        let url = build_tile_url(&provider, &tile(3, 1, 2), &credentials);
        assert_eq!(url, "https://tiles.example.com/3/1/2?key=secret123");
    }

    #[test]
    fn test_subdomain_drawn_from_pool() {
        let provider = TileProvider::new(
            "osm",
            "standard",
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        );

        for _ in 0..50 {
            let url = build_tile_url(&provider, &tile(1, 0, 0), &HashMap::new());
            assert!(
                url.starts_with("https://a.")
                    || url.starts_with("https://b.")
                    || url.starts_with("https://c."),
                "unexpected subdomain in {url}"
            );
            assert!(!url.contains("{s}"));
        }
    }

    #[test]
    fn test_subdomain_pool_by_hostname() {
        assert_eq!(subdomain_pool("tile.openstreetmap.org"), &["a", "b", "c"]);
        assert_eq!(
            subdomain_pool("basemaps.cartocdn.com"),
            &["a", "b", "c", "d"]
        );
        assert_eq!(
            subdomain_pool("mt.googleapis.com"),
            &["mt0", "mt1", "mt2", "mt3"]
        );
        // Unknown hosts fall back to the common convention
        assert_eq!(subdomain_pool("tiles.example.com"), DEFAULT_SUBDOMAINS);
    }

    #[test]
    fn test_host_of_variants() {
        assert_eq!(
            host_of("https://tile.openstreetmap.org/1/2/3.png"),
            Some("tile.openstreetmap.org")
        );
        assert_eq!(
            host_of("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"),
            Some("tile.openstreetmap.org")
        );
        assert_eq!(
            host_of("https://user@example.com:8080/path"),
            Some("example.com")
        );
        assert_eq!(host_of("not a url"), None);
    }

    #[test]
    fn test_user_agent_by_host() {
        assert!(user_agent_for("tile.openstreetmap.org").contains("github.com"));
        assert!(!user_agent_for("tiles.example.com").contains("github.com"));
    }
}
