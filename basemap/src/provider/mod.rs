//! Tile provider abstraction
//!
//! A [`TileProvider`] identifies one raster tile source: a `group.name`
//! pair the host's catalog UI shows, and a URL template with `{z}`, `{x}`,
//! `{y}`, `{s}` and credential placeholders. The catalog line format,
//! template expansion and the HTTP seam all live here.

mod catalog;
mod http;
mod url;

pub use catalog::{load_catalog, parse_catalog, CatalogError};
pub use http::{HttpClient, HttpError, ReqwestClient};
pub use url::{build_tile_url, subdomain_pool, user_agent_for};

#[cfg(test)]
pub use http::tests::MockHttpClient;

use std::collections::HashMap;

use tracing::debug;

use crate::coord::TileIndex;

/// One entry of the user's tile source catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileProvider {
    /// Catalog group, e.g. `osm`.
    pub group: String,
    /// Source name within the group, e.g. `standard`.
    pub name: String,
    /// URL template with `{z}`/`{x}`/`{y}`/`{s}`/credential placeholders.
    pub url_template: String,
}

impl TileProvider {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        url_template: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            url_template: url_template.into(),
        }
    }

    /// The `group.name` identifier used in catalog files and cache keys.
    pub fn id(&self) -> String {
        format!("{}.{}", self.group, self.name)
    }
}

/// Determine the cache file extension for a provider.
///
/// Issues a single probe request for tile (0,0,0) and maps the response
/// Content-Type; anything unexpected (including a failed probe) falls
/// back to `png`. Called once per provider at controller setup.
pub fn sniff_extension(
    client: &dyn HttpClient,
    provider: &TileProvider,
    credentials: &HashMap<String, String>,
) -> String {
    let probe_url = build_tile_url(
        provider,
        &TileIndex {
            zoom: 0,
            x: 0,
            y: 0,
        },
        credentials,
    );

    match client.probe_content_type(&probe_url) {
        Ok(Some(content_type)) => {
            let ext = extension_for_content_type(&content_type);
            debug!(provider = %provider.id(), %content_type, ext, "sniffed tile format");
            ext.to_string()
        }
        Ok(None) => "png".to_string(),
        Err(err) => {
            debug!(provider = %provider.id(), %err, "format probe failed, assuming png");
            "png".to_string()
        }
    }
}

fn extension_for_content_type(content_type: &str) -> &'static str {
    // Servers may append charset or similar parameters
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}
