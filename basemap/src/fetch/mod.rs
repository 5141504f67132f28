//! Per-tile fetch jobs.
//!
//! A [`TileFetcher`] bundles everything a worker needs to materialize one
//! tile on disk: provider, credentials, sniffed extension, cache handle
//! and HTTP client. [`TileFetcher::fetch`] is the job body the controller
//! submits to the worker pool, once per planned tile.
//!
//! Failure policy: every network outcome is absorbed here. A timeout or
//! transport error may leave a partial file; a zero-length file is
//! retried naturally by the next round, and the completion counter is
//! incremented whatever happens so a round always terminates.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::TileDiskCache;
use crate::coord::TileIndex;
use crate::executor::FetchCounters;
use crate::provider::{build_tile_url, HttpClient, TileProvider};

/// Shared, immutable context for all fetch jobs of one provider.
pub struct TileFetcher {
    provider: TileProvider,
    credentials: HashMap<String, String>,
    ext: String,
    cache: TileDiskCache,
    client: Arc<dyn HttpClient>,
}

impl TileFetcher {
    pub fn new(
        provider: TileProvider,
        credentials: HashMap<String, String>,
        ext: String,
        cache: TileDiskCache,
        client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            provider,
            credentials,
            ext,
            cache,
            client,
        }
    }

    pub fn provider(&self) -> &TileProvider {
        &self.provider
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// Materialize one tile, then record completion on `counters`.
    ///
    /// Cache hit: done, zero network traffic. Miss: one GET streamed to
    /// the cache path, no retry, no cleanup on failure.
    pub fn fetch(&self, index: TileIndex, counters: &FetchCounters) {
        self.fetch_tile(index);
        counters.mark_completed();
    }

    fn fetch_tile(&self, index: TileIndex) {
        let path = self.cache.tile_path(&self.provider, &index, &self.ext);
        if TileDiskCache::is_valid_file(&path) {
            trace!(?index, "cache hit");
            return;
        }

        let url = build_tile_url(&self.provider, &index, &self.credentials);
        match self.client.download(&url, &path) {
            Ok(()) => trace!(?index, "tile fetched"),
            // Absorbed: the region stays blank until a later round retries
            Err(err) => debug!(?index, %err, "tile fetch failed"),
        }
    }
}
