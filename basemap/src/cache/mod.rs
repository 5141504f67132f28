//! Persistent disk tile cache.
//!
//! A flat, key-addressed directory of tile files:
//!
//! ```text
//! {cache_dir}/{group}.{name}-{zoom}-{x}-{y}.{ext}
//! ```
//!
//! A file present with non-zero length is a hit and permanently valid:
//! no TTL, no revalidation. A zero-length file counts as absent (the
//! residue of a failed download) and is rewritten by the next fetch.
//! The store is append-only and lock-free: concurrent writers to one key
//! always produce byte-identical content, so races cannot corrupt it.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::coord::TileIndex;
use crate::provider::TileProvider;

/// Cache setup errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to create the cache directory.
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
}

/// Handle to the on-disk tile store.
#[derive(Debug, Clone)]
pub struct TileDiskCache {
    root: PathBuf,
}

impl TileDiskCache {
    /// Open (creating if needed) the cache rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| CacheError::CreateDir {
            path: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Default cache root under the user's cache directory.
    pub fn default_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("basemap")
            .join("tiles")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic path for a tile's cache key.
    pub fn tile_path(&self, provider: &TileProvider, index: &TileIndex, ext: &str) -> PathBuf {
        self.root.join(format!(
            "{}.{}-{}-{}-{}.{}",
            provider.group, provider.name, index.zoom, index.x, index.y, ext
        ))
    }

    /// Whether a tile is cached: present with non-zero length.
    pub fn contains(&self, provider: &TileProvider, index: &TileIndex, ext: &str) -> bool {
        Self::is_valid_file(&self.tile_path(provider, index, ext))
    }

    /// Hit test on an already-computed cache path.
    pub fn is_valid_file(path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) => meta.len() > 0,
            Err(_) => false,
        }
    }
}
