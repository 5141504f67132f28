//! Provider catalog parsing.
//!
//! The host application persists the user's tile sources as a plain text
//! file, one entry per line:
//!
//! ```text
//! group.name,urlTemplate
//! ```
//!
//! Blank lines and `#` comments are ignored; fields are trimmed.
//! Persisting the catalog itself is the host's job, we only parse it.

use std::path::Path;

use thiserror::Error;

use super::TileProvider;

/// Catalog loading/parsing errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to read the catalog file.
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// A line did not match `group.name,urlTemplate`.
    #[error("invalid catalog entry at line {line_no}: '{line}'")]
    InvalidEntry { line_no: usize, line: String },
}

/// Parse catalog text into providers.
pub fn parse_catalog(text: &str) -> Result<Vec<TileProvider>, CatalogError> {
    let mut providers = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let entry = parse_line(line).ok_or_else(|| CatalogError::InvalidEntry {
            line_no: idx + 1,
            line: line.to_string(),
        })?;
        providers.push(entry);
    }

    Ok(providers)
}

/// Load and parse a catalog file.
pub fn load_catalog(path: &Path) -> Result<Vec<TileProvider>, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(&text)
}

fn parse_line(line: &str) -> Option<TileProvider> {
    let (id, template) = line.split_once(',')?;
    let (group, name) = id.trim().split_once('.')?;

    let group = group.trim();
    let name = name.trim();
    let template = template.trim();
    if group.is_empty() || name.is_empty() || template.is_empty() {
        return None;
    }

    Some(TileProvider::new(group, name, template))
}
