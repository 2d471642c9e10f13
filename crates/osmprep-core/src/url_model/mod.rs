//! URL modeling and snapshot filename derivation.

mod path;

pub use path::filename_from_url_path;

/// Derives the local file name for a fetched snapshot: the last segment of the
/// URL path, e.g. `https://example.com/europe/region.osm.pbf` → `region.osm.pbf`.
///
/// Returns `None` when the URL does not parse, is not hierarchical, or its path
/// has no usable segment.
pub fn derive_filename(url: &str) -> Option<String> {
    filename_from_url_path(url).filter(|name| !name.trim().is_empty())
}
