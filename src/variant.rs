//! Variant resolution: request coordinates to cache key and sharded path
//!
//! Resolution is pure. It never touches the filesystem, so the same
//! `(source_id, filename, profile)` triple always maps to the same cache
//! location, on any host.

use crate::config::ThumbnailConfig;
use crate::error::{Result, ThumbCacheError};

/// A resolved thumbnail variant
///
/// `rel_path` is always `/`-separated and relative to the cache root; it is
/// usable both as a filesystem suffix and as a URL suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    /// Cache artifact filename, unique per (source, profile geometry)
    pub cache_key: String,
    /// Sharded location under the cache root: `ab/cd/<cache_key>`
    pub rel_path: String,
    /// Extension taken from the source filename, drives the encode format
    pub extension: String,
}

/// Resolve a thumbnail request to its cache location
///
/// The key starts with the first 12 hex digits of `md5(source_id ++ filename)`,
/// followed by the source id, the configured dimensions (omitted when a side
/// is unset) and the resize mode. The two leading digit pairs of the key name
/// the shard directories, keeping any one directory to a small fraction of
/// the total cache population.
///
/// # Examples
///
/// ```
/// use thumb_cache::config::{ResizeMode, SizeProfile, ThumbnailConfig};
/// use thumb_cache::variant::resolve;
///
/// let config = ThumbnailConfig::new("/assets", "/cache", "http://localhost/cache")
///     .with_profile("list", SizeProfile::new(Some(100), Some(100), ResizeMode::ShrinkOnly));
///
/// let variant = resolve(&config, 42, "photo.jpg", "list").unwrap();
/// assert!(variant.cache_key.ends_with("-42-100x100-shrink_only.jpg"));
/// assert_eq!(variant.rel_path, format!(
///     "{}/{}/{}",
///     &variant.cache_key[0..2],
///     &variant.cache_key[2..4],
///     variant.cache_key,
/// ));
/// ```
pub fn resolve(
    config: &ThumbnailConfig,
    source_id: i64,
    filename: &str,
    profile_name: &str,
) -> Result<ResolvedVariant> {
    let profile = config.profile(profile_name)?;
    let extension = extension_of(filename)?;

    let digest = format!("{:x}", md5::compute(format!("{}{}", source_id, filename)));
    let mut cache_key = format!("{}-{}", &digest[..12], source_id);
    if let Some(width) = profile.width {
        cache_key.push_str(&format!("-{}", width));
    }
    if let Some(height) = profile.height {
        cache_key.push_str(&format!("x{}", height));
    }
    cache_key.push_str(&format!("-{}.{}", profile.mode, extension));

    // The key is prefixed by hex digits, so both slices are ASCII-safe.
    let rel_path = format!("{}/{}/{}", &cache_key[0..2], &cache_key[2..4], cache_key);

    Ok(ResolvedVariant {
        cache_key,
        rel_path,
        extension: extension.to_string(),
    })
}

fn extension_of(filename: &str) -> Result<&str> {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Ok(ext),
        _ => Err(ThumbCacheError::InvalidFilename(filename.to_string())),
    }
}
