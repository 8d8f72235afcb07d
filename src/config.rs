//! Configuration for the thumbnail cache
//!
//! All tunables live in one place: where source images are read from, where
//! cache artifacts are published, which public URL prefix serves them, and
//! the named size profiles callers may request.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Result, ThumbCacheError};

fn default_jpeg_quality() -> u8 {
    85
}

/// How a source image is mapped into the target box of a size profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Scale proportionally until the image fits inside the box
    Fit,
    /// Scale to the exact box dimensions, ignoring aspect ratio
    Exact,
    /// Alias of `Exact`, kept as a distinct profile flag
    Stretch,
    /// Like `Fit`, but never scales up a smaller source
    ShrinkOnly,
    /// Scale proportionally to cover the box, cropping the overflow
    Fill,
    /// Shrink to fit, then composite centered on a white canvas of box size
    Centered,
}

impl ResizeMode {
    /// Stable lowercase name, used as the mode token inside cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeMode::Fit => "fit",
            ResizeMode::Exact => "exact",
            ResizeMode::Stretch => "stretch",
            ResizeMode::ShrinkOnly => "shrink_only",
            ResizeMode::Fill => "fill",
            ResizeMode::Centered => "centered",
        }
    }
}

impl std::fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named thumbnail size
///
/// Either dimension may be omitted; the missing one is derived from the
/// source aspect ratio at render time and never appears in the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SizeProfile {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub mode: ResizeMode,
}

impl SizeProfile {
    pub fn new(width: Option<u32>, height: Option<u32>, mode: ResizeMode) -> Self {
        Self {
            width,
            height,
            mode,
        }
    }
}

/// Thumbnail cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailConfig {
    /// Directory holding the original images
    pub source_dir: PathBuf,
    /// Directory the sharded cache tree is published under
    pub cache_dir: PathBuf,
    /// Public URL prefix mapped to `cache_dir` by the web server
    pub cache_url: String,
    /// JPEG encode quality, 1-100
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Named size profiles callers may request
    #[serde(default)]
    pub profiles: HashMap<String, SizeProfile>,
}

impl ThumbnailConfig {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        cache_url: impl Into<String>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            cache_dir: cache_dir.into(),
            cache_url: cache_url.into(),
            jpeg_quality: default_jpeg_quality(),
            profiles: HashMap::new(),
        }
    }

    /// Register a named size profile
    pub fn with_profile(mut self, name: impl Into<String>, profile: SizeProfile) -> Self {
        self.profiles.insert(name.into(), profile);
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&SizeProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ThumbCacheError::UnknownProfile(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "source_dir": "/var/app/assets",
            "cache_dir": "/var/app/cache",
            "cache_url": "https://cdn.example.com/cache",
            "profiles": {
                "list": { "width": 100, "height": 100, "mode": "shrink_only" },
                "detail": { "width": 640, "mode": "fit" }
            }
        }"#;

        let config: ThumbnailConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.profiles.len(), 2);

        let list = config.profile("list").unwrap();
        assert_eq!(list.width, Some(100));
        assert_eq!(list.mode, ResizeMode::ShrinkOnly);

        let detail = config.profile("detail").unwrap();
        assert_eq!(detail.height, None);
        assert_eq!(detail.mode, ResizeMode::Fit);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let json = r#"{ "width": 100, "mode": "zoom" }"#;
        assert!(serde_json::from_str::<SizeProfile>(json).is_err());
    }

    #[test]
    fn test_unknown_profile_lookup() {
        let config = ThumbnailConfig::new("/src", "/cache", "http://localhost/cache");
        let err = config.profile("missing").unwrap_err();
        assert_eq!(err.to_string(), "unknown size profile: missing");
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(ResizeMode::Fit.as_str(), "fit");
        assert_eq!(ResizeMode::ShrinkOnly.as_str(), "shrink_only");
        assert_eq!(ResizeMode::Centered.to_string(), "centered");
    }

    #[test]
    fn test_builder() {
        let config = ThumbnailConfig::new("/src", "/cache", "http://localhost/cache")
            .with_jpeg_quality(92)
            .with_profile("avatar", SizeProfile::new(Some(48), Some(48), ResizeMode::Fill));

        assert_eq!(config.jpeg_quality, 92);
        assert!(config.profile("avatar").is_ok());
    }
}
