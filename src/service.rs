//! Thumbnail service
//!
//! The read-through entry point: resolve the requested variant, serve it if
//! already published, otherwise decode the source, apply the profile, encode
//! and publish atomically. Requests for the same variant are free to race;
//! they all converge on the same artifact.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::ThumbnailConfig;
use crate::error::{Result, ThumbCacheError};
use crate::processor;
use crate::store::CacheStore;
use crate::variant::{self, ResolvedVariant};

/// On-demand thumbnail cache
pub struct ThumbnailService {
    config: ThumbnailConfig,
    store: CacheStore,
}

impl ThumbnailService {
    pub fn new(config: ThumbnailConfig) -> Self {
        info!(
            source_dir = %config.source_dir.display(),
            cache_dir = %config.cache_dir.display(),
            profiles = config.profiles.len(),
            "Thumbnail service initialized"
        );
        let store = CacheStore::new(&config.cache_dir);
        Self { config, store }
    }

    /// Filesystem path of a thumbnail, materializing it on first request
    pub async fn get_thumbnail_path(
        &self,
        source_id: i64,
        filename: &str,
        profile_name: &str,
    ) -> Result<PathBuf> {
        let variant = self.get_thumbnail(source_id, filename, profile_name).await?;
        Ok(self.store.path_for(&variant.rel_path))
    }

    /// Public URL of a thumbnail, materializing it on first request
    pub async fn get_thumbnail_url(
        &self,
        source_id: i64,
        filename: &str,
        profile_name: &str,
    ) -> Result<String> {
        let variant = self.get_thumbnail(source_id, filename, profile_name).await?;
        Ok(format!(
            "{}/{}",
            self.config.cache_url.trim_end_matches('/'),
            variant.rel_path
        ))
    }

    async fn get_thumbnail(
        &self,
        source_id: i64,
        filename: &str,
        profile_name: &str,
    ) -> Result<ResolvedVariant> {
        let variant = variant::resolve(&self.config, source_id, filename, profile_name)?;

        if self.store.exists(&variant.rel_path).await {
            debug!(cache_key = %variant.cache_key, "Thumbnail cache hit");
            return Ok(variant);
        }

        debug!(
            cache_key = %variant.cache_key,
            profile = profile_name,
            "Thumbnail cache miss"
        );
        self.generate(source_id, filename, profile_name, &variant)
            .await?;

        Ok(variant)
    }

    async fn generate(
        &self,
        source_id: i64,
        filename: &str,
        profile_name: &str,
        variant: &ResolvedVariant,
    ) -> Result<()> {
        let source_path = self.config.source_dir.join(filename);
        let bytes = tokio::fs::read(&source_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ThumbCacheError::SourceNotFound(source_path.clone())
            } else {
                ThumbCacheError::Storage {
                    path: source_path.clone(),
                    source: e,
                }
            }
        })?;

        let profile = *self.config.profile(profile_name)?;
        let extension = variant.extension.clone();
        let quality = self.config.jpeg_quality;
        let decode_path = source_path.clone();

        let rendered = tokio::task::spawn_blocking(move || {
            let img = image::load_from_memory(&bytes).map_err(|e| ThumbCacheError::Decode {
                path: decode_path,
                source: e,
            })?;
            let rendered = processor::render(&img, &profile);
            processor::encode(&rendered, &extension, quality)
        })
        .await??;

        let size = rendered.data.len();
        self.store.publish(&variant.rel_path, rendered.data).await?;

        info!(
            source_id,
            cache_key = %variant.cache_key,
            width = rendered.width,
            height = rendered.height,
            size,
            "Thumbnail generated"
        );

        Ok(())
    }
}
