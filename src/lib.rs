//! On-demand image thumbnail cache
//!
//! Maps `(source_id, filename, profile)` requests onto a sharded tree of
//! resized image variants. A variant is materialized lazily on its first
//! request and published atomically; every later request is served straight
//! from the cache. Resolution is deterministic, so paths and URLs can be
//! computed anywhere without coordination.
//!
//! # Example
//!
//! ```no_run
//! use thumb_cache::{ResizeMode, SizeProfile, ThumbnailConfig, ThumbnailService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ThumbnailConfig::new(
//!         "/var/app/assets",
//!         "/var/app/cache",
//!         "https://cdn.example.com/cache",
//!     )
//!     .with_profile("list", SizeProfile::new(Some(100), Some(100), ResizeMode::ShrinkOnly))
//!     .with_profile("detail", SizeProfile::new(Some(640), None, ResizeMode::Fit));
//!
//!     let service = ThumbnailService::new(config);
//!
//!     let url = service.get_thumbnail_url(42, "photo.jpg", "list").await?;
//!     println!("{}", url);
//!     Ok(())
//! }
//! ```
//!
//! # Limitations
//!
//! Cache keys derive from the source id and filename, never from file
//! content. Replacing a source image in place leaves already materialized
//! variants stale; publish changed images under a new filename or id to get
//! fresh thumbnails.

pub mod config;
pub mod error;
pub mod processor;
pub mod service;
pub mod store;
pub mod variant;

pub use config::{ResizeMode, SizeProfile, ThumbnailConfig};
pub use error::{Result, ThumbCacheError};
pub use processor::RenderedThumbnail;
pub use service::ThumbnailService;
pub use store::CacheStore;
pub use variant::{resolve, ResolvedVariant};
