//! Error types for thumbnail cache operations

use std::path::PathBuf;

use thiserror::Error;

/// Result type for thumbnail cache operations
pub type Result<T> = std::result::Result<T, ThumbCacheError>;

/// Thumbnail cache errors
///
/// `UnknownProfile` and `InvalidFilename` are caller errors and are reported
/// before any storage is touched. The remaining variants surface runtime
/// failures; none of them leaves a partially written cache entry behind.
#[derive(Debug, Error)]
pub enum ThumbCacheError {
    /// Requested size profile is not present in the configured profile table
    #[error("unknown size profile: {0}")]
    UnknownProfile(String),

    /// Source filename carries no extension after its last `.`
    #[error("filename {0:?} has no extension")]
    InvalidFilename(String),

    /// Source image missing from the source directory at materialization time
    #[error("source image not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Source bytes are not a decodable image
    #[error("failed to decode source image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Source extension selects no encodable output format
    #[error("unsupported thumbnail format: {0}")]
    UnsupportedFormat(String),

    /// Transformed image could not be encoded
    #[error("failed to encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),

    /// Shard directory creation or atomic publication failed
    #[error("storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Blocking image task aborted before completing
    #[error("thumbnail task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
