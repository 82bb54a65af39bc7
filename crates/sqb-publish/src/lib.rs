//! Artifact publisher boundary.
//!
//! The reconciliation engine resolves what each touched square displays;
//! this crate turns those resolved records into published artifacts. The
//! filesystem implementation emits the two non-raster artifacts: an
//! ERC-721 metadata document and the raw 300-byte RGB buffer per square.
//! SVG/PNG rendering and master-canvas compositing live outside this
//! pipeline and consume these artifacts.
//!
//! [`publish_all`] fans out over the touched squares through a bounded
//! worker pool and joins on every publish before returning, so the caller
//! can only advance the checkpoint once all artifacts are durable.

mod metadata;

use async_trait::async_trait;
use futures_util::stream::{self, TryStreamExt};
use sqb_schemas::ResolvedSquare;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use metadata::SquareMetadata;

/// Artifact emission failure. Aborts the run before the checkpoint moves.
#[derive(Debug)]
pub enum PublishError {
    Io { path: PathBuf, source: std::io::Error },
    Serialize(serde_json::Error),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::Io { path, source } => {
                write!(f, "artifact write failed: {}: {source}", path.display())
            }
            PublishError::Serialize(e) => write!(f, "metadata serialize failed: {e}"),
        }
    }
}

impl std::error::Error for PublishError {}

/// Sink for resolved per-square state.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, square: &ResolvedSquare) -> Result<(), PublishError>;
}

/// Publish every resolved square through a bounded worker pool.
///
/// Joins on all publishes before returning; the first error wins and the
/// caller must not advance the checkpoint. Returns the number of squares
/// published.
pub async fn publish_all<P: Publisher + ?Sized>(
    publisher: &P,
    squares: &[ResolvedSquare],
    concurrency: usize,
) -> Result<usize, PublishError> {
    stream::iter(squares.iter().map(Ok::<_, PublishError>))
        .try_for_each_concurrent(concurrency.max(1), |square| publisher.publish(square))
        .await?;
    debug!(published = squares.len(), "artifacts published");
    Ok(squares.len())
}

/// Filesystem publisher: `metadata/#####.json` + `squares-rgb/#####.rgb`
/// under the build directory.
pub struct FsPublisher {
    metadata_dir: PathBuf,
    rgb_dir: PathBuf,
    image_base_url: String,
    external_base_url: String,
    /// Description used in place of an empty title, if configured.
    placeholder_description: Option<String>,
}

impl FsPublisher {
    pub fn new(
        build_dir: &Path,
        image_base_url: impl Into<String>,
        external_base_url: impl Into<String>,
    ) -> Self {
        Self {
            metadata_dir: build_dir.join("metadata"),
            rgb_dir: build_dir.join("squares-rgb"),
            image_base_url: image_base_url.into(),
            external_base_url: external_base_url.into(),
            placeholder_description: None,
        }
    }

    /// Use `text` as the metadata description for squares with no title
    /// (the "Available for sale" default of the empty board).
    pub fn with_placeholder_description(mut self, text: impl Into<String>) -> Self {
        self.placeholder_description = Some(text.into());
        self
    }

    /// Create the artifact directories. Call once before publishing.
    pub fn ensure_dirs(&self) -> Result<(), PublishError> {
        for dir in [&self.metadata_dir, &self.rgb_dir] {
            std::fs::create_dir_all(dir).map_err(|source| PublishError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn description_for(&self, square: &ResolvedSquare) -> String {
        if square.title.is_empty() {
            if let Some(placeholder) = &self.placeholder_description {
                return placeholder.clone();
            }
        }
        square.title.clone()
    }
}

#[async_trait]
impl Publisher for FsPublisher {
    async fn publish(&self, square: &ResolvedSquare) -> Result<(), PublishError> {
        let padded = square.id.padded();

        let metadata = SquareMetadata::build(
            square.id,
            self.description_for(square),
            &self.image_base_url,
            &self.external_base_url,
        );
        let json = serde_json::to_string(&metadata).map_err(PublishError::Serialize)?;

        let metadata_path = self.metadata_dir.join(format!("{padded}.json"));
        tokio::fs::write(&metadata_path, json)
            .await
            .map_err(|source| PublishError::Io { path: metadata_path, source })?;

        let rgb_path = self.rgb_dir.join(format!("{padded}.rgb"));
        tokio::fs::write(&rgb_path, square.pixel_data.as_bytes())
            .await
            .map_err(|source| PublishError::Io { path: rgb_path, source })?;

        Ok(())
    }
}
