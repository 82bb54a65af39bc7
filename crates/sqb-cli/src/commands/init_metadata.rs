//! Seed the artifact tree: default metadata and gray RGB for every square.
//!
//! Run once before the first pipeline run so downstream consumers always
//! find a document for every square, personalized or not.

use anyhow::{Context, Result};
use sqb_publish::{publish_all, FsPublisher};
use sqb_schemas::{ResolvedSquare, SquareId};
use tracing::info;

use crate::config::Config;

pub async fn init_metadata(cfg: &Config) -> Result<()> {
    let publisher = FsPublisher::new(&cfg.build_dir, &cfg.image_base_url, &cfg.external_base_url)
        .with_placeholder_description("Available for sale");
    publisher.ensure_dirs().context("create artifact directories")?;

    let squares: Vec<ResolvedSquare> =
        SquareId::all().map(ResolvedSquare::unpersonalized).collect();
    let published = publish_all(&publisher, &squares, cfg.publish_concurrency)
        .await
        .context("publish default artifacts")?;

    info!(published, "default metadata written");
    Ok(())
}
