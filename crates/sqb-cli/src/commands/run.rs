//! The pipeline run: fetch → admission-check → reconcile → publish →
//! checkpoint.
//!
//! Strictly sequential; every failure returns before the checkpoint is
//! saved, so the same block range is safe to retry in full.

use anyhow::{bail, Context, Result};
use sqb_chain::{fetch_batch, read_touched_squares, ChainSource, EthChainSource};
use sqb_publish::{publish_all, FsPublisher};
use sqb_reconcile::{check_admission, reconcile, BatchAdmission};
use sqb_schemas::BlockRange;
use sqb_store::CheckpointStore;
use tracing::info;

use crate::config::Config;

pub async fn run(cfg: &Config, blocks_override: Option<u64>) -> Result<()> {
    let store = CheckpointStore::new(cfg.checkpoint_path());
    let (mut checkpoint, mut table) =
        store.load(cfg.deployment_block).context("load checkpoint")?;

    let chain = EthChainSource::connect(&cfg.chain_config()).context("connect provider")?;

    let latest = chain.latest_block().await.context("query chain tip")?;
    let settled = latest.saturating_sub(cfg.settle_blocks);
    let max_blocks = blocks_override.unwrap_or(cfg.max_blocks_per_run);

    let range = match BlockRange::next_run(checkpoint.last_processed_block, settled, max_blocks) {
        Some(range) => range,
        None => {
            info!(
                last_processed = checkpoint.last_processed_block,
                settled, "no settled blocks to process"
            );
            return Ok(());
        }
    };
    info!(from = range.from, to = range.to, latest, "processing block range");

    let batch = fetch_batch(&chain, range).await.context("fetch events")?;

    match check_admission(&batch) {
        BatchAdmission::Admitted => {}
        BatchAdmission::Rejected { personalized, ceiling } => {
            bail!(
                "{personalized} personalized events exceed the per-run ceiling of {ceiling}; \
                 retry with a narrower --blocks range"
            );
        }
    }

    let touched = batch.personalized_squares();
    let reads = read_touched_squares(&chain, &touched, cfg.read_concurrency)
        .await
        .context("read authoritative square state")?;

    let report = reconcile(&mut table, &batch, &reads).context("reconcile batch")?;
    info!(
        sold = report.sold_applied,
        underlay = report.underlay_applied,
        personalized = report.personalized_applied,
        touched = report.touched.len(),
        "reconciled"
    );

    let publisher = FsPublisher::new(&cfg.build_dir, &cfg.image_base_url, &cfg.external_base_url);
    publisher.ensure_dirs().context("create artifact directories")?;
    // Join barrier: the checkpoint below must not move until every artifact
    // for this run is on disk.
    publish_all(&publisher, &report.touched, cfg.publish_concurrency)
        .await
        .context("publish artifacts")?;

    checkpoint.last_processed_block = range.to;
    store.save(checkpoint, &table).context("save checkpoint")?;
    info!(last_processed = range.to, "run complete");

    Ok(())
}
