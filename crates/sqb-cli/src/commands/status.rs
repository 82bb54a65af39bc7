use anyhow::{Context, Result};
use sqb_store::CheckpointStore;

use crate::config::Config;

pub fn status(cfg: &Config) -> Result<()> {
    let store = CheckpointStore::new(cfg.checkpoint_path());
    let (checkpoint, table) = store.load(cfg.deployment_block).context("load checkpoint")?;

    println!("checkpoint={}", store.path().display());
    println!("last_processed_block={}", checkpoint.last_processed_block);
    println!("personalized_squares={}", table.personalized_count());
    println!("underlay_personalizations={}", table.underlay_count());
    println!("underlay_visible={}", table.visible_count());

    Ok(())
}
