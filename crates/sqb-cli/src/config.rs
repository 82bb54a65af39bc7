use anyhow::{Context, Result};
use ethers::core::types::Address;
use serde::Deserialize;
use sqb_chain::EthChainConfig;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Operator configuration, one JSON document.
///
/// Only the provider endpoint and the on-chain coordinates are required;
/// everything else has a default. Keys are camelCase to match the rest of
/// the deployment's JSON surfaces.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// JSON-RPC endpoint URL.
    pub provider: String,
    /// Main squares contract.
    pub squares_address: Address,
    /// Underlay contract.
    pub underlay_address: Address,
    /// Account whose outgoing transfers are first sales.
    pub issuer_address: Address,
    /// Block the main contract was deployed at; genesis checkpoint value.
    pub deployment_block: u64,

    /// Most-recent blocks excluded from processing (reorg hazard).
    #[serde(default = "default_settle_blocks")]
    pub settle_blocks: u64,
    /// Ceiling on blocks processed per run.
    #[serde(default = "default_max_blocks_per_run")]
    pub max_blocks_per_run: u64,
    /// Per-RPC-call timeout in seconds.
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
    /// Worker pool width for accessor reads.
    #[serde(default = "default_read_concurrency")]
    pub read_concurrency: usize,
    /// Worker pool width for artifact publishing.
    #[serde(default = "default_publish_concurrency")]
    pub publish_concurrency: usize,
    /// Root for the checkpoint and published artifacts.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    /// Base URL of the published square images.
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    /// Base URL of the per-square pages.
    #[serde(default = "default_external_base_url")]
    pub external_base_url: String,
}

fn default_settle_blocks() -> u64 {
    10
}

fn default_max_blocks_per_run() -> u64 {
    1_000_000
}

fn default_rpc_timeout_secs() -> u64 {
    30
}

fn default_read_concurrency() -> usize {
    8
}

fn default_publish_concurrency() -> usize {
    8
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("./build")
}

fn default_image_base_url() -> String {
    "https://tenthousandsu.com/erc721".to_string()
}

fn default_external_base_url() -> String {
    "https://tenthousandsu.com/square".to_string()
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        let cfg: Config =
            serde_json::from_str(&raw).with_context(|| format!("invalid config file: {path}"))?;
        Ok(cfg)
    }

    pub fn chain_config(&self) -> EthChainConfig {
        EthChainConfig {
            provider_url: self.provider.clone(),
            squares_address: self.squares_address,
            underlay_address: self.underlay_address,
            issuer_address: self.issuer_address,
            rpc_timeout: Duration::from_secs(self.rpc_timeout_secs),
        }
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.build_dir.join("checkpoint.json")
    }
}
