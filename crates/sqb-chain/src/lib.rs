//! Chain boundary for the Square Board pipeline.
//!
//! [`ChainSource`] is the contract the core calls: the latest block number,
//! the three filtered event queries, and the authoritative per-square read
//! accessor. [`fetch_batch`] and [`read_touched_squares`] drive a source
//! with the run's concurrency rules; [`EthChainSource`] is the JSON-RPC
//! implementation.
//!
//! Every failure here aborts the run before any state mutation, so any
//! block range is safe to retry in full.

mod eth;
mod fetch;
mod source;

pub use eth::{EthChainConfig, EthChainSource};
pub use fetch::{fetch_batch, read_touched_squares};
pub use source::{ChainError, ChainSource};
