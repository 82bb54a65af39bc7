use async_trait::async_trait;
use sqb_schemas::{BlockRange, PersonalizedEvent, SoldEvent, SquareId, SquareRead, UnderlayEvent};
use std::fmt;

/// Errors a [`ChainSource`] implementation may return.
#[derive(Debug)]
pub enum ChainError {
    /// The endpoint configuration is unusable (bad URL, bad address).
    Endpoint(String),
    /// Network or RPC transport failure. Transient; retry the full range.
    Transport(String),
    /// A log or return value did not decode against the expected ABI.
    /// Implies ABI drift; fatal, surface to the operator.
    Decode(String),
    /// The externally supplied per-call time budget was exceeded.
    Timeout { secs: u64 },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Endpoint(msg) => write!(f, "endpoint error: {msg}"),
            ChainError::Transport(msg) => write!(f, "transport error: {msg}"),
            ChainError::Decode(msg) => write!(f, "decode error: {msg}"),
            ChainError::Timeout { secs } => write!(f, "rpc call timed out after {secs}s"),
        }
    }
}

impl std::error::Error for ChainError {}

/// Read-only view of the two contracts' logs and the main contract's
/// per-square accessor.
///
/// Implementations must be `Send + Sync` so the three event queries can be
/// issued concurrently, and must return events exactly as logged: callers
/// own sorting and deduplication.
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Current chain tip. Callers subtract the settle buffer themselves.
    async fn latest_block(&self) -> Result<u64, ChainError>;

    /// Transfers out of the issuer account within `range`, i.e. first sales.
    async fn sold_events(&self, range: BlockRange) -> Result<Vec<SoldEvent>, ChainError>;

    /// Main-contract personalization change signals within `range`.
    async fn personalized_events(
        &self,
        range: BlockRange,
    ) -> Result<Vec<PersonalizedEvent>, ChainError>;

    /// Underlay personalizations within `range`, payload included.
    async fn underlay_events(&self, range: BlockRange) -> Result<Vec<UnderlayEvent>, ChainError>;

    /// Latest on-chain (version, pixels, title, href) for one square.
    async fn read_square(&self, square: SquareId) -> Result<SquareRead, ChainError>;
}
