use crate::source::{ChainError, ChainSource};
use async_trait::async_trait;
use ethers::contract::{abigen, ContractError};
use ethers::core::types::{Address, H256, U256};
use ethers::providers::{Http, Middleware, Provider};
use sqb_schemas::{
    BlockRange, PersonalizedEvent, PixelData, SoldEvent, SquareId, SquareRead, UnderlayEvent,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

abigen!(
    SquaresContract,
    r#"[
        function suSquares(uint256 squareNumber) view returns (uint256, bytes, string, string)
        event Personalized(uint256 squareNumber)
        event Transfer(address indexed from, address indexed to, uint256 indexed squareNumber)
    ]"#
);

abigen!(
    UnderlayContract,
    r#"[
        event PersonalizedUnderlay(uint256 indexed squareNumber, bytes rgbData, string title, string href)
    ]"#
);

/// Connection parameters for [`EthChainSource`].
#[derive(Clone, Debug)]
pub struct EthChainConfig {
    pub provider_url: String,
    pub squares_address: Address,
    pub underlay_address: Address,
    /// First sales are `Transfer` events whose `from` is this account.
    pub issuer_address: Address,
    /// Externally supplied budget applied to every RPC call.
    pub rpc_timeout: Duration,
}

/// JSON-RPC [`ChainSource`] over the two contracts.
pub struct EthChainSource {
    provider: Arc<Provider<Http>>,
    squares: SquaresContract<Provider<Http>>,
    underlay: UnderlayContract<Provider<Http>>,
    issuer: Address,
    rpc_timeout: Duration,
}

impl EthChainSource {
    pub fn connect(config: &EthChainConfig) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(config.provider_url.as_str())
            .map_err(|e| ChainError::Endpoint(format!("{}: {e}", config.provider_url)))?;
        let provider = Arc::new(provider);
        let squares = SquaresContract::new(config.squares_address, Arc::clone(&provider));
        let underlay = UnderlayContract::new(config.underlay_address, Arc::clone(&provider));
        Ok(Self {
            provider,
            squares,
            underlay,
            issuer: config.issuer_address,
            rpc_timeout: config.rpc_timeout,
        })
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, ChainError>>,
    ) -> Result<T, ChainError> {
        match timeout(self.rpc_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout { secs: self.rpc_timeout.as_secs() }),
        }
    }
}

#[async_trait]
impl ChainSource for EthChainSource {
    async fn latest_block(&self) -> Result<u64, ChainError> {
        let number = self
            .bounded(async {
                self.provider
                    .get_block_number()
                    .await
                    .map_err(|e| ChainError::Transport(e.to_string()))
            })
            .await?;
        Ok(number.as_u64())
    }

    async fn sold_events(&self, range: BlockRange) -> Result<Vec<SoldEvent>, ChainError> {
        let query = self
            .squares
            .transfer_filter()
            .topic1(H256::from(self.issuer))
            .from_block(range.from)
            .to_block(range.to);
        let logs = self
            .bounded(async { query.query_with_meta().await.map_err(contract_error) })
            .await?;

        let mut events = Vec::with_capacity(logs.len());
        for (ev, meta) in logs {
            events.push(SoldEvent {
                square: decode_square_id(ev.square_number)?,
                block: meta.block_number.as_u64(),
                log_index: u256_to_u64(meta.log_index, "log index")?,
            });
        }
        Ok(events)
    }

    async fn personalized_events(
        &self,
        range: BlockRange,
    ) -> Result<Vec<PersonalizedEvent>, ChainError> {
        let query = self
            .squares
            .personalized_filter()
            .from_block(range.from)
            .to_block(range.to);
        let logs = self
            .bounded(async { query.query_with_meta().await.map_err(contract_error) })
            .await?;

        let mut events = Vec::with_capacity(logs.len());
        for (ev, meta) in logs {
            events.push(PersonalizedEvent {
                square: decode_square_id(ev.square_number)?,
                block: meta.block_number.as_u64(),
                log_index: u256_to_u64(meta.log_index, "log index")?,
            });
        }
        Ok(events)
    }

    async fn underlay_events(&self, range: BlockRange) -> Result<Vec<UnderlayEvent>, ChainError> {
        let query = self
            .underlay
            .personalized_underlay_filter()
            .from_block(range.from)
            .to_block(range.to);
        let logs = self
            .bounded(async { query.query_with_meta().await.map_err(contract_error) })
            .await?;

        let mut events = Vec::with_capacity(logs.len());
        for (ev, meta) in logs {
            let square = decode_square_id(ev.square_number)?;
            let pixel_data = PixelData::from_slice(&ev.rgb_data)
                .map_err(|e| ChainError::Decode(format!("underlay square {square}: {e}")))?;
            events.push(UnderlayEvent {
                square,
                block: meta.block_number.as_u64(),
                log_index: u256_to_u64(meta.log_index, "log index")?,
                title: ev.title,
                href: ev.href,
                pixel_data,
            });
        }
        Ok(events)
    }

    async fn read_square(&self, square: SquareId) -> Result<SquareRead, ChainError> {
        let call = self.squares.su_squares(U256::from(square.get()));
        let (version, rgb_data, title, href) = self
            .bounded(async { call.call().await.map_err(contract_error) })
            .await?;
        let pixel_data = PixelData::from_slice(&rgb_data)
            .map_err(|e| ChainError::Decode(format!("square {square}: {e}")))?;
        Ok(SquareRead {
            version: u256_to_u64(version, "version")?,
            title,
            href,
            pixel_data,
        })
    }
}

fn contract_error<M: Middleware>(err: ContractError<M>) -> ChainError {
    match err {
        ContractError::DecodingError(e) => ChainError::Decode(e.to_string()),
        ContractError::DetokenizationError(e) => ChainError::Decode(e.to_string()),
        other => ChainError::Transport(other.to_string()),
    }
}

fn u256_to_u64(value: U256, what: &str) -> Result<u64, ChainError> {
    if value > U256::from(u64::MAX) {
        return Err(ChainError::Decode(format!("{what} out of range: {value}")));
    }
    Ok(value.as_u64())
}

fn decode_square_id(raw: U256) -> Result<SquareId, ChainError> {
    let n = u256_to_u64(raw, "square number")?;
    SquareId::new(n).map_err(|e| ChainError::Decode(e.to_string()))
}
