use crate::source::{ChainError, ChainSource};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use sqb_schemas::{BlockRange, EventBatch, SquareId, SquareReads};
use std::collections::BTreeSet;
use tracing::debug;

/// Fetch the three event sequences for one run.
///
/// The sub-queries are independent and read-only, so they run concurrently,
/// a latency optimization only. The batch is normalized into per-type
/// ascending (block, log index) order before it is returned, so nothing
/// downstream ever sees the incidental arrival order.
pub async fn fetch_batch(
    source: &dyn ChainSource,
    range: BlockRange,
) -> Result<EventBatch, ChainError> {
    let (sold, personalized, underlay) = tokio::try_join!(
        source.sold_events(range),
        source.personalized_events(range),
        source.underlay_events(range),
    )?;
    debug!(
        sold = sold.len(),
        personalized = personalized.len(),
        underlay = underlay.len(),
        from = range.from,
        to = range.to,
        "fetched event batch"
    );
    let mut batch = EventBatch { sold, underlay, personalized };
    batch.normalize();
    Ok(batch)
}

/// Prefetch the authoritative accessor read for each square, with bounded
/// concurrency.
///
/// One read per distinct square: the accessor returns the latest on-chain
/// value, so several Personalized events for one square all resolve to the
/// same read. The call joins on every read before returning; the engine
/// starts only when all reads are in. Any failed read fails the whole
/// prefetch.
pub async fn read_touched_squares(
    source: &dyn ChainSource,
    squares: &BTreeSet<SquareId>,
    concurrency: usize,
) -> Result<SquareReads, ChainError> {
    let reads: SquareReads = stream::iter(squares.iter().copied())
        .map(|id| async move { source.read_square(id).await.map(|read| (id, read)) })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;
    debug!(reads = reads.len(), "prefetched square reads");
    Ok(reads)
}
