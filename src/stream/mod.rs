//! Block/event stream adapter (§4.5, §6). `BlockStream` abstracts the
//! upstream StarkNet stream so the runtime (C5) can be driven against an
//! in-memory fake in tests; [`fake`] holds that implementation.

use async_trait::async_trait;

use crate::errors::IndexerError;
use crate::events::RawEvent;
use crate::value::FieldElement;

#[cfg(test)]
pub mod fake;
pub mod http;

pub use http::HttpBlockStream;

#[derive(Debug, Clone)]
pub struct BlockHeader {
    pub number: i64,
    pub hash: FieldElement,
    pub parent_hash: FieldElement,
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct StreamedBlock {
    pub header: BlockHeader,
    pub events: Vec<RawEvent>,
}

/// One block (or event-filter) at a time, matching this system's delivery
/// model (§4.5) — unlike the teacher's multi-block HyperSync batches, there
/// is no batching here to decouple processing from checkpointing.
#[async_trait]
pub trait BlockStream: Send + Sync {
    /// Blocks until the next finalized block is available, or returns
    /// `Ok(None)` on a clean upstream disconnect (the runtime reconnects).
    async fn next_block(&mut self) -> Result<Option<StreamedBlock>, IndexerError>;

    /// Widens the subscription to also deliver Transfer/Swap/Sync/Mint/Burn
    /// events from a newly discovered pair contract (§4.6 `PairCreated`).
    fn subscribe_pair(&mut self, pair_address: &FieldElement);

    /// Resets the stream's cursor to `from_block`, discarding any stored
    /// checkpoint (the `--restart` CLI flag, §6).
    async fn reset_cursor(&mut self, from_block: i64) -> Result<(), IndexerError>;
}
