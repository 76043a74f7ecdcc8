//! Entity event handlers (C6): one module per event kind, each grounded in
//! the corresponding handler in the system this indexer replaces. [`dispatch`]
//! is the single entry point the runtime (C5) calls per decoded event.

pub mod context;
mod burn;
mod liquidity;
mod lookups;
mod mint;
mod pair_created;
pub mod rollup;
mod sync;
mod transfer;
mod swap;

pub use context::{BlockCtx, HandlerEnv};

use crate::errors::IndexerError;
use crate::events::DecodedEvent;
use crate::value::FieldElement;

/// Dispatches one decoded event to its handler. `from_address` is the
/// contract that emitted the event: the factory for `PairCreated`, the pair
/// for everything else.
pub async fn dispatch(
    env: &HandlerEnv<'_>,
    block: &BlockCtx,
    from_address: &FieldElement,
    tx_hash: &FieldElement,
    log_index: i64,
    event: &DecodedEvent,
) -> Result<(), IndexerError> {
    match event {
        DecodedEvent::PairCreated(e) => pair_created::handle(env, block, from_address, e).await,
        DecodedEvent::Transfer(e) => transfer::handle(env, block, from_address, tx_hash, e).await,
        DecodedEvent::Sync(e) => sync::handle(env, block, from_address, e).await,
        DecodedEvent::Mint(e) => mint::handle(env, block, from_address, tx_hash, e).await,
        DecodedEvent::Burn(e) => burn::handle(env, block, from_address, tx_hash, e).await,
        DecodedEvent::Swap(e) => swap::handle(env, block, from_address, tx_hash, log_index, e).await,
    }
}
