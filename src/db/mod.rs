use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::config::Settings;
use crate::errors::IndexerError;
use crate::value::FieldElement;

pub mod models;
pub mod postgres;

#[cfg(test)]
pub mod fake;

pub use postgres::PostgresClient;

use models::{
    Block, Burn, ExchangeDayData, Factory, LiquidityPosition, LiquidityPositionSnapshot,
    LpContest, LpContestBlock, Mint, Pair, PairBlockCumulativePrice, PairDayData, PairHourData,
    Swap, Token, TokenDayData, Transaction, User,
};

/// Persistence boundary (§4.4, §6). One method per entity-shaped read or
/// write rather than a generic find/insert pair, matching how this codebase
/// puts each access pattern behind its own named call. `PostgresStorage` is
/// the only production implementation; tests use the in-memory `fake`.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn highest_block(&self) -> Result<Option<i64>, IndexerError>;
    async fn put_block(&self, block: &Block) -> Result<(), IndexerError>;
    /// The timestamp of the last known block at or before `number` (§4.9's
    /// cumulative-price series needs inter-block deltas; a handful of block
    /// numbers can be missing from storage if the upstream stream skipped
    /// them, so this resolves to "the closest one at or before", not an
    /// exact match).
    async fn block_timestamp_at_or_before(&self, number: i64) -> Result<Option<i64>, IndexerError>;
    async fn put_transaction(&self, tx: &Transaction) -> Result<(), IndexerError>;
    async fn get_transaction(&self, hash: &FieldElement) -> Result<Option<Transaction>, IndexerError>;

    async fn get_factory(&self, id: &FieldElement) -> Result<Option<Factory>, IndexerError>;
    async fn put_factory(&self, current: Option<&Factory>, next: &Factory) -> Result<(), IndexerError>;

    async fn get_token(&self, id: &FieldElement) -> Result<Option<Token>, IndexerError>;
    async fn put_token(&self, current: Option<&Token>, next: &Token) -> Result<(), IndexerError>;

    async fn get_pair(&self, id: &FieldElement) -> Result<Option<Pair>, IndexerError>;
    /// The version of `id` valid at `block` (§3.1 bitemporal point-in-time
    /// read), used by the LP-contest cumulative-price series (§4.9) which
    /// must price each historical block against the pair state it actually
    /// had then, not the pair's current state.
    async fn get_pair_at(&self, id: &FieldElement, block: i64) -> Result<Option<Pair>, IndexerError>;
    async fn get_pair_by_tokens(
        &self,
        token0: &FieldElement,
        token1: &FieldElement,
    ) -> Result<Option<Pair>, IndexerError>;
    async fn put_pair(&self, current: Option<&Pair>, next: &Pair) -> Result<(), IndexerError>;
    async fn all_pair_ids(&self) -> Result<Vec<FieldElement>, IndexerError>;

    async fn get_user(&self, id: &FieldElement) -> Result<Option<User>, IndexerError>;
    async fn put_user(&self, current: Option<&User>, next: &User) -> Result<(), IndexerError>;

    async fn get_open_mint(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Mint>, IndexerError>;
    /// The most recent mint row for `(pair, tx_hash)` regardless of
    /// completeness, used for index assignment and fee-mint detection (§4.6).
    async fn get_last_mint(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Mint>, IndexerError>;
    async fn put_mint(&self, mint: &Mint) -> Result<(), IndexerError>;
    async fn delete_mint(&self, pair: &FieldElement, tx_hash: &FieldElement, index: i64) -> Result<(), IndexerError>;

    async fn get_open_burn(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Burn>, IndexerError>;
    /// The most recent burn row for `(pair, tx_hash)` regardless of
    /// `needs_complete`, used for index assignment (§4.6).
    async fn get_last_burn(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Burn>, IndexerError>;
    async fn put_burn(&self, burn: &Burn) -> Result<(), IndexerError>;

    async fn put_swap(&self, swap: &Swap) -> Result<(), IndexerError>;

    async fn get_liquidity_position(
        &self,
        pair: &FieldElement,
        user: &FieldElement,
    ) -> Result<Option<LiquidityPosition>, IndexerError>;
    async fn put_liquidity_position(&self, position: &LiquidityPosition) -> Result<(), IndexerError>;
    async fn put_liquidity_snapshot(
        &self,
        snapshot: &LiquidityPositionSnapshot,
    ) -> Result<(), IndexerError>;
    /// Snapshots for one `(pair, user)` at or after `after_block`, ascending.
    async fn liquidity_snapshots(
        &self,
        pair: &FieldElement,
        user: &FieldElement,
        after_block: i64,
    ) -> Result<Vec<LiquidityPositionSnapshot>, IndexerError>;
    /// Every user who has ever held a position in `pair`, paginated.
    async fn liquidity_providers(
        &self,
        pair: &FieldElement,
        after: Option<FieldElement>,
        limit: i64,
    ) -> Result<Vec<FieldElement>, IndexerError>;

    async fn put_exchange_day_data(&self, row: &ExchangeDayData) -> Result<(), IndexerError>;
    async fn get_exchange_day_data(&self, day_id: i64) -> Result<Option<ExchangeDayData>, IndexerError>;
    async fn put_pair_day_data(&self, row: &PairDayData) -> Result<(), IndexerError>;
    async fn get_pair_day_data(
        &self,
        pair: &FieldElement,
        day_id: i64,
    ) -> Result<Option<PairDayData>, IndexerError>;
    async fn put_pair_hour_data(&self, row: &PairHourData) -> Result<(), IndexerError>;
    async fn get_pair_hour_data(
        &self,
        pair: &FieldElement,
        hour_id: i64,
    ) -> Result<Option<PairHourData>, IndexerError>;
    async fn put_token_day_data(&self, row: &TokenDayData) -> Result<(), IndexerError>;
    async fn get_token_day_data(
        &self,
        token: &FieldElement,
        day_id: i64,
    ) -> Result<Option<TokenDayData>, IndexerError>;

    async fn put_cumulative_price(&self, row: &PairBlockCumulativePrice) -> Result<(), IndexerError>;
    async fn last_cumulative_price(
        &self,
        pair: &FieldElement,
    ) -> Result<Option<PairBlockCumulativePrice>, IndexerError>;
    async fn cumulative_price_at_or_before(
        &self,
        pair: &FieldElement,
        block: i64,
    ) -> Result<Option<PairBlockCumulativePrice>, IndexerError>;

    async fn get_lp_contest(&self, user: &FieldElement) -> Result<Option<LpContest>, IndexerError>;
    async fn put_lp_contest(&self, contest: &LpContest) -> Result<(), IndexerError>;
    async fn put_lp_contest_block(&self, block: &LpContestBlock) -> Result<(), IndexerError>;
    /// Users who have ever provided liquidity to an eligible pair, paginated
    /// in a stable order for resumable fan-out (§4.9).
    async fn contest_candidate_users(
        &self,
        after: Option<FieldElement>,
        limit: i64,
    ) -> Result<Vec<FieldElement>, IndexerError>;

    /// Contest high-water mark: the last block the scheduler fully drained.
    async fn get_contest_checkpoint(&self) -> Result<Option<i64>, IndexerError>;
    async fn put_contest_checkpoint(&self, block: i64) -> Result<(), IndexerError>;

    /// Every currently-eligible contest standing, for the ranking/percentile
    /// pipeline and NFT-tier computation (§4.10). Unordered; callers sort.
    async fn list_eligible_contestants(&self) -> Result<Vec<LpContest>, IndexerError>;
}

/// Top-level storage handle: a connection pool plus migration bootstrapping.
#[derive(Clone)]
pub struct Database {
    pub postgres: Arc<PostgresClient>,
}

impl Database {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let postgres_settings = settings
            .require_postgres()
            .map_err(|e| anyhow::anyhow!(e))?
            .clone();
        let postgres = PostgresClient::new(postgres_settings).await?;
        postgres.migrate().await?;
        info!("storage ready");
        Ok(Self {
            postgres: Arc::new(postgres),
        })
    }
}
