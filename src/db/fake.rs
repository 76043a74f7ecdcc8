//! In-memory `Storage` used by handler/oracle/contest unit tests. Mirrors
//! the bitemporal/append-only/current-only semantics of `PostgresStorage`
//! without a database.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::models::{
    Block, Burn, ExchangeDayData, Factory, LiquidityPosition, LiquidityPositionSnapshot,
    LpContest, LpContestBlock, Mint, Pair, PairBlockCumulativePrice, PairDayData, PairHourData,
    Swap, Token, TokenDayData, Transaction, User,
};
use super::Storage;
use crate::errors::IndexerError;
use crate::value::FieldElement;

#[derive(Default)]
struct State {
    blocks: BTreeMap<i64, Block>,
    transactions: BTreeMap<String, Transaction>,
    factories: BTreeMap<String, Vec<Factory>>,
    tokens: BTreeMap<String, Vec<Token>>,
    pairs: BTreeMap<String, Vec<Pair>>,
    users: BTreeMap<String, Vec<User>>,
    mints: Vec<Mint>,
    burns: Vec<Burn>,
    swaps: Vec<Swap>,
    positions: BTreeMap<(String, String), LiquidityPosition>,
    snapshots: Vec<LiquidityPositionSnapshot>,
    exchange_days: BTreeMap<i64, ExchangeDayData>,
    pair_days: BTreeMap<(String, i64), PairDayData>,
    pair_hours: BTreeMap<(String, i64), PairHourData>,
    token_days: BTreeMap<(String, i64), TokenDayData>,
    cumulative_prices: BTreeMap<(String, i64), PairBlockCumulativePrice>,
    contests: BTreeMap<String, LpContest>,
    contest_blocks: Vec<LpContestBlock>,
    contest_checkpoint: Option<i64>,
}

/// An in-process `Storage` backed by `Mutex`-guarded `BTreeMap`s.
#[derive(Default)]
pub struct FakeStorage(Mutex<State>);

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn highest_block(&self) -> Result<Option<i64>, IndexerError> {
        Ok(self.0.lock().unwrap().blocks.keys().next_back().copied())
    }

    async fn put_block(&self, block: &Block) -> Result<(), IndexerError> {
        self.0.lock().unwrap().blocks.insert(block.number, block.clone());
        Ok(())
    }

    async fn block_timestamp_at_or_before(&self, number: i64) -> Result<Option<i64>, IndexerError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .blocks
            .range(..=number)
            .next_back()
            .map(|(_, b)| b.timestamp))
    }

    async fn put_transaction(&self, tx: &Transaction) -> Result<(), IndexerError> {
        self.0
            .lock()
            .unwrap()
            .transactions
            .entry(tx.hash.as_hex())
            .or_insert_with(|| tx.clone());
        Ok(())
    }

    async fn get_transaction(&self, hash: &FieldElement) -> Result<Option<Transaction>, IndexerError> {
        Ok(self.0.lock().unwrap().transactions.get(&hash.as_hex()).cloned())
    }

    async fn get_factory(&self, id: &FieldElement) -> Result<Option<Factory>, IndexerError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .factories
            .get(&id.as_hex())
            .and_then(|v| v.last())
            .cloned())
    }

    async fn put_factory(&self, _current: Option<&Factory>, next: &Factory) -> Result<(), IndexerError> {
        self.0
            .lock()
            .unwrap()
            .factories
            .entry(next.id.as_hex())
            .or_default()
            .push(next.clone());
        Ok(())
    }

    async fn get_token(&self, id: &FieldElement) -> Result<Option<Token>, IndexerError> {
        Ok(self.0.lock().unwrap().tokens.get(&id.as_hex()).and_then(|v| v.last()).cloned())
    }

    async fn put_token(&self, _current: Option<&Token>, next: &Token) -> Result<(), IndexerError> {
        self.0.lock().unwrap().tokens.entry(next.id.as_hex()).or_default().push(next.clone());
        Ok(())
    }

    async fn get_pair(&self, id: &FieldElement) -> Result<Option<Pair>, IndexerError> {
        Ok(self.0.lock().unwrap().pairs.get(&id.as_hex()).and_then(|v| v.last()).cloned())
    }

    async fn get_pair_at(&self, id: &FieldElement, block: i64) -> Result<Option<Pair>, IndexerError> {
        let state = self.0.lock().unwrap();
        Ok(state
            .pairs
            .get(&id.as_hex())
            .and_then(|versions| {
                versions
                    .iter()
                    .filter(|p| p.valid_from <= block && p.valid_to.map(|vt| vt > block).unwrap_or(true))
                    .max_by_key(|p| p.valid_from)
            })
            .cloned())
    }

    async fn get_pair_by_tokens(
        &self,
        token0: &FieldElement,
        token1: &FieldElement,
    ) -> Result<Option<Pair>, IndexerError> {
        let state = self.0.lock().unwrap();
        Ok(state
            .pairs
            .values()
            .filter_map(|v| v.last())
            .find(|p| &p.token0_id == token0 && &p.token1_id == token1)
            .cloned())
    }

    async fn put_pair(&self, _current: Option<&Pair>, next: &Pair) -> Result<(), IndexerError> {
        self.0.lock().unwrap().pairs.entry(next.id.as_hex()).or_default().push(next.clone());
        Ok(())
    }

    async fn all_pair_ids(&self) -> Result<Vec<FieldElement>, IndexerError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .pairs
            .values()
            .filter_map(|v| v.last())
            .map(|p| p.id.clone())
            .collect())
    }

    async fn get_user(&self, id: &FieldElement) -> Result<Option<User>, IndexerError> {
        Ok(self.0.lock().unwrap().users.get(&id.as_hex()).and_then(|v| v.last()).cloned())
    }

    async fn put_user(&self, _current: Option<&User>, next: &User) -> Result<(), IndexerError> {
        self.0.lock().unwrap().users.entry(next.id.as_hex()).or_default().push(next.clone());
        Ok(())
    }

    async fn get_open_mint(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Mint>, IndexerError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .mints
            .iter()
            .rev()
            .find(|m| &m.pair_id == pair && &m.transaction_hash == tx_hash && !m.is_complete())
            .cloned())
    }

    async fn get_last_mint(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Mint>, IndexerError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .mints
            .iter()
            .filter(|m| &m.pair_id == pair && &m.transaction_hash == tx_hash)
            .max_by_key(|m| m.index)
            .cloned())
    }

    async fn put_mint(&self, mint: &Mint) -> Result<(), IndexerError> {
        let mut state = self.0.lock().unwrap();
        if let Some(existing) = state
            .mints
            .iter_mut()
            .find(|m| m.transaction_hash == mint.transaction_hash && m.index == mint.index)
        {
            *existing = mint.clone();
        } else {
            state.mints.push(mint.clone());
        }
        Ok(())
    }

    async fn delete_mint(&self, pair: &FieldElement, tx_hash: &FieldElement, index: i64) -> Result<(), IndexerError> {
        self.0
            .lock()
            .unwrap()
            .mints
            .retain(|m| !(&m.pair_id == pair && &m.transaction_hash == tx_hash && m.index == index));
        Ok(())
    }

    async fn get_open_burn(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Burn>, IndexerError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .burns
            .iter()
            .rev()
            .find(|b| &b.pair_id == pair && &b.transaction_hash == tx_hash && b.needs_complete)
            .cloned())
    }

    async fn get_last_burn(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Burn>, IndexerError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .burns
            .iter()
            .filter(|b| &b.pair_id == pair && &b.transaction_hash == tx_hash)
            .max_by_key(|b| b.index)
            .cloned())
    }

    async fn put_burn(&self, burn: &Burn) -> Result<(), IndexerError> {
        let mut state = self.0.lock().unwrap();
        if let Some(existing) = state
            .burns
            .iter_mut()
            .find(|b| b.transaction_hash == burn.transaction_hash && b.index == burn.index)
        {
            *existing = burn.clone();
        } else {
            state.burns.push(burn.clone());
        }
        Ok(())
    }

    async fn put_swap(&self, swap: &Swap) -> Result<(), IndexerError> {
        self.0.lock().unwrap().swaps.push(swap.clone());
        Ok(())
    }

    async fn get_liquidity_position(
        &self,
        pair: &FieldElement,
        user: &FieldElement,
    ) -> Result<Option<LiquidityPosition>, IndexerError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .positions
            .get(&(pair.as_hex(), user.as_hex()))
            .cloned())
    }

    async fn put_liquidity_position(&self, position: &LiquidityPosition) -> Result<(), IndexerError> {
        self.0
            .lock()
            .unwrap()
            .positions
            .insert((position.pair_address.as_hex(), position.user.as_hex()), position.clone());
        Ok(())
    }

    async fn put_liquidity_snapshot(
        &self,
        snapshot: &LiquidityPositionSnapshot,
    ) -> Result<(), IndexerError> {
        self.0.lock().unwrap().snapshots.push(snapshot.clone());
        Ok(())
    }

    async fn liquidity_snapshots(
        &self,
        pair: &FieldElement,
        user: &FieldElement,
        after_block: i64,
    ) -> Result<Vec<LiquidityPositionSnapshot>, IndexerError> {
        let mut rows: Vec<_> = self
            .0
            .lock()
            .unwrap()
            .snapshots
            .iter()
            .filter(|s| &s.pair_address == pair && &s.user == user && s.block >= after_block)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.block);
        Ok(rows)
    }

    async fn liquidity_providers(
        &self,
        pair: &FieldElement,
        after: Option<FieldElement>,
        limit: i64,
    ) -> Result<Vec<FieldElement>, IndexerError> {
        let state = self.0.lock().unwrap();
        let after_hex = after.map(|f| f.as_hex()).unwrap_or_default();
        let mut users: Vec<FieldElement> = state
            .snapshots
            .iter()
            .filter(|s| &s.pair_address == pair && s.user.as_hex() > after_hex)
            .map(|s| s.user.clone())
            .collect();
        users.sort();
        users.dedup();
        users.truncate(limit as usize);
        Ok(users)
    }

    async fn put_exchange_day_data(&self, row: &ExchangeDayData) -> Result<(), IndexerError> {
        self.0.lock().unwrap().exchange_days.insert(row.day_id, row.clone());
        Ok(())
    }

    async fn get_exchange_day_data(&self, day_id: i64) -> Result<Option<ExchangeDayData>, IndexerError> {
        Ok(self.0.lock().unwrap().exchange_days.get(&day_id).cloned())
    }

    async fn put_pair_day_data(&self, row: &PairDayData) -> Result<(), IndexerError> {
        self.0
            .lock()
            .unwrap()
            .pair_days
            .insert((row.pair_id.as_hex(), row.day_id), row.clone());
        Ok(())
    }

    async fn get_pair_day_data(
        &self,
        pair: &FieldElement,
        day_id: i64,
    ) -> Result<Option<PairDayData>, IndexerError> {
        Ok(self.0.lock().unwrap().pair_days.get(&(pair.as_hex(), day_id)).cloned())
    }

    async fn put_pair_hour_data(&self, row: &PairHourData) -> Result<(), IndexerError> {
        self.0
            .lock()
            .unwrap()
            .pair_hours
            .insert((row.pair_id.as_hex(), row.hour_id), row.clone());
        Ok(())
    }

    async fn get_pair_hour_data(
        &self,
        pair: &FieldElement,
        hour_id: i64,
    ) -> Result<Option<PairHourData>, IndexerError> {
        Ok(self.0.lock().unwrap().pair_hours.get(&(pair.as_hex(), hour_id)).cloned())
    }

    async fn put_token_day_data(&self, row: &TokenDayData) -> Result<(), IndexerError> {
        self.0
            .lock()
            .unwrap()
            .token_days
            .insert((row.token_id.as_hex(), row.day_id), row.clone());
        Ok(())
    }

    async fn get_token_day_data(
        &self,
        token: &FieldElement,
        day_id: i64,
    ) -> Result<Option<TokenDayData>, IndexerError> {
        Ok(self.0.lock().unwrap().token_days.get(&(token.as_hex(), day_id)).cloned())
    }

    async fn put_cumulative_price(&self, row: &PairBlockCumulativePrice) -> Result<(), IndexerError> {
        self.0
            .lock()
            .unwrap()
            .cumulative_prices
            .insert((row.pair.as_hex(), row.block), row.clone());
        Ok(())
    }

    async fn last_cumulative_price(
        &self,
        pair: &FieldElement,
    ) -> Result<Option<PairBlockCumulativePrice>, IndexerError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .cumulative_prices
            .iter()
            .filter(|((p, _), _)| p == &pair.as_hex())
            .max_by_key(|((_, block), _)| *block)
            .map(|(_, v)| v.clone()))
    }

    async fn cumulative_price_at_or_before(
        &self,
        pair: &FieldElement,
        block: i64,
    ) -> Result<Option<PairBlockCumulativePrice>, IndexerError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .cumulative_prices
            .iter()
            .filter(|((p, b), _)| p == &pair.as_hex() && *b <= block)
            .max_by_key(|((_, b), _)| *b)
            .map(|(_, v)| v.clone()))
    }

    async fn get_lp_contest(&self, user: &FieldElement) -> Result<Option<LpContest>, IndexerError> {
        Ok(self.0.lock().unwrap().contests.get(&user.as_hex()).cloned())
    }

    async fn put_lp_contest(&self, contest: &LpContest) -> Result<(), IndexerError> {
        self.0.lock().unwrap().contests.insert(contest.user.as_hex(), contest.clone());
        Ok(())
    }

    async fn put_lp_contest_block(&self, block: &LpContestBlock) -> Result<(), IndexerError> {
        self.0.lock().unwrap().contest_blocks.push(block.clone());
        Ok(())
    }

    async fn contest_candidate_users(
        &self,
        after: Option<FieldElement>,
        limit: i64,
    ) -> Result<Vec<FieldElement>, IndexerError> {
        let state = self.0.lock().unwrap();
        let after_hex = after.map(|f| f.as_hex()).unwrap_or_default();
        let mut users: Vec<FieldElement> = state
            .snapshots
            .iter()
            .filter(|s| s.user.as_hex() > after_hex)
            .map(|s| s.user.clone())
            .collect();
        users.sort();
        users.dedup();
        users.truncate(limit as usize);
        Ok(users)
    }

    async fn get_contest_checkpoint(&self) -> Result<Option<i64>, IndexerError> {
        Ok(self.0.lock().unwrap().contest_checkpoint)
    }

    async fn put_contest_checkpoint(&self, block: i64) -> Result<(), IndexerError> {
        self.0.lock().unwrap().contest_checkpoint = Some(block);
        Ok(())
    }

    async fn list_eligible_contestants(&self) -> Result<Vec<LpContest>, IndexerError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .contests
            .values()
            .filter(|c| c.is_eligible)
            .cloned()
            .collect())
    }
}
