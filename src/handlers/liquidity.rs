//! Liquidity position + snapshot write-through (§4.6), grounded in
//! `helpers.py`'s `replace_liquidity_position`/`create_liquidity_snapshot`:
//! called for both endpoints of any non-zero LP-token transfer.

use crate::chain::fetch_balance;
use crate::db::models::{LiquidityPosition, LiquidityPositionSnapshot};
use crate::errors::IndexerError;
use crate::value::{to_decimal, FieldElement};

use super::context::{BlockCtx, HandlerEnv};

pub async fn refresh_position_and_snapshot(
    env: &HandlerEnv<'_>,
    block: &BlockCtx,
    pair_address: &FieldElement,
    user: &FieldElement,
) -> Result<(), IndexerError> {
    let balance_raw = fetch_balance(env.rpc, pair_address, user, &block.block_hash).await?;
    let balance = to_decimal(&balance_raw, 18);

    env.storage
        .put_liquidity_position(&LiquidityPosition {
            pair_address: pair_address.clone(),
            user: user.clone(),
            liquidity_token_balance: balance.clone(),
        })
        .await?;

    let pair = env
        .storage
        .get_pair(pair_address)
        .await?
        .ok_or_else(|| IndexerError::ReferentialAssert(format!("unknown pair {pair_address}")))?;
    let token0 = env
        .storage
        .get_token(&pair.token0_id)
        .await?
        .ok_or_else(|| IndexerError::ReferentialAssert(format!("unknown token0 {}", pair.token0_id)))?;
    let token1 = env
        .storage
        .get_token(&pair.token1_id)
        .await?
        .ok_or_else(|| IndexerError::ReferentialAssert(format!("unknown token1 {}", pair.token1_id)))?;

    env.storage
        .put_liquidity_snapshot(&LiquidityPositionSnapshot {
            pair_address: pair_address.clone(),
            user: user.clone(),
            block: block.block_number,
            timestamp: block.block_timestamp,
            reserve0: pair.reserve0.clone(),
            reserve1: pair.reserve1.clone(),
            reserve_usd: pair.reserve_usd.clone(),
            token0_price_usd: &token0.derived_eth * &block.eth_price,
            token1_price_usd: &token1.derived_eth * &block.eth_price,
            liquidity_token_total_supply: pair.total_supply.clone(),
            liquidity_token_balance: balance,
        })
        .await
}
