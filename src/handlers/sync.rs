//! `Sync` handler (§4.6), grounded in `core.py`'s `handle_sync`: refreshes
//! reserves, derived prices, and every entity's liquidity totals from the
//! new reserve figures. No transaction/tx-count bookkeeping happens here.

use bigdecimal::BigDecimal;

use crate::db::models::Token;
use crate::db::Storage;
use crate::errors::IndexerError;
use crate::events::SyncEvent;
use crate::oracle::{find_eth_per_token, get_tracked_liquidity_usd};
use crate::value::{price, to_decimal, FieldElement};

use super::context::{BlockCtx, HandlerEnv};

pub async fn handle(
    env: &HandlerEnv<'_>,
    block: &BlockCtx,
    pair_address: &FieldElement,
    event: &SyncEvent,
) -> Result<(), IndexerError> {
    let pair = env
        .storage
        .get_pair(pair_address)
        .await?
        .ok_or_else(|| IndexerError::ReferentialAssert(format!("Sync for unknown pair {pair_address}")))?;
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

    let reserve0 = to_decimal(event.reserve0.to_biguint(), token0.decimals);
    let reserve1 = to_decimal(event.reserve1.to_biguint(), token1.decimals);

    let derived_eth0 = find_eth_per_token(
        env.storage,
        &token0.id,
        &env.eth_id,
        &env.whitelist,
        &env.minimum_liquidity_threshold_eth,
    )
    .await?;
    let derived_eth1 = find_eth_per_token(
        env.storage,
        &token1.id,
        &env.eth_id,
        &env.whitelist,
        &env.minimum_liquidity_threshold_eth,
    )
    .await?;

    let reserve_eth = &reserve0 * &derived_eth0 + &reserve1 * &derived_eth1;
    let reserve_usd = &reserve_eth * &block.eth_price;

    let token0_for_tracking = Token { derived_eth: derived_eth0, ..token0.clone() };
    let token1_for_tracking = Token { derived_eth: derived_eth1, ..token1.clone() };
    let tracked_reserve_usd = get_tracked_liquidity_usd(
        &token0_for_tracking,
        &reserve0,
        &token1_for_tracking,
        &reserve1,
        &block.eth_price,
        &env.whitelist,
    );
    let tracked_reserve_eth = if block.eth_price == BigDecimal::from(0) {
        BigDecimal::from(0)
    } else {
        &tracked_reserve_usd / &block.eth_price
    };

    let mut next_pair = pair.next_version(block.block_number);
    next_pair.reserve0 = reserve0.clone();
    next_pair.reserve1 = reserve1.clone();
    next_pair.token0_price = price(&reserve0, &reserve1);
    next_pair.token1_price = price(&reserve1, &reserve0);
    next_pair.reserve_eth = reserve_eth;
    next_pair.reserve_usd = reserve_usd.clone();
    next_pair.tracked_reserve_eth = tracked_reserve_eth;
    env.storage.put_pair(Some(&pair), &next_pair).await?;

    bump_token_liquidity(env.storage, &token0, &reserve0, block.block_number).await?;
    bump_token_liquidity(env.storage, &token1, &reserve1, block.block_number).await?;

    refresh_factory_liquidity(env, block, &reserve_usd, &pair.reserve_usd).await?;

    Ok(())
}

async fn bump_token_liquidity(
    storage: &dyn Storage,
    token: &Token,
    reserve: &BigDecimal,
    valid_from: i64,
) -> Result<(), IndexerError> {
    let mut next = token.next_version(valid_from);
    next.total_liquidity = reserve.clone();
    storage.put_token(Some(token), &next).await
}

/// Bumps the factory's total tracked liquidity by the delta this pair's
/// `reserve_usd` just moved, mirroring how the original system folds each
/// Sync's liquidity change into the factory total incrementally rather
/// than rescanning every pair.
async fn refresh_factory_liquidity(
    env: &HandlerEnv<'_>,
    block: &BlockCtx,
    new_reserve_usd: &BigDecimal,
    old_reserve_usd: &BigDecimal,
) -> Result<(), IndexerError> {
    let factory = env
        .storage
        .get_factory(&env.factory_address)
        .await?
        .ok_or_else(|| IndexerError::ReferentialAssert(format!("unknown factory {}", env.factory_address)))?;
    let delta_usd = new_reserve_usd - old_reserve_usd;
    let delta_eth = if block.eth_price == BigDecimal::from(0) {
        BigDecimal::from(0)
    } else {
        &delta_usd / &block.eth_price
    };

    let mut next = factory.next_version(block.block_number);
    next.total_liquidity_usd += delta_usd;
    next.total_liquidity_eth += delta_eth;
    env.storage.put_factory(Some(&factory), &next).await
}
