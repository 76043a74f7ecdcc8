//! `Burn` handler (§4.6), grounded in `core.py`'s `handle_burn`: finalizes
//! the pending Burn row the Transfer handler opened (`needs_complete`
//! cleared by that point), records tracked USD value, and bumps
//! transaction-count accumulators + the burning user's `burn_count`.

use bigdecimal::BigDecimal;

use crate::db::models::Burn;
use crate::errors::IndexerError;
use crate::events::BurnEvent;
use crate::oracle::get_tracked_liquidity_usd;
use crate::value::{to_decimal, FieldElement};

use super::context::{BlockCtx, HandlerEnv};
use super::lookups::{ensure_transaction, find_or_create_user};
use super::rollup::{bump_pair_day_data, bump_pair_hour_data};

pub async fn handle(
    env: &HandlerEnv<'_>,
    block: &BlockCtx,
    pair_address: &FieldElement,
    tx_hash: &FieldElement,
    event: &BurnEvent,
) -> Result<(), IndexerError> {
    ensure_transaction(env.storage, tx_hash, block.block_number, block.block_timestamp).await?;

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

    let amount0 = to_decimal(event.amount0.to_biguint(), token0.decimals);
    let amount1 = to_decimal(event.amount1.to_biguint(), token1.decimals);
    let amount_usd = get_tracked_liquidity_usd(
        &token0,
        &amount0,
        &token1,
        &amount1,
        &block.eth_price,
        &env.whitelist,
    );

    let open = env
        .storage
        .get_open_burn(pair_address, tx_hash)
        .await?
        .ok_or_else(|| IndexerError::ReferentialAssert(format!(
            "Burn event with no pending burn row for {pair_address}/{tx_hash}"
        )))?;

    let burning_user = open.sender.clone();
    env.storage
        .put_burn(&Burn {
            to: Some(event.to.clone()),
            amount0: Some(amount0),
            amount1: Some(amount1),
            amount_usd: Some(amount_usd),
            timestamp: block.block_timestamp,
            ..open
        })
        .await?;

    bump_tx_counts(env, block, pair_address).await?;
    let zero = BigDecimal::from(0);
    bump_pair_day_data(env.storage, &pair, block.block_timestamp, &zero, &zero, &zero, 1).await?;
    bump_pair_hour_data(env.storage, &pair, block.block_timestamp, &zero, &zero, &zero, 1).await?;

    if let Some(user) = burning_user {
        find_or_create_user(env.storage, &user, block.block_number).await?;
        bump_user_burn_count(env, &user, block.block_number).await?;
    }

    Ok(())
}

async fn bump_tx_counts(env: &HandlerEnv<'_>, block: &BlockCtx, pair_address: &FieldElement) -> Result<(), IndexerError> {
    let pair = env.storage.get_pair(pair_address).await?.unwrap();
    let mut next_pair = pair.next_version(block.block_number);
    next_pair.tx_count += 1;
    env.storage.put_pair(Some(&pair), &next_pair).await?;

    for token_id in [pair.token0_id.clone(), pair.token1_id.clone()] {
        let token = env.storage.get_token(&token_id).await?.unwrap();
        let mut next = token.next_version(block.block_number);
        next.tx_count += 1;
        env.storage.put_token(Some(&token), &next).await?;
    }

    let factory = env
        .storage
        .get_factory(&env.factory_address)
        .await?
        .ok_or_else(|| IndexerError::ReferentialAssert(format!("unknown factory {}", env.factory_address)))?;
    let mut next_factory = factory.next_version(block.block_number);
    next_factory.tx_count += 1;
    env.storage.put_factory(Some(&factory), &next_factory).await
}

async fn bump_user_burn_count(env: &HandlerEnv<'_>, user: &FieldElement, valid_from: i64) -> Result<(), IndexerError> {
    let current = env.storage.get_user(user).await?.unwrap();
    let mut next = current.next_version(valid_from);
    next.burn_count += 1;
    next.tx_count += 1;
    env.storage.put_user(Some(&current), &next).await
}
