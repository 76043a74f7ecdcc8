//! `Swap` handler (§4.6), grounded in `core.py`'s `handle_swap`: the only
//! handler that creates the transaction row in the original system (every
//! other handler merely asserts it exists there). This port calls
//! `ensure_transaction` from every handler instead, so a Mint-only
//! transaction does not depend on also containing a Swap.

use bigdecimal::BigDecimal;

use crate::db::models::Swap;
use crate::errors::IndexerError;
use crate::events::SwapEvent;
use crate::oracle::get_tracked_volume_usd;
use crate::value::{to_decimal, FieldElement};

use super::context::{BlockCtx, HandlerEnv};
use super::lookups::{ensure_transaction, find_or_create_user};
use super::rollup::{bump_exchange_day_data, bump_pair_day_data, bump_pair_hour_data, bump_token_day_data};

pub async fn handle(
    env: &HandlerEnv<'_>,
    block: &BlockCtx,
    pair_address: &FieldElement,
    tx_hash: &FieldElement,
    log_index: i64,
    event: &SwapEvent,
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

    let amount0_in = to_decimal(event.amount0_in.to_biguint(), token0.decimals);
    let amount1_in = to_decimal(event.amount1_in.to_biguint(), token1.decimals);
    let amount0_out = to_decimal(event.amount0_out.to_biguint(), token0.decimals);
    let amount1_out = to_decimal(event.amount1_out.to_biguint(), token1.decimals);

    let amount0_total = &amount0_in + &amount0_out;
    let amount1_total = &amount1_in + &amount1_out;
    let amount_usd = get_tracked_volume_usd(
        &token0,
        &amount0_total,
        &token1,
        &amount1_total,
        &block.eth_price,
        &pair,
    );

    env.storage
        .put_swap(&Swap {
            transaction_hash: tx_hash.clone(),
            log_index,
            pair_id: pair_address.clone(),
            timestamp: block.block_timestamp,
            sender: event.sender.clone(),
            to: event.to.clone(),
            amount0_in: amount0_in.clone(),
            amount1_in: amount1_in.clone(),
            amount0_out: amount0_out.clone(),
            amount1_out: amount1_out.clone(),
            amount_usd: amount_usd.clone(),
        })
        .await?;

    let amount_eth = if block.eth_price == BigDecimal::from(0) {
        BigDecimal::from(0)
    } else {
        &amount_usd / &block.eth_price
    };

    let mut next_pair = pair.next_version(block.block_number);
    next_pair.volume_token0 += &amount0_total;
    next_pair.volume_token1 += &amount1_total;
    next_pair.volume_usd += &amount_usd;
    next_pair.tx_count += 1;
    env.storage.put_pair(Some(&pair), &next_pair).await?;

    bump_token_volume(env, &token0, &amount0_total, &amount_usd, block.block_number).await?;
    bump_token_volume(env, &token1, &amount1_total, &amount_usd, block.block_number).await?;

    let factory = env
        .storage
        .get_factory(&env.factory_address)
        .await?
        .ok_or_else(|| IndexerError::ReferentialAssert(format!("unknown factory {}", env.factory_address)))?;
    let mut next_factory = factory.next_version(block.block_number);
    next_factory.total_volume_usd += &amount_usd;
    next_factory.total_volume_eth += &amount_eth;
    next_factory.tx_count += 1;
    env.storage.put_factory(Some(&factory), &next_factory).await?;

    bump_pair_day_data(env.storage, &next_pair, block.block_timestamp, &amount0_total, &amount1_total, &amount_usd, 1).await?;
    bump_pair_hour_data(env.storage, &next_pair, block.block_timestamp, &amount0_total, &amount1_total, &amount_usd, 1).await?;
    bump_exchange_day_data(env.storage, &next_factory, block.block_timestamp, &amount_usd, &amount_eth, &BigDecimal::from(0), 1).await?;
    bump_token_day_data(env.storage, &token0, block.block_timestamp, &block.eth_price, &amount0_total, &amount_usd, 1).await?;
    bump_token_day_data(env.storage, &token1, block.block_timestamp, &block.eth_price, &amount1_total, &amount_usd, 1).await?;

    find_or_create_user(env.storage, &event.to, block.block_number).await?;
    bump_user_swap_count(env, &event.to, block.block_number).await?;

    Ok(())
}

async fn bump_token_volume(
    env: &HandlerEnv<'_>,
    token: &crate::db::models::Token,
    amount: &BigDecimal,
    amount_usd: &BigDecimal,
    valid_from: i64,
) -> Result<(), IndexerError> {
    let mut next = token.next_version(valid_from);
    next.trade_volume += amount;
    next.trade_volume_usd += amount_usd;
    next.tx_count += 1;
    env.storage.put_token(Some(token), &next).await
}

async fn bump_user_swap_count(env: &HandlerEnv<'_>, user: &FieldElement, valid_from: i64) -> Result<(), IndexerError> {
    let current = env.storage.get_user(user).await?.unwrap();
    let mut next = current.next_version(valid_from);
    next.swap_count += 1;
    next.tx_count += 1;
    env.storage.put_user(Some(&current), &next).await
}
