//! Day/hour roll-up bumps (§4.6 rollup step). Each call loads-or-creates the
//! bucket row, always refreshes its reserve/supply snapshot fields from the
//! entity's *current* state (mirroring `snapshot_*`'s unconditional
//! overwrite in the system this indexer replaces), then adds the given
//! deltas on top of whatever was already accumulated (mirroring
//! `update_*`'s `$inc`).

use bigdecimal::BigDecimal;

use crate::db::models::{day_id, hour_id, ExchangeDayData, Factory, Pair, PairDayData, PairHourData, Token, TokenDayData};
use crate::db::Storage;
use crate::errors::IndexerError;

pub async fn bump_pair_day_data(
    storage: &dyn Storage,
    pair: &Pair,
    timestamp: i64,
    volume_token0_delta: &BigDecimal,
    volume_token1_delta: &BigDecimal,
    volume_usd_delta: &BigDecimal,
    tx_count_delta: i64,
) -> Result<(), IndexerError> {
    let day = day_id(timestamp);
    let mut row = storage
        .get_pair_day_data(&pair.id, day)
        .await?
        .unwrap_or_else(|| PairDayData::new(pair.id.clone(), day, pair.token0_id.clone(), pair.token1_id.clone()));

    row.reserve0 = pair.reserve0.clone();
    row.reserve1 = pair.reserve1.clone();
    row.reserve_usd = pair.reserve_usd.clone();
    row.daily_volume_token0 += volume_token0_delta;
    row.daily_volume_token1 += volume_token1_delta;
    row.daily_volume_usd += volume_usd_delta;
    row.daily_tx_count += tx_count_delta;

    storage.put_pair_day_data(&row).await
}

pub async fn bump_pair_hour_data(
    storage: &dyn Storage,
    pair: &Pair,
    timestamp: i64,
    volume_token0_delta: &BigDecimal,
    volume_token1_delta: &BigDecimal,
    volume_usd_delta: &BigDecimal,
    tx_count_delta: i64,
) -> Result<(), IndexerError> {
    let hour = hour_id(timestamp);
    let mut row = storage
        .get_pair_hour_data(&pair.id, hour)
        .await?
        .unwrap_or_else(|| PairHourData::new(pair.id.clone(), hour));

    row.reserve0 = pair.reserve0.clone();
    row.reserve1 = pair.reserve1.clone();
    row.reserve_usd = pair.reserve_usd.clone();
    row.total_supply = pair.total_supply.clone();
    row.hourly_volume_token0 += volume_token0_delta;
    row.hourly_volume_token1 += volume_token1_delta;
    row.hourly_volume_usd += volume_usd_delta;
    row.hourly_tx_count += tx_count_delta;

    storage.put_pair_hour_data(&row).await
}

pub async fn bump_exchange_day_data(
    storage: &dyn Storage,
    factory: &Factory,
    timestamp: i64,
    volume_usd_delta: &BigDecimal,
    volume_eth_delta: &BigDecimal,
    untracked_volume_usd_delta: &BigDecimal,
    tx_count_delta: i64,
) -> Result<(), IndexerError> {
    let day = day_id(timestamp);
    let mut row = storage
        .get_exchange_day_data(day)
        .await?
        .unwrap_or_else(|| ExchangeDayData::new(day));

    row.total_liquidity_usd = factory.total_liquidity_usd.clone();
    row.total_liquidity_eth = factory.total_liquidity_eth.clone();
    row.daily_volume_usd += volume_usd_delta;
    row.daily_volume_eth += volume_eth_delta;
    row.daily_untracked_volume_usd += untracked_volume_usd_delta;
    row.tx_count += tx_count_delta;

    storage.put_exchange_day_data(&row).await
}

/// Token day data (§9 divergence): the original system's equivalent
/// document also stores `price_usd` and `total_liquidity_eth`; this port's
/// `TokenDayData` keeps only `total_liquidity_usd`, computed from the same
/// `total_liquidity_token * derived_eth * eth_price` formula without an
/// intermediate stored column for either dropped field.
pub async fn bump_token_day_data(
    storage: &dyn Storage,
    token: &Token,
    timestamp: i64,
    eth_price: &BigDecimal,
    volume_token_delta: &BigDecimal,
    volume_usd_delta: &BigDecimal,
    tx_count_delta: i64,
) -> Result<(), IndexerError> {
    let day = day_id(timestamp);
    let mut row = storage
        .get_token_day_data(&token.id, day)
        .await?
        .unwrap_or_else(|| TokenDayData::new(token.id.clone(), day));

    row.total_liquidity_token = token.total_liquidity.clone();
    row.total_liquidity_usd = &token.total_liquidity * &token.derived_eth * eth_price;
    row.daily_volume_token += volume_token_delta;
    row.daily_volume_usd += volume_usd_delta;
    row.daily_tx_count += tx_count_delta;

    storage.put_token_day_data(&row).await
}
