use bigdecimal::BigDecimal;

use crate::value::FieldElement;

/// `day_id = floor(ts/86400)`.
pub fn day_id(timestamp: i64) -> i64 {
    timestamp.div_euclid(86_400)
}

/// `hour_id = floor(ts/3600)`.
pub fn hour_id(timestamp: i64) -> i64 {
    timestamp.div_euclid(3_600)
}

/// Exchange-wide daily roll-up, keyed by `day_id` (§4.6 C6.daily).
#[derive(Debug, Clone)]
pub struct ExchangeDayData {
    pub day_id: i64,
    pub daily_volume_usd: BigDecimal,
    pub daily_volume_eth: BigDecimal,
    pub daily_untracked_volume_usd: BigDecimal,
    pub total_liquidity_usd: BigDecimal,
    pub total_liquidity_eth: BigDecimal,
    pub tx_count: i64,
}

impl ExchangeDayData {
    pub fn new(day_id: i64) -> Self {
        Self {
            day_id,
            daily_volume_usd: BigDecimal::from(0),
            daily_volume_eth: BigDecimal::from(0),
            daily_untracked_volume_usd: BigDecimal::from(0),
            total_liquidity_usd: BigDecimal::from(0),
            total_liquidity_eth: BigDecimal::from(0),
            tx_count: 0,
        }
    }
}

/// Per-pair daily roll-up, keyed by `(pair_id, day_id)`.
#[derive(Debug, Clone)]
pub struct PairDayData {
    pub pair_id: FieldElement,
    pub day_id: i64,
    pub token0_id: FieldElement,
    pub token1_id: FieldElement,
    pub reserve0: BigDecimal,
    pub reserve1: BigDecimal,
    pub reserve_usd: BigDecimal,
    pub daily_volume_token0: BigDecimal,
    pub daily_volume_token1: BigDecimal,
    pub daily_volume_usd: BigDecimal,
    pub daily_tx_count: i64,
}

impl PairDayData {
    pub fn new(pair_id: FieldElement, day_id: i64, token0_id: FieldElement, token1_id: FieldElement) -> Self {
        Self {
            pair_id,
            day_id,
            token0_id,
            token1_id,
            reserve0: BigDecimal::from(0),
            reserve1: BigDecimal::from(0),
            reserve_usd: BigDecimal::from(0),
            daily_volume_token0: BigDecimal::from(0),
            daily_volume_token1: BigDecimal::from(0),
            daily_volume_usd: BigDecimal::from(0),
            daily_tx_count: 0,
        }
    }
}

/// Per-pair hourly roll-up, keyed by `(pair_id, hour_id)`.
#[derive(Debug, Clone)]
pub struct PairHourData {
    pub pair_id: FieldElement,
    pub hour_id: i64,
    pub reserve0: BigDecimal,
    pub reserve1: BigDecimal,
    pub reserve_usd: BigDecimal,
    pub total_supply: BigDecimal,
    pub hourly_volume_token0: BigDecimal,
    pub hourly_volume_token1: BigDecimal,
    pub hourly_volume_usd: BigDecimal,
    pub hourly_tx_count: i64,
}

impl PairHourData {
    pub fn new(pair_id: FieldElement, hour_id: i64) -> Self {
        Self {
            pair_id,
            hour_id,
            reserve0: BigDecimal::from(0),
            reserve1: BigDecimal::from(0),
            reserve_usd: BigDecimal::from(0),
            total_supply: BigDecimal::from(0),
            hourly_volume_token0: BigDecimal::from(0),
            hourly_volume_token1: BigDecimal::from(0),
            hourly_volume_usd: BigDecimal::from(0),
            hourly_tx_count: 0,
        }
    }
}

/// Per-token daily roll-up, keyed by `(token_id, day_id)`.
#[derive(Debug, Clone)]
pub struct TokenDayData {
    pub token_id: FieldElement,
    pub day_id: i64,
    pub daily_volume_token: BigDecimal,
    pub daily_volume_usd: BigDecimal,
    pub total_liquidity_token: BigDecimal,
    pub total_liquidity_usd: BigDecimal,
    pub daily_tx_count: i64,
}

impl TokenDayData {
    pub fn new(token_id: FieldElement, day_id: i64) -> Self {
        Self {
            token_id,
            day_id,
            daily_volume_token: BigDecimal::from(0),
            daily_volume_usd: BigDecimal::from(0),
            total_liquidity_token: BigDecimal::from(0),
            total_liquidity_usd: BigDecimal::from(0),
            daily_tx_count: 0,
        }
    }
}
