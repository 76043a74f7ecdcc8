use bigdecimal::BigDecimal;
use num_bigint::BigUint;

use crate::value::FieldElement;

/// A token, created lazily when first referenced by a `PairCreated` (§3).
/// `derived_eth` starts at 1 and is refined by the price oracle (C7).
#[derive(Debug, Clone)]
pub struct Token {
    pub id: FieldElement,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub total_supply: BigUint,
    pub trade_volume: BigDecimal,
    pub trade_volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub tx_count: i64,
    pub total_liquidity: BigDecimal,
    pub derived_eth: BigDecimal,
    pub valid_from: i64,
    pub valid_to: Option<i64>,
}

impl Token {
    pub fn new(
        id: FieldElement,
        name: String,
        symbol: String,
        decimals: u32,
        total_supply: BigUint,
        valid_from: i64,
    ) -> Self {
        Self {
            id,
            name,
            symbol,
            decimals,
            total_supply,
            trade_volume: BigDecimal::from(0),
            trade_volume_usd: BigDecimal::from(0),
            untracked_volume_usd: BigDecimal::from(0),
            tx_count: 0,
            total_liquidity: BigDecimal::from(0),
            derived_eth: BigDecimal::from(1),
            valid_from,
            valid_to: None,
        }
    }

    pub fn next_version(&self, valid_from: i64) -> Self {
        let mut next = self.clone();
        next.valid_from = valid_from;
        next.valid_to = None;
        next
    }
}
