use bigdecimal::BigDecimal;

use crate::value::FieldElement;

/// A two-token AMM pool. `token0_id < token1_id` is guaranteed by the
/// factory and never re-checked here (§3).
#[derive(Debug, Clone)]
pub struct Pair {
    pub id: FieldElement,
    pub token0_id: FieldElement,
    pub token1_id: FieldElement,
    pub reserve0: BigDecimal,
    pub reserve1: BigDecimal,
    pub total_supply: BigDecimal,
    pub reserve_eth: BigDecimal,
    pub reserve_usd: BigDecimal,
    pub tracked_reserve_eth: BigDecimal,
    pub token0_price: BigDecimal,
    pub token1_price: BigDecimal,
    pub volume_token0: BigDecimal,
    pub volume_token1: BigDecimal,
    pub volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub tx_count: i64,
    pub created_at_timestamp: i64,
    pub created_at_block: i64,
    pub liquidity_provider_count: i64,
    pub valid_from: i64,
    pub valid_to: Option<i64>,
}

impl Pair {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: FieldElement,
        token0_id: FieldElement,
        token1_id: FieldElement,
        created_at_timestamp: i64,
        created_at_block: i64,
    ) -> Self {
        Self {
            id,
            token0_id,
            token1_id,
            reserve0: BigDecimal::from(0),
            reserve1: BigDecimal::from(0),
            total_supply: BigDecimal::from(0),
            reserve_eth: BigDecimal::from(0),
            reserve_usd: BigDecimal::from(0),
            tracked_reserve_eth: BigDecimal::from(0),
            token0_price: BigDecimal::from(0),
            token1_price: BigDecimal::from(0),
            volume_token0: BigDecimal::from(0),
            volume_token1: BigDecimal::from(0),
            volume_usd: BigDecimal::from(0),
            untracked_volume_usd: BigDecimal::from(0),
            tx_count: 0,
            created_at_timestamp,
            created_at_block,
            liquidity_provider_count: 0,
            valid_from: created_at_block,
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
