use bigdecimal::BigDecimal;

use crate::value::FieldElement;

/// The AMM factory. Created lazily on the first `PairCreated`; versioned on
/// every subsequent `pair_count`/volume/liquidity mutation (§3).
#[derive(Debug, Clone)]
pub struct Factory {
    pub id: FieldElement,
    pub pair_count: i64,
    pub tx_count: i64,
    pub total_volume_usd: BigDecimal,
    pub total_volume_eth: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub total_liquidity_usd: BigDecimal,
    pub total_liquidity_eth: BigDecimal,
    pub valid_from: i64,
    pub valid_to: Option<i64>,
}

impl Factory {
    pub fn new(id: FieldElement, valid_from: i64) -> Self {
        Self {
            id,
            pair_count: 0,
            tx_count: 0,
            total_volume_usd: BigDecimal::from(0),
            total_volume_eth: BigDecimal::from(0),
            untracked_volume_usd: BigDecimal::from(0),
            total_liquidity_usd: BigDecimal::from(0),
            total_liquidity_eth: BigDecimal::from(0),
            valid_from,
            valid_to: None,
        }
    }

    /// Produce the next version: same values, new `valid_from`, open `valid_to`.
    pub fn next_version(&self, valid_from: i64) -> Self {
        let mut next = self.clone();
        next.valid_from = valid_from;
        next.valid_to = None;
        next
    }
}
