use bigdecimal::BigDecimal;

use crate::value::FieldElement;

/// One block's entry in a pair's contiguous cumulative-LP-price series
/// (§3, §4.8/4.9). `price_usd` is the value of one LP token at this block;
/// `time_cumulative_price_usd` is the running time-weighted sum consumed by
/// C9 to integrate a user's contribution between any two blocks in O(1).
#[derive(Debug, Clone)]
pub struct PairBlockCumulativePrice {
    pub pair: FieldElement,
    pub block: i64,
    pub price_usd: BigDecimal,
    pub cumulative_price_usd: BigDecimal,
    pub time_cumulative_price_usd: BigDecimal,
}
