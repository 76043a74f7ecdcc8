use bigdecimal::BigDecimal;

use crate::value::FieldElement;

/// A single swap leg against a pair (§3). Append-only.
#[derive(Debug, Clone)]
pub struct Swap {
    pub transaction_hash: FieldElement,
    pub log_index: i64,
    pub pair_id: FieldElement,
    pub timestamp: i64,
    pub sender: FieldElement,
    pub to: FieldElement,
    pub amount0_in: BigDecimal,
    pub amount1_in: BigDecimal,
    pub amount0_out: BigDecimal,
    pub amount1_out: BigDecimal,
    pub amount_usd: BigDecimal,
}
