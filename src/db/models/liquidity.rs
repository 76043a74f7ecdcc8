use bigdecimal::BigDecimal;

use crate::value::FieldElement;

/// Current-only LP-token balance for a `(pair, user)` pair (§3). Replaced
/// on every transfer leg that touches this user, via upsert.
#[derive(Debug, Clone)]
pub struct LiquidityPosition {
    pub pair_address: FieldElement,
    pub user: FieldElement,
    pub liquidity_token_balance: BigDecimal,
}

/// Append-only journal entry written on every transfer leg involving a
/// non-pair, non-zero address (§4.6), and consumed by C9 to reconstruct a
/// user's historical LP holdings.
#[derive(Debug, Clone)]
pub struct LiquidityPositionSnapshot {
    pub pair_address: FieldElement,
    pub user: FieldElement,
    pub block: i64,
    pub timestamp: i64,
    pub reserve0: BigDecimal,
    pub reserve1: BigDecimal,
    pub reserve_usd: BigDecimal,
    pub token0_price_usd: BigDecimal,
    pub token1_price_usd: BigDecimal,
    pub liquidity_token_total_supply: BigDecimal,
    pub liquidity_token_balance: BigDecimal,
}
