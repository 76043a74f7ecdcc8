use bigdecimal::BigDecimal;

use crate::value::FieldElement;

/// A logical LP-token mint, reconstructed from raw ERC20-style Transfer
/// events by C6.transfer and finalized by the explicit Mint event (§4.6).
/// Ordered by `(transaction_hash, index)`; append-only once complete, but
/// mutable while `sender` is still unset (an "open" mint row).
#[derive(Debug, Clone)]
pub struct Mint {
    pub transaction_hash: FieldElement,
    pub index: i64,
    pub pair_id: FieldElement,
    pub sender: Option<FieldElement>,
    pub to: FieldElement,
    pub liquidity: BigDecimal,
    pub amount0: Option<BigDecimal>,
    pub amount1: Option<BigDecimal>,
    pub amount_usd: Option<BigDecimal>,
    pub timestamp: i64,
    pub zap_in: bool,
}

impl Mint {
    /// True once the explicit Mint event has finalized this row (§4.6).
    pub fn is_complete(&self) -> bool {
        self.sender.is_some()
    }
}

/// A logical LP-token burn, mirror of [`Mint`]. `needs_complete` marks a row
/// inserted on the direct-to-pair transfer leg, still awaiting the
/// from-pair-to-zero transfer leg that makes it canonical (§4.6).
#[derive(Debug, Clone)]
pub struct Burn {
    pub transaction_hash: FieldElement,
    pub index: i64,
    pub pair_id: FieldElement,
    pub sender: Option<FieldElement>,
    pub to: Option<FieldElement>,
    pub liquidity: BigDecimal,
    pub amount0: Option<BigDecimal>,
    pub amount1: Option<BigDecimal>,
    pub amount_usd: Option<BigDecimal>,
    pub timestamp: i64,
    pub needs_complete: bool,
    pub fee_to: Option<FieldElement>,
    pub fee_liquidity: Option<BigDecimal>,
}
