use std::collections::BTreeMap;

use bigdecimal::BigDecimal;

use crate::value::FieldElement;

/// Current LP-contest standing for one user (§3, §4.9). Replaced wholesale
/// on every recompute, keyed by `user`. Maps are keyed by the pair's hex id
/// so they serialize deterministically into a single JSON column.
#[derive(Debug, Clone)]
pub struct LpContest {
    pub user: FieldElement,
    pub block: i64,
    pub timestamp: i64,
    pub contest_value: BigDecimal,
    pub total_lp_value: BigDecimal,
    pub total_time_eligible: i64,
    pub is_eligible: bool,
    pub lp_token_balances: BTreeMap<String, BigDecimal>,
    pub lp_values: BTreeMap<String, BigDecimal>,
}

impl LpContest {
    pub fn initial(user: FieldElement, block: i64, timestamp: i64) -> Self {
        Self {
            user,
            block,
            timestamp,
            contest_value: BigDecimal::from(0),
            total_lp_value: BigDecimal::from(0),
            total_time_eligible: 0,
            is_eligible: false,
            lp_token_balances: BTreeMap::new(),
            lp_values: BTreeMap::new(),
        }
    }
}

/// Append-only per-`(user, block)` journal entry mirroring the current
/// [`LpContest`] at the moment it was recomputed.
#[derive(Debug, Clone)]
pub struct LpContestBlock {
    pub user: FieldElement,
    pub block: i64,
    pub timestamp: i64,
    pub contest_value: BigDecimal,
    pub total_lp_value: BigDecimal,
    pub total_time_eligible: i64,
    pub is_eligible: bool,
    pub lp_token_balances: BTreeMap<String, BigDecimal>,
    pub lp_values: BTreeMap<String, BigDecimal>,
}

impl From<&LpContest> for LpContestBlock {
    fn from(c: &LpContest) -> Self {
        Self {
            user: c.user.clone(),
            block: c.block,
            timestamp: c.timestamp,
            contest_value: c.contest_value.clone(),
            total_lp_value: c.total_lp_value.clone(),
            total_time_eligible: c.total_time_eligible,
            is_eligible: c.is_eligible,
            lp_token_balances: c.lp_token_balances.clone(),
            lp_values: c.lp_values.clone(),
        }
    }
}
