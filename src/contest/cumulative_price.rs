//! Per-pair cumulative-price series extension (§4.9), grounded in
//! `tasks.py`'s `update_pair_cumulative_price`. Resumes from the last
//! `pair_block_cum_price` row (or seeds at `contest_start_block`), then
//! walks forward one block at a time computing both a flat running sum of
//! per-block USD price and a time-weighted (seconds-scaled) variant.

use bigdecimal::BigDecimal;

use crate::db::models::PairBlockCumulativePrice;
use crate::db::Storage;
use crate::errors::IndexerError;
use crate::value::{price, FieldElement};

pub async fn extend_cumulative_price_series(
    storage: &dyn Storage,
    pair: &FieldElement,
    upto_block: i64,
    contest_start_block: i64,
) -> Result<(), IndexerError> {
    let (mut next_block, mut cumulative_price_usd, mut time_cumulative_price_usd) =
        match storage.last_cumulative_price(pair).await? {
            Some(row) => (row.block + 1, row.cumulative_price_usd, row.time_cumulative_price_usd),
            None => (contest_start_block, BigDecimal::from(0), BigDecimal::from(0)),
        };

    while next_block <= upto_block {
        let block_number = next_block;
        let pair_state = storage
            .get_pair_at(pair, block_number)
            .await?
            .ok_or_else(|| IndexerError::ReferentialAssert(format!("no pair state for {pair} at block {block_number}")))?;
        let price_usd = price(&pair_state.reserve_usd, &pair_state.total_supply);

        if block_number == contest_start_block {
            cumulative_price_usd = price_usd.clone();
            time_cumulative_price_usd = price_usd.clone();
        } else {
            cumulative_price_usd += &price_usd;
            let this_ts = storage.block_timestamp_at_or_before(block_number).await?.unwrap_or(0);
            let prev_ts = storage.block_timestamp_at_or_before(block_number - 1).await?.unwrap_or(this_ts);
            let block_secs = this_ts - prev_ts;
            time_cumulative_price_usd += BigDecimal::from(block_secs) * &price_usd;
        }

        storage
            .put_cumulative_price(&PairBlockCumulativePrice {
                pair: pair.clone(),
                block: block_number,
                price_usd,
                cumulative_price_usd: cumulative_price_usd.clone(),
                time_cumulative_price_usd: time_cumulative_price_usd.clone(),
            })
            .await?;

        next_block += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fake::FakeStorage;
    use std::str::FromStr;

    fn felt(s: &str) -> FieldElement {
        FieldElement::from_hex(s).unwrap()
    }

    #[tokio::test]
    async fn seeds_at_contest_start_and_accumulates() {
        let storage = FakeStorage::new();
        let pair_id = felt("0xaa");

        for block in 100..=102 {
            let mut pair = crate::db::models::Pair::new(pair_id.clone(), felt("0x1"), felt("0x2"), 0, block);
            pair.reserve_usd = BigDecimal::from_str("100").unwrap();
            pair.total_supply = BigDecimal::from_str("10").unwrap();
            storage.put_pair(None, &pair).await.unwrap();
        }

        extend_cumulative_price_series(&storage, &pair_id, 102, 100).await.unwrap();

        let last = storage.last_cumulative_price(&pair_id).await.unwrap().unwrap();
        assert_eq!(last.block, 102);
        // price_usd = 100/10 = 10 each block; seeded at 100, then +10 twice = 30
        assert_eq!(last.cumulative_price_usd, BigDecimal::from_str("30").unwrap());
    }
}
