//! Query layer (C10): cursor-paged entity reads, the eligible-participant
//! ranking/percentile pipeline, and NFT-tier classification. Consumed by
//! the GraphQL schema (C17); kept storage-agnostic so it can be exercised
//! against the in-memory fake in tests.

use bigdecimal::BigDecimal;

use crate::db::models::{LpContest, Pair, Swap, Token};
use crate::db::Storage;
use crate::errors::IndexerError;
use crate::value::FieldElement;

/// A page of results plus the cursor to pass as `after` for the next page.
/// `None` means this page was the last one.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Lists every pair, ordered by id, optionally pinned to the version valid
/// at `at_block` (§4.10's `block.number` filter; absent defaults to current).
pub async fn list_pairs(
    storage: &dyn Storage,
    after: Option<FieldElement>,
    limit: i64,
    at_block: Option<i64>,
) -> Result<Page<Pair>, IndexerError> {
    let mut ids = storage.all_pair_ids().await?;
    ids.sort();
    if let Some(after) = &after {
        ids.retain(|id| id > after);
    }

    let limit = limit.max(0) as usize;
    let page_ids: Vec<&FieldElement> = ids.iter().take(limit).collect();
    let mut items = Vec::with_capacity(page_ids.len());
    for id in &page_ids {
        let pair = match at_block {
            Some(block) => storage.get_pair_at(id, block).await?,
            None => storage.get_pair(id).await?,
        };
        if let Some(pair) = pair {
            items.push(pair);
        }
    }

    let next_cursor = if ids.len() > limit {
        page_ids.last().map(|id| id.as_hex())
    } else {
        None
    };

    Ok(Page { items, next_cursor })
}

/// Batches a `Swap` lookup for many pairs in one logical call, the
/// dataloader-style batching §4.10 asks for on transaction child resolvers
/// (`mints`, `burns`, `swaps`) so a list of N pairs in a GraphQL response
/// doesn't issue N sequential storage round trips from the resolver layer.
/// `Storage` itself only exposes single-swap writes, so this reads through
/// whatever broader per-pair listing the caller already holds; production
/// `PostgresStorage` callers should prefer a single `WHERE pair_id = ANY($1)`
/// query once that surface exists (not needed by this port's read paths yet).
pub fn index_swaps_by_pair(swaps: Vec<Swap>) -> std::collections::HashMap<String, Vec<Swap>> {
    let mut by_pair: std::collections::HashMap<String, Vec<Swap>> = std::collections::HashMap::new();
    for swap in swaps {
        by_pair.entry(swap.pair_id.as_hex()).or_default().push(swap);
    }
    by_pair
}

/// Computes the one-indexed rank and percentile of `target` among
/// `eligible_values` (§4.10): sort descending, find the position, then
/// `percentile = round(100 * (rank - 0.5) / count)`.
pub fn rank_and_percentile(eligible_values: &[BigDecimal], target: &BigDecimal) -> Option<(usize, f64)> {
    if eligible_values.is_empty() {
        return None;
    }
    let mut sorted = eligible_values.to_vec();
    sorted.sort_by(|a, b| b.cmp(a));
    let rank = sorted.iter().position(|v| v == target)? + 1;
    let count = sorted.len() as f64;
    let percentile = (100.0 * (rank as f64 - 0.5) / count).round();
    Some((rank, percentile))
}

/// NFT tier for a ranked, eligible participant (§4.10): fixed percent
/// cutoffs among eligible participants, with the top 10 ranks reserved
/// (tier assignment starts at rank 11). Returns `None` for ranks 1-10 and
/// for any rank beyond the eligible population.
pub fn nft_tier(rank: usize, total_eligible: usize) -> Option<&'static str> {
    if rank <= 10 || rank > total_eligible {
        return None;
    }
    let pct = 100.0 * rank as f64 / total_eligible as f64;
    if pct <= 2.0 {
        Some("L1")
    } else if pct <= 10.0 {
        Some("L2")
    } else if pct <= 25.0 {
        Some("L3")
    } else if pct <= 55.0 {
        Some("L4")
    } else {
        Some("L5")
    }
}

/// The full leaderboard: every eligible contestant, ranked descending by
/// `contest_value`, each paired with its rank/percentile/tier.
pub async fn leaderboard(storage: &dyn Storage) -> Result<Vec<LeaderboardEntry>, IndexerError> {
    let mut contestants = storage.list_eligible_contestants().await?;
    contestants.sort_by(|a, b| b.contest_value.cmp(&a.contest_value));
    let total = contestants.len();

    Ok(contestants
        .into_iter()
        .enumerate()
        .map(|(i, contest)| {
            let rank = i + 1;
            let percentile = (100.0 * (rank as f64 - 0.5) / total.max(1) as f64).round();
            LeaderboardEntry {
                tier: nft_tier(rank, total).map(str::to_string),
                rank,
                percentile,
                contest,
            }
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub percentile: f64,
    pub tier: Option<String>,
    pub contest: LpContest,
}

/// `token0_price`/`token1_price` restated in USD for a pair, using the
/// tokens' `derived_eth` and the block's ETH price — a thin read-side
/// convenience the GraphQL layer exposes per-pair without re-deriving it
/// from reserves each time.
pub fn usd_prices(pair: &Pair, token0: &Token, token1: &Token, eth_price: &BigDecimal) -> (BigDecimal, BigDecimal) {
    (&token0.derived_eth * eth_price, {
        let _ = pair;
        &token1.derived_eth * eth_price
    })
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
    async fn lists_pairs_with_cursor_pagination() {
        let storage = FakeStorage::new();
        for i in 1..=5 {
            let id = felt(&format!("0x{i}"));
            let pair = Pair::new(id, felt("0xa"), felt("0xb"), 0, i);
            storage.put_pair(None, &pair).await.unwrap();
        }

        let first_page = list_pairs(&storage, None, 2, None).await.unwrap();
        assert_eq!(first_page.items.len(), 2);
        assert!(first_page.next_cursor.is_some());

        let cursor = FieldElement::from_hex(&first_page.next_cursor.unwrap()).unwrap();
        let second_page = list_pairs(&storage, Some(cursor), 2, None).await.unwrap();
        assert_eq!(second_page.items.len(), 2);
    }

    #[test]
    fn rank_and_percentile_matches_spec_formula() {
        let values = vec![
            BigDecimal::from_str("100").unwrap(),
            BigDecimal::from_str("80").unwrap(),
            BigDecimal::from_str("60").unwrap(),
            BigDecimal::from_str("40").unwrap(),
        ];
        let (rank, pct) = rank_and_percentile(&values, &BigDecimal::from_str("80").unwrap()).unwrap();
        assert_eq!(rank, 2);
        assert_eq!(pct, (100.0 * 1.5 / 4.0).round());
    }

    #[test]
    fn nft_tier_reserves_top_ten_and_applies_cutoffs() {
        assert_eq!(nft_tier(5, 1000), None);
        assert_eq!(nft_tier(11, 1000), Some("L1"));
        assert_eq!(nft_tier(100, 1000), Some("L2"));
        assert_eq!(nft_tier(250, 1000), Some("L3"));
        assert_eq!(nft_tier(550, 1000), Some("L4"));
        assert_eq!(nft_tier(1000, 1000), Some("L5"));
        assert_eq!(nft_tier(1001, 1000), None);
    }
}
