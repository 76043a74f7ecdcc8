//! `Transfer` handler (§4.6), grounded in `core.py`'s `handle_transfer`: an
//! LP-token transfer is reconciled into a pending Mint/Burn row depending on
//! its endpoints, then both non-zero endpoints get their liquidity
//! position/snapshot refreshed.
//!
//! - `from == 0x0 && to == 0x1 && value == MINIMUM_LIQUIDITY (1000)`: the
//!   permanent minimum-liquidity lock transfer, ignored outright.
//! - `from == 0x0`: a mint's LP-token leg. A zap-in contract `to` address
//!   rewrites the pair's most recent mint row instead of opening a new one
//!   (the zap routes two legs of liquidity through one contract call, so
//!   the mint it produces is attributed to the zap's end user, not itself).
//! - `to == pair`: the first leg of a burn — LP tokens returned to the pair
//!   contract ahead of the actual burn. Opens a `needs_complete` burn row.
//! - `from == pair && to == 0x0`: the burn's completion. Reuses the
//!   `needs_complete` row opened above; if the pair itself shows up as an
//!   intervening leg (protocol-fee mint), that fee liquidity is absorbed
//!   into the burn row's `fee_to`/`fee_liquidity` rather than creating a
//!   second entity.

use bigdecimal::BigDecimal;

use crate::db::models::{Burn, Mint};
use crate::errors::IndexerError;
use crate::events::TransferEvent;
use crate::value::{to_decimal, FieldElement};

use super::context::{BlockCtx, HandlerEnv};
use super::liquidity::refresh_position_and_snapshot;
use super::lookups::ensure_transaction;

pub async fn handle(
    env: &HandlerEnv<'_>,
    block: &BlockCtx,
    pair_address: &FieldElement,
    tx_hash: &FieldElement,
    event: &TransferEvent,
) -> Result<(), IndexerError> {
    if event.from.is_zero() && event.to == FieldElement::from_u64(1) && event.value == FieldElement::from_u64(1000) {
        return Ok(());
    }

    ensure_transaction(env.storage, tx_hash, block.block_number, block.block_timestamp).await?;

    let value = to_decimal(event.value.to_biguint(), 18);
    bump_total_supply(env, pair_address, &value, event.from.is_zero(), block.block_number).await?;

    if event.from.is_zero() {
        if env.zap_in_addresses.contains(&event.to) {
            rewrite_last_mint_as_zap_in(env, pair_address, tx_hash, &value).await?;
        } else {
            open_mint(env, pair_address, tx_hash, &event.to, &value, block.block_timestamp).await?;
        }
    } else if *pair_address == event.to {
        open_needs_complete_burn(env, pair_address, tx_hash, &event.from, &value, block.block_timestamp).await?;
    } else if event.to.is_zero() {
        complete_burn(env, pair_address, tx_hash).await?;
    }

    for endpoint in [&event.from, &event.to] {
        if !endpoint.is_zero() {
            refresh_position_and_snapshot(env, block, pair_address, endpoint).await?;
        }
    }

    Ok(())
}

async fn bump_total_supply(
    env: &HandlerEnv<'_>,
    pair_address: &FieldElement,
    value: &BigDecimal,
    is_mint: bool,
    valid_from: i64,
) -> Result<(), IndexerError> {
    let pair = env
        .storage
        .get_pair(pair_address)
        .await?
        .ok_or_else(|| IndexerError::ReferentialAssert(format!("unknown pair {pair_address}")))?;
    let mut next = pair.next_version(valid_from);
    if is_mint {
        next.total_supply += value;
    } else {
        next.total_supply -= value;
    }
    env.storage.put_pair(Some(&pair), &next).await
}

async fn open_mint(
    env: &HandlerEnv<'_>,
    pair_address: &FieldElement,
    tx_hash: &FieldElement,
    to: &FieldElement,
    value: &BigDecimal,
    timestamp: i64,
) -> Result<(), IndexerError> {
    let index = next_index(env.storage.get_last_mint(pair_address, tx_hash).await?.map(|m| m.index));
    env.storage
        .put_mint(&Mint {
            transaction_hash: tx_hash.clone(),
            index,
            pair_id: pair_address.clone(),
            sender: None,
            to: to.clone(),
            liquidity: value.clone(),
            amount0: None,
            amount1: None,
            amount_usd: None,
            timestamp,
            zap_in: false,
        })
        .await
}

async fn rewrite_last_mint_as_zap_in(
    env: &HandlerEnv<'_>,
    pair_address: &FieldElement,
    tx_hash: &FieldElement,
    value: &BigDecimal,
) -> Result<(), IndexerError> {
    match env.storage.get_last_mint(pair_address, tx_hash).await? {
        Some(mint) => {
            env.storage.delete_mint(pair_address, tx_hash, mint.index).await?;
            env.storage
                .put_mint(&Mint {
                    liquidity: value.clone(),
                    zap_in: true,
                    ..mint
                })
                .await
        }
        None => {
            open_mint(env, pair_address, tx_hash, pair_address, value, 0).await
        }
    }
}

async fn open_needs_complete_burn(
    env: &HandlerEnv<'_>,
    pair_address: &FieldElement,
    tx_hash: &FieldElement,
    from: &FieldElement,
    value: &BigDecimal,
    timestamp: i64,
) -> Result<(), IndexerError> {
    let index = next_index(env.storage.get_last_burn(pair_address, tx_hash).await?.map(|b| b.index));
    env.storage
        .put_burn(&Burn {
            transaction_hash: tx_hash.clone(),
            index,
            pair_id: pair_address.clone(),
            sender: Some(from.clone()),
            to: None,
            liquidity: value.clone(),
            amount0: None,
            amount1: None,
            amount_usd: None,
            timestamp,
            needs_complete: true,
            fee_to: None,
            fee_liquidity: None,
        })
        .await
}

async fn complete_burn(
    env: &HandlerEnv<'_>,
    pair_address: &FieldElement,
    tx_hash: &FieldElement,
) -> Result<(), IndexerError> {
    let burn = env
        .storage
        .get_open_burn(pair_address, tx_hash)
        .await?
        .ok_or_else(|| {
            IndexerError::ReferentialAssert(format!(
                "Burn-completing transfer with no pending burn row for {pair_address}/{tx_hash}"
            ))
        })?;

    // An incomplete mint (no `sender`) in the same tx is a protocol-fee
    // mint: absorb it into this burn's fee_to/fee_liquidity and delete the
    // mint row rather than leaving it dangling (core.py's
    // `if mints and not _is_complete_mint(mints[-1])`).
    let (fee_to, fee_liquidity) = match env.storage.get_last_mint(pair_address, tx_hash).await? {
        Some(mint) if mint.sender.is_none() => {
            env.storage.delete_mint(pair_address, tx_hash, mint.index).await?;
            (Some(mint.to), Some(mint.liquidity))
        }
        _ => (burn.fee_to.clone(), burn.fee_liquidity.clone()),
    };

    env.storage
        .put_burn(&Burn {
            needs_complete: false,
            fee_to,
            fee_liquidity,
            ..burn
        })
        .await
}

fn next_index(last: Option<i64>) -> i64 {
    last.map(|i| i + 1).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::fake::FakeChainRpc;
    use crate::config::{ContestSettings, IndexerSettings, KafkaSettings, Settings};
    use crate::db::fake::FakeStorage;
    use crate::db::models::{Pair, Token};
    use num_bigint::BigUint;
    use std::str::FromStr;

    async fn seed_pair_and_tokens(storage: &FakeStorage, rpc: &FakeChainRpc, pair_address: &FieldElement) {
        let token0 = felt("0x1");
        let token1 = felt("0x2");
        storage.put_token(None, &Token::new(token0.clone(), "A".into(), "A".into(), 18, BigUint::from(0u32), 0)).await.unwrap();
        storage.put_token(None, &Token::new(token1.clone(), "B".into(), "B".into(), 18, BigUint::from(0u32), 0)).await.unwrap();
        storage.put_pair(None, &Pair::new(pair_address.clone(), token0, token1, 0, 1)).await.unwrap();
        rpc.set(pair_address, "balanceOf", vec![FieldElement::from_u64(0), FieldElement::from_u64(0)]);
    }

    fn felt(s: &str) -> FieldElement {
        FieldElement::from_hex(s).unwrap()
    }

    fn test_env<'a>(storage: &'a FakeStorage, rpc: &'a FakeChainRpc) -> HandlerEnv<'a> {
        let settings = Settings {
            stream: None,
            postgres: None,
            rpc: None,
            cache: None,
            indexer: IndexerSettings {
                indexer_id: "test".into(),
                whitelist: vec!["0x1".into()],
                eth_usdc_pair: "0x2".into(),
                zap_in_addresses: vec![],
                minimum_liquidity_threshold_eth: "0".into(),
            },
            contest: ContestSettings {
                db_prefix: "c".into(),
                start_block: 1,
                end_block: 2,
                eligible_pairs: vec![],
                min_lp_value: "25".into(),
                min_time_secs: 1,
                throttle_blocks: 100,
                scan_page_size: 10_000,
            },
            kafka: KafkaSettings {
                brokers: "x".into(),
                topic_prefix: "x".into(),
            },
            graphql_port: 8000,
        };
        HandlerEnv::new(storage, rpc, &settings).unwrap()
    }

    fn block(number: i64) -> BlockCtx {
        BlockCtx {
            block_number: number,
            block_hash: felt("0xblk"),
            block_timestamp: 1_000,
            eth_price: BigDecimal::from(0),
        }
    }

    #[tokio::test]
    async fn ignores_only_the_minimum_liquidity_lock() {
        let storage = FakeStorage::new();
        let rpc = FakeChainRpc::new();
        let env = test_env(&storage, &rpc);
        let pair_address = felt("0xp");
        seed_pair_and_tokens(&storage, &rpc, &pair_address).await;

        let lock = TransferEvent {
            from: FieldElement::zero(),
            to: FieldElement::from_u64(1),
            value: FieldElement::from_u64(1000),
        };
        handle(&env, &block(1), &pair_address, &felt("0xtx"), &lock).await.unwrap();
        let pair = storage.get_pair(&pair_address).await.unwrap().unwrap();
        assert_eq!(pair.total_supply, BigDecimal::from(0), "the lock transfer must not bump total_supply");
        assert!(storage.get_last_mint(&pair_address, &felt("0xtx")).await.unwrap().is_none());

        let not_the_lock = TransferEvent {
            from: FieldElement::zero(),
            to: FieldElement::from_u64(1),
            value: FieldElement::from_u64(999),
        };
        handle(&env, &block(2), &pair_address, &felt("0xtx2"), &not_the_lock).await.unwrap();
        assert!(storage.get_last_mint(&pair_address, &felt("0xtx2")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn burn_with_fee_absorbs_and_deletes_the_incomplete_mint() {
        let storage = FakeStorage::new();
        let rpc = FakeChainRpc::new();
        let env = test_env(&storage, &rpc);
        let pair_address = felt("0xp");
        let tx_hash = felt("0xtx");
        let fee_to = felt("0xfee");
        let user = felt("0xu");
        seed_pair_and_tokens(&storage, &rpc, &pair_address).await;

        // Transfer(0 -> feeTo, 0.1): incomplete protocol-fee mint, no Mint event follows it.
        handle(
            &env,
            &block(10),
            &pair_address,
            &tx_hash,
            &TransferEvent { from: FieldElement::zero(), to: fee_to.clone(), value: FieldElement::from_u64(100_000_000_000_000_000) },
        )
        .await
        .unwrap();
        assert!(storage.get_last_mint(&pair_address, &tx_hash).await.unwrap().is_some());

        // Transfer(U -> P, 5): opens the needs_complete burn row.
        handle(
            &env,
            &block(10),
            &pair_address,
            &tx_hash,
            &TransferEvent { from: user.clone(), to: pair_address.clone(), value: FieldElement::from_u64(5_000_000_000_000_000_000) },
        )
        .await
        .unwrap();

        // Transfer(P -> 0, 5): completes the burn.
        handle(
            &env,
            &block(10),
            &pair_address,
            &tx_hash,
            &TransferEvent { from: pair_address.clone(), to: FieldElement::zero(), value: FieldElement::from_u64(5_000_000_000_000_000_000) },
        )
        .await
        .unwrap();

        assert!(storage.get_last_mint(&pair_address, &tx_hash).await.unwrap().is_none(), "the fee mint row must be deleted");
        let burn = storage.get_open_burn(&pair_address, &tx_hash).await.unwrap().unwrap();
        assert!(!burn.needs_complete);
        assert_eq!(burn.fee_to, Some(fee_to));
        assert_eq!(burn.fee_liquidity, Some(BigDecimal::from_str("0.1").unwrap()));
    }
}
