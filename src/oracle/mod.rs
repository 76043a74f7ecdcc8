//! Price oracle (C7): derives each token's ETH price via a one-hop BFS over
//! a whitelist of reference pairs, and classifies tracked vs untracked USD
//! figures (§4.7). All of this is a pure function of current storage state
//! plus a write-through side effect on `Token::derived_eth`, mirroring the
//! original system's `find_eth_per_token`.

use bigdecimal::BigDecimal;

use crate::db::models::{Pair, Token};
use crate::db::Storage;
use crate::errors::IndexerError;
use crate::value::FieldElement;

/// Reads the ETH/USDC reference pair's `token1_price` (§4.7) — ETH is
/// token0 of that pair by address ordering, so `token1_price` (reserve1 /
/// reserve0) is the USDC-per-ETH rate. Returns 0 if the pair does not exist
/// yet (e.g. before it has been created on-chain).
pub async fn get_eth_price(
    storage: &dyn Storage,
    eth_usdc_pair: &FieldElement,
) -> Result<BigDecimal, IndexerError> {
    match storage.get_pair(eth_usdc_pair).await? {
        Some(pair) => Ok(pair.token1_price),
        None => Ok(BigDecimal::from(0)),
    }
}

/// Derives `token`'s ETH price by looking for a whitelisted counterparty
/// pair, in whitelist order, checking both orientations. Writes the result
/// through to the token's `derived_eth` before returning it (§4.7, §9
/// "cyclic references resolved by id, not pointer"). Returns 1 for ETH
/// itself, 0 if no whitelisted pair exists.
pub async fn find_eth_per_token(
    storage: &dyn Storage,
    token: &FieldElement,
    eth_id: &FieldElement,
    whitelist: &[FieldElement],
    minimum_liquidity_threshold_eth: &BigDecimal,
) -> Result<BigDecimal, IndexerError> {
    if token == eth_id {
        return Ok(BigDecimal::from(1));
    }

    for whitelisted in whitelist {
        // pair.token0 == token, pair.token1 == whitelisted: token1_price
        // (reserve1/reserve0) is the whitelisted-per-token rate.
        if let Some(pair) = storage.get_pair_by_tokens(token, whitelisted).await? {
            if &pair.reserve_eth >= minimum_liquidity_threshold_eth {
                if let Some(counterparty) = storage.get_token(whitelisted).await? {
                    let derived = &pair.token1_price * &counterparty.derived_eth;
                    write_through(storage, token, &derived).await?;
                    return Ok(derived);
                }
            }
        }

        // pair.token0 == whitelisted, pair.token1 == token: token0_price
        // (reserve0/reserve1) is the whitelisted-per-token rate.
        if let Some(pair) = storage.get_pair_by_tokens(whitelisted, token).await? {
            if &pair.reserve_eth >= minimum_liquidity_threshold_eth {
                if let Some(counterparty) = storage.get_token(whitelisted).await? {
                    let derived = &pair.token0_price * &counterparty.derived_eth;
                    write_through(storage, token, &derived).await?;
                    return Ok(derived);
                }
            }
        }
    }

    Ok(BigDecimal::from(0))
}

async fn write_through(
    storage: &dyn Storage,
    token: &FieldElement,
    derived_eth: &BigDecimal,
) -> Result<(), IndexerError> {
    let current = storage
        .get_token(token)
        .await?
        .ok_or_else(|| IndexerError::ReferentialAssert(format!("unknown token {token}")))?;
    let mut next = current.next_version(current.valid_from);
    next.derived_eth = derived_eth.clone();
    storage.put_token(Some(&current), &next).await
}

fn is_whitelisted(id: &FieldElement, whitelist: &[FieldElement]) -> bool {
    whitelist.contains(id)
}

/// Tracked liquidity USD (§4.7): both sides whitelisted sums both legs; one
/// side whitelisted doubles that leg (the untracked side is assumed to
/// mirror it in a balanced pool); neither whitelisted contributes nothing.
pub fn get_tracked_liquidity_usd(
    token0: &Token,
    token0_amount: &BigDecimal,
    token1: &Token,
    token1_amount: &BigDecimal,
    eth_price: &BigDecimal,
    whitelist: &[FieldElement],
) -> BigDecimal {
    let price0 = &token0.derived_eth * eth_price;
    let price1 = &token1.derived_eth * eth_price;
    let token0_whitelisted = is_whitelisted(&token0.id, whitelist);
    let token1_whitelisted = is_whitelisted(&token1.id, whitelist);

    if token0_whitelisted && token1_whitelisted {
        token0_amount * &price0 + token1_amount * &price1
    } else if token0_whitelisted {
        token0_amount * &price0 * BigDecimal::from(2)
    } else if token1_whitelisted {
        token1_amount * &price1 * BigDecimal::from(2)
    } else {
        BigDecimal::from(0)
    }
}

/// Tracked volume USD (§4.7): unconditionally the average of both legs'
/// USD value, with no whitelist gating (unlike tracked liquidity).
pub fn get_tracked_volume_usd(
    token0: &Token,
    token0_amount: &BigDecimal,
    token1: &Token,
    token1_amount: &BigDecimal,
    eth_price: &BigDecimal,
    _pair: &Pair,
) -> BigDecimal {
    let price0 = &token0.derived_eth * eth_price;
    let price1 = &token1.derived_eth * eth_price;
    (token0_amount * price0 + token1_amount * price1) / BigDecimal::from(2)
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
    async fn derives_eth_price_through_whitelisted_pair() {
        let storage = FakeStorage::new();
        let eth = felt("0x1");
        let usdc = felt("0x2");
        let x = felt("0x3");
        let whitelist = vec![eth.clone(), usdc.clone()];

        let mut usdc_token = Token::new(usdc.clone(), "USDC".into(), "USDC".into(), 6, 0u32.into(), 1);
        usdc_token.derived_eth = BigDecimal::from_str("0.0005").unwrap();
        storage.put_token(None, &usdc_token).await.unwrap();

        let x_token = Token::new(x.clone(), "X".into(), "X".into(), 18, 0u32.into(), 1);
        storage.put_token(None, &x_token).await.unwrap();

        let mut pair = Pair::new(felt("0x4"), x.clone(), usdc.clone(), 1, 1);
        pair.token1_price = BigDecimal::from_str("2.0").unwrap();
        storage.put_pair(None, &pair).await.unwrap();

        let derived = find_eth_per_token(&storage, &x, &eth, &whitelist, &BigDecimal::from(0))
            .await
            .unwrap();
        assert_eq!(derived, BigDecimal::from_str("0.001").unwrap());

        let reloaded = storage.get_token(&x).await.unwrap().unwrap();
        assert_eq!(reloaded.derived_eth, BigDecimal::from_str("0.001").unwrap());
    }

    #[tokio::test]
    async fn eth_itself_is_one() {
        let storage = FakeStorage::new();
        let eth = felt("0x1");
        let derived = find_eth_per_token(&storage, &eth, &eth, &[], &BigDecimal::from(0))
            .await
            .unwrap();
        assert_eq!(derived, BigDecimal::from(1));
    }

    #[tokio::test]
    async fn no_whitelisted_pair_is_zero() {
        let storage = FakeStorage::new();
        let eth = felt("0x1");
        let lonely = felt("0x9");
        let derived = find_eth_per_token(&storage, &lonely, &eth, &[eth.clone()], &BigDecimal::from(0))
            .await
            .unwrap();
        assert_eq!(derived, BigDecimal::from(0));
    }
}
