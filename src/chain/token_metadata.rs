use num_bigint::BigUint;

use crate::errors::IndexerError;
use crate::value::FieldElement;

use super::ChainRpc;

/// `name()`/`symbol()`/`decimals()`/`totalSupply()`/`balanceOf(owner)`,
/// the five read-only calls used at token-discovery time. Mirrors
/// `fetch_token_name`/`fetch_token_symbol`/`fetch_token_decimals`/
/// `fetch_token_total_supply`/`fetch_token_balance` in the system this
/// indexer replaces.
pub async fn fetch_name(
    rpc: &dyn ChainRpc,
    token: &FieldElement,
    at_block_hash: &FieldElement,
) -> Result<String, IndexerError> {
    let result = rpc.call(token, "name", &[], at_block_hash).await?;
    let felt = result
        .first()
        .ok_or_else(|| IndexerError::Rpc("name() returned no felts".to_string()))?;
    Ok(felt.decode_shortstring())
}

pub async fn fetch_symbol(
    rpc: &dyn ChainRpc,
    token: &FieldElement,
    at_block_hash: &FieldElement,
) -> Result<String, IndexerError> {
    let result = rpc.call(token, "symbol", &[], at_block_hash).await?;
    let felt = result
        .first()
        .ok_or_else(|| IndexerError::Rpc("symbol() returned no felts".to_string()))?;
    Ok(felt.decode_shortstring())
}

pub async fn fetch_decimals(
    rpc: &dyn ChainRpc,
    token: &FieldElement,
    at_block_hash: &FieldElement,
) -> Result<u32, IndexerError> {
    let result = rpc.call(token, "decimals", &[], at_block_hash).await?;
    let felt = result
        .first()
        .ok_or_else(|| IndexerError::Rpc("decimals() returned no felts".to_string()))?;
    biguint_to_u32(felt.to_biguint())
}

pub async fn fetch_total_supply(
    rpc: &dyn ChainRpc,
    token: &FieldElement,
    at_block_hash: &FieldElement,
) -> Result<BigUint, IndexerError> {
    fetch_u256(rpc, token, "totalSupply", &[], at_block_hash).await
}

pub async fn fetch_balance(
    rpc: &dyn ChainRpc,
    token: &FieldElement,
    owner: &FieldElement,
    at_block_hash: &FieldElement,
) -> Result<BigUint, IndexerError> {
    fetch_u256(rpc, token, "balanceOf", std::slice::from_ref(owner), at_block_hash).await
}

async fn fetch_u256(
    rpc: &dyn ChainRpc,
    contract: &FieldElement,
    method: &str,
    args: &[FieldElement],
    at_block_hash: &FieldElement,
) -> Result<BigUint, IndexerError> {
    let result = rpc.call(contract, method, args, at_block_hash).await?;
    if result.len() < 2 {
        return Err(IndexerError::Rpc(format!(
            "{method}() expected a (low, high) uint256 pair, got {} felts",
            result.len()
        )));
    }
    let lo = result[0].to_biguint().clone();
    let hi = result[1].to_biguint().clone();
    Ok(lo + (hi << 128u32))
}

fn biguint_to_u32(n: &BigUint) -> Result<u32, IndexerError> {
    let digits = n.to_u32_digits();
    match digits.as_slice() {
        [] => Ok(0),
        [only] => Ok(*only),
        _ => Err(IndexerError::Rpc("decimals() value does not fit in u32".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::fake::FakeChainRpc;

    #[tokio::test]
    async fn fetches_metadata_via_fake_rpc() {
        let rpc = FakeChainRpc::new();
        let token = FieldElement::from_hex("0xaa").unwrap();
        let block_hash = FieldElement::from_hex("0x1").unwrap();

        let mut symbol_bytes = [0u8; 32];
        symbol_bytes[28..].copy_from_slice(b"USDC");
        rpc.set(&token, "symbol", vec![FieldElement::from_be_bytes(&symbol_bytes)]);
        rpc.set(&token, "decimals", vec![FieldElement::from_u64(6)]);
        rpc.set(
            &token,
            "totalSupply",
            vec![FieldElement::from_u64(1_000_000), FieldElement::from_u64(0)],
        );

        assert_eq!(fetch_symbol(&rpc, &token, &block_hash).await.unwrap(), "USDC");
        assert_eq!(fetch_decimals(&rpc, &token, &block_hash).await.unwrap(), 6);
        assert_eq!(
            fetch_total_supply(&rpc, &token, &block_hash).await.unwrap(),
            BigUint::from(1_000_000u64)
        );
    }
}
