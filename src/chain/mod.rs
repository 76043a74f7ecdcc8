//! Chain RPC adapter (C2): read-only contract calls pinned to a block hash.

mod jsonrpc;
mod token_metadata;
#[cfg(test)]
pub mod fake;

pub use jsonrpc::JsonRpcChain;
pub use token_metadata::{fetch_balance, fetch_decimals, fetch_name, fetch_symbol, fetch_total_supply};

use async_trait::async_trait;
use num_bigint::BigUint;
use num_traits::One;
use sha3::{Digest, Keccak256};

use crate::errors::IndexerError;
use crate::value::FieldElement;

/// `2^250 - 1`, the mask `starknet_keccak` applies so a selector always fits
/// in a field element.
fn selector_mask() -> BigUint {
    (BigUint::one() << 250u32) - BigUint::one()
}

/// Derive a StarkNet entry-point selector from a method name, mirroring
/// `ContractFunction.get_selector` in the system this indexer replaces:
/// `starknet_keccak(name) = keccak256(name) & (2^250 - 1)`.
pub fn selector(method: &str) -> FieldElement {
    let digest = Keccak256::digest(method.as_bytes());
    let value = BigUint::from_bytes_be(&digest) & selector_mask();
    let mut bytes = [0u8; 32];
    let be = value.to_bytes_be();
    bytes[32 - be.len()..].copy_from_slice(&be);
    FieldElement::from_be_bytes(&bytes)
}

/// Read-only contract-call surface. Every call MUST be pinned to the block
/// hash under which the indexer is currently processing (§4.2) so that
/// lazily-created tokens read metadata as of their discovery block, not the
/// chain tip.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn call(
        &self,
        contract: &FieldElement,
        method: &str,
        args: &[FieldElement],
        at_block_hash: &FieldElement,
    ) -> Result<Vec<FieldElement>, IndexerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_is_deterministic_and_masked() {
        let a = selector("name");
        let b = selector("name");
        assert_eq!(a, b);
        assert_ne!(selector("name"), selector("symbol"));
    }
}
