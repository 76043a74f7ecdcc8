//! Event decoder (C3): per-event-kind binary -> record deserialization.
//!
//! Events are matched by their first key. Six kinds are recognized
//! (PairCreated, Transfer, Swap, Sync, Mint, Burn); everything else is
//! logged and skipped (§4.3, §7 unknown-event-key).

use log::warn;
use once_cell::sync::Lazy;

use crate::chain::selector;
use crate::value::FieldElement;

/// A single event as delivered by the upstream stream (§6).
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub from_address: FieldElement,
    pub keys: Vec<FieldElement>,
    pub data: Vec<FieldElement>,
    pub transaction_hash: FieldElement,
}

pub static PAIR_CREATED_KEY: Lazy<FieldElement> = Lazy::new(|| selector("PairCreated"));
pub static TRANSFER_KEY: Lazy<FieldElement> = Lazy::new(|| selector("Transfer"));
pub static SWAP_KEY: Lazy<FieldElement> = Lazy::new(|| selector("Swap"));
pub static SYNC_KEY: Lazy<FieldElement> = Lazy::new(|| selector("Sync"));
pub static MINT_KEY: Lazy<FieldElement> = Lazy::new(|| selector("Mint"));
pub static BURN_KEY: Lazy<FieldElement> = Lazy::new(|| selector("Burn"));

#[derive(Debug, Clone)]
pub struct PairCreatedEvent {
    pub token0: FieldElement,
    pub token1: FieldElement,
    pub pair: FieldElement,
    pub total_pairs: u64,
}

#[derive(Debug, Clone)]
pub struct TransferEvent {
    pub from: FieldElement,
    pub to: FieldElement,
    pub value: FieldElement,
}

#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub reserve0: FieldElement,
    pub reserve1: FieldElement,
}

#[derive(Debug, Clone)]
pub struct MintEvent {
    pub sender: FieldElement,
    pub amount0: FieldElement,
    pub amount1: FieldElement,
}

#[derive(Debug, Clone)]
pub struct BurnEvent {
    pub sender: FieldElement,
    pub amount0: FieldElement,
    pub amount1: FieldElement,
    pub to: FieldElement,
}

#[derive(Debug, Clone)]
pub struct SwapEvent {
    pub sender: FieldElement,
    pub amount0_in: FieldElement,
    pub amount1_in: FieldElement,
    pub amount0_out: FieldElement,
    pub amount1_out: FieldElement,
    pub to: FieldElement,
}

#[derive(Debug, Clone)]
pub enum DecodedEvent {
    PairCreated(PairCreatedEvent),
    Transfer(TransferEvent),
    Sync(SyncEvent),
    Mint(MintEvent),
    Burn(BurnEvent),
    Swap(SwapEvent),
}

fn u256_at(data: &[FieldElement], index: usize) -> Option<FieldElement> {
    let lo = data.get(index)?.to_biguint().clone();
    let hi = data.get(index + 1)?.to_biguint().clone();
    let mut bytes = [0u8; 32];
    let combined = lo + (hi << 128u32);
    let be = combined.to_bytes_be();
    bytes[32 - be.len()..].copy_from_slice(&be);
    Some(FieldElement::from_be_bytes(&bytes))
}

/// Decode a raw event by dispatching on `keys[0]`. Returns `None` (after
/// logging a warning) for an unrecognized key, per §7's fail-closed policy.
pub fn decode(event: &RawEvent) -> Option<DecodedEvent> {
    let key = event.keys.first()?;
    let data = &event.data;

    if *key == *PAIR_CREATED_KEY {
        let total_pairs = data.get(3)?.to_biguint().to_u64_digits().first().copied().unwrap_or(0);
        Some(DecodedEvent::PairCreated(PairCreatedEvent {
            token0: data.first()?.clone(),
            token1: data.get(1)?.clone(),
            pair: data.get(2)?.clone(),
            total_pairs,
        }))
    } else if *key == *TRANSFER_KEY {
        Some(DecodedEvent::Transfer(TransferEvent {
            from: data.first()?.clone(),
            to: data.get(1)?.clone(),
            value: u256_at(data, 2)?,
        }))
    } else if *key == *SYNC_KEY {
        Some(DecodedEvent::Sync(SyncEvent {
            reserve0: u256_at(data, 0)?,
            reserve1: u256_at(data, 2)?,
        }))
    } else if *key == *MINT_KEY {
        Some(DecodedEvent::Mint(MintEvent {
            sender: data.first()?.clone(),
            amount0: u256_at(data, 1)?,
            amount1: u256_at(data, 3)?,
        }))
    } else if *key == *BURN_KEY {
        Some(DecodedEvent::Burn(BurnEvent {
            sender: data.first()?.clone(),
            amount0: u256_at(data, 1)?,
            amount1: u256_at(data, 3)?,
            to: data.get(5)?.clone(),
        }))
    } else if *key == *SWAP_KEY {
        Some(DecodedEvent::Swap(SwapEvent {
            sender: data.first()?.clone(),
            amount0_in: u256_at(data, 1)?,
            amount1_in: u256_at(data, 3)?,
            amount0_out: u256_at(data, 5)?,
            amount1_out: u256_at(data, 7)?,
            to: data.get(9)?.clone(),
        }))
    } else {
        warn!("unknown event key {key}, skipping");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn felt(n: u64) -> FieldElement {
        FieldElement::from_u64(n)
    }

    #[test]
    fn decodes_pair_created() {
        let event = RawEvent {
            from_address: felt(1),
            keys: vec![PAIR_CREATED_KEY.clone()],
            data: vec![felt(0xAA), felt(0xBB), felt(0xCC), felt(1)],
            transaction_hash: felt(42),
        };
        match decode(&event).unwrap() {
            DecodedEvent::PairCreated(e) => {
                assert_eq!(e.token0, felt(0xAA));
                assert_eq!(e.total_pairs, 1);
            }
            _ => panic!("expected PairCreated"),
        }
    }

    #[test]
    fn decodes_transfer_u256_value() {
        let event = RawEvent {
            from_address: felt(1),
            keys: vec![TRANSFER_KEY.clone()],
            data: vec![felt(0), felt(0xAA), felt(10), felt(0)],
            transaction_hash: felt(42),
        };
        match decode(&event).unwrap() {
            DecodedEvent::Transfer(e) => {
                assert_eq!(e.value, felt(10));
            }
            _ => panic!("expected Transfer"),
        }
    }

    #[test]
    fn unknown_key_returns_none() {
        let event = RawEvent {
            from_address: felt(1),
            keys: vec![felt(0xDEAD)],
            data: vec![],
            transaction_hash: felt(42),
        };
        assert!(decode(&event).is_none());
    }
}
