//! `PairCreated` handler (§4.6), grounded in `factory.py`'s
//! `handle_pair_created`.

use crate::db::models::{Factory, Pair};
use crate::errors::IndexerError;
use crate::events::PairCreatedEvent;
use crate::value::FieldElement;

use super::context::{BlockCtx, HandlerEnv};
use super::lookups::find_or_create_token;

pub async fn handle(
    env: &HandlerEnv<'_>,
    block: &BlockCtx,
    factory_address: &FieldElement,
    event: &PairCreatedEvent,
) -> Result<(), IndexerError> {
    let factory = match env.storage.get_factory(factory_address).await? {
        Some(existing) => {
            let mut next = existing.next_version(block.block_number);
            next.pair_count += 1;
            env.storage.put_factory(Some(&existing), &next).await?;
            next
        }
        None => {
            let mut fresh = Factory::new(factory_address.clone(), block.block_number);
            fresh.pair_count = 1;
            env.storage.put_factory(None, &fresh).await?;
            fresh
        }
    };
    let _ = factory;

    find_or_create_token(env, &event.token0, &block.block_hash, block.block_number).await?;
    find_or_create_token(env, &event.token1, &block.block_hash, block.block_number).await?;

    let pair = Pair::new(
        event.pair.clone(),
        event.token0.clone(),
        event.token1.clone(),
        block.block_timestamp,
        block.block_number,
    );
    env.storage.put_pair(None, &pair).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use crate::chain::fake::FakeChainRpc;
    use crate::config::{ContestSettings, IndexerSettings, KafkaSettings, Settings};
    use crate::db::fake::FakeStorage;

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

    #[tokio::test]
    async fn creates_factory_tokens_and_pair_on_first_pair() {
        let storage = FakeStorage::new();
        let rpc = FakeChainRpc::new();
        let token0 = felt("0xaaa");
        let token1 = felt("0xbbb");

        let mut name0 = [0u8; 32];
        name0[29..].copy_from_slice(b"Foo");
        rpc.set(&token0, "name", vec![FieldElement::from_be_bytes(&name0)]);
        rpc.set(&token0, "symbol", vec![FieldElement::from_be_bytes(&name0)]);
        rpc.set(&token0, "decimals", vec![FieldElement::from_u64(18)]);
        rpc.set(&token0, "totalSupply", vec![FieldElement::from_u64(0), FieldElement::from_u64(0)]);

        let mut name1 = [0u8; 32];
        name1[29..].copy_from_slice(b"Bar");
        rpc.set(&token1, "name", vec![FieldElement::from_be_bytes(&name1)]);
        rpc.set(&token1, "symbol", vec![FieldElement::from_be_bytes(&name1)]);
        rpc.set(&token1, "decimals", vec![FieldElement::from_u64(18)]);
        rpc.set(&token1, "totalSupply", vec![FieldElement::from_u64(0), FieldElement::from_u64(0)]);

        let env = test_env(&storage, &rpc);
        let block = BlockCtx {
            block_number: 10,
            block_hash: felt("0x999"),
            block_timestamp: 1000,
            eth_price: BigDecimal::from(0),
        };
        let factory_address = felt("0xfac");
        let event = PairCreatedEvent {
            token0: token0.clone(),
            token1: token1.clone(),
            pair: felt("0xpair"),
            total_pairs: 1,
        };

        handle(&env, &block, &factory_address, &event).await.unwrap();

        let factory = storage.get_factory(&factory_address).await.unwrap().unwrap();
        assert_eq!(factory.pair_count, 1);

        let pair = storage.get_pair(&felt("0xpair")).await.unwrap().unwrap();
        assert_eq!(pair.token0_id, token0);
        assert_eq!(pair.token1_id, token1);

        let t0 = storage.get_token(&token0).await.unwrap().unwrap();
        assert_eq!(t0.symbol, "Foo");
    }
}
