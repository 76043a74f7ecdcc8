use bigdecimal::BigDecimal;

use crate::chain::ChainRpc;
use crate::config::Settings;
use crate::db::Storage;
use crate::value::FieldElement;

/// Everything a block's worth of event handlers needs but that doesn't
/// change within the block: the storage/RPC handles and the settings
/// derived from them. Built once per indexer run, borrowed by every call.
pub struct HandlerEnv<'a> {
    pub storage: &'a dyn Storage,
    pub rpc: &'a dyn ChainRpc,
    pub whitelist: Vec<FieldElement>,
    pub eth_id: FieldElement,
    pub eth_usdc_pair: FieldElement,
    pub factory_address: FieldElement,
    pub zap_in_addresses: Vec<FieldElement>,
    pub minimum_liquidity_threshold_eth: BigDecimal,
}

impl<'a> HandlerEnv<'a> {
    pub fn new(
        storage: &'a dyn Storage,
        rpc: &'a dyn ChainRpc,
        settings: &Settings,
    ) -> Result<Self, crate::errors::IndexerError> {
        let parse = |s: &str| -> Result<FieldElement, crate::errors::IndexerError> {
            FieldElement::from_hex(s)
                .ok_or_else(|| crate::errors::IndexerError::MissingConfig(format!("invalid address {s}")))
        };

        let whitelist = settings
            .indexer
            .whitelist
            .iter()
            .map(|s| parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        let zap_in_addresses = settings
            .indexer
            .zap_in_addresses
            .iter()
            .map(|s| parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        let eth_id = whitelist
            .first()
            .cloned()
            .ok_or_else(|| crate::errors::IndexerError::MissingConfig("indexer.whitelist[0] (ETH)".to_string()))?;
        let eth_usdc_pair = parse(&settings.indexer.eth_usdc_pair)?;
        let factory_address = match &settings.stream {
            Some(stream) => parse(&stream.factory_address)?,
            None => parse("0x00dad44c139a476c7a17fc8141e6db680e9abc9f56fe249a105094c44382c2fd")?,
        };
        let minimum_liquidity_threshold_eth = settings
            .indexer
            .minimum_liquidity_threshold_eth
            .parse::<BigDecimal>()
            .unwrap_or_else(|_| BigDecimal::from(0));

        Ok(Self {
            storage,
            rpc,
            whitelist,
            eth_id,
            eth_usdc_pair,
            factory_address,
            zap_in_addresses,
            minimum_liquidity_threshold_eth,
        })
    }
}

/// Per-block context (§4.5): the header plus the once-per-block ETH price,
/// read by every handler invoked while processing this block's events.
#[derive(Debug, Clone)]
pub struct BlockCtx {
    pub block_number: i64,
    pub block_hash: FieldElement,
    pub block_timestamp: i64,
    pub eth_price: BigDecimal,
}
