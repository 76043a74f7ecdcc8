use std::env;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::errors::IndexerError;

fn env_var(name: &str) -> Result<String, IndexerError> {
    env::var(name).map_err(|_| IndexerError::MissingConfig(name.to_string()))
}

/// Upstream block/event stream endpoint (`STREAM_URL`).
#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub url: String,
    /// Boot cursor: the first block the indexer subscribes from on a cold start.
    pub index_from_block: i64,
    /// The factory contract address events are initially filtered by.
    pub factory_address: String,
}

/// Storage endpoint. The env var is named `MONGO_URL` for interface parity
/// with the system this indexer replaces, even though the concrete adapter
/// here is PostgreSQL-backed; see SPEC_FULL.md §3.1.
#[derive(Debug, Clone)]
pub struct PostgresSettings {
    pub url: String,
    #[allow(dead_code)]
    pub pool_size: usize,
}

/// Chain RPC endpoint (`RPC_URL`), read-only contract calls pinned to a block hash.
#[derive(Debug, Clone)]
pub struct RpcSettings {
    pub url: String,
}

/// Key-value cache used as an at-most-once throttle gate (`REDIS_URL`).
/// The URL is validated as present (matching the original deployment's
/// mandatory-env-var contract) but the concrete adapter is an in-process
/// `moka` TTL cache rather than a network round trip to Redis.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(skip)]
    pub url: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub default_ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    2_592_000 // 30 days
}

/// Indexer-domain configuration: price-oracle whitelist, reconciliation
/// helper addresses, and the indexer's own identity.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexerSettings {
    #[serde(default = "default_indexer_id")]
    pub indexer_id: String,
    #[serde(default = "default_whitelist")]
    pub whitelist: Vec<String>,
    #[serde(default = "default_eth_usdc_pair")]
    pub eth_usdc_pair: String,
    #[serde(default = "default_zap_in_addresses")]
    pub zap_in_addresses: Vec<String>,
    #[serde(default)]
    pub minimum_liquidity_threshold_eth: String,
}

fn default_indexer_id() -> String {
    "jediswap-testnet".to_string()
}

fn default_whitelist() -> Vec<String> {
    vec![
        "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7".to_string(), // ETH
        "0x00da114221cb83fa859dbdb4c44beeaa0bb37c7537ad5ae66fe5e0efd20e6eb3".to_string(), // DAI
        "0x053c91253bc9682c04929ca02ed00b3e423f6710d2ee7e0d5ebb06f3ecf368a8".to_string(), // USDC
        "0x068f5c6a61780768455de69077e07e89787839bf8166decfbf92b645209c0fb8".to_string(), // USDT
        "0x03fe2b97c1fd336e750087d68b9b867997fd64a2661ff3ca5a7c771641e8e7ac".to_string(), // wBTC
    ]
}

fn default_eth_usdc_pair() -> String {
    "0x4d0390b777b424e43839cd1e744799f3de6c176c7e32c1812a41dbd9c19db6a".to_string()
}

fn default_zap_in_addresses() -> Vec<String> {
    vec!["0x029a303b928b9391ce797ec27d011d3937054bee783ca7831df792bae00c925c".to_string()]
}

/// LP-contest scheduling constants (§4.8/§4.9). Overridable so a redeployment
/// for a new contest epoch doesn't require a code change.
#[derive(Debug, Clone, Deserialize)]
pub struct ContestSettings {
    #[serde(default = "default_contest_db_prefix")]
    pub db_prefix: String,
    #[serde(default = "default_contest_start_block")]
    pub start_block: i64,
    #[serde(default = "default_contest_end_block")]
    pub end_block: i64,
    #[serde(default = "default_eligible_pairs")]
    pub eligible_pairs: Vec<String>,
    #[serde(default = "default_min_lp_value")]
    pub min_lp_value: String,
    #[serde(default = "default_min_time_secs")]
    pub min_time_secs: i64,
    #[serde(default = "default_throttle_blocks")]
    pub throttle_blocks: i64,
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: i64,
}

fn default_contest_db_prefix() -> String {
    "lp_contest_67812345".to_string()
}
fn default_contest_start_block() -> i64 {
    22_550
}
fn default_contest_end_block() -> i64 {
    27_100
}
fn default_eligible_pairs() -> Vec<String> {
    vec![
        "0x5a8054e5ca0b277b295a830e53bd71a6a6943b42d0dbb22329437522bc80c8".to_string(),
        "0xcfd39f5244f7b617418c018204a8a9f9a7f72e71f0ef38f968eeb2a9ca302b".to_string(),
        "0xf0f5b3eed258344152e1f17baf84a2e1b621cd754b625bec169e8595aea767".to_string(),
        "0x260e98362e0949fefff8b4de85367c035e44f734c9f8069b6ce2075ae86b45c".to_string(),
        "0x39c183c8e5a2df130eefa6fbaa3b8aad89b29891f6272cb0c90deaa93ec6315".to_string(),
        "0x44d13ad98a46fd2322ef2637e5e4c292ce8822f47b7cb9a1d581176a801c1a0".to_string(),
        "0x45e7131d776dddc137e30bdd490b431c7144677e97bf9369f629ed8d3fb7dd6".to_string(),
        "0x4d0390b777b424e43839cd1e744799f3de6c176c7e32c1812a41dbd9c19db6a".to_string(),
        "0x5801bdad32f343035fb242e98d1e9371ae85bc1543962fedea16c59b35bd19b".to_string(),
        "0x7e2a13b40fc1119ec55e0bcf9428eedaa581ab3c924561ad4e955f95da63138".to_string(),
    ]
}
fn default_min_lp_value() -> String {
    "25".to_string()
}
fn default_min_time_secs() -> i64 {
    2_592_000
}
fn default_throttle_blocks() -> i64 {
    100
}
fn default_scan_page_size() -> i64 {
    10_000
}

/// Task queue adapter configuration (`rdkafka`-backed), grounded in the
/// Redpanda pub/sub settings this codebase already carries.
#[derive(Debug, Clone, Deserialize)]
pub struct KafkaSettings {
    #[serde(default = "default_kafka_brokers")]
    pub brokers: String,
    #[serde(default = "default_kafka_topic_prefix")]
    pub topic_prefix: String,
}

fn default_kafka_brokers() -> String {
    "localhost:9092".to_string()
}
fn default_kafka_topic_prefix() -> String {
    "dexlp".to_string()
}

/// Root application configuration. The four URLs are read directly from
/// the environment (per SPEC_FULL.md §6 they are the literal contract);
/// everything else layers on top via the `config` crate so it can be
/// tuned from `config.yaml`/`DEXLP_*` env vars without code changes.
#[derive(Debug, Clone)]
pub struct Settings {
    pub stream: Option<StreamSettings>,
    pub postgres: Option<PostgresSettings>,
    pub rpc: Option<RpcSettings>,
    pub cache: Option<CacheSettings>,
    pub indexer: IndexerSettings,
    pub contest: ContestSettings,
    pub kafka: KafkaSettings,
    pub graphql_port: u16,
}

#[derive(Debug, Deserialize, Default)]
struct TunableSettings {
    #[serde(default)]
    cache: Option<CacheSettingsTunable>,
    #[serde(default)]
    indexer: Option<IndexerSettings>,
    #[serde(default)]
    contest: Option<ContestSettings>,
    #[serde(default)]
    kafka: Option<KafkaSettings>,
    #[serde(default = "default_graphql_port")]
    graphql_port: u16,
}

#[derive(Debug, Deserialize)]
struct CacheSettingsTunable {
    #[serde(default = "default_cache_ttl_secs")]
    default_ttl_secs: u64,
}

fn default_graphql_port() -> u16 {
    8000
}

impl Settings {
    /// Load tunables from an optional `config.yaml` plus `DEXLP_`-prefixed
    /// environment overrides, then layer in the four mandatory endpoint
    /// URLs straight from the environment. Endpoint URLs are `None` when
    /// their variable is unset; callers (the `indexer`/`server`
    /// subcommands) decide which ones they require and exit if absent.
    pub fn load() -> Result<Self, ConfigError> {
        let tunables: TunableSettings = Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(Environment::with_prefix("DEXLP").separator("__"))
            .set_default("graphql_port", 8000)?
            .build()?
            .try_deserialize()
            .unwrap_or_default();

        let stream = env_var("STREAM_URL").ok().map(|url| StreamSettings {
            url,
            index_from_block: env::var("STREAM_INDEX_FROM_BLOCK")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_760),
            factory_address: env::var("STREAM_FACTORY_ADDRESS").unwrap_or_else(|_| {
                "0x00dad44c139a476c7a17fc8141e6db680e9abc9f56fe249a105094c44382c2fd".to_string()
            }),
        });

        let postgres = env_var("MONGO_URL").ok().map(|url| PostgresSettings {
            url,
            pool_size: 16,
        });

        let rpc = env_var("RPC_URL").ok().map(|url| RpcSettings { url });

        let cache = env_var("REDIS_URL").ok().map(|url| CacheSettings {
            url,
            default_ttl_secs: tunables
                .cache
                .as_ref()
                .map(|c| c.default_ttl_secs)
                .unwrap_or_else(default_cache_ttl_secs),
        });

        Ok(Settings {
            stream,
            postgres,
            rpc,
            cache,
            indexer: tunables.indexer.unwrap_or_else(|| IndexerSettings {
                indexer_id: default_indexer_id(),
                whitelist: default_whitelist(),
                eth_usdc_pair: default_eth_usdc_pair(),
                zap_in_addresses: default_zap_in_addresses(),
                minimum_liquidity_threshold_eth: "0".to_string(),
            }),
            contest: tunables.contest.unwrap_or_else(|| ContestSettings {
                db_prefix: default_contest_db_prefix(),
                start_block: default_contest_start_block(),
                end_block: default_contest_end_block(),
                eligible_pairs: default_eligible_pairs(),
                min_lp_value: default_min_lp_value(),
                min_time_secs: default_min_time_secs(),
                throttle_blocks: default_throttle_blocks(),
                scan_page_size: default_scan_page_size(),
            }),
            kafka: tunables.kafka.unwrap_or_else(|| KafkaSettings {
                brokers: default_kafka_brokers(),
                topic_prefix: default_kafka_topic_prefix(),
            }),
            graphql_port: tunables.graphql_port,
        })
    }

    pub fn require_stream(&self) -> Result<&StreamSettings, IndexerError> {
        self.stream
            .as_ref()
            .ok_or_else(|| IndexerError::MissingConfig("STREAM_URL".to_string()))
    }

    pub fn require_postgres(&self) -> Result<&PostgresSettings, IndexerError> {
        self.postgres
            .as_ref()
            .ok_or_else(|| IndexerError::MissingConfig("MONGO_URL".to_string()))
    }

    pub fn require_rpc(&self) -> Result<&RpcSettings, IndexerError> {
        self.rpc
            .as_ref()
            .ok_or_else(|| IndexerError::MissingConfig("RPC_URL".to_string()))
    }

    pub fn require_cache(&self) -> Result<&CacheSettings, IndexerError> {
        self.cache
            .as_ref()
            .ok_or_else(|| IndexerError::MissingConfig("REDIS_URL".to_string()))
    }
}
