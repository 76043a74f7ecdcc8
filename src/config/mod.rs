mod settings;

pub use settings::{
    CacheSettings, ContestSettings, IndexerSettings, KafkaSettings, PostgresSettings,
    RpcSettings, Settings, StreamSettings,
};
