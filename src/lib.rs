pub mod cache;
pub mod chain;
pub mod config;
pub mod contest;
pub mod db;
pub mod errors;
pub mod events;
pub mod graphql;
pub mod handlers;
pub mod indexer;
pub mod oracle;
pub mod query;
pub mod queue;
pub mod stream;
pub mod value;

pub use config::Settings;
pub use db::Database;
pub use errors::IndexerError;
