use std::{fmt, io};

/// Top-level error type for the indexer and its satellite workers.
///
/// Kept as a hand-rolled enum (no `thiserror`) with manual `Display`/`Error`
/// impls, matching how the rest of this codebase surfaces domain errors.
#[derive(Debug)]
pub enum IndexerError {
    Io(io::Error),
    /// A storage call failed transiently (connection reset, pool exhausted).
    /// Propagated to the caller; the indexer runtime is allowed to crash and
    /// reconnect from its last checkpoint.
    Storage(String),
    /// A chain RPC call failed. The handler that issued it cannot make
    /// progress; the runtime should restart.
    Rpc(String),
    /// The upstream block/event stream disconnected.
    StreamDisconnect(String),
    /// A data invariant the handlers assume was violated (e.g. Sync for an
    /// unknown pair, Mint with no preceding Transfer-derived mint row).
    /// Programmer error: fail fast so the offending block can be inspected.
    ReferentialAssert(String),
    /// An event key did not match any of the six known event kinds.
    UnknownEvent(String),
    /// A required environment variable was absent.
    MissingConfig(String),
}

impl fmt::Display for IndexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexerError::Io(err) => write!(f, "io error: {err}"),
            IndexerError::Storage(err) => write!(f, "storage error: {err}"),
            IndexerError::Rpc(err) => write!(f, "chain rpc error: {err}"),
            IndexerError::StreamDisconnect(err) => write!(f, "stream disconnected: {err}"),
            IndexerError::ReferentialAssert(err) => write!(f, "referential assertion failed: {err}"),
            IndexerError::UnknownEvent(key) => write!(f, "unknown event key: {key}"),
            IndexerError::MissingConfig(var) => write!(f, "missing required environment variable: {var}"),
        }
    }
}

impl std::error::Error for IndexerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IndexerError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for IndexerError {
    fn from(err: io::Error) -> Self {
        IndexerError::Io(err)
    }
}

impl From<tokio_postgres::Error> for IndexerError {
    fn from(err: tokio_postgres::Error) -> Self {
        IndexerError::Storage(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for IndexerError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        IndexerError::Storage(err.to_string())
    }
}
