//! PostgreSQL-backed `Storage` implementation (§4.4, §6): connection pool
//! and migration bootstrapping in [`client`], the full `Storage` trait
//! implementation in [`ops`].

mod client;
mod ops;

pub use client::PostgresClient;
