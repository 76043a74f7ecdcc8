//! Find-or-create helpers (§4.6), grounded in `helpers.py`'s
//! `create_token`/`create_transaction`/`find_or_create_user`: each reads
//! storage first and only reaches for chain RPC / a fresh zero-valued
//! record when nothing exists yet.

use crate::chain::{fetch_decimals, fetch_name, fetch_symbol, fetch_total_supply};
use crate::db::models::{Token, Transaction, User};
use crate::db::Storage;
use crate::errors::IndexerError;
use crate::value::FieldElement;

use super::context::HandlerEnv;

pub async fn find_or_create_token(
    env: &HandlerEnv<'_>,
    token_id: &FieldElement,
    at_block_hash: &FieldElement,
    valid_from: i64,
) -> Result<Token, IndexerError> {
    if let Some(existing) = env.storage.get_token(token_id).await? {
        return Ok(existing);
    }

    let name = fetch_name(env.rpc, token_id, at_block_hash).await?;
    let symbol = fetch_symbol(env.rpc, token_id, at_block_hash).await?;
    let decimals = fetch_decimals(env.rpc, token_id, at_block_hash).await?;
    let total_supply = fetch_total_supply(env.rpc, token_id, at_block_hash).await?;

    let token = Token::new(token_id.clone(), name, symbol, decimals, total_supply, valid_from);
    env.storage.put_token(None, &token).await?;
    Ok(token)
}

/// Ensures the transaction row for `hash` exists, creating it from the
/// current block context if absent. Unlike the original system (which only
/// creates this row from the Swap handler and asserts it elsewhere), every
/// handler in this port calls this first — a transaction containing a Mint
/// but no Swap would otherwise hit an always-false assertion.
pub async fn ensure_transaction(
    storage: &dyn Storage,
    hash: &FieldElement,
    block_number: i64,
    block_timestamp: i64,
) -> Result<(), IndexerError> {
    if storage.get_transaction(hash).await?.is_some() {
        return Ok(());
    }
    storage
        .put_transaction(&Transaction {
            hash: hash.clone(),
            block_number,
            block_timestamp,
        })
        .await
}

pub async fn find_or_create_user(
    storage: &dyn Storage,
    user_id: &FieldElement,
    valid_from: i64,
) -> Result<User, IndexerError> {
    if let Some(existing) = storage.get_user(user_id).await? {
        return Ok(existing);
    }
    let user = User::new(user_id.clone(), valid_from);
    storage.put_user(None, &user).await?;
    Ok(user)
}
