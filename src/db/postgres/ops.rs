use std::collections::BTreeMap;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use tokio_postgres::Client;

use crate::db::models::{
    Block, Burn, ExchangeDayData, Factory, LiquidityPosition, LiquidityPositionSnapshot,
    LpContest, LpContestBlock, Mint, Pair, PairBlockCumulativePrice, PairDayData, PairHourData,
    Swap, Token, TokenDayData, Transaction, User,
};
use crate::db::postgres::PostgresClient;
use crate::db::Storage;
use crate::errors::IndexerError;
use crate::value::FieldElement;

/// Strip null bytes, which PostgreSQL text columns reject outright; token
/// names/symbols decoded from arbitrary felts can contain them.
fn sanitize_string(s: &str) -> String {
    s.replace('\0', "")
}

fn felt(row: &tokio_postgres::Row, col: &str) -> FieldElement {
    let hex: String = row.get(col);
    FieldElement::from_hex(&hex).unwrap_or_else(FieldElement::zero)
}

fn opt_felt(row: &tokio_postgres::Row, col: &str) -> Option<FieldElement> {
    let hex: Option<String> = row.get(col);
    hex.and_then(|h| FieldElement::from_hex(&h))
}

fn balances_to_json(map: &BTreeMap<String, BigDecimal>) -> serde_json::Value {
    serde_json::to_value(map).unwrap_or(serde_json::Value::Null)
}

fn balances_from_json(value: serde_json::Value) -> BTreeMap<String, BigDecimal> {
    serde_json::from_value(value).unwrap_or_default()
}

/// Close the currently-open version of `id` in `table`, if any, at
/// `valid_to`. The caller inserts the replacement row afterwards. Table
/// names are compile-time constants below, never user input.
async fn close_current(
    client: &Client,
    table: &str,
    id: &str,
    valid_to: i64,
) -> Result<(), IndexerError> {
    let sql = format!("UPDATE {table} SET valid_to = $1 WHERE id = $2 AND valid_to IS NULL");
    client.execute(&sql, &[&valid_to, &id]).await?;
    Ok(())
}

#[async_trait]
impl Storage for PostgresClient {
    async fn highest_block(&self) -> Result<Option<i64>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT max(number) AS n FROM blocks", &[])
            .await?;
        Ok(row.and_then(|r| r.get::<_, Option<i64>>("n")))
    }

    async fn block_timestamp_at_or_before(&self, number: i64) -> Result<Option<i64>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT timestamp FROM blocks WHERE number <= $1 ORDER BY number DESC LIMIT 1",
                &[&number],
            )
            .await?;
        Ok(row.map(|r| r.get::<_, i64>("timestamp")))
    }

    async fn put_block(&self, block: &Block) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO blocks (number, hash, parent_hash, timestamp) VALUES ($1, $2, $3, $4)
                 ON CONFLICT (number) DO NOTHING",
                &[
                    &block.number,
                    &block.hash.as_hex(),
                    &block.parent_hash.as_hex(),
                    &block.timestamp,
                ],
            )
            .await?;
        Ok(())
    }

    async fn put_transaction(&self, tx: &Transaction) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO transactions (hash, block_number, block_timestamp) VALUES ($1, $2, $3)
                 ON CONFLICT (hash) DO NOTHING",
                &[&tx.hash.as_hex(), &tx.block_number, &tx.block_timestamp],
            )
            .await?;
        Ok(())
    }

    async fn get_transaction(&self, hash: &FieldElement) -> Result<Option<Transaction>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT hash, block_number, block_timestamp FROM transactions WHERE hash = $1",
                &[&hash.as_hex()],
            )
            .await?;
        Ok(row.map(|row| Transaction {
            hash: felt(&row, "hash"),
            block_number: row.get("block_number"),
            block_timestamp: row.get("block_timestamp"),
        }))
    }

    async fn get_factory(&self, id: &FieldElement) -> Result<Option<Factory>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, pair_count, tx_count, total_volume_usd, total_volume_eth,
                        untracked_volume_usd, total_liquidity_usd, total_liquidity_eth,
                        valid_from, valid_to
                 FROM factories WHERE id = $1 AND valid_to IS NULL",
                &[&id.as_hex()],
            )
            .await?;
        Ok(row.map(|row| Factory {
            id: felt(&row, "id"),
            pair_count: row.get("pair_count"),
            tx_count: row.get("tx_count"),
            total_volume_usd: row.get("total_volume_usd"),
            total_volume_eth: row.get("total_volume_eth"),
            untracked_volume_usd: row.get("untracked_volume_usd"),
            total_liquidity_usd: row.get("total_liquidity_usd"),
            total_liquidity_eth: row.get("total_liquidity_eth"),
            valid_from: row.get("valid_from"),
            valid_to: row.get("valid_to"),
        }))
    }

    async fn put_factory(&self, current: Option<&Factory>, next: &Factory) -> Result<(), IndexerError> {
        let mut client = self.pool.get().await?;
        let txn = client.transaction().await?;
        if current.is_some() {
            close_current(&txn, "factories", &next.id.as_hex(), next.valid_from).await?;
        }
        txn.execute(
            "INSERT INTO factories (id, pair_count, tx_count, total_volume_usd, total_volume_eth,
                 untracked_volume_usd, total_liquidity_usd, total_liquidity_eth, valid_from, valid_to)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            &[
                &next.id.as_hex(),
                &next.pair_count,
                &next.tx_count,
                &next.total_volume_usd,
                &next.total_volume_eth,
                &next.untracked_volume_usd,
                &next.total_liquidity_usd,
                &next.total_liquidity_eth,
                &next.valid_from,
                &next.valid_to,
            ],
        )
        .await?;
        txn.commit().await?;
        Ok(())
    }

    async fn get_token(&self, id: &FieldElement) -> Result<Option<Token>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, name, symbol, decimals, total_supply, trade_volume, trade_volume_usd,
                        untracked_volume_usd, tx_count, total_liquidity, derived_eth, valid_from, valid_to
                 FROM tokens WHERE id = $1 AND valid_to IS NULL",
                &[&id.as_hex()],
            )
            .await?;
        Ok(row.map(|row| {
            let total_supply: BigDecimal = row.get("total_supply");
            let (int_value, _) = total_supply.with_scale(0).into_bigint_and_exponent();
            Token {
                id: felt(&row, "id"),
                name: row.get("name"),
                symbol: row.get("symbol"),
                decimals: row.get::<_, i32>("decimals") as u32,
                total_supply: int_value.to_biguint().unwrap_or_default(),
                trade_volume: row.get("trade_volume"),
                trade_volume_usd: row.get("trade_volume_usd"),
                untracked_volume_usd: row.get("untracked_volume_usd"),
                tx_count: row.get("tx_count"),
                total_liquidity: row.get("total_liquidity"),
                derived_eth: row.get("derived_eth"),
                valid_from: row.get("valid_from"),
                valid_to: row.get("valid_to"),
            }
        }))
    }

    async fn put_token(&self, current: Option<&Token>, next: &Token) -> Result<(), IndexerError> {
        let mut client = self.pool.get().await?;
        let txn = client.transaction().await?;
        if current.is_some() {
            close_current(&txn, "tokens", &next.id.as_hex(), next.valid_from).await?;
        }
        let total_supply = BigDecimal::from(BigInt::from(next.total_supply.clone()));
        txn.execute(
            "INSERT INTO tokens (id, name, symbol, decimals, total_supply, trade_volume,
                 trade_volume_usd, untracked_volume_usd, tx_count, total_liquidity, derived_eth,
                 valid_from, valid_to)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            &[
                &next.id.as_hex(),
                &sanitize_string(&next.name),
                &sanitize_string(&next.symbol),
                &(next.decimals as i32),
                &total_supply,
                &next.trade_volume,
                &next.trade_volume_usd,
                &next.untracked_volume_usd,
                &next.tx_count,
                &next.total_liquidity,
                &next.derived_eth,
                &next.valid_from,
                &next.valid_to,
            ],
        )
        .await?;
        txn.commit().await?;
        Ok(())
    }

    async fn get_pair(&self, id: &FieldElement) -> Result<Option<Pair>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, token0_id, token1_id, reserve0, reserve1, total_supply, reserve_eth,
                        reserve_usd, tracked_reserve_eth, token0_price, token1_price, volume_token0,
                        volume_token1, volume_usd, untracked_volume_usd, tx_count,
                        created_at_timestamp, created_at_block, liquidity_provider_count,
                        valid_from, valid_to
                 FROM pairs WHERE id = $1 AND valid_to IS NULL",
                &[&id.as_hex()],
            )
            .await?;
        Ok(row.map(row_to_pair))
    }

    async fn get_pair_at(&self, id: &FieldElement, block: i64) -> Result<Option<Pair>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, token0_id, token1_id, reserve0, reserve1, total_supply, reserve_eth,
                        reserve_usd, tracked_reserve_eth, token0_price, token1_price, volume_token0,
                        volume_token1, volume_usd, untracked_volume_usd, tx_count,
                        created_at_timestamp, created_at_block, liquidity_provider_count,
                        valid_from, valid_to
                 FROM pairs WHERE id = $1 AND valid_from <= $2 AND (valid_to IS NULL OR valid_to > $2)
                 ORDER BY valid_from DESC LIMIT 1",
                &[&id.as_hex(), &block],
            )
            .await?;
        Ok(row.map(row_to_pair))
    }

    async fn get_pair_by_tokens(
        &self,
        token0: &FieldElement,
        token1: &FieldElement,
    ) -> Result<Option<Pair>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, token0_id, token1_id, reserve0, reserve1, total_supply, reserve_eth,
                        reserve_usd, tracked_reserve_eth, token0_price, token1_price, volume_token0,
                        volume_token1, volume_usd, untracked_volume_usd, tx_count,
                        created_at_timestamp, created_at_block, liquidity_provider_count,
                        valid_from, valid_to
                 FROM pairs WHERE token0_id = $1 AND token1_id = $2 AND valid_to IS NULL",
                &[&token0.as_hex(), &token1.as_hex()],
            )
            .await?;
        Ok(row.map(row_to_pair))
    }

    async fn put_pair(&self, current: Option<&Pair>, next: &Pair) -> Result<(), IndexerError> {
        let mut client = self.pool.get().await?;
        let txn = client.transaction().await?;
        if current.is_some() {
            close_current(&txn, "pairs", &next.id.as_hex(), next.valid_from).await?;
        }
        txn.execute(
            "INSERT INTO pairs (id, token0_id, token1_id, reserve0, reserve1, total_supply,
                 reserve_eth, reserve_usd, tracked_reserve_eth, token0_price, token1_price,
                 volume_token0, volume_token1, volume_usd, untracked_volume_usd, tx_count,
                 created_at_timestamp, created_at_block, liquidity_provider_count, valid_from, valid_to)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)",
            &[
                &next.id.as_hex(),
                &next.token0_id.as_hex(),
                &next.token1_id.as_hex(),
                &next.reserve0,
                &next.reserve1,
                &next.total_supply,
                &next.reserve_eth,
                &next.reserve_usd,
                &next.tracked_reserve_eth,
                &next.token0_price,
                &next.token1_price,
                &next.volume_token0,
                &next.volume_token1,
                &next.volume_usd,
                &next.untracked_volume_usd,
                &next.tx_count,
                &next.created_at_timestamp,
                &next.created_at_block,
                &next.liquidity_provider_count,
                &next.valid_from,
                &next.valid_to,
            ],
        )
        .await?;
        txn.commit().await?;
        Ok(())
    }

    async fn all_pair_ids(&self) -> Result<Vec<FieldElement>, IndexerError> {
        let client = self.pool.get().await?;
        let rows = client
            .query("SELECT id FROM pairs WHERE valid_to IS NULL", &[])
            .await?;
        Ok(rows.iter().map(|row| felt(row, "id")).collect())
    }

    async fn get_user(&self, id: &FieldElement) -> Result<Option<User>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, tx_count, mint_count, burn_count, swap_count, valid_from, valid_to
                 FROM users WHERE id = $1 AND valid_to IS NULL",
                &[&id.as_hex()],
            )
            .await?;
        Ok(row.map(|row| User {
            id: felt(&row, "id"),
            tx_count: row.get("tx_count"),
            mint_count: row.get("mint_count"),
            burn_count: row.get("burn_count"),
            swap_count: row.get("swap_count"),
            valid_from: row.get("valid_from"),
            valid_to: row.get("valid_to"),
        }))
    }

    async fn put_user(&self, current: Option<&User>, next: &User) -> Result<(), IndexerError> {
        let mut client = self.pool.get().await?;
        let txn = client.transaction().await?;
        if current.is_some() {
            close_current(&txn, "users", &next.id.as_hex(), next.valid_from).await?;
        }
        txn.execute(
            "INSERT INTO users (id, tx_count, mint_count, burn_count, swap_count, valid_from, valid_to)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            &[
                &next.id.as_hex(),
                &next.tx_count,
                &next.mint_count,
                &next.burn_count,
                &next.swap_count,
                &next.valid_from,
                &next.valid_to,
            ],
        )
        .await?;
        txn.commit().await?;
        Ok(())
    }

    async fn get_open_mint(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Mint>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT transaction_hash, index, pair_id, sender, \"to\", liquidity, amount0,
                        amount1, amount_usd, timestamp, zap_in
                 FROM mints
                 WHERE pair_id = $1 AND transaction_hash = $2 AND sender IS NULL
                 ORDER BY index DESC LIMIT 1",
                &[&pair.as_hex(), &tx_hash.as_hex()],
            )
            .await?;
        Ok(row.map(row_to_mint))
    }

    async fn get_last_mint(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Mint>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT transaction_hash, index, pair_id, sender, \"to\", liquidity, amount0,
                        amount1, amount_usd, timestamp, zap_in
                 FROM mints
                 WHERE pair_id = $1 AND transaction_hash = $2
                 ORDER BY index DESC LIMIT 1",
                &[&pair.as_hex(), &tx_hash.as_hex()],
            )
            .await?;
        Ok(row.map(row_to_mint))
    }

    async fn delete_mint(&self, pair: &FieldElement, tx_hash: &FieldElement, index: i64) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "DELETE FROM mints WHERE pair_id = $1 AND transaction_hash = $2 AND index = $3",
                &[&pair.as_hex(), &tx_hash.as_hex(), &index],
            )
            .await?;
        Ok(())
    }

    async fn put_mint(&self, mint: &Mint) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO mints (transaction_hash, index, pair_id, sender, \"to\", liquidity,
                     amount0, amount1, amount_usd, timestamp, zap_in)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 ON CONFLICT (transaction_hash, index) DO UPDATE SET
                     sender = EXCLUDED.sender,
                     \"to\" = EXCLUDED.to,
                     amount0 = EXCLUDED.amount0,
                     amount1 = EXCLUDED.amount1,
                     amount_usd = EXCLUDED.amount_usd,
                     zap_in = EXCLUDED.zap_in",
                &[
                    &mint.transaction_hash.as_hex(),
                    &mint.index,
                    &mint.pair_id.as_hex(),
                    &mint.sender.as_ref().map(|s| s.as_hex()),
                    &mint.to.as_hex(),
                    &mint.liquidity,
                    &mint.amount0,
                    &mint.amount1,
                    &mint.amount_usd,
                    &mint.timestamp,
                    &mint.zap_in,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_open_burn(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Burn>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT transaction_hash, index, pair_id, sender, \"to\", liquidity, amount0,
                        amount1, amount_usd, timestamp, needs_complete, fee_to, fee_liquidity
                 FROM burns
                 WHERE pair_id = $1 AND transaction_hash = $2 AND needs_complete = TRUE
                 ORDER BY index DESC LIMIT 1",
                &[&pair.as_hex(), &tx_hash.as_hex()],
            )
            .await?;
        Ok(row.map(row_to_burn))
    }

    async fn get_last_burn(
        &self,
        pair: &FieldElement,
        tx_hash: &FieldElement,
    ) -> Result<Option<Burn>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT transaction_hash, index, pair_id, sender, \"to\", liquidity, amount0,
                        amount1, amount_usd, timestamp, needs_complete, fee_to, fee_liquidity
                 FROM burns
                 WHERE pair_id = $1 AND transaction_hash = $2
                 ORDER BY index DESC LIMIT 1",
                &[&pair.as_hex(), &tx_hash.as_hex()],
            )
            .await?;
        Ok(row.map(row_to_burn))
    }

    async fn put_burn(&self, burn: &Burn) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO burns (transaction_hash, index, pair_id, sender, \"to\", liquidity,
                     amount0, amount1, amount_usd, timestamp, needs_complete, fee_to, fee_liquidity)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                 ON CONFLICT (transaction_hash, index) DO UPDATE SET
                     sender = EXCLUDED.sender,
                     \"to\" = EXCLUDED.to,
                     amount0 = EXCLUDED.amount0,
                     amount1 = EXCLUDED.amount1,
                     amount_usd = EXCLUDED.amount_usd,
                     needs_complete = EXCLUDED.needs_complete,
                     fee_to = EXCLUDED.fee_to,
                     fee_liquidity = EXCLUDED.fee_liquidity",
                &[
                    &burn.transaction_hash.as_hex(),
                    &burn.index,
                    &burn.pair_id.as_hex(),
                    &burn.sender.as_ref().map(|s| s.as_hex()),
                    &burn.to.as_ref().map(|s| s.as_hex()),
                    &burn.liquidity,
                    &burn.amount0,
                    &burn.amount1,
                    &burn.amount_usd,
                    &burn.timestamp,
                    &burn.needs_complete,
                    &burn.fee_to.as_ref().map(|s| s.as_hex()),
                    &burn.fee_liquidity,
                ],
            )
            .await?;
        Ok(())
    }

    async fn put_swap(&self, swap: &Swap) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO swaps (transaction_hash, log_index, pair_id, timestamp, sender, \"to\",
                     amount0_in, amount1_in, amount0_out, amount1_out, amount_usd)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 ON CONFLICT (transaction_hash, log_index) DO NOTHING",
                &[
                    &swap.transaction_hash.as_hex(),
                    &swap.log_index,
                    &swap.pair_id.as_hex(),
                    &swap.timestamp,
                    &swap.sender.as_hex(),
                    &swap.to.as_hex(),
                    &swap.amount0_in,
                    &swap.amount1_in,
                    &swap.amount0_out,
                    &swap.amount1_out,
                    &swap.amount_usd,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_liquidity_position(
        &self,
        pair: &FieldElement,
        user: &FieldElement,
    ) -> Result<Option<LiquidityPosition>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT pair_address, \"user\", liquidity_token_balance FROM liquidity_positions
                 WHERE pair_address = $1 AND \"user\" = $2",
                &[&pair.as_hex(), &user.as_hex()],
            )
            .await?;
        Ok(row.map(|row| LiquidityPosition {
            pair_address: felt(&row, "pair_address"),
            user: felt(&row, "user"),
            liquidity_token_balance: row.get("liquidity_token_balance"),
        }))
    }

    async fn put_liquidity_position(&self, position: &LiquidityPosition) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO liquidity_positions (pair_address, \"user\", liquidity_token_balance)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (pair_address, \"user\") DO UPDATE SET
                     liquidity_token_balance = EXCLUDED.liquidity_token_balance",
                &[
                    &position.pair_address.as_hex(),
                    &position.user.as_hex(),
                    &position.liquidity_token_balance,
                ],
            )
            .await?;
        Ok(())
    }

    async fn put_liquidity_snapshot(
        &self,
        snapshot: &LiquidityPositionSnapshot,
    ) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO liquidity_position_snapshots (pair_address, \"user\", block, timestamp,
                     reserve0, reserve1, reserve_usd, token0_price_usd, token1_price_usd,
                     liquidity_token_total_supply, liquidity_token_balance)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
                &[
                    &snapshot.pair_address.as_hex(),
                    &snapshot.user.as_hex(),
                    &snapshot.block,
                    &snapshot.timestamp,
                    &snapshot.reserve0,
                    &snapshot.reserve1,
                    &snapshot.reserve_usd,
                    &snapshot.token0_price_usd,
                    &snapshot.token1_price_usd,
                    &snapshot.liquidity_token_total_supply,
                    &snapshot.liquidity_token_balance,
                ],
            )
            .await?;
        Ok(())
    }

    async fn liquidity_snapshots(
        &self,
        pair: &FieldElement,
        user: &FieldElement,
        after_block: i64,
    ) -> Result<Vec<LiquidityPositionSnapshot>, IndexerError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT pair_address, \"user\", block, timestamp, reserve0, reserve1, reserve_usd,
                        token0_price_usd, token1_price_usd, liquidity_token_total_supply,
                        liquidity_token_balance
                 FROM liquidity_position_snapshots
                 WHERE pair_address = $1 AND \"user\" = $2 AND block >= $3
                 ORDER BY block ASC",
                &[&pair.as_hex(), &user.as_hex(), &after_block],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|row| LiquidityPositionSnapshot {
                pair_address: felt(row, "pair_address"),
                user: felt(row, "user"),
                block: row.get("block"),
                timestamp: row.get("timestamp"),
                reserve0: row.get("reserve0"),
                reserve1: row.get("reserve1"),
                reserve_usd: row.get("reserve_usd"),
                token0_price_usd: row.get("token0_price_usd"),
                token1_price_usd: row.get("token1_price_usd"),
                liquidity_token_total_supply: row.get("liquidity_token_total_supply"),
                liquidity_token_balance: row.get("liquidity_token_balance"),
            })
            .collect())
    }

    async fn liquidity_providers(
        &self,
        pair: &FieldElement,
        after: Option<FieldElement>,
        limit: i64,
    ) -> Result<Vec<FieldElement>, IndexerError> {
        let client = self.pool.get().await?;
        let after_hex = after.map(|f| f.as_hex()).unwrap_or_default();
        let rows = client
            .query(
                "SELECT DISTINCT \"user\" FROM liquidity_position_snapshots
                 WHERE pair_address = $1 AND \"user\" > $2
                 ORDER BY \"user\" ASC LIMIT $3",
                &[&pair.as_hex(), &after_hex, &limit],
            )
            .await?;
        Ok(rows.iter().map(|row| felt(row, "user")).collect())
    }

    async fn put_exchange_day_data(&self, row: &ExchangeDayData) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO exchange_day_data (day_id, daily_volume_usd, daily_volume_eth,
                     daily_untracked_volume_usd, total_liquidity_usd, total_liquidity_eth, tx_count)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (day_id) DO UPDATE SET
                     daily_volume_usd = EXCLUDED.daily_volume_usd,
                     daily_volume_eth = EXCLUDED.daily_volume_eth,
                     daily_untracked_volume_usd = EXCLUDED.daily_untracked_volume_usd,
                     total_liquidity_usd = EXCLUDED.total_liquidity_usd,
                     total_liquidity_eth = EXCLUDED.total_liquidity_eth,
                     tx_count = EXCLUDED.tx_count",
                &[
                    &row.day_id,
                    &row.daily_volume_usd,
                    &row.daily_volume_eth,
                    &row.daily_untracked_volume_usd,
                    &row.total_liquidity_usd,
                    &row.total_liquidity_eth,
                    &row.tx_count,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_exchange_day_data(&self, day_id: i64) -> Result<Option<ExchangeDayData>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT day_id, daily_volume_usd, daily_volume_eth, daily_untracked_volume_usd,
                        total_liquidity_usd, total_liquidity_eth, tx_count
                 FROM exchange_day_data WHERE day_id = $1",
                &[&day_id],
            )
            .await?;
        Ok(row.map(|row| ExchangeDayData {
            day_id: row.get("day_id"),
            daily_volume_usd: row.get("daily_volume_usd"),
            daily_volume_eth: row.get("daily_volume_eth"),
            daily_untracked_volume_usd: row.get("daily_untracked_volume_usd"),
            total_liquidity_usd: row.get("total_liquidity_usd"),
            total_liquidity_eth: row.get("total_liquidity_eth"),
            tx_count: row.get("tx_count"),
        }))
    }

    async fn put_pair_day_data(&self, row: &PairDayData) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO pair_day_data (pair_id, day_id, token0_id, token1_id, reserve0,
                     reserve1, reserve_usd, daily_volume_token0, daily_volume_token1,
                     daily_volume_usd, daily_tx_count)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 ON CONFLICT (pair_id, day_id) DO UPDATE SET
                     reserve0 = EXCLUDED.reserve0,
                     reserve1 = EXCLUDED.reserve1,
                     reserve_usd = EXCLUDED.reserve_usd,
                     daily_volume_token0 = EXCLUDED.daily_volume_token0,
                     daily_volume_token1 = EXCLUDED.daily_volume_token1,
                     daily_volume_usd = EXCLUDED.daily_volume_usd,
                     daily_tx_count = EXCLUDED.daily_tx_count",
                &[
                    &row.pair_id.as_hex(),
                    &row.day_id,
                    &row.token0_id.as_hex(),
                    &row.token1_id.as_hex(),
                    &row.reserve0,
                    &row.reserve1,
                    &row.reserve_usd,
                    &row.daily_volume_token0,
                    &row.daily_volume_token1,
                    &row.daily_volume_usd,
                    &row.daily_tx_count,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_pair_day_data(
        &self,
        pair: &FieldElement,
        day_id: i64,
    ) -> Result<Option<PairDayData>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT pair_id, day_id, token0_id, token1_id, reserve0, reserve1, reserve_usd,
                        daily_volume_token0, daily_volume_token1, daily_volume_usd, daily_tx_count
                 FROM pair_day_data WHERE pair_id = $1 AND day_id = $2",
                &[&pair.as_hex(), &day_id],
            )
            .await?;
        Ok(row.map(|row| PairDayData {
            pair_id: felt(&row, "pair_id"),
            day_id: row.get("day_id"),
            token0_id: felt(&row, "token0_id"),
            token1_id: felt(&row, "token1_id"),
            reserve0: row.get("reserve0"),
            reserve1: row.get("reserve1"),
            reserve_usd: row.get("reserve_usd"),
            daily_volume_token0: row.get("daily_volume_token0"),
            daily_volume_token1: row.get("daily_volume_token1"),
            daily_volume_usd: row.get("daily_volume_usd"),
            daily_tx_count: row.get("daily_tx_count"),
        }))
    }

    async fn put_pair_hour_data(&self, row: &PairHourData) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO pair_hour_data (pair_id, hour_id, reserve0, reserve1, reserve_usd,
                     total_supply, hourly_volume_token0, hourly_volume_token1, hourly_volume_usd,
                     hourly_tx_count)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                 ON CONFLICT (pair_id, hour_id) DO UPDATE SET
                     reserve0 = EXCLUDED.reserve0,
                     reserve1 = EXCLUDED.reserve1,
                     reserve_usd = EXCLUDED.reserve_usd,
                     total_supply = EXCLUDED.total_supply,
                     hourly_volume_token0 = EXCLUDED.hourly_volume_token0,
                     hourly_volume_token1 = EXCLUDED.hourly_volume_token1,
                     hourly_volume_usd = EXCLUDED.hourly_volume_usd,
                     hourly_tx_count = EXCLUDED.hourly_tx_count",
                &[
                    &row.pair_id.as_hex(),
                    &row.hour_id,
                    &row.reserve0,
                    &row.reserve1,
                    &row.reserve_usd,
                    &row.total_supply,
                    &row.hourly_volume_token0,
                    &row.hourly_volume_token1,
                    &row.hourly_volume_usd,
                    &row.hourly_tx_count,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_pair_hour_data(
        &self,
        pair: &FieldElement,
        hour_id: i64,
    ) -> Result<Option<PairHourData>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT pair_id, hour_id, reserve0, reserve1, reserve_usd, total_supply,
                        hourly_volume_token0, hourly_volume_token1, hourly_volume_usd, hourly_tx_count
                 FROM pair_hour_data WHERE pair_id = $1 AND hour_id = $2",
                &[&pair.as_hex(), &hour_id],
            )
            .await?;
        Ok(row.map(|row| PairHourData {
            pair_id: felt(&row, "pair_id"),
            hour_id: row.get("hour_id"),
            reserve0: row.get("reserve0"),
            reserve1: row.get("reserve1"),
            reserve_usd: row.get("reserve_usd"),
            total_supply: row.get("total_supply"),
            hourly_volume_token0: row.get("hourly_volume_token0"),
            hourly_volume_token1: row.get("hourly_volume_token1"),
            hourly_volume_usd: row.get("hourly_volume_usd"),
            hourly_tx_count: row.get("hourly_tx_count"),
        }))
    }

    async fn put_token_day_data(&self, row: &TokenDayData) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO token_day_data (token_id, day_id, daily_volume_token, daily_volume_usd,
                     total_liquidity_token, total_liquidity_usd, daily_tx_count)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (token_id, day_id) DO UPDATE SET
                     daily_volume_token = EXCLUDED.daily_volume_token,
                     daily_volume_usd = EXCLUDED.daily_volume_usd,
                     total_liquidity_token = EXCLUDED.total_liquidity_token,
                     total_liquidity_usd = EXCLUDED.total_liquidity_usd,
                     daily_tx_count = EXCLUDED.daily_tx_count",
                &[
                    &row.token_id.as_hex(),
                    &row.day_id,
                    &row.daily_volume_token,
                    &row.daily_volume_usd,
                    &row.total_liquidity_token,
                    &row.total_liquidity_usd,
                    &row.daily_tx_count,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_token_day_data(
        &self,
        token: &FieldElement,
        day_id: i64,
    ) -> Result<Option<TokenDayData>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT token_id, day_id, daily_volume_token, daily_volume_usd,
                        total_liquidity_token, total_liquidity_usd, daily_tx_count
                 FROM token_day_data WHERE token_id = $1 AND day_id = $2",
                &[&token.as_hex(), &day_id],
            )
            .await?;
        Ok(row.map(|row| TokenDayData {
            token_id: felt(&row, "token_id"),
            day_id: row.get("day_id"),
            daily_volume_token: row.get("daily_volume_token"),
            daily_volume_usd: row.get("daily_volume_usd"),
            total_liquidity_token: row.get("total_liquidity_token"),
            total_liquidity_usd: row.get("total_liquidity_usd"),
            daily_tx_count: row.get("daily_tx_count"),
        }))
    }

    async fn put_cumulative_price(&self, row: &PairBlockCumulativePrice) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO pair_block_cumulative_prices (pair, block, price_usd,
                     cumulative_price_usd, time_cumulative_price_usd)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (pair, block) DO NOTHING",
                &[
                    &row.pair.as_hex(),
                    &row.block,
                    &row.price_usd,
                    &row.cumulative_price_usd,
                    &row.time_cumulative_price_usd,
                ],
            )
            .await?;
        Ok(())
    }

    async fn last_cumulative_price(
        &self,
        pair: &FieldElement,
    ) -> Result<Option<PairBlockCumulativePrice>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT pair, block, price_usd, cumulative_price_usd, time_cumulative_price_usd
                 FROM pair_block_cumulative_prices WHERE pair = $1 ORDER BY block DESC LIMIT 1",
                &[&pair.as_hex()],
            )
            .await?;
        Ok(row.map(row_to_cumulative_price))
    }

    async fn cumulative_price_at_or_before(
        &self,
        pair: &FieldElement,
        block: i64,
    ) -> Result<Option<PairBlockCumulativePrice>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT pair, block, price_usd, cumulative_price_usd, time_cumulative_price_usd
                 FROM pair_block_cumulative_prices
                 WHERE pair = $1 AND block <= $2 ORDER BY block DESC LIMIT 1",
                &[&pair.as_hex(), &block],
            )
            .await?;
        Ok(row.map(row_to_cumulative_price))
    }

    async fn get_lp_contest(&self, user: &FieldElement) -> Result<Option<LpContest>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT \"user\", block, timestamp, contest_value, total_lp_value,
                        total_time_eligible, is_eligible, lp_token_balances, lp_values
                 FROM lp_contest WHERE \"user\" = $1",
                &[&user.as_hex()],
            )
            .await?;
        Ok(row.map(|row| LpContest {
            user: felt(&row, "user"),
            block: row.get("block"),
            timestamp: row.get("timestamp"),
            contest_value: row.get("contest_value"),
            total_lp_value: row.get("total_lp_value"),
            total_time_eligible: row.get("total_time_eligible"),
            is_eligible: row.get("is_eligible"),
            lp_token_balances: balances_from_json(row.get("lp_token_balances")),
            lp_values: balances_from_json(row.get("lp_values")),
        }))
    }

    async fn put_lp_contest(&self, contest: &LpContest) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO lp_contest (\"user\", block, timestamp, contest_value, total_lp_value,
                     total_time_eligible, is_eligible, lp_token_balances, lp_values)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 ON CONFLICT (\"user\") DO UPDATE SET
                     block = EXCLUDED.block,
                     timestamp = EXCLUDED.timestamp,
                     contest_value = EXCLUDED.contest_value,
                     total_lp_value = EXCLUDED.total_lp_value,
                     total_time_eligible = EXCLUDED.total_time_eligible,
                     is_eligible = EXCLUDED.is_eligible,
                     lp_token_balances = EXCLUDED.lp_token_balances,
                     lp_values = EXCLUDED.lp_values",
                &[
                    &contest.user.as_hex(),
                    &contest.block,
                    &contest.timestamp,
                    &contest.contest_value,
                    &contest.total_lp_value,
                    &contest.total_time_eligible,
                    &contest.is_eligible,
                    &balances_to_json(&contest.lp_token_balances),
                    &balances_to_json(&contest.lp_values),
                ],
            )
            .await?;
        Ok(())
    }

    async fn put_lp_contest_block(&self, block: &LpContestBlock) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO lp_contest_blocks (\"user\", block, timestamp, contest_value,
                     total_lp_value, total_time_eligible, is_eligible, lp_token_balances, lp_values)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &block.user.as_hex(),
                    &block.block,
                    &block.timestamp,
                    &block.contest_value,
                    &block.total_lp_value,
                    &block.total_time_eligible,
                    &block.is_eligible,
                    &balances_to_json(&block.lp_token_balances),
                    &balances_to_json(&block.lp_values),
                ],
            )
            .await?;
        Ok(())
    }

    async fn contest_candidate_users(
        &self,
        after: Option<FieldElement>,
        limit: i64,
    ) -> Result<Vec<FieldElement>, IndexerError> {
        let client = self.pool.get().await?;
        let after_hex = after.map(|f| f.as_hex()).unwrap_or_default();
        let rows = client
            .query(
                "SELECT DISTINCT \"user\" FROM liquidity_position_snapshots
                 WHERE \"user\" > $1 ORDER BY \"user\" ASC LIMIT $2",
                &[&after_hex, &limit],
            )
            .await?;
        Ok(rows.iter().map(|row| felt(row, "user")).collect())
    }

    async fn list_eligible_contestants(&self) -> Result<Vec<LpContest>, IndexerError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT \"user\", block, timestamp, contest_value, total_lp_value,
                        total_time_eligible, is_eligible, lp_token_balances, lp_values
                 FROM lp_contest WHERE is_eligible = TRUE",
                &[],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|row| LpContest {
                user: felt(row, "user"),
                block: row.get("block"),
                timestamp: row.get("timestamp"),
                contest_value: row.get("contest_value"),
                total_lp_value: row.get("total_lp_value"),
                total_time_eligible: row.get("total_time_eligible"),
                is_eligible: row.get("is_eligible"),
                lp_token_balances: balances_from_json(row.get("lp_token_balances")),
                lp_values: balances_from_json(row.get("lp_values")),
            })
            .collect())
    }

    async fn get_contest_checkpoint(&self) -> Result<Option<i64>, IndexerError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT last_drained_block FROM contest_checkpoint WHERE id = TRUE", &[])
            .await?;
        Ok(row.map(|row| row.get("last_drained_block")))
    }

    async fn put_contest_checkpoint(&self, block: i64) -> Result<(), IndexerError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO contest_checkpoint (id, last_drained_block) VALUES (TRUE, $1)
                 ON CONFLICT (id) DO UPDATE SET last_drained_block = EXCLUDED.last_drained_block",
                &[&block],
            )
            .await?;
        Ok(())
    }
}

fn row_to_pair(row: tokio_postgres::Row) -> Pair {
    Pair {
        id: felt(&row, "id"),
        token0_id: felt(&row, "token0_id"),
        token1_id: felt(&row, "token1_id"),
        reserve0: row.get("reserve0"),
        reserve1: row.get("reserve1"),
        total_supply: row.get("total_supply"),
        reserve_eth: row.get("reserve_eth"),
        reserve_usd: row.get("reserve_usd"),
        tracked_reserve_eth: row.get("tracked_reserve_eth"),
        token0_price: row.get("token0_price"),
        token1_price: row.get("token1_price"),
        volume_token0: row.get("volume_token0"),
        volume_token1: row.get("volume_token1"),
        volume_usd: row.get("volume_usd"),
        untracked_volume_usd: row.get("untracked_volume_usd"),
        tx_count: row.get("tx_count"),
        created_at_timestamp: row.get("created_at_timestamp"),
        created_at_block: row.get("created_at_block"),
        liquidity_provider_count: row.get("liquidity_provider_count"),
        valid_from: row.get("valid_from"),
        valid_to: row.get("valid_to"),
    }
}

fn row_to_mint(row: tokio_postgres::Row) -> Mint {
    Mint {
        transaction_hash: felt(&row, "transaction_hash"),
        index: row.get("index"),
        pair_id: felt(&row, "pair_id"),
        sender: opt_felt(&row, "sender"),
        to: felt(&row, "to"),
        liquidity: row.get("liquidity"),
        amount0: row.get("amount0"),
        amount1: row.get("amount1"),
        amount_usd: row.get("amount_usd"),
        timestamp: row.get("timestamp"),
        zap_in: row.get("zap_in"),
    }
}

fn row_to_burn(row: tokio_postgres::Row) -> Burn {
    Burn {
        transaction_hash: felt(&row, "transaction_hash"),
        index: row.get("index"),
        pair_id: felt(&row, "pair_id"),
        sender: opt_felt(&row, "sender"),
        to: opt_felt(&row, "to"),
        liquidity: row.get("liquidity"),
        amount0: row.get("amount0"),
        amount1: row.get("amount1"),
        amount_usd: row.get("amount_usd"),
        timestamp: row.get("timestamp"),
        needs_complete: row.get("needs_complete"),
        fee_to: opt_felt(&row, "fee_to"),
        fee_liquidity: row.get("fee_liquidity"),
    }
}

fn row_to_cumulative_price(row: tokio_postgres::Row) -> PairBlockCumulativePrice {
    PairBlockCumulativePrice {
        pair: felt(&row, "pair"),
        block: row.get("block"),
        price_usd: row.get("price_usd"),
        cumulative_price_usd: row.get("cumulative_price_usd"),
        time_cumulative_price_usd: row.get("time_cumulative_price_usd"),
    }
}
