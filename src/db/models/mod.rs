//! Entity model structs (§3). One module per entity or closely related
//! pair of entities, mirroring how this codebase lays out `db/models/`.

mod block;
mod contest;
mod cumulative_price;
mod factory;
mod liquidity;
mod mint_burn;
mod pair;
mod rollup;
mod swap;
mod transaction;
mod user;

pub use block::Block;
pub use contest::{LpContest, LpContestBlock};
pub use cumulative_price::PairBlockCumulativePrice;
pub use factory::Factory;
pub use liquidity::{LiquidityPosition, LiquidityPositionSnapshot};
pub use mint_burn::{Burn, Mint};
pub use pair::Pair;
pub use rollup::{day_id, hour_id, ExchangeDayData, PairDayData, PairHourData, TokenDayData};
pub use swap::Swap;
pub use transaction::Transaction;
pub use user::User;

mod token;
pub use token::Token;
