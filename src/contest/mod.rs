//! LP-contest scheduler + worker (C8/C9), grounded in `tasks.py`'s
//! `lp_contest_for_block` (scheduler) and `lp_contest_each_user` (worker),
//! plus `update_pair_cumulative_price` (the cumulative-price series
//! extension both of them depend on).

pub(crate) mod cumulative_price;
mod scheduler;
mod worker;

pub use cumulative_price::extend_cumulative_price_series;
pub use scheduler::{aggregate_block, triggers_on};
pub use worker::aggregate_user;
