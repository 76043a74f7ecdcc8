//! Value codecs and field-element helpers (C1).
//!
//! - [`felt`] - the 252-bit field element type and its 32-byte / hex codecs
//! - [`decimal`] - `to_decimal`/`price` and the cached power-of-ten table

mod decimal;
mod felt;

pub use decimal::{big_pow10, price, to_decimal};
pub use felt::FieldElement;
