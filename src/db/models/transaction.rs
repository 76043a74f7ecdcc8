use crate::value::FieldElement;

/// Append-only record of the first block at which a transaction hash was
/// observed (§3). Looked up, never mutated.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub hash: FieldElement,
    pub block_number: i64,
    pub block_timestamp: i64,
}
