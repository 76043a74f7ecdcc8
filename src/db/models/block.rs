use crate::value::FieldElement;

/// An observed block header. Append-only (§3); the indexer's processing
/// cursor is simply "the highest `number` persisted".
#[derive(Debug, Clone)]
pub struct Block {
    pub number: i64,
    pub hash: FieldElement,
    pub parent_hash: FieldElement,
    pub timestamp: i64,
}
