use crate::value::FieldElement;

/// A wallet that has interacted with the exchange (§3). Created lazily on
/// first reference, versioned on every counter mutation.
#[derive(Debug, Clone)]
pub struct User {
    pub id: FieldElement,
    pub tx_count: i64,
    pub mint_count: i64,
    pub burn_count: i64,
    pub swap_count: i64,
    pub valid_from: i64,
    pub valid_to: Option<i64>,
}

impl User {
    pub fn new(id: FieldElement, valid_from: i64) -> Self {
        Self {
            id,
            tx_count: 0,
            mint_count: 0,
            burn_count: 0,
            swap_count: 0,
            valid_from,
            valid_to: None,
        }
    }

    pub fn next_version(&self, valid_from: i64) -> Self {
        let mut next = self.clone();
        next.valid_from = valid_from;
        next.valid_to = None;
        next
    }
}
