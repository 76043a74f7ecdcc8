use std::collections::VecDeque;

use async_trait::async_trait;

use crate::errors::IndexerError;
use crate::value::FieldElement;

use super::{BlockStream, StreamedBlock};

/// In-memory `BlockStream`: a fixed queue of blocks, drained in order.
/// `subscribe_pair` calls are recorded for assertion but don't change what
/// gets delivered (the fixture already contains every relevant event).
#[derive(Default)]
pub struct FakeBlockStream {
    pub blocks: VecDeque<StreamedBlock>,
    pub subscribed_pairs: Vec<FieldElement>,
    pub reset_to: Option<i64>,
}

impl FakeBlockStream {
    pub fn new(blocks: Vec<StreamedBlock>) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
            subscribed_pairs: Vec::new(),
            reset_to: None,
        }
    }
}

#[async_trait]
impl BlockStream for FakeBlockStream {
    async fn next_block(&mut self) -> Result<Option<StreamedBlock>, IndexerError> {
        Ok(self.blocks.pop_front())
    }

    fn subscribe_pair(&mut self, pair_address: &FieldElement) {
        self.subscribed_pairs.push(pair_address.clone());
    }

    async fn reset_cursor(&mut self, from_block: i64) -> Result<(), IndexerError> {
        self.reset_to = Some(from_block);
        Ok(())
    }
}
