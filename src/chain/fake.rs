use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::IndexerError;
use crate::value::FieldElement;

use super::ChainRpc;

/// In-memory `ChainRpc` used by handler tests: responses are registered per
/// `(contract, method)` ahead of time, independent of `args`/block hash.
#[derive(Default)]
pub struct FakeChainRpc {
    responses: Mutex<HashMap<(String, String), Vec<FieldElement>>>,
}

impl FakeChainRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, contract: &FieldElement, method: &str, result: Vec<FieldElement>) {
        self.responses
            .lock()
            .unwrap()
            .insert((contract.as_hex(), method.to_string()), result);
    }
}

#[async_trait]
impl ChainRpc for FakeChainRpc {
    async fn call(
        &self,
        contract: &FieldElement,
        method: &str,
        _args: &[FieldElement],
        _at_block_hash: &FieldElement,
    ) -> Result<Vec<FieldElement>, IndexerError> {
        self.responses
            .lock()
            .unwrap()
            .get(&(contract.as_hex(), method.to_string()))
            .cloned()
            .ok_or_else(|| IndexerError::Rpc(format!("no fake response for {method} on {contract}")))
    }
}
