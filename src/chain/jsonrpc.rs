use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::IndexerError;
use crate::value::FieldElement;

use super::{selector, ChainRpc};

/// Production `ChainRpc`: a StarkNet JSON-RPC `starknet_call` client pinned
/// to a block hash, grounded in the request/retry shape of this codebase's
/// PostgreSQL client (single `reqwest::Client`, explicit timeout, error
/// mapped into the crate's own error type rather than left as a raw
/// transport error).
pub struct JsonRpcChain {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Vec<String>>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcChain {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ChainRpc for JsonRpcChain {
    async fn call(
        &self,
        contract: &FieldElement,
        method: &str,
        args: &[FieldElement],
        at_block_hash: &FieldElement,
    ) -> Result<Vec<FieldElement>, IndexerError> {
        let entry_point_selector = selector(method);
        let calldata: Vec<String> = args.iter().map(|a| a.as_hex()).collect();

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "starknet_call",
            params: json!({
                "request": {
                    "contract_address": contract.as_hex(),
                    "entry_point_selector": entry_point_selector.as_hex(),
                    "calldata": calldata,
                },
                "block_id": { "block_hash": at_block_hash.as_hex() },
            }),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| IndexerError::Rpc(e.to_string()))?;

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| IndexerError::Rpc(e.to_string()))?;

        if let Some(err) = body.error {
            return Err(IndexerError::Rpc(format!("{} ({})", err.message, err.code)));
        }

        let result = body
            .result
            .ok_or_else(|| IndexerError::Rpc("empty starknet_call result".to_string()))?;

        result
            .iter()
            .map(|s| FieldElement::from_hex(s).ok_or_else(|| IndexerError::Rpc(format!("invalid felt in rpc result: {s}"))))
            .collect()
    }
}
