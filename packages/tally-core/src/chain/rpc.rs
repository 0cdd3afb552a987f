//! JSON-RPC chain transport.
//!
//! Speaks a small JSON-RPC 2.0 protocol over HTTP POST to a chain endpoint:
//!
//! | Method              | Params                     | Result              |
//! |---------------------|----------------------------|---------------------|
//! | `chain_execute`     | `{ call: SignedCall }`     | `ExecuteEffects`    |
//! | `chain_getObject`   | `{ id }`                   | `ObjectRecord`      |
//! | `chain_ownedObjects`| `{ owner, type_tag }`      | `[ObjectRecord]`    |
//!
//! Transport failures and RPC error payloads map to distinct error
//! variants; neither is retried.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use super::{ChainClient, ExecuteEffects, ObjectRecord, SignedCall};
use crate::error::{Error, Result};
use crate::model::{Address, ObjectId};

use async_trait::async_trait;

// ── Wire Types ────────────────────────────────────────────────────────────────

/// A JSON-RPC request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Request id for matching responses.
    pub id: u64,
    /// Method name.
    pub method: &'static str,
    /// Method parameters.
    pub params: serde_json::Value,
}

impl RpcRequest {
    fn new(id: u64, method: &'static str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// A JSON-RPC response envelope: exactly one of `result` / `error` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    /// Successful result, if any.
    pub result: Option<T>,
    /// Error payload, if the call failed.
    pub error: Option<RpcErrorBody>,
}

/// Error payload inside a response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorBody {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

// ── Client ────────────────────────────────────────────────────────────────────

/// [`ChainClient`] over HTTP JSON-RPC.
pub struct RpcChainClient {
    http: reqwest::Client,
    url: String,
    next_id: std::sync::atomic::AtomicU64,
}

impl RpcChainClient {
    /// Create a client for the endpoint at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            next_id: std::sync::atomic::AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<T> {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        tracing::debug!(method, id, "RPC request");

        let response: RpcResponse<T> = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(Error::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        response.result.ok_or_else(|| {
            Error::Serialization(format!("{}: response had neither result nor error", method))
        })
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn execute(&self, call: &SignedCall) -> Result<ExecuteEffects> {
        self.call("chain_execute", json!({ "call": call })).await
    }

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectRecord> {
        self.call("chain_getObject", json!({ "id": id })).await
    }

    async fn owned_objects(&self, owner: &Address, type_tag: &str) -> Result<Vec<ObjectRecord>> {
        self.call(
            "chain_ownedObjects",
            json!({ "owner": owner, "type_tag": type_tag }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_request_serialization() {
        let request = RpcRequest::new(7, "chain_getObject", json!({ "id": "0xabc" }));
        let encoded = serde_json::to_string(&request).unwrap();
        assert!(encoded.contains("\"jsonrpc\":\"2.0\""));
        assert!(encoded.contains("\"id\":7"));
        assert!(encoded.contains("\"method\":\"chain_getObject\""));
    }

    #[test]
    fn test_rpc_response_with_result() {
        let json = r#"{"jsonrpc":"2.0","id":1,"result":{"digest":"tx-1","created":[]}}"#;
        let response: RpcResponse<ExecuteEffects> = serde_json::from_str(json).unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.result.unwrap().digest.0, "tx-1");
    }

    #[test]
    fn test_rpc_response_with_error() {
        let json = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution aborted"}}"#;
        let response: RpcResponse<ExecuteEffects> = serde_json::from_str(json).unwrap();
        assert!(response.result.is_none());
        let err = response.error.unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "execution aborted");
    }
}
