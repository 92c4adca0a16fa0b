//! Thin JSON-RPC 2.0 transport over HTTP.

use diem_primitives::AccountAddress;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::RpcError;
use crate::rpc::{RpcClient, RpcResponse, TransactionRecord};

/// JSON-RPC request envelope.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC response envelope with the Diem ledger extension fields.
#[derive(Debug, Deserialize)]
struct JsonRpcResponseEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
    #[serde(default)]
    diem_chain_id: Option<u8>,
    #[serde(default)]
    diem_ledger_version: Option<u64>,
    #[serde(default)]
    diem_ledger_timestampusec: Option<u64>,
}

/// HTTP transport for the Diem JSON-RPC API.
#[derive(Debug, Clone)]
pub struct JsonRpcTransport {
    /// JSON-RPC endpoint URL.
    url: String,
    /// Underlying HTTP client.
    client: reqwest::Client,
}

impl JsonRpcTransport {
    /// Create a transport from client configuration.
    ///
    /// # Arguments
    /// * `config` - Supplies the endpoint URL and per-request timeout.
    ///
    /// # Returns
    /// `Ok(JsonRpcTransport)`, or `Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            url: config.url.clone(),
            client,
        })
    }

    /// The endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call a JSON-RPC method.
    ///
    /// # Arguments
    /// * `method` - Method name.
    /// * `params` - Positional parameters as a JSON array.
    ///
    /// # Returns
    /// The decoded `result` with the ledger fields, `Server` for a JSON-RPC
    /// error object, or `MissingLedgerInfo` if a ledger field is absent.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<RpcResponse<T>, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let body = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let envelope: JsonRpcResponseEnvelope = serde_json::from_str(&body)?;
        if let Some(error) = envelope.error {
            return Err(RpcError::Server {
                code: error.code,
                message: error.message,
            });
        }

        let chain_id = envelope.diem_chain_id.ok_or(RpcError::MissingLedgerInfo("diem_chain_id"))?;
        let ledger_version = envelope
            .diem_ledger_version
            .ok_or(RpcError::MissingLedgerInfo("diem_ledger_version"))?;
        let ledger_timestamp_usec = envelope
            .diem_ledger_timestampusec
            .ok_or(RpcError::MissingLedgerInfo("diem_ledger_timestampusec"))?;

        let result = serde_json::from_value(envelope.result.unwrap_or(Value::Null))?;
        Ok(RpcResponse {
            result,
            chain_id,
            ledger_version,
            ledger_timestamp_usec,
        })
    }
}

impl RpcClient for JsonRpcTransport {
    async fn get_account_transaction(
        &self,
        address: AccountAddress,
        sequence_number: u64,
        include_events: bool,
    ) -> Result<RpcResponse<Option<TransactionRecord>>, RpcError> {
        self.call(
            "get_account_transaction",
            serde_json::json!([address.to_hex(), sequence_number, include_events]),
        )
        .await
    }
}
