//! Tests for the Diem client.
//!
//! The JSON-RPC transport is exercised against `wiremock` servers. The wait
//! protocol runs against a scripted in-memory `RpcClient`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use diem_primitives::ed25519::Ed25519PrivateKey;
use diem_primitives::{AccountAddress, HashValue};
use diem_types::signing::TransactionSigner;
use diem_types::{Module, RawTransaction, TransactionPayload};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::{Client, ExpectedTransaction};
use crate::config::ClientConfig;
use crate::error::{ClientError, RpcError};
use crate::jsonrpc::JsonRpcTransport;
use crate::ledger::LedgerState;
use crate::rpc::{RpcClient, RpcResponse, TransactionData, TransactionRecord, VmStatus};

const CHAIN_ID: u8 = 2;
const TXN_HASH: &str = "8c7f5fe4b0cda3c2f0f2f3e34e6b2cf3a1e0e6c7ad3c8d2a9c3b0d3e5f6a7b8c";

fn sender() -> AccountAddress {
    AccountAddress::from_hex("f72589b71ff4f8d139674a3f7369c69b").unwrap()
}

fn test_config(url: &str) -> ClientConfig {
    ClientConfig {
        url: url.to_string(),
        chain_id: CHAIN_ID,
        poll_interval: Duration::from_millis(50),
        request_timeout: Duration::from_secs(5),
    }
}

fn record(hash: &str, status: &str) -> TransactionRecord {
    TransactionRecord {
        version: 42,
        hash: hash.to_string(),
        gas_used: 100,
        vm_status: VmStatus::new(status),
        transaction: TransactionData {
            kind: "user".to_string(),
            signature: Some("aabbcc".to_string()),
            ..Default::default()
        },
        events: Vec::new(),
    }
}

// -----------------------------------------------------------------------
// Scripted RPC collaborator
// -----------------------------------------------------------------------

type Reply = Result<RpcResponse<Option<TransactionRecord>>, RpcError>;

/// Replays queued replies, then repeats `fallback` forever.
struct ScriptedRpc {
    replies: Mutex<VecDeque<Reply>>,
    fallback: RpcResponse<Option<TransactionRecord>>,
    calls: AtomicUsize,
}

impl ScriptedRpc {
    fn new(replies: Vec<Reply>, fallback: RpcResponse<Option<TransactionRecord>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RpcClient for ScriptedRpc {
    async fn get_account_transaction(
        &self,
        _address: AccountAddress,
        _sequence_number: u64,
        _include_events: bool,
    ) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

fn response(
    result: Option<TransactionRecord>,
    chain_id: u8,
    version: u64,
    timestamp_usec: u64,
) -> RpcResponse<Option<TransactionRecord>> {
    RpcResponse {
        result,
        chain_id,
        ledger_version: version,
        ledger_timestamp_usec: timestamp_usec,
    }
}

fn scripted_client(replies: Vec<Reply>, fallback: RpcResponse<Option<TransactionRecord>>) -> Client<ScriptedRpc> {
    Client::new(ScriptedRpc::new(replies, fallback), test_config("http://unused"))
}

fn expected_hash() -> ExpectedTransaction {
    ExpectedTransaction::Hash(HashValue::from_hex(TXN_HASH).unwrap())
}

/// Expiration far beyond any ledger timestamp used here.
const FAR_EXPIRATION: u64 = 4_000_000_000;

// -----------------------------------------------------------------------
// Ledger consistency
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_stale_response_leaves_state_unchanged() {
    let client = scripted_client(
        vec![
            Ok(response(None, CHAIN_ID, 10, 1000)),
            Ok(response(None, CHAIN_ID, 9, 1000)),
            Ok(response(None, CHAIN_ID, 11, 1001)),
        ],
        response(None, CHAIN_ID, 11, 1001),
    );

    client.get_account_transaction(sender(), 0, false).await.unwrap();
    assert_eq!(client.last_ledger_state(), LedgerState::new(10, 1000));

    let err = client.get_account_transaction(sender(), 0, false).await.unwrap_err();
    assert!(err.is_stale());
    assert_eq!(client.last_ledger_state(), LedgerState::new(10, 1000));

    client.get_account_transaction(sender(), 0, false).await.unwrap();
    assert_eq!(client.last_ledger_state(), LedgerState::new(11, 1001));
}

#[tokio::test]
async fn test_rpc_error_is_not_stale() {
    let client = scripted_client(
        vec![Err(RpcError::MissingLedgerInfo("diem_chain_id"))],
        response(None, CHAIN_ID, 1, 1),
    );
    let err = client.get_account_transaction(sender(), 0, false).await.unwrap_err();
    assert!(!err.is_stale());
    assert!(matches!(err, ClientError::Rpc(RpcError::MissingLedgerInfo("diem_chain_id"))));
}

// -----------------------------------------------------------------------
// Wait protocol
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_wait_times_out_when_never_found() {
    let client = scripted_client(vec![], response(None, CHAIN_ID, 1, 1_000_000));
    let start = std::time::Instant::now();

    let err = client
        .wait_for_transaction(sender(), 0, &expected_hash(), FAR_EXPIRATION, Duration::from_secs(1))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::WaitTimeout { duration } if duration == Duration::from_secs(1)));
    assert!(err.is_resubmittable());
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert!(client.rpc().calls() > 1);
}

#[tokio::test]
async fn test_wait_hash_mismatch_is_immediate() {
    let other = "00".repeat(32);
    let client = scripted_client(vec![], response(Some(record(&other, "executed")), CHAIN_ID, 5, 5));

    let err = client
        .wait_for_transaction(sender(), 0, &expected_hash(), FAR_EXPIRATION, Duration::from_secs(5))
        .await
        .unwrap_err();

    match err {
        ClientError::TransactionMismatch { expected, got } => {
            assert_eq!(expected, TXN_HASH);
            assert_eq!(got, other);
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
    assert_eq!(client.rpc().calls(), 1);
}

#[tokio::test]
async fn test_wait_hash_compare_ignores_case() {
    let upper = TXN_HASH.to_ascii_uppercase();
    let client = scripted_client(vec![], response(Some(record(&upper, "executed")), CHAIN_ID, 5, 5));

    let found = client
        .wait_for_transaction(sender(), 0, &expected_hash(), FAR_EXPIRATION, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(found.version, 42);
}

#[tokio::test]
async fn test_wait_execution_failure_is_immediate() {
    let client = scripted_client(vec![], response(Some(record(TXN_HASH, "out_of_gas")), CHAIN_ID, 5, 5));

    let err = client
        .wait_for_transaction(sender(), 0, &expected_hash(), FAR_EXPIRATION, Duration::from_secs(5))
        .await
        .unwrap_err();

    match err {
        ClientError::ExecutionFailed { status } => assert_eq!(status.kind, "out_of_gas"),
        other => panic!("expected execution failure, got {other:?}"),
    }
    assert_eq!(client.rpc().calls(), 1);
}

#[tokio::test]
async fn test_wait_expired_by_ledger_clock() {
    let expiration = 1_000u64;
    let client = scripted_client(vec![], response(None, CHAIN_ID, 5, expiration * 1_000_000));

    let err = client
        .wait_for_transaction(sender(), 0, &expected_hash(), expiration, Duration::from_secs(5))
        .await
        .unwrap_err();

    match err {
        ClientError::TransactionExpired { expiration_time_sec, ledger_timestamp_usec } => {
            assert_eq!(expiration_time_sec, expiration);
            assert_eq!(ledger_timestamp_usec, expiration * 1_000_000);
        }
        other => panic!("expected expiry, got {other:?}"),
    }
    assert_eq!(client.rpc().calls(), 1);
}

#[tokio::test]
async fn test_wait_chain_id_mismatch() {
    let client = scripted_client(
        vec![Ok(response(None, CHAIN_ID, 1, 1))],
        response(None, 4, 2, 2),
    );

    let err = client
        .wait_for_transaction(sender(), 0, &expected_hash(), FAR_EXPIRATION, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::ChainIdMismatch { expected: 2, got: 4 }));
    assert_eq!(client.rpc().calls(), 2);
}

#[tokio::test]
async fn test_wait_retries_stale_then_succeeds() {
    let client = scripted_client(
        vec![
            Ok(response(None, CHAIN_ID, 10, 1000)),
            Ok(response(None, CHAIN_ID, 9, 900)),
            Ok(response(None, CHAIN_ID, 8, 800)),
        ],
        response(Some(record(TXN_HASH, "executed")), CHAIN_ID, 12, 1200),
    );

    let found = client
        .wait_for_transaction(sender(), 0, &expected_hash(), FAR_EXPIRATION, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(found.hash, TXN_HASH);
    assert_eq!(client.rpc().calls(), 4);
    assert_eq!(client.last_ledger_state(), LedgerState::new(12, 1200));
}

#[tokio::test]
async fn test_wait_matches_signature() {
    let client = scripted_client(vec![], response(Some(record(TXN_HASH, "executed")), CHAIN_ID, 5, 5));
    let expected = ExpectedTransaction::Signature("AABBCC".to_string());

    let found = client
        .wait_for_transaction(sender(), 0, &expected, FAR_EXPIRATION, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(found.signature(), Some("aabbcc"));
}

#[tokio::test]
async fn test_wait_cancelled() {
    let client = scripted_client(vec![], response(None, CHAIN_ID, 1, 1));
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        canceller.cancel();
    });

    let err = client
        .wait_for_transaction_with_cancel(
            sender(),
            0,
            &expected_hash(),
            FAR_EXPIRATION,
            Duration::from_secs(10),
            &token,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
    assert!(!err.is_resubmittable());
}

#[tokio::test]
async fn test_wait_for_signed_transaction_uses_hash() {
    let key = Ed25519PrivateKey::from_seed([5u8; 32]);
    let signed = RawTransaction {
        sender: key.account_address(),
        sequence_number: 7,
        payload: TransactionPayload::Module(Module::new(vec![1, 2, 3])),
        max_gas_amount: 1_000,
        gas_unit_price: 0,
        gas_currency_code: "XUS".to_string(),
        expiration_timestamp_secs: FAR_EXPIRATION,
        chain_id: CHAIN_ID,
    }
    .sign(&key);

    let hash = signed.hash().to_hex();
    let client = scripted_client(vec![], response(Some(record(&hash, "executed")), CHAIN_ID, 5, 5));

    let found = client
        .wait_for_signed_transaction(&signed, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(found.hash, hash);
}

// -----------------------------------------------------------------------
// JSON-RPC transport
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_jsonrpc_get_account_transaction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "get_account_transaction",
            "params": ["f72589b71ff4f8d139674a3f7369c69b", 3, true]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "diem_chain_id": 2,
            "diem_ledger_version": 1000,
            "diem_ledger_timestampusec": 1_600_000_000_000_000u64,
            "result": {
                "version": 900,
                "hash": TXN_HASH,
                "gas_used": 481,
                "vm_status": {"type": "executed"},
                "transaction": {"type": "user", "sequence_number": 3, "signature": "aabbcc"},
                "events": []
            }
        })))
        .mount(&server)
        .await;

    let transport = JsonRpcTransport::new(&test_config(&server.uri())).unwrap();
    let resp = transport.get_account_transaction(sender(), 3, true).await.unwrap();

    assert_eq!(resp.chain_id, 2);
    assert_eq!(resp.ledger_state(), LedgerState::new(1000, 1_600_000_000_000_000));
    let record = resp.result.unwrap();
    assert_eq!(record.version, 900);
    assert!(record.vm_status.is_executed());
}

#[tokio::test]
async fn test_jsonrpc_null_result_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "diem_chain_id": 2,
            "diem_ledger_version": 5,
            "diem_ledger_timestampusec": 5,
            "result": null
        })))
        .mount(&server)
        .await;

    let client = Client::connect(test_config(&server.uri())).unwrap();
    let found = client.get_account_transaction(sender(), 0, false).await.unwrap();
    assert!(found.is_none());
    assert_eq!(client.last_ledger_state(), LedgerState::new(5, 5));
}

#[tokio::test]
async fn test_jsonrpc_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "diem_chain_id": 2,
            "diem_ledger_version": 5,
            "diem_ledger_timestampusec": 5,
            "error": {"code": -32602, "message": "Invalid params"}
        })))
        .mount(&server)
        .await;

    let transport = JsonRpcTransport::new(&test_config(&server.uri())).unwrap();
    let err = transport.get_account_transaction(sender(), 0, false).await.unwrap_err();
    match err {
        RpcError::Server { code, message } => {
            assert_eq!(code, -32602);
            assert_eq!(message, "Invalid params");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_jsonrpc_missing_ledger_info() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "diem_chain_id": 2,
            "diem_ledger_version": 5,
            "result": null
        })))
        .mount(&server)
        .await;

    let transport = JsonRpcTransport::new(&test_config(&server.uri())).unwrap();
    let err = transport.get_account_transaction(sender(), 0, false).await.unwrap_err();
    assert!(matches!(err, RpcError::MissingLedgerInfo("diem_ledger_timestampusec")));
}

#[tokio::test]
async fn test_jsonrpc_invalid_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let transport = JsonRpcTransport::new(&test_config(&server.uri())).unwrap();
    let err = transport.get_account_transaction(sender(), 0, false).await.unwrap_err();
    assert!(matches!(err, RpcError::Serialization(_)));
}

#[tokio::test]
async fn test_jsonrpc_http_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = Client::connect(test_config(&server.uri())).unwrap();
    let err = client.get_account_transaction(sender(), 0, false).await.unwrap_err();
    assert!(matches!(err, ClientError::Rpc(RpcError::Http(_))));
}

#[tokio::test]
async fn test_jsonrpc_chain_id_mismatch_through_client() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "diem_chain_id": 1,
            "diem_ledger_version": 5,
            "diem_ledger_timestampusec": 5,
            "result": null
        })))
        .mount(&server)
        .await;

    let client = Client::connect(test_config(&server.uri())).unwrap();
    let err = client.get_account_transaction(sender(), 0, false).await.unwrap_err();
    assert!(matches!(err, ClientError::ChainIdMismatch { expected: 2, got: 1 }));
    assert_eq!(client.last_ledger_state(), LedgerState::default());
}
