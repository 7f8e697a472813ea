//! Eth-compatible JSON-RPC surface contract. Method
//! signatures and response shapes only — execution is delegated to
//! whatever [`crate::ipc::TxExecutor`] and [`crate::store::PersistentStore`]
//! the daemon is wired with. Grounded on `bin/darkfid2/src/rpc.rs`'s
//! `RequestHandler`/`JsonResult` dispatch pattern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 error codes this surface can return, including the
/// `MISC_ERROR`/fatal-reason cases raised by consensus and executor
/// failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
    MiscError = -32000,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonRequest {
    pub id: Value,
    pub method: String,
    pub params: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonResponse {
    pub id: Value,
    pub result: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub id: Value,
    pub code: i32,
    pub message: String,
}

impl JsonError {
    pub fn new(code: ErrorCode, message: impl Into<String>, id: Value) -> Self {
        Self { id, code: code as i32, message: message.into() }
    }
}

/// Either a successful response or a JSON-RPC error, the shape every
/// handler method below resolves to.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonResult {
    Resp(JsonResponse),
    Err(JsonError),
}

impl From<JsonResponse> for JsonResult {
    fn from(r: JsonResponse) -> Self {
        JsonResult::Resp(r)
    }
}

impl From<JsonError> for JsonResult {
    fn from(e: JsonError) -> Self {
        JsonResult::Err(e)
    }
}

/// A block as surfaced through `eth_getBlockByNumber`/`eth_getBlockByHash`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EthBlock {
    pub hash: String,
    pub number: String,
    pub transactions: Vec<String>,
}

/// A transaction as surfaced through `eth_getTransactionByHash`. `nonce`
/// is the stored nonce minus one, matching the Eth convention offset
/// calls out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EthTransaction {
    pub hash: String,
    pub nonce: String,
    pub from: String,
    pub to: Option<String>,
    pub value: String,
    pub input: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EthCallRequest {
    pub to: Option<String>,
    pub data: Option<String>,
    pub gas: Option<String>,
    pub value: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EthLogFilter {
    pub from_block: Option<String>,
    pub to_block: Option<String>,
    pub address: Option<String>,
    pub topics: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EthLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: String,
    pub transaction_hash: String,
}

/// Handler contract a daemon binds its node state to, one method per
/// row. Dispatch (`handle_request` matching on
/// `req.method`) is the daemon's job; this core only defines what each
/// method promises to return.
#[async_trait]
pub trait EthRpc: Send + Sync {
    async fn eth_chain_id(&self) -> JsonResult;
    async fn eth_block_number(&self) -> JsonResult;
    async fn eth_get_block_by_number(&self, tag: String, full_tx: bool) -> JsonResult;
    async fn eth_get_block_by_hash(&self, hash: String, full_tx: bool) -> JsonResult;
    async fn eth_get_transaction_by_hash(&self, hash: String) -> JsonResult;
    async fn eth_get_transaction_count(&self, address: String, tag: String) -> JsonResult;
    async fn eth_get_balance(&self, address: String, tag: String) -> JsonResult;
    async fn eth_gas_price(&self) -> JsonResult;
    async fn eth_call(&self, tx: EthCallRequest, tag: String) -> JsonResult;
    async fn eth_estimate_gas(&self, tx: EthCallRequest) -> JsonResult;
    async fn eth_get_logs(&self, filter: EthLogFilter) -> JsonResult;
    async fn net_version(&self) -> JsonResult;
    async fn web3_client_version(&self) -> JsonResult;
    async fn web3_sha3(&self, data: String) -> JsonResult;
}

/// `eth_gasPrice`'s scaling formula.
pub fn scaled_gas_price(ds_gas_price: u128, evm_zil_scaling_factor: u128, gas_scaling_factor: u128) -> u128 {
    (ds_gas_price * evm_zil_scaling_factor / gas_scaling_factor) + 1_000_000
}

/// `eth_chainId`'s formula.
pub fn chain_id(network_id: u16) -> u32 {
    0x8000 | network_id as u32
}
