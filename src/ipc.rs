//! Scilla/EVM transaction-execution IPC contract. The
//! executor runs out-of-process; this core only shapes the request and
//! the `ExecutionOutcome` it expects back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::block::{Address, Transaction};
use crate::error::Result;

/// A single account-state mutation the executor wants applied, per
/// `apply` entries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApplyModify {
    pub address: Address,
    pub balance: Option<u128>,
    pub nonce: Option<u64>,
    pub code: Option<Vec<u8>>,
    pub storage: Vec<(Vec<u8>, Vec<u8>)>,
}

/// Why the executor stopped: `Fatal` carries an opaque reason payload
/// the caller surfaces verbatim to the transaction receipt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ExitReason {
    Succeed,
    Revert,
    Fatal(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub address: Address,
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
}

/// The executor's full response to one transaction submission,
/// matching JSON contract field for field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub apply: Vec<ApplyModify>,
    pub exit_reason: ExitReason,
    pub logs: Vec<ExecutionLog>,
    pub return_value: Vec<u8>,
    pub remaining_gas: u64,
}

impl ExecutionOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.exit_reason, ExitReason::Succeed)
    }
}

/// External collaborator contract: the Scilla/EVM execution engine.
/// Runs out-of-process.
#[async_trait]
pub trait TxExecutor: Send + Sync {
    async fn execute(&self, tx: &Transaction, gas_limit: u64) -> Result<ExecutionOutcome>;
}
