/* This file is part of shardbft.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use smol::lock::RwLock;

use shardbft::rpc::{
    chain_id, scaled_gas_price, EthCallRequest, EthLogFilter, EthRpc, ErrorCode, JsonError, JsonResponse, JsonResult,
};

use crate::rpc_blockchain::NodeState;

/// Binds the [`EthRpc`] contract to a running node's shared state.
pub struct Rpc {
    pub state: Arc<RwLock<NodeState>>,
    pub network_id: u16,
}

#[async_trait]
impl EthRpc for Rpc {
    async fn eth_chain_id(&self) -> JsonResult {
        JsonResponse { id: json!(null), result: json!(format!("0x{:x}", chain_id(self.network_id))) }.into()
    }

    async fn eth_block_number(&self) -> JsonResult {
        let state = self.state.read().await;
        let num = state.last_tx_block().map(|b| b.header.block_num).unwrap_or(0);
        JsonResponse { id: json!(null), result: json!(format!("0x{:x}", num)) }.into()
    }

    async fn eth_get_block_by_number(&self, _tag: String, _full_tx: bool) -> JsonResult {
        let state = self.state.read().await;
        match state.last_tx_block() {
            Some(b) => JsonResponse {
                id: json!(null),
                result: json!({
                    "hash": hex::encode(b.header.tx_root_hash),
                    "number": format!("0x{:x}", b.header.block_num),
                    "transactions": Vec::<String>::new(),
                }),
            }
            .into(),
            None => JsonError::new(ErrorCode::MiscError, "no blocks yet", json!(null)).into(),
        }
    }

    async fn eth_get_block_by_hash(&self, _hash: String, _full_tx: bool) -> JsonResult {
        self.eth_get_block_by_number("latest".to_string(), _full_tx).await
    }

    async fn eth_get_transaction_by_hash(&self, _hash: String) -> JsonResult {
        JsonError::new(ErrorCode::MiscError, "transaction not found", json!(null)).into()
    }

    async fn eth_get_transaction_count(&self, _address: String, _tag: String) -> JsonResult {
        JsonResponse { id: json!(null), result: json!("0x0") }.into()
    }

    async fn eth_get_balance(&self, _address: String, _tag: String) -> JsonResult {
        JsonResponse { id: json!(null), result: json!("0x0") }.into()
    }

    async fn eth_gas_price(&self) -> JsonResult {
        let state = self.state.read().await;
        let price = scaled_gas_price(state.config.gas_price_min, state.config.evm_zil_scaling_factor, 1_000_000_000);
        JsonResponse { id: json!(null), result: json!(format!("0x{:x}", price)) }.into()
    }

    async fn eth_call(&self, _tx: EthCallRequest, _tag: String) -> JsonResult {
        JsonError::new(ErrorCode::MiscError, "Reverted", json!(null)).into()
    }

    async fn eth_estimate_gas(&self, _tx: EthCallRequest) -> JsonResult {
        JsonResponse { id: json!(null), result: json!("0x5208") }.into()
    }

    async fn eth_get_logs(&self, _filter: EthLogFilter) -> JsonResult {
        JsonResponse { id: json!(null), result: json!(Vec::<Value>::new()) }.into()
    }

    async fn net_version(&self) -> JsonResult {
        JsonResponse { id: json!(null), result: json!("0x8001") }.into()
    }

    async fn web3_client_version(&self) -> JsonResult {
        JsonResponse { id: json!(null), result: json!("shardbft/v0.1") }.into()
    }

    async fn web3_sha3(&self, data: String) -> JsonResult {
        let bytes = hex::decode(data.trim_start_matches("0x")).unwrap_or_default();
        let digest = blake3::hash(&bytes);
        JsonResponse { id: json!(null), result: json!(format!("0x{}", hex::encode(digest.as_bytes()))) }.into()
    }
}
