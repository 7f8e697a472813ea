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

use shardbft::block::{DSBlock, TxBlock};
use shardbft::byzantine::ByzantineAccounting;
use shardbft::coinbase::CoinbaseTracker;
use shardbft::config::NodeConfig;
use shardbft::ds::DsStateMachine;
use shardbft::store::{tables, BlockChainStore, DsBlockChainStore, TxBlockChainStore};

/// Everything a running node holds in memory: the DS control loop, the
/// two block ring buffers, and the accounting trackers the DS loop
/// feeds on every rotation. Wrapped by the daemon in an `Arc<RwLock<_>>`.
pub struct NodeState {
    pub config: NodeConfig,
    pub ds_state_machine: DsStateMachine,
    pub ds_blocks: DsBlockChainStore,
    pub tx_blocks: TxBlockChainStore,
    pub coinbase: CoinbaseTracker,
    pub byzantine: ByzantineAccounting,
}

impl NodeState {
    pub fn new(config: NodeConfig) -> Self {
        let ds_blocks: DsBlockChainStore = BlockChainStore::new(config.ds_blockchain_size, tables::DS_BLOCKS);
        let tx_blocks: TxBlockChainStore = BlockChainStore::new(config.tx_blockchain_size, tables::TX_BLOCKS);
        let ds_state_machine = DsStateMachine::new(config.clone(), Vec::new());
        Self { config, ds_state_machine, ds_blocks, tx_blocks, coinbase: CoinbaseTracker::new(), byzantine: ByzantineAccounting::new() }
    }

    pub fn last_ds_block(&self) -> Option<&DSBlock> {
        self.ds_blocks.get_last_block()
    }

    pub fn last_tx_block(&self) -> Option<&TxBlock> {
        self.tx_blocks.get_last_block()
    }
}
