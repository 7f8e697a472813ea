use serde::{Deserialize, Serialize};

use super::cosig::CoSignatures;
use super::keys::PublicKey;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MicroBlockHeader {
    pub shard_id: u32,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub rewards: u128,
    pub epoch_num: u64,
    pub tx_root_hash: [u8; 32],
    pub state_delta_hash: [u8; 32],
    pub tran_receipt_hash: [u8; 32],
    pub num_txs: u64,
    pub miner_pub_key: PublicKey,
    pub ds_block_num: u64,
}

/// A shard's proposed set of executed transactions, cosigned by the
/// shard's own committee.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MicroBlock {
    pub header: MicroBlockHeader,
    pub tx_hashes: Vec<[u8; 32]>,
    pub cosigs: CoSignatures,
}

impl MicroBlock {
    /// An "empty" placeholder microblock for a shard that missed the
    /// `MICROBLOCK_TIMEOUT` deadline.
    pub fn empty(shard_id: u32, epoch_num: u64, ds_block_num: u64, miner_pub_key: PublicKey) -> Self {
        Self {
            header: MicroBlockHeader {
                shard_id,
                gas_limit: 0,
                gas_used: 0,
                rewards: 0,
                epoch_num,
                tx_root_hash: [0u8; 32],
                state_delta_hash: [0u8; 32],
                tran_receipt_hash: [0u8; 32],
                num_txs: 0,
                miner_pub_key,
                ds_block_num,
            },
            tx_hashes: Vec::new(),
            cosigs: CoSignatures::default(),
        }
    }

    pub fn is_empty_shard(&self) -> bool {
        self.header.num_txs == 0 && self.tx_hashes.is_empty()
    }
}
