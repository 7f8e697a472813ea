use serde::{Deserialize, Serialize};

use super::cosig::CoSignatures;
use super::keys::PublicKey;

/// Header of a TX (final) block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxBlockHeader {
    pub gas_limit: u64,
    pub gas_used: u64,
    pub rewards: u128,
    pub block_num: u64,
    pub ds_block_num: u64,
    pub miner_pub_key: PublicKey,
    pub tx_root_hash: [u8; 32],
    pub state_root_hash: [u8; 32],
    pub state_delta_hash: [u8; 32],
    pub mb_info_hash: [u8; 32],
    pub num_txs: u64,
    pub committee_hash: [u8; 32],
    pub prev_hash: [u8; 32],
    pub version: u32,
    pub timestamp: crate::util::time::Timestamp,
}

impl TxBlockHeader {
    pub fn signing_digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.gas_limit.to_be_bytes());
        hasher.update(&self.gas_used.to_be_bytes());
        hasher.update(&self.rewards.to_be_bytes());
        hasher.update(&self.block_num.to_be_bytes());
        hasher.update(&self.ds_block_num.to_be_bytes());
        hasher.update(&self.miner_pub_key.0);
        hasher.update(&self.tx_root_hash);
        hasher.update(&self.state_root_hash);
        hasher.update(&self.state_delta_hash);
        hasher.update(&self.mb_info_hash);
        hasher.update(&self.num_txs.to_be_bytes());
        hasher.update(&self.committee_hash);
        hasher.update(&self.prev_hash);
        *hasher.finalize().as_bytes()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxBlock {
    pub header: TxBlockHeader,
    pub cosigs: CoSignatures,
}

/// Whether this final block closes out the DS epoch window without
/// coinbase distribution.
pub fn is_vacuous_epoch(tx_block_num: u64, num_final_block_per_pow: u64) -> bool {
    num_final_block_per_pow != 0 && tx_block_num % num_final_block_per_pow == 0
}
