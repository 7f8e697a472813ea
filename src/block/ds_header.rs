use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cosig::CoSignatures;
use super::keys::{PublicKey, Signature};
use super::peer::Peer;

/// Header of a DS (directory-service) block.
/// Immutable once signed: there is deliberately no setter on a
/// constructed header, only the builder in [`DSBlockHeader::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DSBlockHeader {
    pub ds_difficulty: u8,
    pub difficulty: u8,
    pub prev_hash: [u8; 32],
    pub nonce: u64,
    pub miner_pub_key: PublicKey,
    pub leader_pub_key: PublicKey,
    pub block_num: u64,
    pub epoch_num: u64,
    pub gas_price: u128,
    pub sw_info: String,
    pub ds_winners: BTreeMap<Vec<u8>, Peer>,
    pub removed_pub_keys: Vec<PublicKey>,
    pub sharding_hash: [u8; 32],
    pub reserved_field: Vec<u8>,
    pub committee_hash: [u8; 32],
    pub version: u32,
}

impl DSBlockHeader {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ds_difficulty: u8,
        difficulty: u8,
        prev_hash: [u8; 32],
        nonce: u64,
        miner_pub_key: PublicKey,
        leader_pub_key: PublicKey,
        block_num: u64,
        epoch_num: u64,
        gas_price: u128,
        ds_winners: BTreeMap<Vec<u8>, Peer>,
        removed_pub_keys: Vec<PublicKey>,
        sharding_hash: [u8; 32],
        committee_hash: [u8; 32],
    ) -> Self {
        Self {
            ds_difficulty,
            difficulty,
            prev_hash,
            nonce,
            miner_pub_key,
            leader_pub_key,
            block_num,
            epoch_num,
            gas_price,
            sw_info: String::new(),
            ds_winners,
            removed_pub_keys,
            sharding_hash,
            reserved_field: Vec::new(),
            committee_hash,
            version: 1,
        }
    }

    /// Digest signed over by `cs1`, matching `CoSignatures::cs1`'s target.
    pub fn signing_digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[self.ds_difficulty, self.difficulty]);
        hasher.update(&self.prev_hash);
        hasher.update(&self.nonce.to_be_bytes());
        hasher.update(&self.miner_pub_key.0);
        hasher.update(&self.leader_pub_key.0);
        hasher.update(&self.block_num.to_be_bytes());
        hasher.update(&self.epoch_num.to_be_bytes());
        hasher.update(&self.gas_price.to_be_bytes());
        hasher.update(&self.sharding_hash);
        hasher.update(&self.committee_hash);
        *hasher.finalize().as_bytes()
    }
}

/// A complete, cosigned DS block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DSBlock {
    pub header: DSBlockHeader,
    pub cosigs: CoSignatures,
}

/// Records the view-change that occurred between two DS states.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VCBlockHeader {
    pub view_change_ds_epoch_no: u64,
    pub view_change_epoch_no: u64,
    pub view_change_state: String,
    pub candidate_leader_pub_key: PublicKey,
    pub faulty_leaders: Vec<(PublicKey, Peer)>,
    pub view_change_counter: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VCBlock {
    pub header: VCBlockHeader,
    pub cosigs: CoSignatures,
    pub signature: Option<Signature>,
}
