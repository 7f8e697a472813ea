use serde::{Deserialize, Serialize};

use super::keys::{PublicKey, Signature};
use super::peer::Peer;

/// An admitted PoW submission, mirroring `DSPowSolution`'s fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PowSubmission {
    pub block_num: u64,
    pub peer: Peer,
    pub pub_key: PublicKey,
    pub nonce: u64,
    pub resulting_hash: [u8; 32],
    pub mix_hash: [u8; 32],
    pub gas_price: u128,
    pub version: u32,
    pub signature: Signature,
}

impl PowSubmission {
    /// Bytes the signature is computed over: every field but the
    /// signature itself.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(&self.block_num.to_be_bytes());
        buf.extend_from_slice(&self.peer.ip_address.to_be_bytes());
        buf.extend_from_slice(&self.peer.port.to_be_bytes());
        buf.extend_from_slice(&self.pub_key.0);
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.extend_from_slice(&self.resulting_hash);
        buf.extend_from_slice(&self.mix_hash);
        buf.extend_from_slice(&self.gas_price.to_be_bytes());
        buf.extend_from_slice(&self.version.to_be_bytes());
        buf
    }
}
