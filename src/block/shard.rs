use super::keys::PublicKey;
use super::peer::Peer;

/// A single shard's membership, in canonical (committee) order,
/// mirroring `ShardStruct`.
pub type Shard = Vec<(PublicKey, Peer)>;

/// Sharding-structure commitment: `hash` over the ordered list of
/// shards, signed into the DS block as `sharding_hash`.
pub fn sharding_hash(shards: &[Shard]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for shard in shards {
        hasher.update(&(shard.len() as u32).to_be_bytes());
        for (pk, peer) in shard {
            hasher.update(&pk.0);
            hasher.update(&peer.ip_address.to_be_bytes());
            hasher.update(&peer.port.to_be_bytes());
        }
    }
    *hasher.finalize().as_bytes()
}
