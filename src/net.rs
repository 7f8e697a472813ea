//! Wire framing and outbound transport/peer-store contracts: each
//! frame pairs a type tag with a struct, the same shape
//! `impl_p2p_message!`-style message macros produce.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::block::Peer;
use crate::error::Result;
use crate::gossip::Message as GossipMessage;

/// Wire-level instruction byte, dispatched on by the receiving peer's
/// protocol handler. Mirrors the gossip [`MessageType`](crate::gossip::MessageType)
/// tags plus the DS-consensus frames that ride the same channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FrameType {
    Gossip = 0,
    PowSubmission = 1,
    ConsensusAnnounce = 2,
    ConsensusCommit = 3,
    BlockBroadcast = 4,
}

/// A single framed wire message: a type tag plus an opaque,
/// already-serialized body. Dispatch on `frame_type` is the receiving
/// side's job; this core never deserializes bodies it doesn't own the
/// type for.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Frame {
    pub frame_type: FrameType,
    pub body: Vec<u8>,
}

impl Frame {
    pub fn gossip(msg: &GossipMessage) -> Result<Self> {
        let body = serde_json::to_vec(msg).map_err(|e| crate::Error::invariant(e.to_string()))?;
        Ok(Self { frame_type: FrameType::Gossip, body })
    }

    pub fn decode_gossip(&self) -> Result<GossipMessage> {
        serde_json::from_slice(&self.body).map_err(|e| crate::Error::invariant(e.to_string()))
    }
}

/// External collaborator contract: outbound transport. A production
/// node wires this to its actual P2P stack (TCP/Tor/whatever the
/// deployment picks); this core only ever calls `send`/`broadcast`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, to: Peer, frame: Frame) -> Result<()>;
    async fn broadcast(&self, frame: Frame) -> Result<()>;
}

/// External collaborator contract: the peer directory this core
/// samples gossip targets and committee members from.
#[async_trait]
pub trait PeerStore: Send + Sync {
    async fn known_peers(&self) -> Vec<Peer>;
    async fn add_peer(&self, peer: Peer);
    async fn remove_peer(&self, peer: Peer);
}
