//! Wire message shapes exchanged by the gossip layer.

use serde::{Deserialize, Serialize};

/// Sentinel rumor id used on `EMPTY_PUSH`/`EMPTY_PULL` — there is no
/// rumor payload attached.
pub const NO_RUMOR: i64 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    Push,
    Pull,
    EmptyPush,
    EmptyPull,
    LazyPush,
    LazyPull,
    Forward,
    Undefined,
}

/// A single gossip wire message. `rumor_id == NO_RUMOR` for the
/// `Empty*` variants, which carry no payload, only a round counter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageType,
    pub rumor_id: i64,
    pub rounds: u32,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn push(rumor_id: i64, rounds: u32, payload: Vec<u8>) -> Self {
        Self { kind: MessageType::Push, rumor_id, rounds, payload }
    }

    pub fn pull(rumor_id: i64, rounds: u32) -> Self {
        Self { kind: MessageType::Pull, rumor_id, rounds, payload: Vec::new() }
    }

    pub fn empty_push() -> Self {
        Self { kind: MessageType::EmptyPush, rumor_id: NO_RUMOR, rounds: 0, payload: Vec::new() }
    }

    pub fn empty_pull() -> Self {
        Self { kind: MessageType::EmptyPull, rumor_id: NO_RUMOR, rounds: 0, payload: Vec::new() }
    }

    pub fn lazy_push(rumor_id: i64, rounds: u32) -> Self {
        Self { kind: MessageType::LazyPush, rumor_id, rounds, payload: Vec::new() }
    }

    pub fn lazy_pull(rumor_id: i64, rounds: u32) -> Self {
        Self { kind: MessageType::LazyPull, rumor_id, rounds, payload: Vec::new() }
    }

    pub fn forward(rumor_id: i64, payload: Vec<u8>) -> Self {
        Self { kind: MessageType::Forward, rumor_id, rounds: 0, payload }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, MessageType::EmptyPush | MessageType::EmptyPull)
    }
}
