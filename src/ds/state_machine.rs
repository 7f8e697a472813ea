//! Directory-service control loop: PoW admission, DS-block consensus,
//! sharding, microblock collection, final-block consensus, and
//! view-change, modeled as a phase enum paired with the active
//! committee.

use std::collections::{BTreeMap, HashMap};

use crate::block::{Peer, PowSubmission, PublicKey, Shard};
use crate::config::NodeConfig;
use crate::error::{Error, Result};

/// Directory-service phases,. `Error` is the terminal
/// sink for unrecoverable invariant violations; every other state is
/// re-entered after a successful view-change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DsState {
    PowSubmission,
    DsBlockConsensusPrep,
    DsBlockConsensus,
    ShardingConsensusPrep,
    ShardingConsensus,
    MicroBlockSubmission,
    FinalBlockConsensusPrep,
    FinalBlockConsensus,
    ViewChangeConsensusPrep,
    ViewChangeConsensus,
    Error,
}

/// Instruction byte a message claims to carry; the admission gate below
/// decides whether `state` currently accepts it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    PowSubmission,
    DsBlockConsensus,
    ShardingConsensus,
    MicroBlockSubmission,
    FinalBlockConsensus,
    ViewChangeConsensus,
}

/// `true` iff `state` accepts `instr` unconditionally. PoW and
/// FinalBlock are additionally allowed to suspend for late arrivals
/// — that suspension is the caller's timeout-future
/// concern, not expressed in this pure gate function.
pub fn admits(state: DsState, instr: Instruction) -> bool {
    matches!(
        (state, instr),
        (DsState::PowSubmission, Instruction::PowSubmission)
            | (DsState::DsBlockConsensusPrep | DsState::DsBlockConsensus, Instruction::DsBlockConsensus)
            | (DsState::ShardingConsensusPrep | DsState::ShardingConsensus, Instruction::ShardingConsensus)
            | (DsState::MicroBlockSubmission, Instruction::MicroBlockSubmission)
            | (DsState::FinalBlockConsensusPrep | DsState::FinalBlockConsensus, Instruction::FinalBlockConsensus)
            | (DsState::ViewChangeConsensusPrep | DsState::ViewChangeConsensus, Instruction::ViewChangeConsensus)
    )
}

/// Tracks PoW submissions admitted for the current block-number window
///.
#[derive(Default)]
pub struct PowAdmission {
    expected_block_num: u64,
    admitted: HashMap<Vec<u8>, PowSubmission>,
}

impl PowAdmission {
    pub fn new(expected_block_num: u64) -> Self {
        Self { expected_block_num, admitted: HashMap::new() }
    }

    /// Validates freshness, public-IP exclusion, and no-duplicate per
    /// pubkey, then admits. Signature verification over
    /// `submission.signing_bytes()` is the caller's job via
    /// [`crate::block::SignatureScheme`] — this function only enforces
    /// the structural invariants lists.
    pub fn admit(&mut self, submission: PowSubmission) -> Result<()> {
        if submission.block_num != self.expected_block_num {
            return Err(Error::invariant("PoW submission block number does not match chain head + 1"));
        }
        if !submission.peer.is_public() {
            return Err(Error::invariant("PoW submission from non-public peer address"));
        }
        if self.admitted.contains_key(&submission.pub_key.0) {
            return Err(Error::invariant("duplicate PoW submission for this epoch"));
        }
        self.admitted.insert(submission.pub_key.0.clone(), submission);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.admitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admitted.is_empty()
    }

    /// Winners sorted by `resulting_hash` ascending, capped at
    /// `max_pow_winners`.
    pub fn winners(&self, max_pow_winners: usize) -> Vec<PowSubmission> {
        let mut all: Vec<PowSubmission> = self.admitted.values().cloned().collect();
        all.sort_by(|a, b| a.resulting_hash.cmp(&b.resulting_hash));
        all.truncate(max_pow_winners);
        all
    }
}

/// Deterministic round-robin sharding assignment,:
/// winners (and any other eligible members) are sorted by
/// `hash(pubkey || randomness)` ascending and placed round-robin into
/// shards sized to `comm_size`.
pub fn assign_shards(eligible: &[(PublicKey, Peer)], randomness: &[u8], comm_size: usize) -> Vec<Shard> {
    if eligible.is_empty() || comm_size == 0 {
        return Vec::new();
    }
    let mut ordered: Vec<(PublicKey, Peer)> = eligible.to_vec();
    ordered.sort_by_cached_key(|(pk, _)| {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&pk.0);
        hasher.update(randomness);
        *hasher.finalize().as_bytes()
    });

    let num_shards = ordered.len().div_ceil(comm_size).max(1);
    let mut shards: Vec<Shard> = (0..num_shards).map(|_| Vec::new()).collect();
    for (i, member) in ordered.into_iter().enumerate() {
        shards[i % num_shards].push(member);
    }
    shards
}

/// Tracks which shards have submitted for the current final-block
/// round.
#[derive(Default)]
pub struct MicroBlockCollector {
    submissions: BTreeMap<u32, crate::block::MicroBlock>,
}

impl MicroBlockCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verifies the microblock's cosig against the committed shard
    /// composition before accepting it.
    pub fn submit(&mut self, shard: &Shard, block: crate::block::MicroBlock) -> Result<()> {
        if !block.cosigs.meets_quorum(shard.len()) {
            return Err(Error::invariant("microblock cosig does not meet shard quorum"));
        }
        self.submissions.insert(block.header.shard_id, block);
        Ok(())
    }

    /// Fills in empty placeholders for every shard that never
    /// submitted by the `MICROBLOCK_TIMEOUT` deadline, returning the complete, shard-ordered set.
    pub fn finalize(mut self, num_shards: u32, epoch_num: u64, ds_block_num: u64, miner_pub_key: PublicKey) -> Vec<crate::block::MicroBlock> {
        for shard_id in 0..num_shards {
            self.submissions
                .entry(shard_id)
                .or_insert_with(|| crate::block::MicroBlock::empty(shard_id, epoch_num, ds_block_num, miner_pub_key.clone()));
        }
        self.submissions.into_values().collect()
    }
}

/// The directory-service control loop's current phase and the
/// long-lived state that survives across phase transitions within one
/// DS rotation. Transition methods are intentionally synchronous and
/// pure where possible; the daemon binary is responsible for wiring
/// timeouts, network I/O, and persistence around them.
pub struct DsStateMachine {
    state: DsState,
    config: NodeConfig,
    ds_block_num: u64,
    tx_block_num: u64,
    committee: Vec<PublicKey>,
}

impl DsStateMachine {
    pub fn new(config: NodeConfig, committee: Vec<PublicKey>) -> Self {
        Self { state: DsState::PowSubmission, config, ds_block_num: 0, tx_block_num: 0, committee }
    }

    pub fn state(&self) -> DsState {
        self.state
    }

    pub fn committee(&self) -> &[PublicKey] {
        &self.committee
    }

    pub fn handle(&mut self, instr: Instruction) -> Result<()> {
        if !admits(self.state, instr) {
            return Err(Error::MessageRejection(format!("{:?} not accepted in state {:?}", instr, self.state)));
        }
        Ok(())
    }

    pub fn advance_to(&mut self, next: DsState) {
        self.state = next;
    }

    /// Rotates the committee on a successful DS-block: winners are
    /// prepended, and members named in `removed` are evicted from the
    /// bottom.
    pub fn rotate_committee(&mut self, winners: &[PublicKey], removed: &[PublicKey]) {
        let mut next = winners.to_vec();
        next.extend(self.committee.iter().filter(|m| !removed.contains(m)).cloned());
        self.committee = next;
        self.ds_block_num += 1;
    }

    pub fn advance_tx_block(&mut self) {
        self.tx_block_num += 1;
    }

    pub fn is_vacuous_epoch(&self) -> bool {
        crate::block::is_vacuous_epoch(self.tx_block_num, self.config.num_final_block_per_pow)
    }

    pub fn ds_block_num(&self) -> u64 {
        self.ds_block_num
    }

    pub fn tx_block_num(&self) -> u64 {
        self.tx_block_num
    }

    pub fn trigger_view_change(&mut self) {
        self.state = match self.state {
            DsState::DsBlockConsensusPrep | DsState::DsBlockConsensus => DsState::ViewChangeConsensusPrep,
            DsState::FinalBlockConsensusPrep | DsState::FinalBlockConsensus => DsState::ViewChangeConsensusPrep,
            other => other,
        };
    }

    /// Returns control to the interrupted phase once view-change
    /// succeeds, "On success, control returns
    /// to the state that was interrupted."
    pub fn resume_from_view_change(&mut self, interrupted: DsState) {
        self.state = interrupted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Peer;

    #[test]
    fn admission_gate_rejects_out_of_state_messages() {
        assert!(admits(DsState::PowSubmission, Instruction::PowSubmission));
        assert!(!admits(DsState::PowSubmission, Instruction::FinalBlockConsensus));
    }

    #[test]
    fn pow_admission_rejects_stale_block_num() {
        let mut admission = PowAdmission::new(10);
        let sub = PowSubmission {
            block_num: 9,
            peer: Peer { ip_address: 0x08080808, port: 3000 },
            pub_key: PublicKey(vec![1]),
            nonce: 0,
            resulting_hash: [0u8; 32],
            mix_hash: [0u8; 32],
            gas_price: 0,
            version: 1,
            signature: crate::block::Signature(vec![]),
        };
        assert!(admission.admit(sub).is_err());
    }

    #[test]
    fn pow_admission_rejects_private_subnet_peers() {
        let mut admission = PowAdmission::new(10);
        let sub = PowSubmission {
            block_num: 10,
            peer: Peer { ip_address: 0xC0A80001, port: 3000 }, // 192.168.0.1
            pub_key: PublicKey(vec![1]),
            nonce: 0,
            resulting_hash: [0u8; 32],
            mix_hash: [0u8; 32],
            gas_price: 0,
            version: 1,
            signature: crate::block::Signature(vec![]),
        };
        assert!(admission.admit(sub).is_err());
    }

    #[test]
    fn pow_admission_rejects_duplicate_pubkey() {
        let mut admission = PowAdmission::new(10);
        let mk = |hash: u8| PowSubmission {
            block_num: 10,
            peer: Peer { ip_address: 0x08080808, port: 3000 },
            pub_key: PublicKey(vec![1]),
            nonce: 0,
            resulting_hash: [hash; 32],
            mix_hash: [0u8; 32],
            gas_price: 0,
            version: 1,
            signature: crate::block::Signature(vec![]),
        };
        admission.admit(mk(1)).unwrap();
        assert!(admission.admit(mk(2)).is_err());
    }

    #[test]
    fn shard_assignment_is_round_robin_by_sorted_hash() {
        let members: Vec<(PublicKey, Peer)> =
            (0..10u8).map(|i| (PublicKey(vec![i]), Peer { ip_address: i as u128, port: 3000 })).collect();
        let shards = assign_shards(&members, b"seed", 3);
        assert_eq!(shards.len(), 4);
        assert_eq!(shards.iter().map(|s| s.len()).sum::<usize>(), 10);
    }

    #[test]
    fn microblock_collector_fills_missing_shards_as_empty() {
        let collector = MicroBlockCollector::new();
        let blocks = collector.finalize(3, 5, 1, PublicKey(vec![9]));
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.is_empty_shard()));
    }
}
