//! Two-round multi-signature consensus coordinator shared by DS-block
//! and final-block consensus, grounded on the
//! teacher's `ProtocolParticipant`/`ValidatorStatePtr` actor pattern:
//! a small piece of state behind a lock, driven by messages rather than
//! by blocking on a thread.

use crate::block::{CoSignatures, PublicKey, Signature};
use crate::error::{Error, Result};

/// Which cosigning round is in progress. `Round1` signs the block body
/// directly; `Round2` signs `(cs1, b1 bitmap)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Round {
    Round1,
    Round2,
    Done,
}

/// Drives one committee's two-round cosigning over a single block
/// digest. The leader collects signatures via [`ConsensusCoordinator::receive`]
/// and finalizes each round once quorum is met.
pub struct ConsensusCoordinator {
    committee: Vec<PublicKey>,
    round: Round,
    cosigs: CoSignatures,
    round1_signatures: Vec<(usize, Signature)>,
    round2_signatures: Vec<(usize, Signature)>,
}

impl ConsensusCoordinator {
    pub fn new(committee: Vec<PublicKey>) -> Self {
        let size = committee.len();
        Self {
            committee,
            round: Round::Round1,
            cosigs: CoSignatures::new(size),
            round1_signatures: Vec::new(),
            round2_signatures: Vec::new(),
        }
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn cosigs(&self) -> &CoSignatures {
        &self.cosigs
    }

    fn member_index(&self, pub_key: &PublicKey) -> Result<usize> {
        self.committee
            .iter()
            .position(|m| m == pub_key)
            .ok_or_else(|| Error::invariant("signature from non-committee member"))
    }

    /// Records one committee member's signature for the current round.
    /// Returns `true` once this round has crossed quorum and the
    /// aggregate `cs1`/`cs2` has been set.
    pub fn receive(&mut self, pub_key: &PublicKey, signature: Signature) -> Result<bool> {
        let idx = self.member_index(pub_key)?;
        match self.round {
            Round::Round1 => {
                if !self.cosigs.b1[idx] {
                    self.cosigs.b1[idx] = true;
                    self.round1_signatures.push((idx, signature));
                }
                if self.quorum_met(self.cosigs.b1_count()) {
                    self.cosigs.cs1 = Some(self.aggregate(&self.round1_signatures));
                    self.round = Round::Round2;
                    return Ok(true);
                }
            }
            Round::Round2 => {
                if !self.cosigs.b2[idx] {
                    self.cosigs.b2[idx] = true;
                    self.round2_signatures.push((idx, signature));
                }
                if self.quorum_met(self.cosigs.b2_count()) {
                    self.cosigs.cs2 = Some(self.aggregate(&self.round2_signatures));
                    self.round = Round::Done;
                    return Ok(true);
                }
            }
            Round::Done => {}
        }
        Ok(false)
    }

    fn quorum_met(&self, count: usize) -> bool {
        let quorum = (2 * self.committee.len()).div_ceil(3);
        count >= quorum
    }

    /// Concatenates the individual signature bytes in committee order;
    /// a real Schnorr aggregation scheme replaces this once
    /// [`crate::block::SignatureScheme`] is wired to a concrete curve.
    fn aggregate(&self, signatures: &[(usize, Signature)]) -> Signature {
        let mut ordered: Vec<&(usize, Signature)> = signatures.iter().collect();
        ordered.sort_by_key(|(i, _)| *i);
        let mut bytes = Vec::new();
        for (_, sig) in ordered {
            bytes.extend_from_slice(&sig.0);
        }
        Signature(bytes)
    }

    pub fn is_done(&self) -> bool {
        self.round == Round::Done
    }
}
