use serde::{Deserialize, Serialize};

use super::keys::Signature;

/// Two-round multi-signature bundle produced by a committee, per base
/// spec §3.2: `cs1` signs the block, `cs2` signs `(cs1 || b1 bitmap)`.
/// Each bitmap carries one bit per committee member, in canonical
/// (committee) order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoSignatures {
    pub cs1: Option<Signature>,
    pub b1: Vec<bool>,
    pub cs2: Option<Signature>,
    pub b2: Vec<bool>,
}

impl CoSignatures {
    pub fn new(committee_size: usize) -> Self {
        Self { cs1: None, b1: vec![false; committee_size], cs2: None, b2: vec![false; committee_size] }
    }

    pub fn b1_count(&self) -> usize {
        self.b1.iter().filter(|b| **b).count()
    }

    pub fn b2_count(&self) -> usize {
        self.b2.iter().filter(|b| **b).count()
    }

    /// `true` once both rounds have met the quorum implied by the
    /// committee size (`ceil(2/3 * size)`), matching the consensus
    /// coordinator's quorum rule.
    pub fn meets_quorum(&self, committee_size: usize) -> bool {
        let quorum = (2 * committee_size).div_ceil(3);
        self.cs1.is_some() && self.cs2.is_some() && self.b1_count() >= quorum && self.b2_count() >= quorum
    }
}
