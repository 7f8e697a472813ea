//! Leader-rotation view-change.

use crate::block::{PublicKey, VCBlockHeader};

/// Drives leader rotation when the current leader stalls or is
/// accused by quorum. Elects the next candidate by deterministic
/// round-robin, independent of performance history (that's
/// [`crate::byzantine::ByzantineAccounting`]'s job, applied only on
/// DS-block rotation).
pub struct ViewChangeController {
    committee_size: usize,
    view_counter: u32,
    ds_epoch_no: u64,
    tx_epoch_no: u64,
}

impl ViewChangeController {
    pub fn new(committee_size: usize, ds_epoch_no: u64, tx_epoch_no: u64) -> Self {
        Self { committee_size, view_counter: 0, ds_epoch_no, tx_epoch_no }
    }

    /// `(currentLeader + viewCounter) mod committeeSize`, called after
    /// bumping the view counter for this attempt.
    pub fn next_leader_index(&mut self, current_leader_index: usize) -> usize {
        self.view_counter += 1;
        (current_leader_index + self.view_counter as usize) % self.committee_size.max(1)
    }

    pub fn view_counter(&self) -> u32 {
        self.view_counter
    }

    /// Builds the VCBlock header to be cosigned once the candidate
    /// leader is elected, supplemented
    /// `VCBlockHeader` fields.
    pub fn build_header(
        &self,
        view_change_state: &str,
        candidate_leader_pub_key: PublicKey,
        faulty_leaders: Vec<(PublicKey, crate::block::Peer)>,
    ) -> VCBlockHeader {
        VCBlockHeader {
            view_change_ds_epoch_no: self.ds_epoch_no,
            view_change_epoch_no: self.tx_epoch_no,
            view_change_state: view_change_state.to_string(),
            candidate_leader_pub_key,
            faulty_leaders,
            view_change_counter: self.view_counter,
        }
    }

    pub fn reset(&mut self) {
        self.view_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_around_committee_size() {
        let mut vc = ViewChangeController::new(4, 1, 1);
        assert_eq!(vc.next_leader_index(3), 0);
        assert_eq!(vc.next_leader_index(3), 1);
    }

    #[test]
    fn header_records_the_current_view_counter() {
        let mut vc = ViewChangeController::new(3, 5, 20);
        vc.next_leader_index(0);
        let header = vc.build_header("DSBLOCK_CONSENSUS", PublicKey(vec![1]), Vec::new());
        assert_eq!(header.view_change_counter, 1);
        assert_eq!(header.view_change_ds_epoch_no, 5);
    }
}
