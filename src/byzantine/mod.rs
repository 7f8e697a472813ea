//! Underperformer accounting applied on DS-committee rotation (base
//! spec §4.3.6, §4.6): members whose cosign participation falls below
//! [`crate::config::NodeConfig::removal_threshold`] are dropped, capped
//! at [`crate::config::NodeConfig::num_of_removed`]-worth per rotation.

use std::collections::HashMap;

use crate::block::PublicKey;
use crate::config::NodeConfig;

/// Tracks how many final blocks each DS-committee member has actually
/// cosigned (`b1` or `b2` bit set) since the last rotation.
#[derive(Default)]
pub struct ByzantineAccounting {
    co_sigs: HashMap<PublicKey, u64>,
}

impl ByzantineAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cosign(&mut self, pub_key: &PublicKey) {
        *self.co_sigs.entry(pub_key.clone()).or_insert(0) += 1;
    }

    pub fn co_sign_count(&self, pub_key: &PublicKey) -> u64 {
        self.co_sigs.get(pub_key).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.co_sigs.clear();
    }

    /// Returns the committee members to evict on rotation, in
    /// committee order, capped at `config.num_of_removed`. The first
    /// DS epoch (`epoch_num == 1`) never evicts anyone: there has been
    /// no full epoch of cosigning yet to judge performance by.
    pub fn removal_candidates(&self, committee: &[PublicKey], epoch_num: u64, config: &NodeConfig) -> Vec<PublicKey> {
        if epoch_num <= 1 {
            return Vec::new();
        }
        let threshold = config.removal_threshold();
        committee
            .iter()
            .filter(|pk| self.co_sign_count(pk) < threshold)
            .take(config.num_of_removed)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::PublicKey;

    fn pk(b: u8) -> PublicKey {
        PublicKey(vec![b; 4])
    }

    fn cfg() -> NodeConfig {
        let mut c = NodeConfig::default();
        c.num_final_block_per_pow = 11;
        c.performance_threshold = 0.5;
        c.num_of_removed = 2;
        c
    }

    #[test]
    fn first_epoch_never_removes_anyone() {
        let accounting = ByzantineAccounting::new();
        let committee = vec![pk(1), pk(2), pk(3)];
        assert!(accounting.removal_candidates(&committee, 1, &cfg()).is_empty());
    }

    #[test]
    fn underperformers_are_capped_at_num_of_removed() {
        let mut accounting = ByzantineAccounting::new();
        let committee = vec![pk(1), pk(2), pk(3), pk(4)];
        // max_co_sigs = 2*(11-1) = 20, threshold = ceil(0.5*20) = 10.
        for pk_ in &committee {
            for _ in 0..2 {
                accounting.record_cosign(pk_);
            }
        }
        let removed = accounting.removal_candidates(&committee, 2, &cfg());
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0], pk(1));
        assert_eq!(removed[1], pk(2));
    }

    #[test]
    fn well_performing_members_are_never_flagged() {
        let mut accounting = ByzantineAccounting::new();
        let committee = vec![pk(1)];
        for _ in 0..20 {
            accounting.record_cosign(&pk(1));
        }
        assert!(accounting.removal_candidates(&committee, 2, &cfg()).is_empty());
    }
}
