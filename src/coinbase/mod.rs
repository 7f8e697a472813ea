//! Coinbase reward bookkeeping, grounded on
//! Mirrors `Coinbase.cpp`'s `SaveCoinbaseCore`/`SaveCoinbase`/`InitCoinbase`
//! bookkeeping.

use std::collections::HashMap;

use crate::block::{Address, PublicKey, Shard};
use crate::error::{Error, Result};

/// `epochNum -> shardId -> rewarded addresses`, one entry per b1/b2 bit
/// set by a cosigning committee member.
pub type CoinbaseRewardees = HashMap<u64, HashMap<u32, Vec<Address>>>;

const MAX_REPUTATION: u16 = 4096;

/// Tracks which addresses earned a coinbase share this epoch and the
/// running reputation score used elsewhere for Byzantine accounting.
#[derive(Default)]
pub struct CoinbaseTracker {
    rewardees: CoinbaseRewardees,
    reputation: HashMap<PublicKey, u16>,
}

impl CoinbaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one shard's cosigning bitmaps for `epoch_num`, crediting
    /// every member whose `b1` or `b2` bit is set (twice, if both are
    /// set) and bumping their reputation up to [`MAX_REPUTATION`].
    /// Returns `Ok(false)` (not an error) if this shard/epoch pair was
    /// already recorded, matching `SaveCoinbaseCore`'s idempotency
    /// guard.
    pub fn record_cosigs(&mut self, epoch_num: u64, shard_id: u32, shard: &Shard, b1: &[bool], b2: &[bool]) -> Result<bool> {
        if shard.len() != b1.len() || shard.len() != b2.len() {
            return Err(Error::invariant("cosig bitmap length does not match shard size"));
        }
        if self.rewardees.get(&epoch_num).and_then(|e| e.get(&shard_id)).is_some() {
            return Ok(false);
        }

        let entry = self.rewardees.entry(epoch_num).or_default().entry(shard_id).or_default();
        for (i, (pub_key, _peer)) in shard.iter().enumerate() {
            let addr = Address::from_public_key(pub_key);
            if b1[i] {
                entry.push(addr);
                bump_reputation(&mut self.reputation, pub_key);
            }
            if b2[i] {
                entry.push(addr);
                bump_reputation(&mut self.reputation, pub_key);
            }
        }
        Ok(true)
    }

    pub fn reputation(&self, pub_key: &PublicKey) -> u16 {
        self.reputation.get(pub_key).copied().unwrap_or(0)
    }

    pub fn rewardee_count(&self, epoch_num: u64) -> usize {
        self.rewardees.get(&epoch_num).map(|shards| shards.values().map(Vec::len).sum()).unwrap_or(0)
    }

    /// Distributes `coinbase_reward + total_txn_fees` evenly across
    /// every recorded signature for `epoch_num`, then pays the
    /// leftover remainder to one lucky-draw winner selected
    /// deterministically from `last_block_hash`, mirroring
    /// `InitCoinbase` field for field (including its early return when
    /// `genesis_wallets` is empty).
    pub fn distribute(
        &self,
        epoch_num: u64,
        genesis_wallets: &[Address],
        coinbase_reward: u128,
        total_txn_fees: u128,
        last_block_hash: u16,
        mut pay: impl FnMut(Address, Address, u128) -> bool,
    ) -> Result<()> {
        let Some(genesis_account) = genesis_wallets.first().copied() else {
            return Ok(());
        };

        let shards = match self.rewardees.get(&epoch_num) {
            Some(s) => s,
            None => return Ok(()),
        };

        let sig_count: u128 = shards.values().map(|addrs| addrs.len() as u128).sum();
        if sig_count == 0 {
            return Ok(());
        }

        let total_reward = coinbase_reward
            .checked_add(total_txn_fees)
            .ok_or_else(|| Error::ArithmeticOverflow("total_reward addition overflowed".into()))?;

        let reward_each = total_reward
            .checked_div(sig_count)
            .ok_or_else(|| Error::ArithmeticOverflow("reward_each division by zero".into()))?;

        let mut success_count: u128 = 0;
        for addrs in shards.values() {
            for addr in addrs {
                if pay(*addr, genesis_account, reward_each) {
                    success_count += 1;
                }
            }
        }

        let balance_left = total_reward.saturating_sub(success_count.saturating_mul(reward_each));

        let shard_count = shards.len() as u16;
        if shard_count == 0 {
            return Ok(());
        }
        let shard_index = last_block_hash % shard_count;
        if let Some((_, addrs)) = shards.iter().enumerate().find(|(i, _)| *i as u16 == shard_index).map(|(_, kv)| kv) {
            if !addrs.is_empty() {
                let rdm_index = (last_block_hash as usize) % addrs.len();
                pay(addrs[rdm_index], genesis_account, balance_left);
            }
        }

        Ok(())
    }
}

fn bump_reputation(reputation: &mut HashMap<PublicKey, u16>, pub_key: &PublicKey) {
    let rep = reputation.entry(pub_key.clone()).or_insert(0);
    if *rep < MAX_REPUTATION {
        *rep += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{KeyPair, Peer};

    fn kp(byte: u8) -> KeyPair {
        KeyPair { secret: crate::block::SecretKey(vec![byte]), public: PublicKey(vec![byte; 32]) }
    }

    fn shard_of(n: u8) -> Shard {
        (0..n).map(|i| (kp(i).public, Peer { ip_address: i as u128, port: 30000 })).collect()
    }

    #[test]
    fn record_cosigs_rejects_length_mismatch() {
        let mut tracker = CoinbaseTracker::new();
        let shard = shard_of(3);
        let err = tracker.record_cosigs(1, 0, &shard, &[true, false], &[true, false, false]);
        assert!(err.is_err());
    }

    #[test]
    fn record_cosigs_is_idempotent_per_epoch_shard() {
        let mut tracker = CoinbaseTracker::new();
        let shard = shard_of(2);
        assert!(tracker.record_cosigs(1, 0, &shard, &[true, false], &[false, true]).unwrap());
        assert!(!tracker.record_cosigs(1, 0, &shard, &[true, false], &[false, true]).unwrap());
    }

    #[test]
    fn distribute_is_noop_with_no_genesis_wallets() {
        let mut tracker = CoinbaseTracker::new();
        let shard = shard_of(2);
        tracker.record_cosigs(1, 0, &shard, &[true, true], &[false, false]).unwrap();
        let mut paid = Vec::new();
        tracker.distribute(1, &[], 1000, 0, 7, |to, _from, amt| { paid.push((to, amt)); true }).unwrap();
        assert!(paid.is_empty());
    }

    #[test]
    fn distribute_splits_reward_across_every_recorded_signature() {
        let mut tracker = CoinbaseTracker::new();
        let shard = shard_of(2);
        tracker.record_cosigs(1, 0, &shard, &[true, true], &[false, false]).unwrap();
        let genesis = Address([0xAA; 20]);
        let mut paid = Vec::new();
        tracker
            .distribute(1, &[genesis], 1000, 0, 0, |to, _from, amt| {
                paid.push((to, amt));
                true
            })
            .unwrap();
        assert_eq!(paid.len(), 3);
    }
}
