//! Protocol constants and the node's runtime configuration.
//!
//! Mirrors `common/Constants.h` from the reference implementation:
//! a single place that centralizes every tunable the directory-service
//! and gossip subsystems consult, with a [`NodeConfig`] that can be
//! loaded from TOML the way the daemon binary loads `darkfid_config.toml`.

use serde::{Deserialize, Serialize};

/// Minimum number of retry attempts `RumorHolder::advance_round` makes
/// when sampling neighbors before falling back to non-priority peers.
pub const MAX_RETRY: usize = 3;

/// Timeout (seconds) the PoW-submission phase suspends for, absorbing
/// late PoW submissions from slow peers.
pub const POW_SUBMISSION_TIMEOUT_SECS: u64 = 60;

/// Timeout (seconds) between DS state-machine phase transitions before
/// view-change is triggered.
pub const CONSENSUS_OBJECT_TIMEOUT_SECS: u64 = 30;

/// Timeout (seconds) the final-block consensus phase suspends for to
/// absorb late arrivals.
pub const FINALBLOCK_CONSENSUS_OBJECT_TIMEOUT_SECS: u64 = 30;

/// Timeout (seconds) a shard's microblock submission is waited for
/// before the shard is marked empty in the final block.
pub const MICROBLOCK_TIMEOUT_SECS: u64 = 20;

/// Number of final (TX) blocks produced per PoW/DS-epoch window.
pub const NUM_FINAL_BLOCK_PER_POW: u64 = 100;

/// Target member count of a single shard.
pub const COMM_SIZE: usize = 600;

/// Maximum number of PoW winners admitted into a single DS block.
pub const MAX_POW_WINNERS: usize = 30;

/// Maximum committee members evicted for underperformance on a single
/// rotation.
pub const NUM_OF_REMOVED: usize = 3;

/// Fraction (of `maxCoSigs`) below which a committee member becomes a
/// removal candidate on rotation.
pub const PERFORMANCE_THRESHOLD: f64 = 0.25;

/// Percentage of `gasLimit` a block must reach to count as "full" for
/// gas price control purposes.
pub const GAS_CONGESTION_RATE: u64 = 80;

/// Below this percentage of full blocks, gas price moves toward the
/// minimum.
pub const UNFILLED_RATIO_LOW: u64 = 25;

/// Above this percentage of full blocks, gas price increases.
pub const UNFILLED_RATIO_HIGH: u64 = 75;

/// Minimum allowed DS gas price.
pub const GAS_PRICE_MIN: u128 = 2_000_000_000;

/// Base coinbase reward per DS epoch, in Qa.
pub const COINBASE_REWARD: u128 = 950_000_000_000_000;

/// Qa-per-unit scaling factor used when presenting balances/gas prices
/// through the Eth-compatible RPC surface.
pub const EVM_ZIL_SCALING_FACTOR: u128 = 1_000_000;

/// Capacity of the in-memory DS-block ring buffer.
pub const DS_BLOCKCHAIN_SIZE: usize = 50;

/// Capacity of the in-memory TX-block ring buffer.
pub const TX_BLOCKCHAIN_SIZE: usize = 50;

/// Bound on the AccountStore's writer queue; external RPC writers queue
/// behind consensus-driven writes.
pub const NUM_OF_WRITERS_IN_QUEUE: usize = 1;

/// Genesis reward-recipient addresses. Empty by default: a real
/// deployment supplies this via [`NodeConfig`], and coinbase
/// distribution is a no-op while the list stays empty.
pub type GenesisWallets = Vec<crate::block::Address>;

/// Runtime-tunable node configuration, loadable from TOML.
///
/// Grounded on `darkfid2::main::Args` (structopt + structopt-toml) for
/// the CLI surface, and on `common/Constants.h` for the constant
/// defaults collected here instead of scattered as bare `const`s, so a
/// deployment can override them without recompiling.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub pow_submission_timeout_secs: u64,
    pub consensus_object_timeout_secs: u64,
    pub finalblock_consensus_object_timeout_secs: u64,
    pub microblock_timeout_secs: u64,
    pub num_final_block_per_pow: u64,
    pub comm_size: usize,
    pub max_pow_winners: usize,
    pub num_of_removed: usize,
    pub performance_threshold: f64,
    pub gas_congestion_rate: u64,
    pub unfilled_ratio_low: u64,
    pub unfilled_ratio_high: u64,
    pub gas_price_min: u128,
    pub coinbase_reward: u128,
    pub evm_zil_scaling_factor: u128,
    pub ds_blockchain_size: usize,
    pub tx_blockchain_size: usize,
    pub num_of_writers_in_queue: usize,
    pub genesis_wallets: GenesisWallets,
    /// Single-node mode, used for local testing (skips quorum waits).
    pub single_node: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            pow_submission_timeout_secs: POW_SUBMISSION_TIMEOUT_SECS,
            consensus_object_timeout_secs: CONSENSUS_OBJECT_TIMEOUT_SECS,
            finalblock_consensus_object_timeout_secs: FINALBLOCK_CONSENSUS_OBJECT_TIMEOUT_SECS,
            microblock_timeout_secs: MICROBLOCK_TIMEOUT_SECS,
            num_final_block_per_pow: NUM_FINAL_BLOCK_PER_POW,
            comm_size: COMM_SIZE,
            max_pow_winners: MAX_POW_WINNERS,
            num_of_removed: NUM_OF_REMOVED,
            performance_threshold: PERFORMANCE_THRESHOLD,
            gas_congestion_rate: GAS_CONGESTION_RATE,
            unfilled_ratio_low: UNFILLED_RATIO_LOW,
            unfilled_ratio_high: UNFILLED_RATIO_HIGH,
            gas_price_min: GAS_PRICE_MIN,
            coinbase_reward: COINBASE_REWARD,
            evm_zil_scaling_factor: EVM_ZIL_SCALING_FACTOR,
            ds_blockchain_size: DS_BLOCKCHAIN_SIZE,
            tx_blockchain_size: TX_BLOCKCHAIN_SIZE,
            num_of_writers_in_queue: NUM_OF_WRITERS_IN_QUEUE,
            genesis_wallets: Vec::new(),
            single_node: false,
        }
    }
}

impl NodeConfig {
    /// `max_co_sigs`: two cosign opportunities
    /// (b1, b2) per final block, for every final block but the vacuous
    /// one that opens the next rotation.
    pub fn max_co_sigs(&self) -> u64 {
        2 * (self.num_final_block_per_pow - 1)
    }

    /// Removal threshold.
    pub fn removal_threshold(&self) -> u64 {
        (self.performance_threshold * self.max_co_sigs() as f64).ceil() as u64
    }
}
