//! Per-rumor round budgets derived from peer count,
//! matching `NetworkConfig.cpp`'s derivation.

/// Immutable tuple `(networkSize, maxRoundsInB, maxRoundsInC,
/// maxRoundsTotal)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    network_size: usize,
    max_rounds_in_b: u32,
    max_rounds_in_c: u32,
    max_rounds_total: u32,
}

impl NetworkConfig {
    /// Derives round budgets from the "Randomized Rumor Spreading" paper:
    /// `maxRoundsInB = maxRoundsInC = max(1, ceil(ln(ln N)))`,
    /// `maxRoundsTotal = ceil(ln N)`.
    pub fn new(network_size: usize) -> Self {
        let n = network_size.max(2) as f64;
        let magic = (n.ln().ln()).ceil() as i64;
        let max_rounds_in_b = magic.max(1) as u32;
        let max_rounds_total = n.ln().ceil().max(max_rounds_in_b as f64) as u32;
        Self {
            network_size,
            max_rounds_in_b,
            max_rounds_in_c: max_rounds_in_b,
            max_rounds_total: max_rounds_total.max(max_rounds_in_b + max_rounds_in_b),
        }
    }

    /// Constructs a config with explicit round budgets, bypassing
    /// derivation (used by callers that need deterministic small-network
    /// test configs).
    pub fn with_rounds(network_size: usize, max_rounds_in_b: u32, max_rounds_in_c: u32, max_rounds_total: u32) -> Self {
        Self { network_size, max_rounds_in_b, max_rounds_in_c, max_rounds_total }
    }

    pub fn network_size(&self) -> usize {
        self.network_size
    }

    pub fn max_rounds_in_b(&self) -> u32 {
        self.max_rounds_in_b
    }

    pub fn max_rounds_in_c(&self) -> u32 {
        self.max_rounds_in_c
    }

    pub fn max_rounds_total(&self) -> u32 {
        self.max_rounds_total
    }
}
