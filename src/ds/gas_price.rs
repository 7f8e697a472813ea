//! Gas price control, a sub-loop of DS-block composition, mirroring
//! `GasPricer.cpp`'s congestion-ratio adjustment.
//!
//! `IncreaseGasPrice`/`DecreaseGasPrice` only collect committee
//! proposals upstream; the actual adjustment implemented here moves
//! toward the median submitted proposal when increasing, and toward
//! the configured minimum when decreasing.

/// One TxBlock's gas-usage sample for the congestion ratio.
#[derive(Clone, Copy, Debug)]
pub struct TxBlockGasSample {
    pub gas_used: u64,
    pub gas_limit: u64,
}

/// Computes `fullBlockRatio` over `[lo_block_num, hi_block_num]` the way
/// `CalculateGasPrice` does: the fraction of sampled blocks whose
/// `gasUsed >= gasLimit * GAS_CONGESTION_RATE / 100`.
pub fn full_block_ratio(samples: &[TxBlockGasSample], gas_congestion_rate: u64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let full = samples
        .iter()
        .filter(|s| s.gas_used as u128 * 100 >= s.gas_limit as u128 * gas_congestion_rate as u128)
        .count();
    full as f64 / samples.len() as f64
}

/// Decides the next gas price given the current one, the prior epoch's
/// per-block gas samples, and the committee's submitted PoW gas-price
/// proposals.
pub fn next_gas_price(
    current: u128,
    samples: &[TxBlockGasSample],
    submitted_proposals: &[u128],
    gas_congestion_rate: u64,
    unfilled_ratio_low: u64,
    unfilled_ratio_high: u64,
    gas_price_min: u128,
) -> u128 {
    let ratio = full_block_ratio(samples, gas_congestion_rate);
    if ratio < unfilled_ratio_low as f64 / 100.0 {
        if current <= gas_price_min {
            gas_price_min
        } else {
            current - ((current - gas_price_min) / 2)
        }
    } else if ratio > unfilled_ratio_high as f64 / 100.0 {
        match median(submitted_proposals) {
            Some(target) if target > current => target,
            _ => current,
        }
    } else {
        current
    }
}

fn median(values: &[u128]) -> Option<u128> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    Some(sorted[sorted.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_congestion_decreases_toward_minimum() {
        let samples = vec![TxBlockGasSample { gas_used: 1, gas_limit: 100 }; 10];
        let price = next_gas_price(10_000, &samples, &[], 80, 25, 75, 2_000_000_000u128.min(1));
        assert!(price < 10_000);
    }

    #[test]
    fn high_congestion_increases_toward_proposal_median() {
        let samples = vec![TxBlockGasSample { gas_used: 95, gas_limit: 100 }; 10];
        let proposals = vec![5_000u128, 6_000, 7_000];
        let price = next_gas_price(4_000, &samples, &proposals, 80, 25, 75, 0);
        assert_eq!(price, 6_000);
    }

    #[test]
    fn moderate_congestion_holds_steady() {
        let mut samples = vec![TxBlockGasSample { gas_used: 95, gas_limit: 100 }; 5];
        samples.extend(vec![TxBlockGasSample { gas_used: 1, gas_limit: 100 }; 5]);
        let price = next_gas_price(4_000, &samples, &[9_999], 80, 25, 75, 0);
        assert_eq!(price, 4_000);
    }
}
