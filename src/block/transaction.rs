use serde::{Deserialize, Serialize};

use super::keys::{Address, PublicKey, Signature};

/// A transaction, keyed by `tranID = hash(coreFields)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub tran_id: [u8; 32],
    pub version: u32,
    pub nonce: u64,
    pub to_addr: Address,
    pub sender_pub_key: PublicKey,
    pub amount: u128,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub code: Vec<u8>,
    pub data: Vec<u8>,
    pub signature: Option<Signature>,
}

impl Transaction {
    /// Builds a transaction and derives `tran_id` from the core fields,
    /// excluding the signature (which is computed over `tran_id`).
    pub fn new(
        version: u32,
        nonce: u64,
        to_addr: Address,
        sender_pub_key: PublicKey,
        amount: u128,
        gas_price: u128,
        gas_limit: u64,
        code: Vec<u8>,
        data: Vec<u8>,
    ) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&version.to_be_bytes());
        hasher.update(&nonce.to_be_bytes());
        hasher.update(&to_addr.0);
        hasher.update(&sender_pub_key.0);
        hasher.update(&amount.to_be_bytes());
        hasher.update(&gas_price.to_be_bytes());
        hasher.update(&gas_limit.to_be_bytes());
        hasher.update(&code);
        hasher.update(&data);
        let tran_id = *hasher.finalize().as_bytes();

        Self {
            tran_id,
            version,
            nonce,
            to_addr,
            sender_pub_key,
            amount,
            gas_price,
            gas_limit,
            code,
            data,
            signature: None,
        }
    }
}

/// Tolerance-bounded ordering check used to validate that a microblock's
/// transaction ordering is "close enough" to the expected leader order,
///.
///
/// `verify_order(expected, received, tolerance_pct)` is true iff the
/// longest increasing subsequence of `received`'s positions in
/// `expected` has length `>= ceil((100 - tolerance_pct)/100 * |expected|)`.
pub fn verify_order(expected: &[[u8; 32]], received: &[[u8; 32]], tolerance_pct: u32) -> bool {
    if expected.len() != received.len() {
        return false;
    }
    if expected.is_empty() {
        return true;
    }

    let mut position = std::collections::HashMap::with_capacity(expected.len());
    for (i, h) in expected.iter().enumerate() {
        position.insert(*h, i);
    }

    // positions[i] = expected-index of received[i]; any hash in `received`
    // that isn't in `expected` breaks ordering verification.
    let mut positions = Vec::with_capacity(received.len());
    for h in received {
        match position.get(h) {
            Some(p) => positions.push(*p),
            None => return false,
        }
    }

    let lis_len = longest_increasing_subsequence_len(&positions);
    let required = ((100 - tolerance_pct) as u64 * expected.len() as u64).div_ceil(100);
    lis_len as u64 >= required
}

fn longest_increasing_subsequence_len(xs: &[usize]) -> usize {
    let mut tails: Vec<usize> = Vec::new();
    for &x in xs {
        match tails.binary_search(&x) {
            Ok(_) => {}
            Err(pos) => {
                if pos == tails.len() {
                    tails.push(x);
                } else {
                    tails[pos] = x;
                }
            }
        }
    }
    tails.len()
}
