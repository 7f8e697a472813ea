//! Bloom-filter transaction/log index, mirroring
//! `BloomFilter.h`/`BloomFilter.cpp`'s probabilistic membership
//! structure.
//!
//! An open question about `CompressibleBloomFilter`'s
//! `compute_indices` iterating `size_list` by *value* instead of by
//! *position* (so `size_list[i]` indexes with an element rather than
//! walking the vector) is fixed here, not preserved. The same bug shape
//! is present in the base `BloomFilter::insert`/`contains`, which
//! iterate `salt_` the same way (`for (auto i : salt_) ... salt_[i]`) —
//! both are fixed identically: iterate by position.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const BITS_PER_CHAR: usize = 8;

const BIT_MASK: [u8; BITS_PER_CHAR] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];

const PREDEF_SALT: [u32; 128] = [
    0xAAAAAAAA, 0x55555555, 0x33333333, 0xCCCCCCCC, 0x66666666, 0x99999999, 0xB5B5B5B5, 0x4B4B4B4B, 0xAA55AA55,
    0x55335533, 0x33CC33CC, 0xCC66CC66, 0x66996699, 0x99B599B5, 0xB54BB54B, 0x4BAA4BAA, 0xAA33AA33, 0x55CC55CC,
    0x33663366, 0xCC99CC99, 0x66B566B5, 0x994B994B, 0xB5AAB5AA, 0xAAAAAA33, 0x555555CC, 0x33333366, 0xCCCCCC99,
    0x666666B5, 0x9999994B, 0xB5B5B5AA, 0xFFFFFFFF, 0xFFFF0000, 0xB823D5EB, 0xC1191CDF, 0xF623AEB3, 0xDB58499F,
    0xC8D42E70, 0xB173F616, 0xA91A5967, 0xDA427D63, 0xB1E8A2EA, 0xF6C0D155, 0x4909FEA3, 0xA68CC6A7, 0xC395E782,
    0xA26057EB, 0x0CD5DA28, 0x467C5492, 0xF15E6982, 0x61C6FAD3, 0x9615E352, 0x6E9E355A, 0x689B563E, 0x0C9831A8,
    0x6753C18B, 0xA622689B, 0x8CA63C47, 0x42CC2884, 0x8E89919B, 0x6EDBD7D3, 0x15B6796C, 0x1D6FDFE4, 0x63FF9092,
    0xE7401432, 0xEFFE9412, 0xAEAEDF79, 0x9F245A31, 0x83C136FC, 0xC3DA4A8C, 0xA5112C8C, 0x5271F491, 0x9A948DAB,
    0xCEE59A8D, 0xB5F525AB, 0x59D13217, 0x24E7C331, 0x697C2103, 0x84B0A460, 0x86156DA9, 0xAEF2AC68, 0x23243DA5,
    0x3F649643, 0x5FA495A8, 0x67710DF8, 0x9A6C499E, 0xDCFB0227, 0x46A43433, 0x1832B07A, 0xC46AFF3C, 0xB9C8FFF0,
    0xC9500467, 0x34431BDF, 0xB652432B, 0xE367F12B, 0x427F4C1B, 0x224C006E, 0x2E7E5A89, 0x96F99AA5, 0x0BEB452A,
    0x2FD87C39, 0x74B2E1FB, 0x222EFD24, 0xF357F60C, 0x440FCB1E, 0x8BBE030F, 0x6704DC29, 0x1144D12F, 0x948B1355,
    0x6D8FD7E9, 0x1C11A014, 0xADD1592F, 0xFB3C712E, 0xFC77642F, 0xF9C4CE8C, 0x31312FB9, 0x08B0DD79, 0x318FA6E7,
    0xC040D23D, 0xC0589AA7, 0x0CA5C075, 0xF874B172, 0x0CF914D5, 0x784D3280, 0x4E8CFEBC, 0xC569F575, 0xCDB2A091,
    0x2CC016B4, 0x5C5F4421,
];

/// Tunables fed into [`BloomFilter::with_parameters`], mirroring
/// `BloomParameters`.
#[derive(Clone, Debug)]
pub struct BloomParameters {
    pub projected_element_count: u64,
    pub false_positive_probability: f64,
    pub random_seed: u64,
}

impl Default for BloomParameters {
    fn default() -> Self {
        let projected_element_count = 10_000;
        Self {
            projected_element_count,
            false_positive_probability: 1.0 / projected_element_count as f64,
            random_seed: 0xA5A5A5A5_5A5A5A5A,
        }
    }
}

struct OptimalParameters {
    number_of_hashes: u32,
    table_size: u64,
}

/// Searches `k` in `[1, 1000)` for the `k` minimizing the required
/// table size `m(k)`, per `BloomParameters::compute_optimal_parameters`.
fn compute_optimal_parameters(p: &BloomParameters) -> Result<OptimalParameters> {
    if p.projected_element_count == 0 || !(0.0..=1.0).contains(&p.false_positive_probability) {
        return Err(Error::InvalidBloomParameters("projected_element_count or fpp out of range".into()));
    }

    let mut min_m = f64::INFINITY;
    let mut min_k = 0.0f64;
    let mut k = 1.0f64;
    while k < 1000.0 {
        let numerator = -k * p.projected_element_count as f64;
        let denominator = (1.0 - p.false_positive_probability.powf(1.0 / k)).ln();
        let curr_m = numerator / denominator;
        if curr_m < min_m {
            min_m = curr_m;
            min_k = k;
        }
        k += 1.0;
    }

    let number_of_hashes = (min_k as u32).max(1);
    let mut table_size = min_m as u64;
    if table_size % BITS_PER_CHAR as u64 != 0 {
        table_size += BITS_PER_CHAR as u64 - (table_size % BITS_PER_CHAR as u64);
    }
    Ok(OptimalParameters { number_of_hashes, table_size: table_size.max(1) })
}

/// Arash-Partow-style shift-xor rolling hash, seeded per call with one
/// of the filter's salts.
fn hash_ap(data: &[u8], mut hash: u32) -> u32 {
    let mut chunks = data.chunks_exact(8);
    for chunk in chunks.by_ref() {
        let i1 = u32::from_ne_bytes(chunk[0..4].try_into().unwrap());
        let i2 = u32::from_ne_bytes(chunk[4..8].try_into().unwrap());
        hash ^= (hash << 7) ^ i1.wrapping_mul(hash >> 3) ^ (!((hash << 11).wrapping_add(i2 ^ (hash >> 5))));
    }

    let mut remainder = chunks.remainder();
    let mut loop_count = 0u32;
    if remainder.len() >= 4 {
        let i = u32::from_ne_bytes(remainder[0..4].try_into().unwrap());
        if loop_count & 1 != 0 {
            hash ^= (hash << 7) ^ i.wrapping_mul(hash >> 3);
        } else {
            hash ^= !((hash << 11).wrapping_add(i ^ (hash >> 5)));
        }
        loop_count += 1;
        remainder = &remainder[4..];
    }
    if remainder.len() >= 2 {
        let i = u16::from_ne_bytes(remainder[0..2].try_into().unwrap()) as u32;
        if loop_count & 1 != 0 {
            hash ^= (hash << 7) ^ i.wrapping_mul(hash >> 3);
        } else {
            hash ^= !((hash << 11).wrapping_add(i ^ (hash >> 5)));
        }
        loop_count += 1;
        remainder = &remainder[2..];
    }
    if let Some(&b) = remainder.first() {
        hash = hash.wrapping_add((b as u32 ^ hash.wrapping_mul(0xA5A5A5A5)).wrapping_add(loop_count));
    }
    hash
}

fn generate_unique_salt(salt_count: u32, random_seed: u64) -> Vec<u32> {
    let mut salt = Vec::new();
    if salt_count as usize <= PREDEF_SALT.len() {
        salt.extend_from_slice(&PREDEF_SALT[..salt_count as usize]);
        let n = salt.len();
        let base = salt.clone();
        for i in 0..n {
            salt[i] = base[i].wrapping_mul(base[(i + 3) % n]).wrapping_add(random_seed as u32);
        }
    } else {
        salt.extend_from_slice(&PREDEF_SALT);
        let mut rng_state = random_seed as u32;
        let mut next_rand = move || {
            rng_state = rng_state.wrapping_mul(1103515245).wrapping_add(12345);
            (rng_state >> 16) & 0x7fff
        };
        while salt.len() < salt_count as usize {
            let current = next_rand().wrapping_mul(next_rand());
            if current == 0 {
                continue;
            }
            if !salt.contains(&current) {
                salt.push(current);
            }
        }
    }
    salt
}

/// Basic bloom filter over arbitrary byte keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BloomFilter {
    salt: Vec<u32>,
    bit_table: Vec<u8>,
    table_size: u64,
    random_seed: u64,
    inserted_element_count: u64,
}

impl BloomFilter {
    pub fn with_parameters(p: &BloomParameters) -> Result<Self> {
        let optimal = compute_optimal_parameters(p)?;
        let random_seed = p.random_seed.wrapping_mul(0xA5A5A5A5).wrapping_add(1);
        let salt = generate_unique_salt(optimal.number_of_hashes, random_seed);
        let bit_table = vec![0u8; (optimal.table_size / BITS_PER_CHAR as u64) as usize];
        Ok(Self { salt, bit_table, table_size: optimal.table_size, random_seed, inserted_element_count: 0 })
    }

    pub fn clear(&mut self) {
        self.bit_table.iter_mut().for_each(|b| *b = 0);
        self.inserted_element_count = 0;
    }

    fn compute_indices(&self, hash: u32) -> (usize, usize) {
        let bit_index = (hash as u64 % self.table_size) as usize;
        (bit_index, bit_index % BITS_PER_CHAR)
    }

    pub fn insert(&mut self, key: &[u8]) {
        for &s in &self.salt {
            let (bit_index, bit) = self.compute_indices(hash_ap(key, s));
            self.bit_table[bit_index / BITS_PER_CHAR] |= BIT_MASK[bit];
        }
        self.inserted_element_count += 1;
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        for &s in &self.salt {
            let (bit_index, bit) = self.compute_indices(hash_ap(key, s));
            if self.bit_table[bit_index / BITS_PER_CHAR] & BIT_MASK[bit] != BIT_MASK[bit] {
                return false;
            }
        }
        true
    }

    pub fn size(&self) -> u64 {
        self.table_size
    }

    pub fn element_count(&self) -> u64 {
        self.inserted_element_count
    }

    pub fn hash_count(&self) -> usize {
        self.salt.len()
    }

    pub fn effective_fpp(&self) -> f64 {
        let k = self.salt.len() as f64;
        (1.0 - (-k * self.inserted_element_count as f64 / self.size() as f64).exp()).powf(k)
    }

    fn compatible_with(&self, other: &Self) -> bool {
        self.salt.len() == other.salt.len() && self.table_size == other.table_size && self.random_seed == other.random_seed
    }

    pub fn union(&mut self, other: &Self) {
        if self.compatible_with(other) {
            for (a, b) in self.bit_table.iter_mut().zip(&other.bit_table) {
                *a |= *b;
            }
        }
    }

    pub fn intersection(&mut self, other: &Self) {
        if self.compatible_with(other) {
            for (a, b) in self.bit_table.iter_mut().zip(&other.bit_table) {
                *a &= *b;
            }
        }
    }

    pub fn difference(&mut self, other: &Self) {
        if self.compatible_with(other) {
            for (a, b) in self.bit_table.iter_mut().zip(&other.bit_table) {
                *a ^= *b;
            }
        }
    }
}

/// A bloom filter that can be shrunk after the fact by folding its
/// upper half onto its lower half, at the cost of a higher effective
/// false-positive rate — used to compact old log indices.
#[derive(Clone, Debug)]
pub struct CompressibleBloomFilter {
    inner: BloomFilter,
    size_list: Vec<u64>,
}

impl CompressibleBloomFilter {
    pub fn with_parameters(p: &BloomParameters) -> Result<Self> {
        let inner = BloomFilter::with_parameters(p)?;
        let size_list = vec![inner.table_size];
        Ok(Self { inner, size_list })
    }

    pub fn insert(&mut self, key: &[u8]) {
        for &s in &self.inner.salt {
            let (bit_index, bit) = self.compute_indices(hash_ap(key, s));
            self.inner.bit_table[bit_index / BITS_PER_CHAR] |= BIT_MASK[bit];
        }
        self.inner.inserted_element_count += 1;
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        for &s in &self.inner.salt {
            let (bit_index, bit) = self.compute_indices(hash_ap(key, s));
            if self.inner.bit_table[bit_index / BITS_PER_CHAR] & BIT_MASK[bit] != BIT_MASK[bit] {
                return false;
            }
        }
        true
    }

    pub fn size(&self) -> u64 {
        *self.size_list.last().expect("size_list always has an initial entry")
    }

    pub fn element_count(&self) -> u64 {
        self.inner.inserted_element_count
    }

    /// `compute_indices` folds the raw hash through every size the
    /// filter has ever held, from largest to smallest, so bits set
    /// before a compression remain reachable afterward. Fixed to walk
    /// `size_list` by position, not by using the hash-derived remainder
    /// as an index into it.
    fn compute_indices(&self, hash: u32) -> (usize, usize) {
        let mut bit_index = hash as u64;
        for &size in &self.size_list {
            bit_index %= size;
        }
        (bit_index as usize, (bit_index % BITS_PER_CHAR as u64) as usize)
    }

    /// Shrinks the table by `percentage` (in `[0, 100)`), folding the
    /// dropped upper region onto the retained lower region with
    /// bitwise OR so no previously-set bit is lost.
    pub fn compress(&mut self, percentage: f64) -> bool {
        if !(0.0..100.0).contains(&percentage) {
            return false;
        }
        let original = *self.size_list.last().unwrap();
        let mut new_size = (original as f64 * (1.0 - percentage / 100.0)) as u64;
        new_size -= new_size % BITS_PER_CHAR as u64;

        if new_size < BITS_PER_CHAR as u64 || new_size >= original {
            return false;
        }

        let new_raw = (new_size / BITS_PER_CHAR as u64) as usize;
        let mut folded = vec![0u8; new_raw];
        folded.copy_from_slice(&self.inner.bit_table[..new_raw]);

        let original_raw = (original / BITS_PER_CHAR as u64) as usize;
        for (i, byte) in self.inner.bit_table[new_raw..original_raw].iter().enumerate() {
            folded[i % new_raw] |= *byte;
        }

        self.inner.bit_table = folded;
        self.size_list.push(new_size);
        true
    }
}
