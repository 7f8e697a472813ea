//! In-memory ring-buffer block store with an overflow hook into a
//! persistent KV backend: a small hot cache in front of `sled`.

use std::collections::VecDeque;

use crate::block::{DSBlock, TxBlock};
use crate::error::{Error, Result};

/// Logical table names of the persistent backend, keyed as described in
///.
pub mod tables {
    pub const DS_BLOCKS: &str = "dsBlocks";
    pub const TX_BLOCKS: &str = "txBlocks";
    pub const MICRO_BLOCKS: &str = "microBlocks";
    pub const TX_BODIES: &str = "txBodies";
    pub const CONTRACT_CODE: &str = "contractCode";
    pub const CONTRACT_INIT: &str = "contractInit";
    pub const CONTRACT_STATE_DATA: &str = "contractStateData";
}

/// External collaborator contract: the persistent KV backend every
/// write staged in the in-memory ring buffer eventually overflows into.
/// A single atomic batch commit is expected per finalized `TxBlock`
///; this core never opens the backend itself.
pub trait PersistentStore: Send + Sync {
    fn put(&self, table: &str, key: &[u8], value: &[u8]) -> Result<()>;
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;
}

/// Fixed-capacity, most-recent-first block cache. Blocks pushed past
/// capacity are evicted to the configured [`PersistentStore`] rather
/// than dropped, keeping only a hot tail of validated blocks resident.
pub struct BlockChainStore<B> {
    capacity: usize,
    blocks: VecDeque<B>,
    table: &'static str,
}

impl<B: Clone> BlockChainStore<B> {
    pub fn new(capacity: usize, table: &'static str) -> Self {
        Self { capacity, blocks: VecDeque::with_capacity(capacity), table }
    }

    /// Appends the next block, evicting (and, if a backend is given,
    /// persisting) the oldest once `capacity` is exceeded.
    pub fn add_block(&mut self, block: B, overflow_key: impl Fn(&B) -> Vec<u8>, overflow_value: impl Fn(&B) -> Vec<u8>, backend: Option<&dyn PersistentStore>) -> Result<()> {
        self.blocks.push_back(block);
        if self.blocks.len() > self.capacity {
            if let Some(evicted) = self.blocks.pop_front() {
                if let Some(store) = backend {
                    store.put(self.table, &overflow_key(&evicted), &overflow_value(&evicted))?;
                }
            }
        }
        Ok(())
    }

    pub fn get_last_block(&self) -> Option<&B> {
        self.blocks.back()
    }

    /// Looks up a block by its offset from the tail (`0` = most
    /// recent), returning an error if it's already been evicted to the
    /// persistent backend and must be fetched from there instead.
    pub fn get_block(&self, offset_from_tail: usize) -> Result<&B> {
        let len = self.blocks.len();
        if offset_from_tail >= len {
            return Err(Error::invariant("block offset beyond resident ring buffer; consult the persistent store"));
        }
        Ok(&self.blocks[len - 1 - offset_from_tail])
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

pub type DsBlockChainStore = BlockChainStore<DSBlock>;
pub type TxBlockChainStore = BlockChainStore<TxBlock>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{DSBlockHeader, PublicKey};

    fn ds_block(n: u64) -> DSBlock {
        let header = DSBlockHeader::new(
            1,
            1,
            [0u8; 32],
            n,
            PublicKey(vec![1, 2, 3]),
            PublicKey(vec![1, 2, 3]),
            n,
            n,
            0,
            Default::default(),
            Vec::new(),
            [0u8; 32],
            [0u8; 32],
        );
        DSBlock { header, cosigs: crate::block::CoSignatures::default() }
    }

    #[test]
    fn ring_buffer_evicts_oldest_past_capacity() {
        let mut store: BlockChainStore<DSBlock> = BlockChainStore::new(2, tables::DS_BLOCKS);
        for n in 0..5 {
            store.add_block(ds_block(n), |b| b.header.block_num.to_be_bytes().to_vec(), |_| Vec::new(), None).unwrap();
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_last_block().unwrap().header.block_num, 4);
    }

    #[test]
    fn get_block_beyond_resident_tail_errors() {
        let mut store: BlockChainStore<DSBlock> = BlockChainStore::new(2, tables::DS_BLOCKS);
        store.add_block(ds_block(0), |b| b.header.block_num.to_be_bytes().to_vec(), |_| Vec::new(), None).unwrap();
        assert!(store.get_block(5).is_err());
    }
}
