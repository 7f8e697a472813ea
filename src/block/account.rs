use serde::{Deserialize, Serialize};

use super::keys::Address;

/// An on-chain account, keyed by [`Address`] in the external
/// Merkle-Patricia trie.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub balance: u128,
    pub nonce: u64,
    pub code_hash: [u8; 32],
    pub storage_root: [u8; 32],
}

/// External collaborator contract for the account Merkle-Patricia trie.
pub trait AccountTrie: Send + Sync {
    fn root(&self) -> [u8; 32];
    fn at(&self, addr: &Address) -> Option<Account>;
    fn insert(&mut self, addr: Address, account: Account);
    fn remove(&mut self, addr: &Address);
}

/// In-memory `AccountTrie` used for tests and the single-node daemon
/// default. Production deployments back this with the real MPT.
#[derive(Default)]
pub struct InMemoryAccountTrie {
    accounts: std::collections::BTreeMap<Address, Account>,
}

impl AccountTrie for InMemoryAccountTrie {
    fn root(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        for (addr, acct) in &self.accounts {
            hasher.update(&addr.0);
            hasher.update(&acct.balance.to_be_bytes());
            hasher.update(&acct.nonce.to_be_bytes());
        }
        *hasher.finalize().as_bytes()
    }

    fn at(&self, addr: &Address) -> Option<Account> {
        self.accounts.get(addr).cloned()
    }

    fn insert(&mut self, addr: Address, account: Account) {
        self.accounts.insert(addr, account);
    }

    fn remove(&mut self, addr: &Address) {
        self.accounts.remove(addr);
    }
}
