//! Wire and accounting data types shared by the gossip and
//! directory-service subsystems.

pub mod account;
pub mod cosig;
pub mod ds_header;
pub mod keys;
pub mod microblock;
pub mod peer;
pub mod pow;
pub mod shard;
pub mod transaction;
pub mod tx_header;

pub use account::{Account, AccountTrie, InMemoryAccountTrie};
pub use cosig::CoSignatures;
pub use ds_header::{DSBlock, DSBlockHeader, VCBlock, VCBlockHeader};
pub use keys::{Address, KeyPair, PublicKey, SecretKey, Signature, SignatureScheme};
pub use microblock::{MicroBlock, MicroBlockHeader};
pub use peer::Peer;
pub use pow::PowSubmission;
pub use shard::{sharding_hash, Shard};
pub use transaction::{verify_order, Transaction};
pub use tx_header::{is_vacuous_epoch, TxBlock, TxBlockHeader};
