//! Cryptographic identity types.
//!
//! The Schnorr/elliptic-curve primitives themselves are an external
//! collaborator: this module only defines the opaque
//! wire types (`PublicKey`, `Signature`, `SecretKey`) and the
//! [`SignatureScheme`] trait a concrete curve implementation must
//! satisfy. Address derivation (`hash(publicKey)` truncated to 20
//! bytes) is specified, so it lives here rather than behind the trait.

use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub Vec<u8>);

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey(pub Vec<u8>);

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", hex_encode(&self.0))
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey(..)")
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex_encode(&self.0))
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// A keypair over whichever curve the node is configured with.
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub secret: SecretKey,
    pub public: PublicKey,
}

impl KeyPair {
    /// Last 20 bytes of `hash(publicKey)`.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public)
    }
}

/// 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn from_public_key(pk: &PublicKey) -> Self {
        let digest = blake3::hash(&pk.0);
        let bytes = digest.as_bytes();
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&bytes[bytes.len() - 20..]);
        Address(addr)
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex_encode(&self.0))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex_encode(&self.0))
    }
}

/// External collaborator contract: the Schnorr/EC signing backend.
///
/// A production node wires a real curve implementation here; the core
/// never constructs keys or verifies signatures itself outside of this
/// trait, matching "assumed to expose sign/verify/keygen".
pub trait SignatureScheme: Send + Sync {
    fn keygen(&self) -> KeyPair;
    fn sign(&self, secret: &SecretKey, message: &[u8]) -> Signature;
    fn verify(&self, public: &PublicKey, message: &[u8], signature: &Signature) -> bool;
}
