//! Core transaction and script types

use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash, internal byte order
pub type Hash = [u8; 32];

/// 160-bit hash: RIPEMD160(SHA256(x))
pub type Hash160 = [u8; 20];

/// Byte string type
pub type ByteString = Vec<u8>;

/// OutPoint: 𝒪 = ℍ × u32
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

/// Transaction Input: ℐ = 𝒪 × 𝕊 × u32
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: ByteString,
    pub sequence: u32,
}

impl TransactionInput {
    /// Input spending `prevout` with an empty unlocking script.
    pub fn unsigned(prevout: OutPoint, sequence: u32) -> Self {
        Self {
            prevout,
            script_sig: Vec::new(),
            sequence,
        }
    }
}

/// Transaction Output: 𝒯 = i64 × 𝕊
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: i64,
    pub script_pubkey: ByteString,
}

/// Transaction: 𝒯𝒳 = i32 × ℐ* × 𝒯* × u32
///
/// Input and output order is part of both the txid and every sighash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Empty transaction with the given version and lock time.
    pub fn new(version: i32, lock_time: u32) -> Self {
        Self {
            version,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time,
        }
    }
}

/// Redeem script `OP_SHA256 <SHA256(preimage)> OP_EQUAL`.
///
/// Only [`crate::script::build_hash_lock`] constructs one, so the embedded
/// digest always matches the preimage it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RedeemScript(pub(crate) ByteString);

impl RedeemScript {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// The 32-byte digest committed to by the script.
    pub fn embedded_hash(&self) -> Hash {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&self.0[2..34]);
        hash
    }

    /// hash160 of the script bytes, the P2SH commitment.
    pub fn script_hash(&self) -> Hash160 {
        crate::hash::hash160(&self.0)
    }
}

impl AsRef<[u8]> for RedeemScript {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Locking script shapes the assembler knows how to spend or pay to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG
    P2pkh,
    /// OP_HASH160 <20> OP_EQUAL
    P2sh,
    /// <33|65> OP_CHECKSIG
    P2pk,
    NonStandard,
}
