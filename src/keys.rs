//! Private key parsing (hex or WIF) and the public key forms derived from it

use crate::address::Address;
use crate::error::SignError;
use crate::hash::{hash160, sha256d};
use crate::network::NetworkParams;
use crate::script::p2pkh_script_pubkey;
use crate::types::*;
use secp256k1::{PublicKey, Secp256k1, SecretKey};

/// A secp256k1 private scalar and its public point.
///
/// Signing borrows the key for the duration of one call; nothing in this
/// crate keeps a copy.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
    compressed: bool,
}

impl KeyPair {
    /// Key from a 32-byte big-endian scalar; rejects zero and values ≥ n.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignError> {
        let secret =
            SecretKey::from_slice(bytes).map_err(|e| SignError::InvalidKey(e.to_string()))?;
        let public = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret);
        Ok(Self {
            secret,
            public,
            compressed: true,
        })
    }

    pub fn from_hex(s: &str) -> Result<Self, SignError> {
        let bytes = hex::decode(s.trim()).map_err(|e| SignError::InvalidKey(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(SignError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        Self::from_slice(&bytes)
    }

    /// Wallet import format: base58check(wif_version ‖ key ‖ [0x01]).
    pub fn from_wif(s: &str, network: &NetworkParams) -> Result<Self, SignError> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| SignError::InvalidKey(e.to_string()))?;
        if bytes.len() < 5 {
            return Err(SignError::InvalidKey("WIF too short".to_string()));
        }
        let (payload, checksum) = bytes.split_at(bytes.len() - 4);
        if sha256d(payload)[..4] != *checksum {
            return Err(SignError::InvalidKey("WIF checksum mismatch".to_string()));
        }
        if payload[0] != network.wif_version {
            return Err(SignError::InvalidKey(format!(
                "WIF version 0x{:02x} is not {}",
                payload[0], network.name
            )));
        }
        let (key, compressed) = match &payload[1..] {
            [key @ .., 0x01] if key.len() == 32 => (key, true),
            key if key.len() == 32 => (key, false),
            _ => {
                return Err(SignError::InvalidKey(format!(
                    "WIF payload of {} bytes",
                    payload.len()
                )))
            }
        };
        let mut pair = Self::from_slice(key)?;
        pair.compressed = compressed;
        Ok(pair)
    }

    /// 64 hex characters are read as a raw scalar, anything else as WIF.
    pub fn parse(s: &str, network: &NetworkParams) -> Result<Self, SignError> {
        let s = s.trim();
        if s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Self::from_hex(s)
        } else {
            Self::from_wif(s, network)
        }
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// SEC1 encoding, compressed unless the key came from an uncompressed WIF.
    pub fn public_key_bytes(&self) -> ByteString {
        if self.compressed {
            self.public.serialize().to_vec()
        } else {
            self.public.serialize_uncompressed().to_vec()
        }
    }

    pub fn pubkey_hash(&self) -> Hash160 {
        hash160(&self.public_key_bytes())
    }

    pub fn p2pkh_script_pubkey(&self) -> ByteString {
        p2pkh_script_pubkey(&self.pubkey_hash())
    }

    pub fn p2pkh_address(&self, network: &NetworkParams) -> Address {
        Address::p2pkh(self.pubkey_hash(), network)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &hex::encode(self.public_key_bytes()))
            .finish_non_exhaustive()
    }
}
