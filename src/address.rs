//! Base58check addresses: P2SH derivation from a redeem script, decoding and locking scripts

use crate::error::AddressError;
use crate::hash::{hash160, sha256d};
use crate::network::NetworkParams;
use crate::script::{p2pkh_script_pubkey, p2sh_script_pubkey};
use crate::types::*;
use log::debug;
use std::fmt;

/// Decoded size: version ‖ hash160 ‖ checksum
const ADDRESS_LEN: usize = 25;

/// What an address pays to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    PubkeyHash,
    ScriptHash,
}

/// A network-checksummed address and its base58 form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub kind: AddressKind,
    pub version: u8,
    pub hash: Hash160,
    encoded: String,
}

impl Address {
    /// Locking script paying to this address.
    pub fn script_pubkey(&self) -> ByteString {
        match self.kind {
            AddressKind::PubkeyHash => p2pkh_script_pubkey(&self.hash),
            AddressKind::ScriptHash => p2sh_script_pubkey(&self.hash),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// P2PKH address for a public key hash.
    pub fn p2pkh(pubkey_hash: Hash160, network: &NetworkParams) -> Self {
        Self::from_parts(AddressKind::PubkeyHash, network.p2pkh_version, pubkey_hash)
    }

    fn from_parts(kind: AddressKind, version: u8, hash: Hash160) -> Self {
        let mut payload = [0u8; ADDRESS_LEN];
        payload[0] = version;
        payload[1..21].copy_from_slice(&hash);
        let checksum = sha256d(&payload[..21]);
        payload[21..].copy_from_slice(&checksum[..4]);
        Self {
            kind,
            version,
            hash,
            encoded: bs58::encode(payload).into_string(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// DeriveAddress: 𝕊 × 𝒩 → 𝒜
///
/// base58(p2sh_version ‖ hash160(script) ‖ sha256d(p2sh_version ‖ hash160(script))[..4])
pub fn derive_address(script: &RedeemScript, network: &NetworkParams) -> Address {
    let address = Address::from_parts(
        AddressKind::ScriptHash,
        network.p2sh_version,
        script.script_hash(),
    );
    debug!("derived {} address {}", network.name, address);
    address
}

/// DecodeAddress: string → (version, hash160)
///
/// Checks length and checksum only; the version byte is returned as found.
/// `network` is unused here and kept so the signature mirrors `derive_address`;
/// `parse_address` is the variant that checks the version against it.
pub fn decode_address(s: &str, _network: &NetworkParams) -> Result<(u8, Hash160), AddressError> {
    let bytes = bs58::decode(s.trim())
        .into_vec()
        .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
    if bytes.len() != ADDRESS_LEN {
        return Err(AddressError::BadLength(bytes.len()));
    }

    let checksum = sha256d(&bytes[..21]);
    if checksum[..4] != bytes[21..] {
        return Err(AddressError::BadChecksum);
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&bytes[1..21]);
    Ok((bytes[0], hash))
}

/// Decode and require a P2PKH or P2SH version byte belonging to `network`.
pub fn parse_address(s: &str, network: &NetworkParams) -> Result<Address, AddressError> {
    let (version, hash) = decode_address(s, network)?;
    let kind = if version == network.p2pkh_version {
        AddressKind::PubkeyHash
    } else if version == network.p2sh_version {
        AddressKind::ScriptHash
    } else {
        return Err(AddressError::UnsupportedVersion(version));
    };
    Ok(Address::from_parts(kind, version, hash))
}
