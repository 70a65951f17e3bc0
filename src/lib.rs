//! # Hashlock-Tx
//!
//! Construction of hash-locked pay-to-script-hash transactions over the Bitcoin
//! legacy transaction format.
//!
//! A hash lock commits funds to `OP_SHA256 <SHA256(preimage)> OP_EQUAL`. Anyone
//! who reveals the preimage can spend the output. This crate builds the redeem
//! script, derives its P2SH address, and assembles both the funding transaction
//! that locks value to that address and the spending transaction that unlocks it.
//!
//! ## Layout
//!
//! - `script`: opcode and data-push encoding, script parsing
//! - `address`: base58check P2SH/P2PKH addresses
//! - `codec`: legacy wire serialization and transaction ids
//! - `sighash`: legacy signature hash and ECDSA signing
//! - `interpreter`: script evaluation used to self-check signed inputs
//! - `builder`: funding and spending transaction assembly
//!
//! All operations are pure functions over in-memory byte buffers. Network
//! selection is always an explicit parameter.
//!
//! ## Usage
//!
//! ```rust
//! use hashlock_tx::{BuilderConfig, HashLock};
//!
//! let lock = HashLock::new(BuilderConfig::default());
//! let redeem = lock.redeem_script(b"Btrust Builders");
//! assert_eq!(
//!     redeem.to_hex(),
//!     "a82016e05614526c1ebd3a170a430a1906a6484fdd203ab7ce6690a54938f5c44d7d87"
//! );
//! assert_eq!(
//!     lock.derive_address(b"Btrust Builders").to_string(),
//!     "2MwDHax5L9jXVGmnhN2YECEx63ickZaf7n9"
//! );
//! ```

pub mod types;
pub mod constants;
pub mod error;
pub mod hash;
pub mod network;
pub mod config;
pub mod script;
pub mod address;
pub mod codec;
pub mod keys;
pub mod sighash;
pub mod interpreter;
pub mod builder;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use error::{AddressError, CodecError, HashLockError, Result, SignError, ValueError};
pub use address::{decode_address, derive_address, parse_address, Address, AddressKind};
pub use builder::{build_funding, build_spending, ChangeOutput};
pub use codec::{deserialize, serialize, tx_id, txid_hex};
pub use config::BuilderConfig;
pub use keys::KeyPair;
pub use network::{Network, NetworkParams};
pub use script::{build_hash_lock, build_unlocking_script, ScriptBuilder};
pub use sighash::{sighash, sign};

/// Hash-lock workflow bound to one configuration
///
/// # Examples
///
/// ```
/// use hashlock_tx::{BuilderConfig, HashLock, Network};
///
/// let lock = HashLock::new(BuilderConfig::for_network(Network::Mainnet));
/// let address = lock.derive_address(b"Btrust Builders");
/// assert_eq!(address.as_str(), "35f5XD9JYH294zA9gtvMaHxpqNQapdVWGp");
/// ```
#[derive(Debug, Clone, Default)]
pub struct HashLock {
    config: BuilderConfig,
}

impl HashLock {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Redeem script locking to `preimage`
    pub fn redeem_script(&self, preimage: &[u8]) -> RedeemScript {
        build_hash_lock(preimage)
    }

    /// P2SH address of the redeem script for `preimage` on the configured network
    pub fn derive_address(&self, preimage: &[u8]) -> Address {
        derive_address(&self.redeem_script(preimage), &self.config.network.params())
    }

    /// Parse a hex scalar or WIF private key for the configured network
    pub fn key(&self, private_key: &str) -> Result<KeyPair> {
        KeyPair::parse(private_key, &self.config.network.params()).map_err(HashLockError::Key)
    }

    /// Build and sign the funding transaction.
    ///
    /// `prev_script_pubkey` is the locking script of the output being spent.
    /// When absent it is taken to be the P2PKH script of the signing key.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashlock_tx::{BuilderConfig, HashLock, OutPoint};
    ///
    /// let lock = HashLock::new(BuilderConfig::default());
    /// let key = "053c54759ad026960b75da497faa6da4c386cfa63f51313ea627ee812ad6e96b";
    /// let prevout = OutPoint { hash: [1; 32], index: 0 };
    /// let tx = lock.fund(b"Btrust Builders", 100000, prevout, None, key).unwrap();
    /// assert_eq!(tx.outputs[0].value, 100000);
    /// ```
    pub fn fund(
        &self,
        preimage: &[u8],
        amount: i64,
        prev_outpoint: OutPoint,
        prev_script_pubkey: Option<&[u8]>,
        private_key: &str,
    ) -> Result<Transaction> {
        let key = self.key(private_key)?;
        let prev_script = match prev_script_pubkey {
            Some(script) => script.to_vec(),
            None => key.p2pkh_script_pubkey(),
        };
        build_funding(
            &self.redeem_script(preimage),
            amount,
            prev_outpoint,
            &prev_script,
            &key,
            &self.config,
        )
    }

    /// Build and sign the transaction spending output 0 of `funding_tx_hex`.
    ///
    /// The change address is always validated; a change output is only
    /// created when `change_amount` is given. The destination receives the
    /// funding value minus the configured fee and any change.
    pub fn spend(
        &self,
        preimage: &[u8],
        funding_tx_hex: &str,
        dest_address: &str,
        change_address: &str,
        change_amount: Option<i64>,
        private_key: &str,
    ) -> Result<Transaction> {
        let network = self.config.network.params();
        let funding_tx = codec::from_hex(funding_tx_hex)?;
        let dest = parse_address(dest_address, &network)?;
        let change_address = parse_address(change_address, &network)?;
        let change = change_amount.map(|amount| ChangeOutput {
            address: change_address,
            amount,
        });
        let key = self.key(private_key)?;

        build_spending(
            &funding_tx,
            &self.redeem_script(preimage),
            preimage,
            &dest,
            change.as_ref(),
            self.config.fee,
            &key,
            &self.config,
        )
    }
}
