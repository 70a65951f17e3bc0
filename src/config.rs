//! Construction parameters shared by the assembler and the command line

use crate::constants::*;
use crate::network::Network;
use serde::{Deserialize, Serialize};

/// Everything the assembler needs besides keys and amounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub network: Network,
    /// Fixed fee taken out of the destination output
    pub fee: i64,
    pub sighash_type: u32,
    pub version: i32,
    pub sequence: u32,
    pub lock_time: u32,
    /// Run the script interpreter over every signed input
    pub verify: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            fee: DEFAULT_FEE,
            sighash_type: SIGHASH_ALL,
            version: TX_VERSION,
            sequence: SEQUENCE_FINAL,
            lock_time: 0,
            verify: true,
        }
    }
}

impl BuilderConfig {
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }
}
