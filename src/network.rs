//! Network profiles: the version bytes that make addresses and keys network-specific

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version bytes for one network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    pub name: &'static str,
    pub p2pkh_version: u8,
    pub p2sh_version: u8,
    pub wif_version: u8,
}

pub const MAINNET: NetworkParams = NetworkParams {
    name: "mainnet",
    p2pkh_version: 0x00,
    p2sh_version: 0x05,
    wif_version: 0x80,
};

pub const TESTNET: NetworkParams = NetworkParams {
    name: "testnet",
    p2pkh_version: 0x6f,
    p2sh_version: 0xc4,
    wif_version: 0xef,
};

/// Regtest shares testnet's base58 prefixes.
pub const REGTEST: NetworkParams = NetworkParams {
    name: "regtest",
    ..TESTNET
};

/// Network selector carried in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Regtest,
}

impl Network {
    pub fn params(self) -> NetworkParams {
        match self {
            Network::Mainnet => MAINNET,
            Network::Testnet => TESTNET,
            Network::Regtest => REGTEST,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.params().name)
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "bitcoin" => Ok(Network::Mainnet),
            "testnet" | "test" | "testnet3" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}
