use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

lazy_static! {
    static ref KNOWN_NETWORKS: HashMap<u64, &'static str> = {
        let mut m = HashMap::new();
        m.insert(1, "Ethereum Mainnet");
        m.insert(3, "Ropsten Testnet");
        m.insert(4, "Rinkeby Testnet");
        m.insert(5, "Goerli Testnet");
        m.insert(42, "Kovan Testnet");
        m.insert(56, "Binance Smart Chain");
        m.insert(97, "Binance Smart Chain Testnet");
        m.insert(137, "Polygon Mainnet");
        m.insert(80001, "Polygon Mumbai Testnet");
        m.insert(1337, "Local Development Chain");
        m.insert(31337, "Hardhat Network");
        m
    };
}

pub fn network_name(chain_id: u64) -> String {
    KNOWN_NETWORKS
        .get(&chain_id)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Unknown Network (ID: {})", chain_id))
}

/// Backend view of the chain it talks to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub network_id: u64,
    pub network_name: String,
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub rpc_url: String,
}
