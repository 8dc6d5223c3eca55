use serde::{Deserialize, Serialize};

/// What the server sends back in place of a stored Pinata secret.
pub const MASKED_SECRET: &str = "********";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_true")]
    pub use_mock_contract: bool,
    #[serde(rename = "useMockIPFS", default = "default_true")]
    pub use_mock_ipfs: bool,
    #[serde(default = "default_rpc_url")]
    pub network_rpc_url: String,
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub pinata_api_key: String,
    #[serde(default)]
    pub pinata_secret_key: String,
}

fn default_true() -> bool {
    true
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_mock_contract: true,
            use_mock_ipfs: true,
            network_rpc_url: default_rpc_url(),
            contract_address: String::new(),
            pinata_api_key: String::new(),
            pinata_secret_key: String::new(),
        }
    }
}

impl Settings {
    /// True when the secret field still holds the server's mask, meaning
    /// saving leaves the stored secret untouched.
    pub fn secret_is_masked(&self) -> bool {
        self.pinata_secret_key == MASKED_SECRET
    }
}
