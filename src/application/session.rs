use crate::domain::network_name;
use crate::infrastructure::session_store::{
    SessionStore, StoreError, CACHED_PROVIDER_KEY, CONTRACT_ADDRESS_KEY,
};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

/// Opaque failure reported by the wallet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ProviderError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConnection {
    pub address: String,
    pub chain_id: u64,
}

/// The injected wallet: account identity plus contract deployment.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn connect(&self) -> Result<WalletConnection, ProviderError>;
    /// Deploys the certificate contract and returns its address.
    async fn deploy_contract(&self) -> Result<String, ProviderError>;
    async fn disconnect(&self) -> Result<(), ProviderError>;
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Wallet error: {0}")]
    Provider(#[from] ProviderError),

    #[error("No wallet connected")]
    NotConnected,

    #[error("A contract deployment is already in progress")]
    DeploymentInProgress,

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
}

/// Wallet and contract state shared by every view of one app instance.
///
/// Views receive it explicitly; there is no global session.
pub struct WalletSession {
    store: Box<dyn SessionStore>,
    account: Option<String>,
    chain_id: Option<u64>,
    network: Option<String>,
    contract_address: Option<String>,
    is_deploying: bool,
}

impl WalletSession {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self {
            store,
            account: None,
            chain_id: None,
            network: None,
            contract_address: None,
            is_deploying: false,
        }
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn network(&self) -> Option<&str> {
        self.network.as_deref()
    }

    pub fn contract_address(&self) -> Option<&str> {
        self.contract_address.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn is_deployed(&self) -> bool {
        self.contract_address.is_some()
    }

    pub fn is_deploying(&self) -> bool {
        self.is_deploying
    }

    pub async fn connect(&mut self, provider: &dyn WalletProvider) -> Result<(), SessionError> {
        let connection = provider.connect().await?;
        info!(address = %connection.address, chain_id = connection.chain_id, "wallet connected");

        self.account = Some(connection.address);
        self.set_chain(connection.chain_id);

        if let Err(e) = self.store.set(CACHED_PROVIDER_KEY, "1") {
            warn!("failed to remember wallet provider: {}", e);
        }
        match self.load_stored_contract() {
            Ok(true) => info!("restored contract address from session store"),
            Ok(false) => {}
            Err(e) => warn!("contract not restored: {}", e),
        }
        Ok(())
    }

    /// Reconnect when a previous session left the provider cached.
    /// Returns whether a connection was made.
    pub async fn restore(&mut self, provider: &dyn WalletProvider) -> Result<bool, SessionError> {
        if self.store.get(CACHED_PROVIDER_KEY)?.is_none() {
            return Ok(false);
        }
        self.connect(provider).await?;
        Ok(true)
    }

    /// Pick up a contract address persisted by an earlier deployment.
    pub fn load_stored_contract(&mut self) -> Result<bool, SessionError> {
        match self.store.get(CONTRACT_ADDRESS_KEY)? {
            Some(address) if !address.is_empty() => {
                self.contract_address = Some(address);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Use a contract deployed elsewhere, e.g. the one the backend reports.
    pub fn adopt_contract(&mut self, address: &str) -> Result<(), SessionError> {
        self.store.set(CONTRACT_ADDRESS_KEY, address)?;
        self.contract_address = Some(address.to_string());
        info!(%address, "using contract");
        Ok(())
    }

    pub fn begin_deployment(&mut self) -> Result<(), SessionError> {
        if self.account.is_none() {
            return Err(SessionError::NotConnected);
        }
        if self.is_deploying {
            return Err(SessionError::DeploymentInProgress);
        }
        self.is_deploying = true;
        Ok(())
    }

    pub fn finish_deployment(
        &mut self,
        result: Result<String, ProviderError>,
    ) -> Result<String, SessionError> {
        self.is_deploying = false;
        let address = result?;
        info!(%address, "contract deployed");

        self.contract_address = Some(address.clone());
        // The contract exists on chain regardless; losing the stored copy
        // only means it must be adopted again next session.
        if let Err(e) = self.store.set(CONTRACT_ADDRESS_KEY, &address) {
            warn!("failed to persist contract address: {}", e);
        }
        Ok(address)
    }

    pub async fn deploy_contract(
        &mut self,
        provider: &dyn WalletProvider,
    ) -> Result<String, SessionError> {
        self.begin_deployment()?;
        let result = provider.deploy_contract().await;
        self.finish_deployment(result)
    }

    pub async fn disconnect(&mut self, provider: &dyn WalletProvider) -> Result<(), SessionError> {
        if let Err(e) = provider.disconnect().await {
            warn!("wallet disconnect failed: {}", e);
        }
        self.account = None;
        self.chain_id = None;
        self.network = None;
        self.contract_address = None;
        self.is_deploying = false;
        self.store.remove(CACHED_PROVIDER_KEY)?;
        Ok(())
    }

    /// Wallet switched accounts; an empty list means it locked.
    pub fn accounts_changed(&mut self, accounts: &[String]) {
        self.account = accounts.first().cloned();
        info!(account = ?self.account, "wallet account changed");
    }

    /// Wallet switched chains. Views holding chain data should be remounted.
    pub fn chain_changed(&mut self, chain_id: u64) {
        self.set_chain(chain_id);
        info!(chain_id, network = ?self.network, "wallet chain changed");
    }

    fn set_chain(&mut self, chain_id: u64) {
        self.chain_id = Some(chain_id);
        self.network = Some(network_name(chain_id));
    }
}
