use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::domain::Address;
use tracing::{info, warn};

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts already authorized for this client, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>>;
    /// Asks the user to grant account access.
    async fn request_accounts(&self) -> Result<Vec<Address>>;
    async fn network_id(&self) -> Result<u64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    AccountsCleared,
    AccountChanged,
    NetworkChanged,
    /// The wallet stopped answering, so the binding can no longer be trusted.
    WalletUnreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletChange {
    Unchanged,
    ReloadRequired(ReloadReason),
}

/// Remembers the account and network a session was built for. Any change
/// means the contract binding is stale and the session must be rebuilt.
pub struct WalletWatch {
    wallet: Arc<dyn WalletProvider>,
    account: Address,
    network_id: u64,
}

impl WalletWatch {
    pub fn new(wallet: Arc<dyn WalletProvider>, account: Address, network_id: u64) -> Self {
        Self {
            wallet,
            account,
            network_id,
        }
    }

    pub fn account(&self) -> &Address {
        &self.account
    }

    pub fn network_id(&self) -> u64 {
        self.network_id
    }

    pub async fn check(&self) -> Result<WalletChange> {
        let accounts = self.wallet.accounts().await?;
        let change = match accounts.first() {
            None => WalletChange::ReloadRequired(ReloadReason::AccountsCleared),
            Some(current) if !current.same_account(&self.account) => {
                WalletChange::ReloadRequired(ReloadReason::AccountChanged)
            }
            Some(_) => {
                if self.wallet.network_id().await? != self.network_id {
                    WalletChange::ReloadRequired(ReloadReason::NetworkChanged)
                } else {
                    WalletChange::Unchanged
                }
            }
        };
        if let WalletChange::ReloadRequired(reason) = change {
            info!(?reason, account = %self.account, "wallet changed; session reload required");
        }
        Ok(change)
    }

    /// Like [`WalletWatch::check`], but a wallet that fails to answer also
    /// invalidates the session instead of letting it run on stale state.
    pub async fn check_or_reload(&self) -> WalletChange {
        match self.check().await {
            Ok(change) => change,
            Err(err) => {
                warn!(account = %self.account, "wallet check failed: {err:#}");
                WalletChange::ReloadRequired(ReloadReason::WalletUnreachable)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/wallet_tests.rs"]
mod tests;
