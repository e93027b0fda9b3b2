use std::sync::Arc;

use anyhow::Result;
use shared::domain::{Address, Role};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    admin::AdminView,
    artifact::{ArtifactError, ArtifactSource},
    contract::{ContractFactory, ContractService},
    student::StudentView,
    teacher::TeacherView,
    view::{Screen, StatusLine, ViewMode, INIT_FAILURE_MESSAGE, UNREGISTERED_MESSAGE},
    wallet::{WalletProvider, WalletWatch},
};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("wallet not detected")]
    WalletUnavailable,
    #[error("connection rejected: {0}")]
    ConnectionRejected(String),
    #[error("wallet request failed: {0}")]
    Wallet(String),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("contract not deployed on network {network_id}")]
    NotDeployed { network_id: u64 },
    #[error("failed to bind contract: {0}")]
    Binding(String),
    #[error("failed to set up view: {0}")]
    ViewSetup(String),
}

/// Everything a view controller needs to talk to the contract on behalf of
/// the connected account. Built once per connection.
#[derive(Clone)]
pub struct SessionContext {
    account: Address,
    role: Role,
    contract: Arc<dyn ContractService>,
}

impl SessionContext {
    pub fn new(account: Address, role: Role, contract: Arc<dyn ContractService>) -> Self {
        Self {
            account,
            role,
            contract,
        }
    }

    pub fn account(&self) -> &Address {
        &self.account
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn contract(&self) -> &dyn ContractService {
        self.contract.as_ref()
    }
}

pub enum ActiveView {
    Admin(AdminView),
    Teacher(TeacherView),
    Student(StudentView),
    Unregistered,
}

impl ActiveView {
    pub fn mode(&self) -> ViewMode {
        match self {
            ActiveView::Admin(_) => ViewMode::Admin,
            ActiveView::Teacher(_) => ViewMode::Teacher,
            ActiveView::Student(_) => ViewMode::Student,
            ActiveView::Unregistered => ViewMode::Welcome,
        }
    }
}

pub struct ActiveSession {
    pub screen: Screen,
    pub context: SessionContext,
    pub view: ActiveView,
    pub watch: WalletWatch,
    /// Set while the view still holds the data loaded during activation.
    fresh: bool,
}

impl ActiveSession {
    /// Returns whether the view data is the one loaded during activation,
    /// and clears the flag so later calls report a stale view.
    pub fn take_fresh(&mut self) -> bool {
        std::mem::take(&mut self.fresh)
    }
}

pub enum Startup {
    WalletUnavailable {
        screen: Screen,
    },
    /// A wallet is present but has not granted any account yet.
    AwaitingConnection {
        screen: Screen,
        wallet: Arc<dyn WalletProvider>,
    },
    Failed {
        screen: Screen,
        error: InitError,
    },
    Active(Box<ActiveSession>),
}

impl Startup {
    pub fn screen(&self) -> &Screen {
        match self {
            Startup::WalletUnavailable { screen }
            | Startup::AwaitingConnection { screen, .. }
            | Startup::Failed { screen, .. } => screen,
            Startup::Active(session) => &session.screen,
        }
    }
}

/// Turns a wallet into an active, role-specific session.
pub struct SessionResolver {
    artifacts: Arc<dyn ArtifactSource>,
    contracts: Arc<dyn ContractFactory>,
}

impl SessionResolver {
    pub fn new(artifacts: Arc<dyn ArtifactSource>, contracts: Arc<dyn ContractFactory>) -> Self {
        Self {
            artifacts,
            contracts,
        }
    }

    /// Startup path: uses an already-authorized account if there is one.
    pub async fn initialize(&self, wallet: Option<Arc<dyn WalletProvider>>) -> Startup {
        let mut screen = Screen::default();
        let Some(wallet) = wallet else {
            screen.status = StatusLine::WalletMissing;
            screen.connect_enabled = false;
            return Startup::WalletUnavailable { screen };
        };

        match wallet.accounts().await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => self.connect_with(wallet, account, screen).await,
                None => {
                    screen.status = StatusLine::NotConnected;
                    Startup::AwaitingConnection { screen, wallet }
                }
            },
            Err(err) => {
                error!("wallet account lookup failed: {err:#}");
                screen.status = StatusLine::Error(format!("Wallet request failed: {err}"));
                Startup::Failed {
                    screen,
                    error: InitError::Wallet(err.to_string()),
                }
            }
        }
    }

    /// Explicit connect action: asks the wallet to grant account access.
    pub async fn connect(&self, wallet: Arc<dyn WalletProvider>) -> Startup {
        let mut screen = Screen::default();
        let granted = match wallet.request_accounts().await {
            Ok(accounts) => accounts.into_iter().next(),
            Err(err) => {
                error!("connection rejected: {err:#}");
                screen.status = StatusLine::ConnectionRejected;
                return Startup::Failed {
                    screen,
                    error: InitError::ConnectionRejected(err.to_string()),
                };
            }
        };

        match granted {
            Some(account) => self.connect_with(wallet, account, screen).await,
            None => {
                screen.status = StatusLine::ConnectionRejected;
                Startup::Failed {
                    screen,
                    error: InitError::ConnectionRejected("no account was granted".to_string()),
                }
            }
        }
    }

    async fn connect_with(
        &self,
        wallet: Arc<dyn WalletProvider>,
        account: Address,
        mut screen: Screen,
    ) -> Startup {
        screen.status = StatusLine::Connected(account.clone());

        let (contract, network_id) = match self.bind_contract(wallet.as_ref(), &account).await {
            Ok(binding) => binding,
            Err(error) => {
                error!(%error, "contract loading failed");
                screen.status = StatusLine::Error(match &error {
                    InitError::NotDeployed { network_id } => format!(
                        "Contract not deployed on network {network_id}. Check the network and contract deployment."
                    ),
                    other => format!(
                        "Error loading contract: {other}. Ensure ABI is correct and contract is deployed."
                    ),
                });
                return Startup::Failed { screen, error };
            }
        };

        let watch = WalletWatch::new(wallet, account.clone(), network_id);
        match self.activate(contract, account, &mut screen).await {
            Ok((context, view)) => Startup::Active(Box::new(ActiveSession {
                screen,
                context,
                view,
                watch,
                fresh: true,
            })),
            Err(err) => {
                error!("role detection or view setup failed: {err:#}");
                screen.status =
                    StatusLine::Error(format!("Error determining role or setting up UI: {err}"));
                screen.show_welcome(INIT_FAILURE_MESSAGE);
                Startup::Failed {
                    screen,
                    error: InitError::ViewSetup(err.to_string()),
                }
            }
        }
    }

    async fn bind_contract(
        &self,
        wallet: &dyn WalletProvider,
        account: &Address,
    ) -> std::result::Result<(Arc<dyn ContractService>, u64), InitError> {
        let artifact = self.artifacts.load().await?;
        let network_id = wallet
            .network_id()
            .await
            .map_err(|err| InitError::Wallet(err.to_string()))?;
        let deployment = artifact
            .deployment(network_id)
            .ok_or(InitError::NotDeployed { network_id })?;
        artifact.ensure_client_methods()?;

        let contract = self
            .contracts
            .connect(&deployment.address, account)
            .map_err(|err| InitError::Binding(err.to_string()))?;
        info!(
            contract = %deployment.address,
            network_id,
            name = %artifact.contract_name,
            "bound records contract"
        );
        Ok((contract, network_id))
    }

    async fn activate(
        &self,
        contract: Arc<dyn ContractService>,
        account: Address,
        screen: &mut Screen,
    ) -> Result<(SessionContext, ActiveView)> {
        let role = contract.get_my_role().await?;
        info!(?role, account = %account, "resolved caller role");
        let context = SessionContext::new(account, role, contract);

        let view = match role {
            Role::Admin => {
                screen.activate(ViewMode::Admin);
                let mut view = AdminView::new(context.clone());
                view.refresh().await;
                ActiveView::Admin(view)
            }
            Role::Teacher => {
                screen.activate(ViewMode::Teacher);
                let identity = context.contract().get_teacher_info(None).await?;
                let mut view = TeacherView::new(context.clone(), identity);
                view.load_roster().await;
                ActiveView::Teacher(view)
            }
            Role::Student => {
                screen.activate(ViewMode::Student);
                let student_id = context.contract().get_my_id().await?;
                let mut view = StudentView::new(context.clone(), student_id);
                view.load().await;
                ActiveView::Student(view)
            }
            Role::Unregistered => {
                screen.show_welcome(UNREGISTERED_MESSAGE);
                screen.connect_enabled = false;
                ActiveView::Unregistered
            }
        };
        Ok((context, view))
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
