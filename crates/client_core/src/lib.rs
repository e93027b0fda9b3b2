//! Session resolution and role-specific view controllers for the records contract.

pub mod admin;
pub mod artifact;
pub mod contract;
pub mod prompt;
pub mod session;
pub mod student;
pub mod teacher;
pub mod transport;
pub mod view;
pub mod wallet;

pub use admin::AdminView;
pub use artifact::{ArtifactError, ArtifactSource, ContractArtifact};
pub use contract::{ContractFactory, ContractService};
pub use prompt::{AssumeYes, Prompter};
pub use session::{ActiveSession, ActiveView, InitError, SessionContext, SessionResolver, Startup};
pub use student::StudentView;
pub use teacher::TeacherView;
pub use transport::{JsonRpcClient, RpcContract, RpcContractFactory, RpcWallet};
pub use view::{ActionOutcome, Screen, Section, StatusLine, ViewMode};
pub use wallet::{ReloadReason, WalletChange, WalletProvider, WalletWatch};

#[cfg(test)]
#[path = "tests/fakes.rs"]
mod fakes;
