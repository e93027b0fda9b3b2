//! View state shared by the controllers: which container is active, what the
//! status line says, and how records are turned into display text.

use std::fmt;

use shared::{
    domain::{Address, CourseScores, ScoreField, StudentInfo},
    validation::format_score,
};

pub const CONNECT_PROMPT: &str = "Connect your wallet to manage student records.";
pub const UNREGISTERED_MESSAGE: &str = "Your address is not registered. Please contact an admin.";
pub const INIT_FAILURE_MESSAGE: &str =
    "Error initializing your view. Please ensure you are on the correct network and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Welcome,
    Admin,
    Teacher,
    Student,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [
        ViewMode::Welcome,
        ViewMode::Admin,
        ViewMode::Teacher,
        ViewMode::Student,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Idle,
    WalletMissing,
    NotConnected,
    Connected(Address),
    ConnectionRejected,
    Error(String),
}

impl StatusLine {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            StatusLine::WalletMissing | StatusLine::ConnectionRejected | StatusLine::Error(_)
        )
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::Idle => Ok(()),
            StatusLine::WalletMissing => {
                f.write_str("Wallet not detected. Install a wallet such as MetaMask.")
            }
            StatusLine::NotConnected => f.write_str("Wallet not connected"),
            StatusLine::Connected(account) => write!(f, "Connected: {}", account.short()),
            StatusLine::ConnectionRejected => f.write_str("Connection rejected"),
            StatusLine::Error(message) => f.write_str(message),
        }
    }
}

/// Top-level screen. Exactly one container is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub status: StatusLine,
    active: ViewMode,
    pub welcome_message: String,
    pub connect_enabled: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            status: StatusLine::Idle,
            active: ViewMode::Welcome,
            welcome_message: CONNECT_PROMPT.to_string(),
            connect_enabled: true,
        }
    }
}

impl Screen {
    pub fn activate(&mut self, mode: ViewMode) {
        self.active = mode;
    }

    pub fn active(&self) -> ViewMode {
        self.active
    }

    pub fn is_active(&self, mode: ViewMode) -> bool {
        self.active == mode
    }

    /// Welcome container with a message in place of the connect prompt.
    pub fn show_welcome(&mut self, message: impl Into<String>) {
        self.active = ViewMode::Welcome;
        self.welcome_message = message.into();
    }
}

/// A view region that is filled from a contract read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section<T> {
    Loading,
    Empty(String),
    Ready(T),
    Failed(String),
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Section::Loading
    }
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Placeholder text for every state except `Ready`.
    pub fn message(&self) -> Option<&str> {
        match self {
            Section::Loading => Some("Loading..."),
            Section::Empty(message) | Section::Failed(message) => Some(message),
            Section::Ready(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Section::Failed(_))
    }
}

/// Result of a user action, worded for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed(String),
    /// Rejected by local validation; nothing was submitted.
    Invalid(String),
    /// The user backed out; nothing was submitted.
    Cancelled(String),
    Failed(String),
}

impl ActionOutcome {
    pub fn message(&self) -> &str {
        match self {
            ActionOutcome::Completed(message)
            | ActionOutcome::Invalid(message)
            | ActionOutcome::Cancelled(message)
            | ActionOutcome::Failed(message) => message,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ActionOutcome::Completed(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ActionOutcome::Invalid(_) | ActionOutcome::Failed(_))
    }
}

/// `CIE1: 80`, `CIE2: -`, ... with attendance shown as a percentage.
pub fn course_cells(scores: &CourseScores) -> Vec<String> {
    ScoreField::ALL
        .iter()
        .map(|field| {
            let value = scores.get(*field);
            match (field, value) {
                (ScoreField::Attendance, Some(_)) => {
                    format!("{}: {}%", field.label(), format_score(value))
                }
                _ => format!("{}: {}", field.label(), format_score(value)),
            }
        })
        .collect()
}

pub fn profile_rows(info: &StudentInfo) -> Vec<(&'static str, String)> {
    vec![
        ("Name", info.name.clone()),
        ("Age", info.age.to_string()),
        ("Semester", info.semester.to_string()),
        ("Email", info.email.clone()),
        ("Branch", info.branch.clone()),
        ("Phone", info.phone.clone()),
        (
            "Enrollment Date",
            info.enrolled_at.format("%Y-%m-%d").to_string(),
        ),
        ("Wallet Address", info.address.to_string()),
    ]
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
