use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client-side input problems. Raised before any contract call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),
    #[error("{field} must be a whole number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: &'static str, min: u32 },
    #[error("Invalid score: {0}. Must be 0-100 or blank.")]
    InvalidScore(String),
    #[error("no {0} selected")]
    NothingSelected(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractErrorKind {
    /// The contract or wallet refused the request (revert, user rejection).
    Rejected,
    /// The request never produced a response.
    Transport,
    /// A response arrived but did not match the expected shape.
    Decode,
}

/// Remote failure. `message` is the raw text shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

impl ContractError {
    pub fn new(kind: ContractErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ContractErrorKind::Rejected, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ContractErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ContractErrorKind::Decode, message)
    }
}
