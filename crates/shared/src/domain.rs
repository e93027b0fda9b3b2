use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(TeacherId);
id_newtype!(StudentId);

/// Account address in `0x` + 40 hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ValidationError::InvalidAddress(trimmed.to_string()))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidAddress(trimmed.to_string()));
        }
        Ok(Self(format!("0x{hex}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First six characters, used for selector labels.
    pub fn prefix(&self) -> &str {
        &self.0[..6]
    }

    /// `0x1234...abcd` form for the status line.
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..6], &self.0[38..])
    }

    /// Addresses are case-insensitive; mixed case only carries a checksum.
    pub fn same_account(&self, other: &Address) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Unregistered,
}

impl Role {
    /// Maps the contract's role string. Anything unrecognised is treated as unregistered.
    pub fn from_contract(raw: &str) -> Self {
        match raw.trim() {
            "Admin" => Role::Admin,
            "Teacher" => Role::Teacher,
            "Student" => Role::Student,
            _ => Role::Unregistered,
        }
    }
}

/// A recorded score or attendance percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 100;

    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if value > u32::from(Self::MAX) {
            return Err(ValidationError::InvalidScore(value.to_string()));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreField {
    Cie1,
    Cie2,
    Cie3,
    Aat,
    Lab,
    Attendance,
}

impl ScoreField {
    pub const ALL: [ScoreField; 6] = [
        ScoreField::Cie1,
        ScoreField::Cie2,
        ScoreField::Cie3,
        ScoreField::Aat,
        ScoreField::Lab,
        ScoreField::Attendance,
    ];

    /// Short column label used in course rows.
    pub fn label(self) -> &'static str {
        match self {
            ScoreField::Cie1 => "CIE1",
            ScoreField::Cie2 => "CIE2",
            ScoreField::Cie3 => "CIE3",
            ScoreField::Aat => "AAT",
            ScoreField::Lab => "Lab",
            ScoreField::Attendance => "Attend",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ScoreField::Cie1 => "CIE1 score",
            ScoreField::Cie2 => "CIE2 score",
            ScoreField::Cie3 => "CIE3 score",
            ScoreField::Aat => "AAT score",
            ScoreField::Lab => "Lab score",
            ScoreField::Attendance => "Attendance %",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseScores {
    pub cie1: Option<Score>,
    pub cie2: Option<Score>,
    pub cie3: Option<Score>,
    pub aat: Option<Score>,
    pub lab: Option<Score>,
    pub attendance: Option<Score>,
}

impl CourseScores {
    pub fn get(&self, field: ScoreField) -> Option<Score> {
        match field {
            ScoreField::Cie1 => self.cie1,
            ScoreField::Cie2 => self.cie2,
            ScoreField::Cie3 => self.cie3,
            ScoreField::Aat => self.aat,
            ScoreField::Lab => self.lab,
            ScoreField::Attendance => self.attendance,
        }
    }

    pub fn set(&mut self, field: ScoreField, value: Option<Score>) {
        let slot = match field {
            ScoreField::Cie1 => &mut self.cie1,
            ScoreField::Cie2 => &mut self.cie2,
            ScoreField::Cie3 => &mut self.cie3,
            ScoreField::Aat => &mut self.aat,
            ScoreField::Lab => &mut self.lab,
            ScoreField::Attendance => &mut self.attendance,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    pub name: String,
    pub scores: CourseScores,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherInfo {
    pub name: String,
    pub age: u32,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentInfo {
    pub name: String,
    pub age: u32,
    pub semester: u32,
    pub email: String,
    pub branch: String,
    pub phone: String,
    pub enrolled_at: DateTime<Utc>,
    pub address: Address,
}
