//! Form parsing and validation that runs before any contract call.

use crate::{
    domain::{Address, CourseRecord, CourseScores, Score, ScoreField},
    error::ValidationError,
};

pub const MIN_AGE: u32 = 18;
pub const MIN_SEMESTER: u32 = 1;

/// Blank input means "not recorded"; anything else must be a whole number in `0..=100`.
pub fn parse_score_input(value: &str) -> Result<Option<Score>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parsed: u32 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidScore(trimmed.to_string()))?;
    Score::new(parsed)
        .map(Some)
        .map_err(|_| ValidationError::InvalidScore(trimmed.to_string()))
}

pub fn format_score(score: Option<Score>) -> String {
    match score {
        Some(score) => score.to_string(),
        None => "-".to_string(),
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn at_least(field: &'static str, value: &str, min: u32) -> Result<u32, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    let parsed: u32 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: trimmed.to_string(),
    })?;
    if parsed < min {
        return Err(ValidationError::BelowMinimum { field, min });
    }
    Ok(parsed)
}

fn wallet_address(value: &str) -> Result<Address, ValidationError> {
    required("wallet address", value)?;
    Address::parse(value)
}

/// Raw admin input for a new teacher.
#[derive(Debug, Clone, Default)]
pub struct TeacherForm {
    pub name: String,
    pub age: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeacher {
    pub name: String,
    pub age: u32,
    pub address: Address,
}

impl TeacherForm {
    pub fn validate(&self) -> Result<NewTeacher, ValidationError> {
        Ok(NewTeacher {
            name: required("name", &self.name)?,
            age: at_least("age", &self.age, MIN_AGE)?,
            address: wallet_address(&self.address)?,
        })
    }
}

/// Raw admin input for a new student.
#[derive(Debug, Clone, Default)]
pub struct StudentForm {
    pub name: String,
    pub age: String,
    pub semester: String,
    pub email: String,
    pub branch: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub age: u32,
    pub semester: u32,
    pub email: String,
    pub branch: String,
    pub phone: String,
    pub address: Address,
}

impl StudentForm {
    pub fn validate(&self) -> Result<NewStudent, ValidationError> {
        Ok(NewStudent {
            name: required("name", &self.name)?,
            age: at_least("age", &self.age, MIN_AGE)?,
            semester: at_least("semester", &self.semester, MIN_SEMESTER)?,
            email: required("email", &self.email)?,
            branch: required("branch", &self.branch)?,
            phone: required("phone", &self.phone)?,
            address: wallet_address(&self.address)?,
        })
    }
}

/// Raw teacher input for a new course. Blank score fields stay unset.
#[derive(Debug, Clone, Default)]
pub struct CourseForm {
    pub name: String,
    pub cie1: String,
    pub cie2: String,
    pub cie3: String,
    pub aat: String,
    pub lab: String,
    pub attendance: String,
}

impl CourseForm {
    pub fn validate(&self) -> Result<CourseRecord, ValidationError> {
        let name = required("course name", &self.name)?;
        Ok(CourseRecord {
            name,
            scores: CourseScores {
                cie1: parse_score_input(&self.cie1)?,
                cie2: parse_score_input(&self.cie2)?,
                cie3: parse_score_input(&self.cie3)?,
                aat: parse_score_input(&self.aat)?,
                lab: parse_score_input(&self.lab)?,
                attendance: parse_score_input(&self.attendance)?,
            },
        })
    }
}

/// What to do with one field of an existing course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldEdit {
    #[default]
    Keep,
    Clear,
    Set(Score),
}

impl FieldEdit {
    /// Interprets a prompt answer: blank clears the field.
    pub fn from_input(value: &str) -> Result<Self, ValidationError> {
        Ok(match parse_score_input(value)? {
            Some(score) => FieldEdit::Set(score),
            None => FieldEdit::Clear,
        })
    }

    fn apply(self, current: Option<Score>) -> Option<Score> {
        match self {
            FieldEdit::Keep => current,
            FieldEdit::Clear => None,
            FieldEdit::Set(score) => Some(score),
        }
    }
}

/// A complete edit of a course's six values, submitted in one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseEdit {
    pub cie1: FieldEdit,
    pub cie2: FieldEdit,
    pub cie3: FieldEdit,
    pub aat: FieldEdit,
    pub lab: FieldEdit,
    pub attendance: FieldEdit,
}

impl CourseEdit {
    pub fn get(&self, field: ScoreField) -> FieldEdit {
        match field {
            ScoreField::Cie1 => self.cie1,
            ScoreField::Cie2 => self.cie2,
            ScoreField::Cie3 => self.cie3,
            ScoreField::Aat => self.aat,
            ScoreField::Lab => self.lab,
            ScoreField::Attendance => self.attendance,
        }
    }

    pub fn set(&mut self, field: ScoreField, edit: FieldEdit) {
        let slot = match field {
            ScoreField::Cie1 => &mut self.cie1,
            ScoreField::Cie2 => &mut self.cie2,
            ScoreField::Cie3 => &mut self.cie3,
            ScoreField::Aat => &mut self.aat,
            ScoreField::Lab => &mut self.lab,
            ScoreField::Attendance => &mut self.attendance,
        };
        *slot = edit;
    }

    pub fn is_noop(&self) -> bool {
        ScoreField::ALL
            .iter()
            .all(|field| self.get(*field) == FieldEdit::Keep)
    }

    pub fn apply(&self, current: &CourseScores) -> CourseScores {
        let mut next = *current;
        for field in ScoreField::ALL {
            next.set(field, self.get(field).apply(current.get(field)));
        }
        next
    }
}
