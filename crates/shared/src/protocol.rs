use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    domain::{Address, CourseRecord, CourseScores, Score, ScoreField, StudentInfo, TeacherInfo},
    error::ContractError,
};

/// Wire value the contract stores for a score that was never recorded.
pub const UNSET_SCORE_SENTINEL: u64 = 200;

pub const JSONRPC_VERSION: &str = "2.0";
pub const CONTRACT_CALL_METHOD: &str = "contract_call";
pub const CONTRACT_SEND_METHOD: &str = "contract_send";

/// Contract methods the client invokes, named as they appear in the ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractMethod {
    GetMyRole,
    GetTeacherInfo,
    GetMyId,
    GetStudentInfo,
    GetMyInfo,
    GetAllTeachers,
    GetAllStudents,
    AddTeacher,
    AddStudent,
    AssignStudentToTeacher,
    RemoveStudent,
    RemoveTeacher,
    GetMyStudents,
    GetStudentCoursesAddedByMe,
    GetMyCourses,
    AddCourseToStudent,
    UpdateCourse,
    RemoveCourse,
}

impl ContractMethod {
    pub const ALL: [ContractMethod; 18] = [
        ContractMethod::GetMyRole,
        ContractMethod::GetTeacherInfo,
        ContractMethod::GetMyId,
        ContractMethod::GetStudentInfo,
        ContractMethod::GetMyInfo,
        ContractMethod::GetAllTeachers,
        ContractMethod::GetAllStudents,
        ContractMethod::AddTeacher,
        ContractMethod::AddStudent,
        ContractMethod::AssignStudentToTeacher,
        ContractMethod::RemoveStudent,
        ContractMethod::RemoveTeacher,
        ContractMethod::GetMyStudents,
        ContractMethod::GetStudentCoursesAddedByMe,
        ContractMethod::GetMyCourses,
        ContractMethod::AddCourseToStudent,
        ContractMethod::UpdateCourse,
        ContractMethod::RemoveCourse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContractMethod::GetMyRole => "getMyRole",
            ContractMethod::GetTeacherInfo => "getTeacherInfo",
            ContractMethod::GetMyId => "getMyId",
            ContractMethod::GetStudentInfo => "getStudentInfo",
            ContractMethod::GetMyInfo => "getMyInfo",
            ContractMethod::GetAllTeachers => "getAllTeachers",
            ContractMethod::GetAllStudents => "getAllStudents",
            ContractMethod::AddTeacher => "addTeacher",
            ContractMethod::AddStudent => "addStudent",
            ContractMethod::AssignStudentToTeacher => "assignStudentToTeacher",
            ContractMethod::RemoveStudent => "removeStudent",
            ContractMethod::RemoveTeacher => "removeTeacher",
            ContractMethod::GetMyStudents => "getMyStudents",
            ContractMethod::GetStudentCoursesAddedByMe => "getStudentCoursesAddedByMe",
            ContractMethod::GetMyCourses => "getMyCourses",
            ContractMethod::AddCourseToStudent => "addCourseToStudent",
            ContractMethod::UpdateCourse => "updateCourse",
            ContractMethod::RemoveCourse => "removeCourse",
        }
    }

    /// Mutations are submitted from the active account; everything else is a free read.
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            ContractMethod::AddTeacher
                | ContractMethod::AddStudent
                | ContractMethod::AssignStudentToTeacher
                | ContractMethod::RemoveStudent
                | ContractMethod::RemoveTeacher
                | ContractMethod::AddCourseToStudent
                | ContractMethod::UpdateCourse
                | ContractMethod::RemoveCourse
        )
    }
}

/// Unsigned contract integer. Gateways return these either as JSON numbers or
/// as decimal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Uint(pub u64);

impl<'de> Deserialize<'de> for Uint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(Uint(value)),
            Repr::Text(text) => text
                .trim()
                .parse()
                .map(Uint)
                .map_err(|_| de::Error::custom(format!("invalid unsigned integer '{text}'"))),
        }
    }
}

impl Uint {
    fn into_u32(self, field: &str) -> Result<u32, ContractError> {
        u32::try_from(self.0)
            .map_err(|_| ContractError::decode(format!("{field} out of range: {}", self.0)))
    }
}

pub fn encode_score(score: Option<Score>) -> u64 {
    score.map_or(UNSET_SCORE_SENTINEL, |s| u64::from(s.value()))
}

pub fn decode_score(field: ScoreField, raw: Uint) -> Result<Option<Score>, ContractError> {
    if raw.0 == UNSET_SCORE_SENTINEL {
        return Ok(None);
    }
    u32::try_from(raw.0)
        .ok()
        .and_then(|v| Score::new(v).ok())
        .map(Some)
        .ok_or_else(|| {
            ContractError::decode(format!("{} out of range: {}", field.describe(), raw.0))
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCourse {
    pub cie1: Uint,
    pub cie2: Uint,
    pub cie3: Uint,
    pub aat_score: Uint,
    pub lab_score: Uint,
    pub attendance: Uint,
}

impl RawCourse {
    pub fn from_scores(scores: &CourseScores) -> Self {
        Self {
            cie1: Uint(encode_score(scores.cie1)),
            cie2: Uint(encode_score(scores.cie2)),
            cie3: Uint(encode_score(scores.cie3)),
            aat_score: Uint(encode_score(scores.aat)),
            lab_score: Uint(encode_score(scores.lab)),
            attendance: Uint(encode_score(scores.attendance)),
        }
    }

    pub fn into_scores(self) -> Result<CourseScores, ContractError> {
        Ok(CourseScores {
            cie1: decode_score(ScoreField::Cie1, self.cie1)?,
            cie2: decode_score(ScoreField::Cie2, self.cie2)?,
            cie3: decode_score(ScoreField::Cie3, self.cie3)?,
            aat: decode_score(ScoreField::Aat, self.aat_score)?,
            lab: decode_score(ScoreField::Lab, self.lab_score)?,
            attendance: decode_score(ScoreField::Attendance, self.attendance)?,
        })
    }
}

/// `(names[], courses[])` pair returned by the course listing reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCourseListing(pub Vec<String>, pub Vec<RawCourse>);

impl RawCourseListing {
    pub fn into_records(self) -> Result<Vec<CourseRecord>, ContractError> {
        let RawCourseListing(names, courses) = self;
        if names.len() != courses.len() {
            return Err(ContractError::decode(format!(
                "course listing has {} names but {} records",
                names.len(),
                courses.len()
            )));
        }
        names
            .into_iter()
            .zip(courses)
            .map(|(name, raw)| {
                Ok(CourseRecord {
                    name,
                    scores: raw.into_scores()?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTeacherInfo {
    pub name: String,
    pub age: Uint,
    #[serde(rename = "teacherAddress")]
    pub address: Address,
}

impl RawTeacherInfo {
    pub fn into_domain(self) -> Result<TeacherInfo, ContractError> {
        Ok(TeacherInfo {
            name: self.name,
            age: self.age.into_u32("teacher age")?,
            address: self.address,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStudentInfo {
    pub name: String,
    pub age: Uint,
    pub semester: Uint,
    pub email: String,
    pub branch: String,
    pub phone: String,
    /// Seconds since the Unix epoch.
    pub enrollment_date: Uint,
    #[serde(rename = "studentAddress")]
    pub address: Address,
}

impl RawStudentInfo {
    pub fn into_domain(self) -> Result<StudentInfo, ContractError> {
        let seconds = i64::try_from(self.enrollment_date.0).map_err(|_| {
            ContractError::decode(format!(
                "enrollment date out of range: {}",
                self.enrollment_date.0
            ))
        })?;
        let enrolled_at = DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
            ContractError::decode(format!("enrollment date out of range: {seconds}"))
        })?;
        Ok(StudentInfo {
            name: self.name,
            age: self.age.into_u32("student age")?,
            semester: self.semester.into_u32("semester")?,
            email: self.email,
            branch: self.branch,
            phone: self.phone,
            enrolled_at,
            address: self.address,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest<P> {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: P,
}

impl<P> RpcRequest<P> {
    pub fn new(id: u64, method: impl Into<String>, params: P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

/// Params of a `contract_call` / `contract_send` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractCallParams {
    pub to: Address,
    pub from: Address,
    pub method: String,
    pub args: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sentinel_decodes_to_unset() {
        let raw: RawCourse = serde_json::from_value(json!({
            "cie1": 80, "cie2": 200, "cie3": "0",
            "aatScore": "200", "labScore": 100, "attendance": 95
        }))
        .expect("course");
        let scores = raw.into_scores().expect("scores");
        assert_eq!(scores.cie1.map(Score::value), Some(80));
        assert_eq!(scores.cie2, None);
        assert_eq!(scores.cie3.map(Score::value), Some(0));
        assert_eq!(scores.aat, None);
        assert_eq!(scores.attendance.map(Score::value), Some(95));
    }

    #[test]
    fn non_sentinel_values_above_range_are_decode_errors() {
        let err = decode_score(ScoreField::Lab, Uint(150)).expect_err("must fail");
        assert_eq!(err.kind, crate::error::ContractErrorKind::Decode);
        assert!(err.message.contains("Lab score"));
    }

    #[test]
    fn unset_scores_encode_as_sentinel() {
        let mut scores = CourseScores::default();
        scores.cie1 = Some(Score::new(7).expect("score"));
        let raw = RawCourse::from_scores(&scores);
        assert_eq!(raw.cie1, Uint(7));
        assert_eq!(raw.cie2, Uint(UNSET_SCORE_SENTINEL));
        assert_eq!(raw.attendance, Uint(UNSET_SCORE_SENTINEL));
    }

    #[test]
    fn course_listing_rejects_mismatched_lengths() {
        let listing: RawCourseListing = serde_json::from_value(json!([
            ["Math", "Physics"],
            [{ "cie1": 1, "cie2": 2, "cie3": 3, "aatScore": 4, "labScore": 5, "attendance": 6 }]
        ]))
        .expect("listing");
        assert!(listing.into_records().is_err());
    }

    #[test]
    fn student_info_renders_enrollment_timestamp() {
        let raw: RawStudentInfo = serde_json::from_value(json!({
            "name": "Asha", "age": "19", "semester": 3,
            "email": "asha@example.edu", "branch": "CSE", "phone": "555-0101",
            "enrollmentDate": "1700000000",
            "studentAddress": "0x1111111111111111111111111111111111111111"
        }))
        .expect("student");
        let info = raw.into_domain().expect("domain");
        assert_eq!(info.enrolled_at.format("%Y-%m-%d").to_string(), "2023-11-14");
        assert_eq!(info.semester, 3);
    }

    #[test]
    fn mutations_are_flagged() {
        assert!(ContractMethod::UpdateCourse.is_mutation());
        assert!(!ContractMethod::GetMyCourses.is_mutation());
        assert_eq!(
            ContractMethod::GetStudentCoursesAddedByMe.name(),
            "getStudentCoursesAddedByMe"
        );
    }
}
