use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{Address, CourseRecord, Role, StudentId, StudentInfo, TeacherId, TeacherInfo},
    validation::{NewStudent, NewTeacher},
};

/// The deployed records contract, bound to the account that issues calls.
///
/// Reads are free calls; the `add_*`, `assign_*`, `remove_*` and `update_*`
/// methods submit state changes from the bound account. Errors carry the raw
/// remote message so callers can show it unchanged.
#[async_trait]
pub trait ContractService: Send + Sync {
    async fn get_my_role(&self) -> Result<Role>;
    /// `None` asks for the caller's own teacher record.
    async fn get_teacher_info(&self, teacher_id: Option<TeacherId>) -> Result<TeacherInfo>;
    async fn get_my_id(&self) -> Result<StudentId>;
    async fn get_student_info(&self, student_id: StudentId) -> Result<StudentInfo>;
    async fn get_my_info(&self) -> Result<StudentInfo>;
    async fn get_all_teachers(&self) -> Result<Vec<TeacherId>>;
    async fn get_all_students(&self) -> Result<Vec<StudentId>>;
    async fn add_teacher(&self, teacher: &NewTeacher) -> Result<()>;
    async fn add_student(&self, student: &NewStudent) -> Result<()>;
    async fn assign_student_to_teacher(
        &self,
        student_id: StudentId,
        teacher_id: TeacherId,
    ) -> Result<()>;
    async fn remove_student(&self, student_id: StudentId) -> Result<()>;
    async fn remove_teacher(&self, teacher_id: TeacherId) -> Result<()>;
    async fn get_my_students(&self) -> Result<Vec<StudentId>>;
    /// Only the courses the calling teacher added for this student.
    async fn get_student_courses_added_by_me(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<CourseRecord>>;
    async fn get_my_courses(&self) -> Result<Vec<CourseRecord>>;
    async fn add_course_to_student(&self, student_id: StudentId, course: &CourseRecord)
        -> Result<()>;
    async fn update_course(&self, student_id: StudentId, course: &CourseRecord) -> Result<()>;
    async fn remove_course(&self, student_id: StudentId, course_name: &str) -> Result<()>;
}

/// Builds a contract handle for a deployment address and calling account.
pub trait ContractFactory: Send + Sync {
    fn connect(&self, contract: &Address, account: &Address) -> Result<Arc<dyn ContractService>>;
}
