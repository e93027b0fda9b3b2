use shared::domain::{CourseRecord, StudentId, StudentInfo};
use tracing::error;

use crate::{session::SessionContext, view::Section};

/// Read-only profile and course list for a student account.
pub struct StudentView {
    ctx: SessionContext,
    student_id: StudentId,
    pub profile: Section<StudentInfo>,
    pub courses: Section<Vec<CourseRecord>>,
}

impl StudentView {
    pub fn new(ctx: SessionContext, student_id: StudentId) -> Self {
        Self {
            ctx,
            student_id,
            profile: Section::Loading,
            courses: Section::Loading,
        }
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn id_label(&self) -> String {
        format!("ID: {}", self.student_id)
    }

    /// Profile and courses load independently; one failing leaves the other intact.
    pub async fn load(&mut self) {
        self.profile = match self.ctx.contract().get_my_info().await {
            Ok(info) => Section::Ready(info),
            Err(err) => {
                error!("getMyInfo failed: {err:#}");
                Section::Failed(format!("Error loading your information: {err}"))
            }
        };

        self.courses = match self.ctx.contract().get_my_courses().await {
            Ok(courses) if courses.is_empty() => {
                Section::Empty("No courses enrolled yet.".to_string())
            }
            Ok(courses) => Section::Ready(courses),
            Err(err) => {
                error!("getMyCourses failed: {err:#}");
                Section::Failed(format!("Error loading your courses: {err}"))
            }
        };
    }
}

#[cfg(test)]
#[path = "tests/student_tests.rs"]
mod tests;
