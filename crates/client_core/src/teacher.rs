use anyhow::Result;
use shared::{
    domain::{CourseRecord, ScoreField, StudentId, TeacherInfo},
    validation::{format_score, CourseEdit, CourseForm, FieldEdit},
};
use tracing::{error, info, warn};

use crate::{
    prompt::Prompter,
    session::SessionContext,
    view::{ActionOutcome, Section},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub student_id: StudentId,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedStudent {
    pub student_id: StudentId,
    pub name: String,
}

/// Roster and per-student course management for a teacher account.
pub struct TeacherView {
    ctx: SessionContext,
    identity: TeacherInfo,
    pub roster: Section<Vec<RosterEntry>>,
    selection: Option<SelectedStudent>,
    pub courses: Section<Vec<CourseRecord>>,
}

impl TeacherView {
    pub fn new(ctx: SessionContext, identity: TeacherInfo) -> Self {
        Self {
            ctx,
            identity,
            roster: Section::Loading,
            selection: None,
            courses: Section::Loading,
        }
    }

    pub fn identity(&self) -> &TeacherInfo {
        &self.identity
    }

    pub fn identity_label(&self) -> String {
        format!("Name: {}", self.identity.name)
    }

    pub fn selection(&self) -> Option<&SelectedStudent> {
        self.selection.as_ref()
    }

    pub async fn load_roster(&mut self) {
        self.roster = Section::Loading;
        let student_ids = match self.ctx.contract().get_my_students().await {
            Ok(ids) => ids,
            Err(err) => {
                error!("getMyStudents failed: {err:#}");
                self.roster = Section::Failed(format!("Error loading students: {err}"));
                return;
            }
        };
        if student_ids.is_empty() {
            self.roster = Section::Empty("No students assigned yet".to_string());
            return;
        }

        let mut entries = Vec::with_capacity(student_ids.len());
        for student_id in student_ids {
            let display_name = match self.ctx.contract().get_student_info(student_id).await {
                Ok(info) => info.name,
                Err(err) => {
                    warn!(%student_id, "could not fetch student details: {err}");
                    format!("Student ID: {student_id}")
                }
            };
            entries.push(RosterEntry {
                student_id,
                display_name,
            });
        }
        self.roster = Section::Ready(entries);
    }

    /// Opens the course panel scoped to one student.
    pub async fn open_course_panel(&mut self, student_id: StudentId, name: impl Into<String>) {
        self.selection = Some(SelectedStudent {
            student_id,
            name: name.into(),
        });
        self.reload_courses().await;
    }

    /// Opens the panel by id, taking the display name from the roster.
    pub async fn open_course_panel_for(&mut self, student_id: StudentId) {
        let name = self
            .roster
            .ready()
            .and_then(|entries| entries.iter().find(|e| e.student_id == student_id))
            .map(|entry| entry.display_name.clone())
            .unwrap_or_else(|| format!("Student ID: {student_id}"));
        self.open_course_panel(student_id, name).await;
    }

    pub fn close_course_panel(&mut self) {
        self.selection = None;
        self.courses = Section::Loading;
    }

    pub fn panel_title(&self) -> Option<String> {
        self.selection
            .as_ref()
            .map(|s| format!("{} (ID: {})", s.name, s.student_id))
    }

    pub async fn reload_courses(&mut self) {
        let Some(student_id) = self.selection.as_ref().map(|s| s.student_id) else {
            return;
        };
        self.courses = Section::Loading;
        self.courses = match self
            .ctx
            .contract()
            .get_student_courses_added_by_me(student_id)
            .await
        {
            Ok(courses) if courses.is_empty() => Section::Empty(
                "No courses added by you for this student yet.".to_string(),
            ),
            Ok(courses) => Section::Ready(courses),
            Err(err) => {
                error!(%student_id, "getStudentCoursesAddedByMe failed: {err:#}");
                Section::Failed(format!("Error loading courses: {err}"))
            }
        };
    }

    fn selected_student(&self) -> Option<StudentId> {
        self.selection.as_ref().map(|s| s.student_id)
    }

    pub async fn add_course(&mut self, form: &CourseForm) -> ActionOutcome {
        let Some(student_id) = self.selected_student() else {
            return ActionOutcome::Invalid("Select a student first.".to_string());
        };
        if form.name.trim().is_empty() {
            return ActionOutcome::Invalid("Course Name is compulsory.".to_string());
        }
        let course = match form.validate() {
            Ok(course) => course,
            Err(err) => return ActionOutcome::Invalid(format!("Error adding course: {err}")),
        };

        match self
            .ctx
            .contract()
            .add_course_to_student(student_id, &course)
            .await
        {
            Ok(()) => {
                info!(%student_id, course = %course.name, "course added");
                self.reload_courses().await;
                ActionOutcome::Completed("Course added successfully!".to_string())
            }
            Err(err) => {
                error!("addCourseToStudent failed: {err:#}");
                ActionOutcome::Failed(format!("Error adding course: {err}"))
            }
        }
    }

    /// Current values straight from the contract, not from the panel.
    async fn fetch_course(
        &self,
        student_id: StudentId,
        course_name: &str,
    ) -> Result<Option<CourseRecord>> {
        let courses = self
            .ctx
            .contract()
            .get_student_courses_added_by_me(student_id)
            .await?;
        Ok(courses.into_iter().find(|c| c.name == course_name))
    }

    async fn current_course(
        &self,
        course_name: &str,
    ) -> std::result::Result<(StudentId, CourseRecord), ActionOutcome> {
        let Some(student_id) = self.selected_student() else {
            return Err(ActionOutcome::Invalid("Select a student first.".to_string()));
        };
        match self.fetch_course(student_id, course_name).await {
            Ok(Some(course)) => Ok((student_id, course)),
            Ok(None) => Err(ActionOutcome::Invalid(
                "Course not found for editing.".to_string(),
            )),
            Err(err) => Err(ActionOutcome::Failed(format!(
                "Error fetching current course details: {err}"
            ))),
        }
    }

    /// Applies a structured edit in a single `updateCourse` submission.
    pub async fn edit_course(&mut self, course_name: &str, edit: &CourseEdit) -> ActionOutcome {
        let (student_id, current) = match self.current_course(course_name).await {
            Ok(found) => found,
            Err(outcome) => return outcome,
        };
        self.submit_edit(student_id, current, edit).await
    }

    /// Asks for all six values in turn, pre-filled with the current ones.
    /// Nothing is submitted unless every prompt is answered.
    pub async fn edit_course_interactive(
        &mut self,
        course_name: &str,
        prompter: &dyn Prompter,
    ) -> ActionOutcome {
        let (student_id, current) = match self.current_course(course_name).await {
            Ok(found) => found,
            Err(outcome) => return outcome,
        };

        let mut edit = CourseEdit::default();
        for field in ScoreField::ALL {
            let value = current.scores.get(field);
            let question = format!(
                "Enter new {} for {course_name} (0-100 or blank, current: {}):",
                field.describe(),
                format_score(value)
            );
            let default = value.map(|v| v.to_string()).unwrap_or_default();
            let Some(answer) = prompter.prompt(&question, &default).await else {
                return ActionOutcome::Cancelled("Edit cancelled.".to_string());
            };
            match FieldEdit::from_input(&answer) {
                Ok(field_edit) => edit.set(field, field_edit),
                Err(err) => return ActionOutcome::Invalid(format!("Error updating course: {err}")),
            }
        }

        self.submit_edit(student_id, current, &edit).await
    }

    async fn submit_edit(
        &mut self,
        student_id: StudentId,
        current: CourseRecord,
        edit: &CourseEdit,
    ) -> ActionOutcome {
        let updated = CourseRecord {
            scores: edit.apply(&current.scores),
            name: current.name,
        };
        match self.ctx.contract().update_course(student_id, &updated).await {
            Ok(()) => {
                info!(%student_id, course = %updated.name, "course updated");
                self.reload_courses().await;
                ActionOutcome::Completed("Course updated successfully!".to_string())
            }
            Err(err) => {
                error!("updateCourse failed: {err:#}");
                ActionOutcome::Failed(format!("Error updating course: {err}"))
            }
        }
    }

    pub async fn remove_course(&mut self, course_name: &str, prompter: &dyn Prompter) -> ActionOutcome {
        let Some(student_id) = self.selected_student() else {
            return ActionOutcome::Invalid("Select a student first.".to_string());
        };
        let question = format!(
            "Are you sure you want to remove course \"{course_name}\" for student ID {student_id}?"
        );
        if !prompter.confirm(&question).await {
            return ActionOutcome::Cancelled("Removal cancelled.".to_string());
        }
        match self
            .ctx
            .contract()
            .remove_course(student_id, course_name)
            .await
        {
            Ok(()) => {
                info!(%student_id, course = course_name, "course removed");
                self.reload_courses().await;
                ActionOutcome::Completed("Course removed successfully!".to_string())
            }
            Err(err) => {
                error!("removeCourse failed: {err:#}");
                ActionOutcome::Failed(format!("Error removing course: {err}"))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/teacher_tests.rs"]
mod tests;
