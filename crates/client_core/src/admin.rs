use anyhow::Result;
use shared::{
    domain::{StudentId, TeacherId},
    error::ValidationError,
    validation::{StudentForm, TeacherForm},
};
use tracing::{error, info};

use crate::{
    prompt::Prompter,
    session::SessionContext,
    view::{ActionOutcome, Section},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOption<Id> {
    pub id: Id,
    pub label: String,
}

/// Teacher/student management for the admin account.
pub struct AdminView {
    ctx: SessionContext,
    pub teachers: Section<Vec<SelectorOption<TeacherId>>>,
    pub students: Section<Vec<SelectorOption<StudentId>>>,
}

impl AdminView {
    pub fn new(ctx: SessionContext) -> Self {
        Self {
            ctx,
            teachers: Section::Loading,
            students: Section::Loading,
        }
    }

    /// Reloads both selectors. A failure is shown in both of them.
    pub async fn refresh(&mut self) {
        self.teachers = Section::Loading;
        self.students = Section::Loading;
        match self.load_selectors().await {
            Ok((teachers, students)) => {
                self.teachers = if teachers.is_empty() {
                    Section::Empty("No teachers found.".to_string())
                } else {
                    Section::Ready(teachers)
                };
                self.students = if students.is_empty() {
                    Section::Empty("No students found.".to_string())
                } else {
                    Section::Ready(students)
                };
            }
            Err(err) => {
                error!("failed to populate admin selectors: {err:#}");
                self.teachers = Section::Failed(format!("Error loading teachers: {err}"));
                self.students = Section::Failed(format!("Error loading students: {err}"));
            }
        }
    }

    async fn load_selectors(
        &self,
    ) -> Result<(
        Vec<SelectorOption<TeacherId>>,
        Vec<SelectorOption<StudentId>>,
    )> {
        let contract = self.ctx.contract();

        let mut teachers = Vec::new();
        for id in contract.get_all_teachers().await? {
            let teacher = contract.get_teacher_info(Some(id)).await?;
            teachers.push(SelectorOption {
                id,
                label: format!("ID: {id} - {} ({}...)", teacher.name, teacher.address.prefix()),
            });
        }

        let mut students = Vec::new();
        for id in contract.get_all_students().await? {
            let student = contract.get_student_info(id).await?;
            students.push(SelectorOption {
                id,
                label: format!("ID: {id} - {} ({}...)", student.name, student.address.prefix()),
            });
        }

        Ok((teachers, students))
    }

    pub async fn add_teacher(&mut self, form: &TeacherForm) -> ActionOutcome {
        let teacher = match form.validate() {
            Ok(teacher) => teacher,
            Err(err) => {
                return ActionOutcome::Invalid(format!(
                    "Please fill all teacher fields correctly (valid address, age >= 18): {err}"
                ))
            }
        };
        match self.ctx.contract().add_teacher(&teacher).await {
            Ok(()) => {
                info!(name = %teacher.name, address = %teacher.address, "teacher added");
                self.refresh().await;
                ActionOutcome::Completed("Teacher added successfully".to_string())
            }
            Err(err) => {
                error!("addTeacher failed: {err:#}");
                ActionOutcome::Failed(format!("Error adding teacher: {err}"))
            }
        }
    }

    pub async fn add_student(&mut self, form: &StudentForm) -> ActionOutcome {
        let student = match form.validate() {
            Ok(student) => student,
            Err(err) => {
                return ActionOutcome::Invalid(format!(
                    "Please fill all student fields correctly (valid address, age >= 18, semester >= 1): {err}"
                ))
            }
        };
        match self.ctx.contract().add_student(&student).await {
            Ok(()) => {
                info!(name = %student.name, address = %student.address, "student added");
                self.refresh().await;
                ActionOutcome::Completed("Student added successfully".to_string())
            }
            Err(err) => {
                error!("addStudent failed: {err:#}");
                ActionOutcome::Failed(format!("Error adding student: {err}"))
            }
        }
    }

    pub async fn assign_student(
        &mut self,
        student_id: Option<StudentId>,
        teacher_id: Option<TeacherId>,
    ) -> ActionOutcome {
        let (Some(student_id), Some(teacher_id)) = (student_id, teacher_id) else {
            return ActionOutcome::Invalid("Please select both teacher and student IDs.".to_string());
        };
        match self
            .ctx
            .contract()
            .assign_student_to_teacher(student_id, teacher_id)
            .await
        {
            Ok(()) => {
                info!(%student_id, %teacher_id, "student assigned");
                self.refresh().await;
                ActionOutcome::Completed("Student assigned successfully".to_string())
            }
            Err(err) => {
                error!("assignStudentToTeacher failed: {err:#}");
                ActionOutcome::Failed(format!("Error assigning student: {err}"))
            }
        }
    }

    /// Removing a student deletes all of their data on the contract side.
    pub async fn remove_student(
        &mut self,
        student_id: Option<StudentId>,
        prompter: &dyn Prompter,
    ) -> ActionOutcome {
        let Some(student_id) = student_id else {
            return ActionOutcome::Invalid(ValidationError::NothingSelected("student").to_string());
        };
        let question = format!(
            "Are you sure you want to remove student with ID {student_id}? This will delete all their data."
        );
        if !prompter.confirm(&question).await {
            return ActionOutcome::Cancelled("Removal cancelled.".to_string());
        }
        match self.ctx.contract().remove_student(student_id).await {
            Ok(()) => {
                info!(%student_id, "student removed");
                self.refresh().await;
                ActionOutcome::Completed("Student removed successfully".to_string())
            }
            Err(err) => {
                error!("removeStudent failed: {err:#}");
                ActionOutcome::Failed(format!("Error removing student: {err}"))
            }
        }
    }

    /// Removing a teacher unassigns them from all of their students.
    pub async fn remove_teacher(
        &mut self,
        teacher_id: Option<TeacherId>,
        prompter: &dyn Prompter,
    ) -> ActionOutcome {
        let Some(teacher_id) = teacher_id else {
            return ActionOutcome::Invalid(ValidationError::NothingSelected("teacher").to_string());
        };
        let question = format!(
            "Are you sure you want to remove teacher with ID {teacher_id}? This will unassign them from all students."
        );
        if !prompter.confirm(&question).await {
            return ActionOutcome::Cancelled("Removal cancelled.".to_string());
        }
        match self.ctx.contract().remove_teacher(teacher_id).await {
            Ok(()) => {
                info!(%teacher_id, "teacher removed");
                self.refresh().await;
                ActionOutcome::Completed("Teacher removed successfully".to_string())
            }
            Err(err) => {
                error!("removeTeacher failed: {err:#}");
                ActionOutcome::Failed(format!("Error removing teacher: {err}"))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/admin_tests.rs"]
mod tests;
