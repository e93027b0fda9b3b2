use super::*;
use std::sync::Arc;

use crate::fakes::{
    addr, student_info, teacher_info, ContractState, FakeContract, ScriptedPrompter, Submission,
};
use shared::{domain::Role, protocol::ContractMethod, validation::NewStudent};

fn populated() -> Arc<FakeContract> {
    FakeContract::new(ContractState {
        role: "Admin".into(),
        teachers: vec![(TeacherId(1), teacher_info("Meera", 0x11))],
        students: vec![
            (StudentId(1), student_info("Asha", 0x21)),
            (StudentId(2), student_info("Ravi", 0x22)),
        ],
        ..ContractState::default()
    })
}

fn teacher_form(address: &str) -> TeacherForm {
    TeacherForm {
        name: "Kiran".into(),
        age: "35".into(),
        address: address.into(),
    }
}

#[tokio::test]
async fn refresh_builds_labelled_selectors() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));

    view.refresh().await;

    let teachers = view.teachers.ready().expect("teachers");
    assert_eq!(
        teachers,
        &vec![SelectorOption {
            id: TeacherId(1),
            label: "ID: 1 - Meera (0x0000...)".into(),
        }]
    );
    let students = view.students.ready().expect("students");
    assert_eq!(students.len(), 2);
    assert_eq!(students[1].label, "ID: 2 - Ravi (0x0000...)");
}

#[tokio::test]
async fn empty_registry_shows_placeholders() {
    let contract = FakeContract::new(ContractState::default());
    let mut view = AdminView::new(contract.context(Role::Admin));

    view.refresh().await;

    assert_eq!(view.teachers.message(), Some("No teachers found."));
    assert_eq!(view.students.message(), Some("No students found."));
}

#[tokio::test]
async fn lookup_failure_marks_both_selectors() {
    let contract = populated();
    contract.fail(ContractMethod::GetAllTeachers, "node unreachable");
    let mut view = AdminView::new(contract.context(Role::Admin));

    view.refresh().await;

    assert_eq!(
        view.teachers.message(),
        Some("Error loading teachers: node unreachable")
    );
    assert!(view.students.is_failed());
}

#[tokio::test]
async fn malformed_address_is_rejected_before_submission() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));

    let outcome = view.add_teacher(&teacher_form("0x123")).await;

    assert!(matches!(outcome, ActionOutcome::Invalid(_)));
    assert!(outcome
        .message()
        .starts_with("Please fill all teacher fields correctly"));
    assert!(contract.submissions().is_empty());
}

#[tokio::test]
async fn underage_student_is_rejected_before_submission() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));
    let form = StudentForm {
        name: "Nila".into(),
        age: "17".into(),
        semester: "1".into(),
        email: "nila@example.edu".into(),
        branch: "ECE".into(),
        phone: "555-0101".into(),
        address: addr(0x30).as_str().into(),
    };

    let outcome = view.add_student(&form).await;

    assert!(matches!(outcome, ActionOutcome::Invalid(_)));
    assert!(contract.submissions().is_empty());
}

#[tokio::test]
async fn added_teacher_appears_after_refresh() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));

    let outcome = view.add_teacher(&teacher_form(addr(0x12).as_str())).await;

    assert_eq!(
        outcome,
        ActionOutcome::Completed("Teacher added successfully".into())
    );
    assert!(matches!(
        contract.submissions().as_slice(),
        [Submission::AddTeacher(teacher)] if teacher.age == 35 && teacher.address == addr(0x12)
    ));
    assert_eq!(view.teachers.ready().map(Vec::len), Some(2));
}

#[tokio::test]
async fn contract_rejection_is_surfaced_verbatim() {
    let contract = populated();
    contract.fail(ContractMethod::AddTeacher, "Teacher already exists");
    let mut view = AdminView::new(contract.context(Role::Admin));

    let outcome = view.add_teacher(&teacher_form(addr(0x11).as_str())).await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed("Error adding teacher: Teacher already exists".into())
    );
}

#[tokio::test]
async fn assign_requires_both_selections() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));

    let outcome = view.assign_student(Some(StudentId(1)), None).await;

    assert_eq!(
        outcome,
        ActionOutcome::Invalid("Please select both teacher and student IDs.".into())
    );
    assert!(contract.submissions().is_empty());

    let outcome = view.assign_student(Some(StudentId(1)), Some(TeacherId(1))).await;
    assert!(outcome.is_completed());
    assert_eq!(
        contract.submissions(),
        vec![Submission::Assign {
            student_id: StudentId(1),
            teacher_id: TeacherId(1),
        }]
    );
}

#[tokio::test]
async fn assignment_refreshes_selectors() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));
    assert_eq!(contract.read_count(ContractMethod::GetAllTeachers), 0);

    let outcome = view.assign_student(Some(StudentId(2)), Some(TeacherId(1))).await;

    assert_eq!(
        outcome,
        ActionOutcome::Completed("Student assigned successfully".into())
    );
    assert_eq!(contract.read_count(ContractMethod::GetAllTeachers), 1);
    assert_eq!(contract.read_count(ContractMethod::GetAllStudents), 1);
    assert_eq!(view.teachers.ready().map(Vec::len), Some(1));
    assert_eq!(view.students.ready().map(Vec::len), Some(2));
}

#[tokio::test]
async fn failed_assignment_keeps_selectors_untouched() {
    let contract = populated();
    contract.fail(ContractMethod::AssignStudentToTeacher, "Student already assigned");
    let mut view = AdminView::new(contract.context(Role::Admin));

    let outcome = view.assign_student(Some(StudentId(2)), Some(TeacherId(1))).await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed("Error assigning student: Student already assigned".into())
    );
    assert_eq!(contract.read_count(ContractMethod::GetAllTeachers), 0);
}

#[tokio::test]
async fn added_student_appears_after_refresh() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));
    let form = StudentForm {
        name: "  Nila ".into(),
        age: " 19".into(),
        semester: "2 ".into(),
        email: " nila@example.edu ".into(),
        branch: "ECE".into(),
        phone: "555-0101".into(),
        address: format!(" {} ", addr(0x30).as_str()),
    };

    let outcome = view.add_student(&form).await;

    assert_eq!(
        outcome,
        ActionOutcome::Completed("Student added successfully".into())
    );
    assert_eq!(
        contract.submissions(),
        vec![Submission::AddStudent(NewStudent {
            name: "Nila".into(),
            age: 19,
            semester: 2,
            email: "nila@example.edu".into(),
            branch: "ECE".into(),
            phone: "555-0101".into(),
            address: addr(0x30),
        })]
    );
    let students = view.students.ready().expect("students");
    assert_eq!(students.len(), 3);
    assert_eq!(students[2].label, "ID: 3 - Nila (0x0000...)");
}

#[tokio::test]
async fn rejected_student_surfaces_raw_message() {
    let contract = populated();
    contract.fail(ContractMethod::AddStudent, "Student address already registered");
    let mut view = AdminView::new(contract.context(Role::Admin));
    let form = StudentForm {
        name: "Nila".into(),
        age: "19".into(),
        semester: "2".into(),
        email: "nila@example.edu".into(),
        branch: "ECE".into(),
        phone: "555-0101".into(),
        address: addr(0x21).as_str().into(),
    };

    let outcome = view.add_student(&form).await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed("Error adding student: Student address already registered".into())
    );
    assert!(view.students.ready().is_none());
}

#[tokio::test]
async fn declined_teacher_removal_submits_nothing() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));
    let prompter = ScriptedPrompter::confirming(false);

    let outcome = view.remove_teacher(Some(TeacherId(1)), &prompter).await;

    assert_eq!(outcome, ActionOutcome::Cancelled("Removal cancelled.".into()));
    assert!(contract.submissions().is_empty());
    let asked = prompter.asked();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].0.contains("teacher with ID 1"));
}

#[tokio::test]
async fn confirmed_teacher_removal_refreshes_selectors() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));
    view.refresh().await;
    assert_eq!(view.teachers.ready().map(Vec::len), Some(1));

    let outcome = view
        .remove_teacher(Some(TeacherId(1)), &ScriptedPrompter::confirming(true))
        .await;

    assert_eq!(
        outcome,
        ActionOutcome::Completed("Teacher removed successfully".into())
    );
    assert_eq!(contract.submissions(), vec![Submission::RemoveTeacher(TeacherId(1))]);
    assert_eq!(view.teachers.message(), Some("No teachers found."));
}

#[tokio::test]
async fn declined_removal_submits_nothing() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));
    let prompter = ScriptedPrompter::confirming(false);

    let outcome = view.remove_student(Some(StudentId(2)), &prompter).await;

    assert!(matches!(outcome, ActionOutcome::Cancelled(_)));
    assert!(contract.submissions().is_empty());
    let asked = prompter.asked();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].0.contains("ID 2"));
}

#[tokio::test]
async fn removal_without_selection_does_not_prompt() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));
    let prompter = ScriptedPrompter::confirming(true);

    let outcome = view.remove_teacher(None, &prompter).await;

    assert_eq!(outcome, ActionOutcome::Invalid("no teacher selected".into()));
    assert!(prompter.asked().is_empty());
}

#[tokio::test]
async fn confirmed_removal_refreshes_selectors() {
    let contract = populated();
    let mut view = AdminView::new(contract.context(Role::Admin));
    view.refresh().await;

    let outcome = view
        .remove_student(Some(StudentId(2)), &ScriptedPrompter::confirming(true))
        .await;

    assert_eq!(
        outcome,
        ActionOutcome::Completed("Student removed successfully".into())
    );
    assert_eq!(contract.submissions(), vec![Submission::RemoveStudent(StudentId(2))]);
    assert_eq!(view.students.ready().map(Vec::len), Some(1));
}
