//! Plain-text rendering of the screen and the role views.

use std::fmt::Write;

use client_core::{
    view::{course_cells, profile_rows},
    ActionOutcome, ActiveView, AdminView, ReloadReason, Screen, Section, StudentView, TeacherView,
    ViewMode,
};
use shared::domain::CourseRecord;

pub fn screen(screen: &Screen) -> String {
    let mut out = format!("Status: {}\n", screen.status);
    if screen.active() == ViewMode::Welcome {
        let _ = writeln!(out, "{}", screen.welcome_message);
        if screen.connect_enabled {
            out.push_str("Run `records connect` to connect a wallet account.\n");
        }
    }
    out
}

pub fn view(view: &ActiveView) -> String {
    match view {
        ActiveView::Admin(admin) => admin_view(admin),
        ActiveView::Teacher(teacher) => teacher_view(teacher),
        ActiveView::Student(student) => student_view(student),
        ActiveView::Unregistered => String::new(),
    }
}

fn section<T>(out: &mut String, title: &str, section: &Section<T>, body: impl Fn(&mut String, &T)) {
    let _ = writeln!(out, "{title}:");
    match section.ready() {
        Some(value) => body(out, value),
        None => {
            let _ = writeln!(out, "  {}", section.message().unwrap_or_default());
        }
    }
}

fn courses(out: &mut String, courses: &[CourseRecord]) {
    for course in courses {
        let _ = writeln!(out, "  {}  {}", course.name, course_cells(&course.scores).join("  "));
    }
}

pub fn admin_view(view: &AdminView) -> String {
    let mut out = String::from("== Admin ==\n");
    section(&mut out, "Teachers", &view.teachers, |out, options| {
        for option in options {
            let _ = writeln!(out, "  {}", option.label);
        }
    });
    section(&mut out, "Students", &view.students, |out, options| {
        for option in options {
            let _ = writeln!(out, "  {}", option.label);
        }
    });
    out
}

pub fn teacher_view(view: &TeacherView) -> String {
    let mut out = format!("== Teacher ==\n{}\n", view.identity_label());
    section(&mut out, "My students", &view.roster, |out, entries| {
        for entry in entries {
            let _ = writeln!(out, "  [{}] {}", entry.student_id, entry.display_name);
        }
    });
    if let Some(title) = view.panel_title() {
        section(&mut out, &format!("Courses for {title}"), &view.courses, |out, list| {
            courses(out, list)
        });
    }
    out
}

pub fn student_view(view: &StudentView) -> String {
    let mut out = format!("== Student ==\n{}\n", view.id_label());
    section(&mut out, "Profile", &view.profile, |out, info| {
        for (label, value) in profile_rows(info) {
            let _ = writeln!(out, "  {label}: {value}");
        }
    });
    section(&mut out, "My courses", &view.courses, |out, list| courses(out, list));
    out
}

pub fn outcome(outcome: &ActionOutcome) -> String {
    let tag = match outcome {
        ActionOutcome::Completed(_) => "ok",
        ActionOutcome::Invalid(_) | ActionOutcome::Failed(_) => "error",
        ActionOutcome::Cancelled(_) => "cancelled",
    };
    format!("{tag}: {}", outcome.message())
}

pub fn reload_reason(reason: ReloadReason) -> &'static str {
    match reason {
        ReloadReason::AccountsCleared => "wallet disconnected",
        ReloadReason::AccountChanged => "wallet account changed",
        ReloadReason::NetworkChanged => "wallet network changed",
        ReloadReason::WalletUnreachable => "wallet unreachable",
    }
}
