mod config;
mod render;
mod terminal;

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    ActionOutcome, ActiveSession, ActiveView, AssumeYes, JsonRpcClient, Prompter,
    RpcContractFactory, RpcWallet, SessionResolver, Startup, WalletChange, WalletProvider,
};
use shared::{
    domain::{Role, ScoreField, StudentId, TeacherId},
    error::ValidationError,
    validation::{CourseEdit, CourseForm, FieldEdit, StudentForm, TeacherForm},
};
use tracing::info;

use crate::{
    config::{load_settings, Overrides, Settings, CONFIG_FILE},
    terminal::{split_words, TerminalPrompter},
};

#[derive(Parser, Debug)]
#[command(name = "records", about = "Student and teacher records on the registry contract")]
struct Cli {
    #[arg(long, global = true, env = "RECORDS_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,
    /// Wallet JSON-RPC endpoint. An empty value runs without a wallet.
    #[arg(long, global = true)]
    rpc_url: Option<String>,
    /// Contract gateway endpoint, if different from the wallet endpoint.
    #[arg(long, global = true)]
    gateway_url: Option<String>,
    /// Path to the compiled contract artifact.
    #[arg(long, global = true)]
    artifact: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Action(Action),
    /// Interactive session. Rebuilt whenever the wallet account or network changes.
    Shell,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Show the connection status and the view for the connected role.
    Status,
    /// Ask the wallet for account access, then show the role view.
    Connect,
    #[command(subcommand)]
    Admin(AdminAction),
    #[command(subcommand)]
    Teacher(TeacherAction),
    /// Show your profile and courses.
    Student,
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    AddTeacher {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
        #[arg(long)]
        address: String,
    },
    AddStudent {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
        #[arg(long)]
        semester: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        branch: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
    },
    Assign {
        #[arg(long)]
        student: Option<u64>,
        #[arg(long)]
        teacher: Option<u64>,
    },
    /// Deletes the student and all of their data.
    RemoveStudent {
        id: Option<u64>,
        #[arg(long)]
        yes: bool,
    },
    /// Unassigns the teacher from all of their students.
    RemoveTeacher {
        id: Option<u64>,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum TeacherAction {
    Roster,
    Courses {
        student: u64,
    },
    AddCourse {
        student: u64,
        #[arg(long)]
        name: String,
        #[command(flatten)]
        scores: CourseScoreArgs,
    },
    /// Without score flags, prompts for every value.
    EditCourse {
        student: u64,
        course: String,
        #[command(flatten)]
        scores: CourseScoreArgs,
        #[arg(long)]
        interactive: bool,
    },
    RemoveCourse {
        student: u64,
        course: String,
        #[arg(long)]
        yes: bool,
    },
}

/// Scores are 0-100. When editing, `clear` (or an empty value) unsets a score.
#[derive(Args, Debug, Default)]
struct CourseScoreArgs {
    #[arg(long)]
    cie1: Option<String>,
    #[arg(long)]
    cie2: Option<String>,
    #[arg(long)]
    cie3: Option<String>,
    #[arg(long)]
    aat: Option<String>,
    #[arg(long)]
    lab: Option<String>,
    #[arg(long)]
    attendance: Option<String>,
}

impl CourseScoreArgs {
    fn value(&self, field: ScoreField) -> Option<&str> {
        let value = match field {
            ScoreField::Cie1 => &self.cie1,
            ScoreField::Cie2 => &self.cie2,
            ScoreField::Cie3 => &self.cie3,
            ScoreField::Aat => &self.aat,
            ScoreField::Lab => &self.lab,
            ScoreField::Attendance => &self.attendance,
        };
        value.as_deref()
    }

    fn course_form(&self, name: String) -> CourseForm {
        let value = |field| self.value(field).unwrap_or_default().to_string();
        CourseForm {
            name,
            cie1: value(ScoreField::Cie1),
            cie2: value(ScoreField::Cie2),
            cie3: value(ScoreField::Cie3),
            aat: value(ScoreField::Aat),
            lab: value(ScoreField::Lab),
            attendance: value(ScoreField::Attendance),
        }
    }

    fn course_edit(&self) -> Result<CourseEdit, ValidationError> {
        let mut edit = CourseEdit::default();
        for field in ScoreField::ALL {
            let field_edit = match self.value(field).map(str::trim) {
                None => FieldEdit::Keep,
                Some(v) if v.eq_ignore_ascii_case("clear") => FieldEdit::Clear,
                Some(v) => FieldEdit::from_input(v)?,
            };
            edit.set(field, field_edit);
        }
        Ok(edit)
    }
}

/// One command line inside `records shell`.
#[derive(Parser, Debug)]
#[command(name = "records", no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    action: Action,
}

struct App {
    resolver: SessionResolver,
    wallet: Option<Arc<dyn WalletProvider>>,
    state: Startup,
}

impl App {
    async fn start(settings: &Settings) -> Self {
        let wallet = settings.rpc_url.clone().map(|url| {
            Arc::new(RpcWallet::new(Arc::new(JsonRpcClient::new(url)))) as Arc<dyn WalletProvider>
        });
        let gateway = Arc::new(JsonRpcClient::new(settings.gateway_url.clone()));
        let resolver = SessionResolver::new(
            Arc::new(settings.artifact_path.clone()),
            Arc::new(RpcContractFactory::new(gateway)),
        );
        info!(
            gateway = %settings.gateway_url,
            artifact = %settings.artifact_path.display(),
            wallet = settings.rpc_url.is_some(),
            "starting records client"
        );
        let state = resolver.initialize(wallet.clone()).await;
        Self {
            resolver,
            wallet,
            state,
        }
    }

    fn session_mut(&mut self) -> Option<&mut ActiveSession> {
        match &mut self.state {
            Startup::Active(session) => Some(session),
            _ => None,
        }
    }

    fn print_status(&self) {
        print!("{}", render::screen(self.state.screen()));
        if let Startup::Active(session) = &self.state {
            print!("{}", render::view(&session.view));
        }
    }

    async fn connect(&mut self) {
        let wallet = match &self.state {
            Startup::AwaitingConnection { wallet, .. } => Some(Arc::clone(wallet)),
            _ => self.wallet.clone(),
        };
        if let Some(wallet) = wallet {
            self.state = self.resolver.connect(wallet).await;
        }
        self.print_status();
    }

    /// Rebuilds the session when the wallet switched account or network, or
    /// stopped answering.
    async fn check_wallet(&mut self) {
        let Some(session) = self.session_mut() else {
            return;
        };
        let change = session.watch.check_or_reload().await;
        if let WalletChange::ReloadRequired(reason) = change {
            println!("{}; reloading.", render::reload_reason(reason));
            self.state = self.resolver.initialize(self.wallet.clone()).await;
            self.print_status();
        }
    }

    async fn run(&mut self, action: Action, terminal: &TerminalPrompter) {
        // Views loaded during activation are only reused by the first command.
        let fresh = self
            .session_mut()
            .is_some_and(|session| session.take_fresh());
        match action {
            Action::Status => self.print_status(),
            Action::Connect => self.connect().await,
            Action::Admin(action) => self.run_admin(action, terminal).await,
            Action::Teacher(action) => self.run_teacher(action, terminal, fresh).await,
            Action::Student => self.run_student(fresh).await,
        }
    }

    async fn run_admin(&mut self, action: AdminAction, terminal: &TerminalPrompter) {
        let Some(session) = self.session_mut() else {
            self.print_status();
            return;
        };
        let ActiveView::Admin(view) = &mut session.view else {
            println!("{}", wrong_role("admin", session.context.role()));
            return;
        };

        let outcome = match action {
            AdminAction::AddTeacher { name, age, address } => {
                view.add_teacher(&TeacherForm { name, age, address }).await
            }
            AdminAction::AddStudent {
                name,
                age,
                semester,
                email,
                branch,
                phone,
                address,
            } => {
                view.add_student(&StudentForm {
                    name,
                    age,
                    semester,
                    email,
                    branch,
                    phone,
                    address,
                })
                .await
            }
            AdminAction::Assign { student, teacher } => {
                view.assign_student(student.map(StudentId), teacher.map(TeacherId))
                    .await
            }
            AdminAction::RemoveStudent { id, yes } => {
                view.remove_student(id.map(StudentId), prompter(yes, terminal))
                    .await
            }
            AdminAction::RemoveTeacher { id, yes } => {
                view.remove_teacher(id.map(TeacherId), prompter(yes, terminal))
                    .await
            }
        };
        println!("{}", render::outcome(&outcome));
        print!("{}", render::admin_view(view));
    }

    async fn run_teacher(
        &mut self,
        action: TeacherAction,
        terminal: &TerminalPrompter,
        fresh: bool,
    ) {
        let Some(session) = self.session_mut() else {
            self.print_status();
            return;
        };
        let ActiveView::Teacher(view) = &mut session.view else {
            println!("{}", wrong_role("teacher", session.context.role()));
            return;
        };

        let outcome = match action {
            TeacherAction::Roster => {
                view.close_course_panel();
                if !fresh {
                    view.load_roster().await;
                }
                None
            }
            TeacherAction::Courses { student } => {
                view.open_course_panel_for(StudentId(student)).await;
                None
            }
            TeacherAction::AddCourse {
                student,
                name,
                scores,
            } => {
                view.open_course_panel_for(StudentId(student)).await;
                Some(view.add_course(&scores.course_form(name)).await)
            }
            TeacherAction::EditCourse {
                student,
                course,
                scores,
                interactive,
            } => {
                view.open_course_panel_for(StudentId(student)).await;
                Some(match scores.course_edit() {
                    Ok(edit) if interactive || edit.is_noop() => {
                        view.edit_course_interactive(&course, terminal).await
                    }
                    Ok(edit) => view.edit_course(&course, &edit).await,
                    Err(err) => ActionOutcome::Invalid(format!("Error updating course: {err}")),
                })
            }
            TeacherAction::RemoveCourse {
                student,
                course,
                yes,
            } => {
                view.open_course_panel_for(StudentId(student)).await;
                Some(view.remove_course(&course, prompter(yes, terminal)).await)
            }
        };
        if let Some(outcome) = outcome {
            println!("{}", render::outcome(&outcome));
        }
        print!("{}", render::teacher_view(view));
    }

    async fn run_student(&mut self, fresh: bool) {
        let Some(session) = self.session_mut() else {
            self.print_status();
            return;
        };
        let ActiveView::Student(view) = &mut session.view else {
            println!("{}", wrong_role("student", session.context.role()));
            return;
        };
        if !fresh {
            view.load().await;
        }
        print!("{}", render::student_view(view));
    }
}

fn prompter(assume_yes: bool, terminal: &TerminalPrompter) -> &dyn Prompter {
    if assume_yes {
        &AssumeYes
    } else {
        terminal
    }
}

fn wrong_role(needed: &str, role: Role) -> String {
    let current = match role {
        Role::Admin => "admin",
        Role::Teacher => "teacher",
        Role::Student => "student",
        Role::Unregistered => "unregistered",
    };
    format!("This command needs the {needed} role; the connected account is {current}.")
}

async fn shell(app: &mut App, terminal: &TerminalPrompter) {
    app.print_status();
    while let Some(line) = terminal.read_line("records> ").await {
        let words = match split_words(&line) {
            Ok(words) => words,
            Err(err) => {
                println!("error: {err}");
                continue;
            }
        };
        match words.first().map(String::as_str) {
            None => continue,
            Some("exit" | "quit") => break,
            Some(_) => {}
        }
        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(err) => {
                let _ = err.print();
                continue;
            }
        };
        app.check_wallet().await;
        app.run(parsed.action, terminal).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(
        &cli.config,
        &Overrides {
            rpc_url: cli.rpc_url,
            gateway_url: cli.gateway_url,
            artifact_path: cli.artifact,
        },
    )?;

    let terminal = TerminalPrompter::new();
    let mut app = App::start(&settings).await;
    match cli.command {
        Command::Shell => shell(&mut app, &terminal).await,
        Command::Action(action) => app.run(action, &terminal).await,
    }

    match &app.state {
        Startup::Failed { error, .. } => Err(anyhow!("session could not be started: {error}")),
        _ => Ok(()),
    }
}
