use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use shared::{
    domain::{
        Address, CourseRecord, CourseScores, Role, Score, StudentId, StudentInfo, TeacherId,
        TeacherInfo,
    },
    protocol::ContractMethod,
    validation::{NewStudent, NewTeacher},
};

use crate::{
    artifact::ContractArtifact,
    contract::{ContractFactory, ContractService},
    prompt::Prompter,
    session::SessionContext,
    wallet::WalletProvider,
};

pub fn addr(n: u8) -> Address {
    Address::parse(&format!("0x{n:040x}")).expect("address")
}

pub fn score(value: u32) -> Score {
    Score::new(value).expect("score")
}

pub fn scores(values: [Option<u32>; 6]) -> CourseScores {
    let [cie1, cie2, cie3, aat, lab, attendance] = values.map(|v| v.map(score));
    CourseScores {
        cie1,
        cie2,
        cie3,
        aat,
        lab,
        attendance,
    }
}

pub fn course(name: &str, values: [Option<u32>; 6]) -> CourseRecord {
    CourseRecord {
        name: name.to_string(),
        scores: scores(values),
    }
}

pub fn teacher_info(name: &str, n: u8) -> TeacherInfo {
    TeacherInfo {
        name: name.to_string(),
        age: 40,
        address: addr(n),
    }
}

pub fn student_info(name: &str, n: u8) -> StudentInfo {
    StudentInfo {
        name: name.to_string(),
        age: 20,
        semester: 3,
        email: format!("{}@example.edu", name.to_ascii_lowercase()),
        branch: "CSE".to_string(),
        phone: "555-0100".to_string(),
        enrolled_at: Utc
            .with_ymd_and_hms(2024, 8, 1, 9, 30, 0)
            .single()
            .expect("timestamp"),
        address: addr(n),
    }
}

/// Artifact declaring every client method, deployed at `addr(0xC0)` on `network_id`.
pub fn artifact_for(network_id: u64) -> ContractArtifact {
    let abi: Vec<_> = ContractMethod::ALL
        .iter()
        .map(|m| json!({ "type": "function", "name": m.name() }))
        .collect();
    let raw = json!({
        "contractName": "StudentTeacherManagement",
        "abi": abi,
        "networks": { network_id.to_string(): { "address": addr(0xC0).as_str() } }
    });
    ContractArtifact::from_json(&raw.to_string()).expect("artifact")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    AddTeacher(NewTeacher),
    AddStudent(NewStudent),
    Assign {
        student_id: StudentId,
        teacher_id: TeacherId,
    },
    RemoveStudent(StudentId),
    RemoveTeacher(TeacherId),
    AddCourse {
        student_id: StudentId,
        course: CourseRecord,
    },
    UpdateCourse {
        student_id: StudentId,
        course: CourseRecord,
    },
    RemoveCourse {
        student_id: StudentId,
        name: String,
    },
}

#[derive(Default)]
pub struct ContractState {
    pub role: String,
    pub my_id: Option<StudentId>,
    pub my_teacher_info: Option<TeacherInfo>,
    pub my_info: Option<StudentInfo>,
    pub teachers: Vec<(TeacherId, TeacherInfo)>,
    pub students: Vec<(StudentId, StudentInfo)>,
    pub my_students: Vec<StudentId>,
    pub courses_by_me: HashMap<StudentId, Vec<CourseRecord>>,
    pub my_courses: Vec<CourseRecord>,
    /// Method name → error message returned instead of a result.
    pub failing: HashMap<&'static str, String>,
    pub reads: Vec<&'static str>,
    pub submissions: Vec<Submission>,
}

/// In-memory contract that records every read and submission.
pub struct FakeContract {
    state: Mutex<ContractState>,
}

impl FakeContract {
    pub fn new(state: ContractState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
        })
    }

    pub fn fail(&self, method: ContractMethod, message: &str) {
        self.state
            .lock()
            .expect("state")
            .failing
            .insert(method.name(), message.to_string());
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().expect("state").submissions.clone()
    }

    pub fn read_count(&self, method: ContractMethod) -> usize {
        self.state
            .lock()
            .expect("state")
            .reads
            .iter()
            .filter(|name| **name == method.name())
            .count()
    }

    pub fn context(self: &Arc<Self>, role: Role) -> SessionContext {
        SessionContext::new(addr(0xAA), role, Arc::clone(self) as Arc<dyn ContractService>)
    }

    fn read<T>(
        &self,
        method: ContractMethod,
        f: impl FnOnce(&ContractState) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.lock().expect("state");
        state.reads.push(method.name());
        if let Some(message) = state.failing.get(method.name()) {
            return Err(anyhow!(message.clone()));
        }
        f(&state)
    }

    fn submit(
        &self,
        method: ContractMethod,
        submission: Submission,
        apply: impl FnOnce(&mut ContractState),
    ) -> Result<()> {
        let mut state = self.state.lock().expect("state");
        state.submissions.push(submission);
        if let Some(message) = state.failing.get(method.name()) {
            return Err(anyhow!(message.clone()));
        }
        apply(&mut state);
        Ok(())
    }
}

#[async_trait]
impl ContractService for FakeContract {
    async fn get_my_role(&self) -> Result<Role> {
        self.read(ContractMethod::GetMyRole, |s| Ok(Role::from_contract(&s.role)))
    }

    async fn get_teacher_info(&self, teacher_id: Option<TeacherId>) -> Result<TeacherInfo> {
        self.read(ContractMethod::GetTeacherInfo, |s| match teacher_id {
            None => s
                .my_teacher_info
                .clone()
                .ok_or_else(|| anyhow!("caller is not a teacher")),
            Some(id) => s
                .teachers
                .iter()
                .find(|(tid, _)| *tid == id)
                .map(|(_, info)| info.clone())
                .ok_or_else(|| anyhow!("teacher {id} not found")),
        })
    }

    async fn get_my_id(&self) -> Result<StudentId> {
        self.read(ContractMethod::GetMyId, |s| {
            s.my_id.ok_or_else(|| anyhow!("caller is not a student"))
        })
    }

    async fn get_student_info(&self, student_id: StudentId) -> Result<StudentInfo> {
        self.read(ContractMethod::GetStudentInfo, |s| {
            s.students
                .iter()
                .find(|(sid, _)| *sid == student_id)
                .map(|(_, info)| info.clone())
                .ok_or_else(|| anyhow!("student {student_id} not found"))
        })
    }

    async fn get_my_info(&self) -> Result<StudentInfo> {
        self.read(ContractMethod::GetMyInfo, |s| {
            s.my_info
                .clone()
                .ok_or_else(|| anyhow!("caller is not a student"))
        })
    }

    async fn get_all_teachers(&self) -> Result<Vec<TeacherId>> {
        self.read(ContractMethod::GetAllTeachers, |s| {
            Ok(s.teachers.iter().map(|(id, _)| *id).collect())
        })
    }

    async fn get_all_students(&self) -> Result<Vec<StudentId>> {
        self.read(ContractMethod::GetAllStudents, |s| {
            Ok(s.students.iter().map(|(id, _)| *id).collect())
        })
    }

    async fn add_teacher(&self, teacher: &NewTeacher) -> Result<()> {
        let teacher = teacher.clone();
        self.submit(
            ContractMethod::AddTeacher,
            Submission::AddTeacher(teacher.clone()),
            |s| {
                let id = TeacherId(s.teachers.len() as u64 + 1);
                s.teachers.push((
                    id,
                    TeacherInfo {
                        name: teacher.name,
                        age: teacher.age,
                        address: teacher.address,
                    },
                ));
            },
        )
    }

    async fn add_student(&self, student: &NewStudent) -> Result<()> {
        let student = student.clone();
        self.submit(
            ContractMethod::AddStudent,
            Submission::AddStudent(student.clone()),
            |s| {
                let id = StudentId(s.students.len() as u64 + 1);
                s.students.push((
                    id,
                    StudentInfo {
                        name: student.name,
                        age: student.age,
                        semester: student.semester,
                        email: student.email,
                        branch: student.branch,
                        phone: student.phone,
                        enrolled_at: Utc::now(),
                        address: student.address,
                    },
                ));
            },
        )
    }

    async fn assign_student_to_teacher(
        &self,
        student_id: StudentId,
        teacher_id: TeacherId,
    ) -> Result<()> {
        self.submit(
            ContractMethod::AssignStudentToTeacher,
            Submission::Assign {
                student_id,
                teacher_id,
            },
            |_| {},
        )
    }

    async fn remove_student(&self, student_id: StudentId) -> Result<()> {
        self.submit(
            ContractMethod::RemoveStudent,
            Submission::RemoveStudent(student_id),
            |s| s.students.retain(|(id, _)| *id != student_id),
        )
    }

    async fn remove_teacher(&self, teacher_id: TeacherId) -> Result<()> {
        self.submit(
            ContractMethod::RemoveTeacher,
            Submission::RemoveTeacher(teacher_id),
            |s| s.teachers.retain(|(id, _)| *id != teacher_id),
        )
    }

    async fn get_my_students(&self) -> Result<Vec<StudentId>> {
        self.read(ContractMethod::GetMyStudents, |s| Ok(s.my_students.clone()))
    }

    async fn get_student_courses_added_by_me(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<CourseRecord>> {
        self.read(ContractMethod::GetStudentCoursesAddedByMe, |s| {
            Ok(s.courses_by_me.get(&student_id).cloned().unwrap_or_default())
        })
    }

    async fn get_my_courses(&self) -> Result<Vec<CourseRecord>> {
        self.read(ContractMethod::GetMyCourses, |s| Ok(s.my_courses.clone()))
    }

    async fn add_course_to_student(
        &self,
        student_id: StudentId,
        course: &CourseRecord,
    ) -> Result<()> {
        let course = course.clone();
        self.submit(
            ContractMethod::AddCourseToStudent,
            Submission::AddCourse {
                student_id,
                course: course.clone(),
            },
            |s| s.courses_by_me.entry(student_id).or_default().push(course),
        )
    }

    async fn update_course(&self, student_id: StudentId, course: &CourseRecord) -> Result<()> {
        let course = course.clone();
        self.submit(
            ContractMethod::UpdateCourse,
            Submission::UpdateCourse {
                student_id,
                course: course.clone(),
            },
            |s| {
                if let Some(existing) = s
                    .courses_by_me
                    .entry(student_id)
                    .or_default()
                    .iter_mut()
                    .find(|c| c.name == course.name)
                {
                    *existing = course;
                }
            },
        )
    }

    async fn remove_course(&self, student_id: StudentId, course_name: &str) -> Result<()> {
        let name = course_name.to_string();
        self.submit(
            ContractMethod::RemoveCourse,
            Submission::RemoveCourse {
                student_id,
                name: name.clone(),
            },
            |s| {
                s.courses_by_me
                    .entry(student_id)
                    .or_default()
                    .retain(|c| c.name != name)
            },
        )
    }
}

pub struct FakeFactory {
    pub contract: Arc<FakeContract>,
    pub bound: Mutex<Vec<(Address, Address)>>,
}

impl FakeFactory {
    pub fn new(contract: Arc<FakeContract>) -> Arc<Self> {
        Arc::new(Self {
            contract,
            bound: Mutex::new(Vec::new()),
        })
    }
}

impl ContractFactory for FakeFactory {
    fn connect(&self, contract: &Address, account: &Address) -> Result<Arc<dyn ContractService>> {
        self.bound
            .lock()
            .expect("bound")
            .push((contract.clone(), account.clone()));
        Ok(Arc::clone(&self.contract) as Arc<dyn ContractService>)
    }
}

pub struct FakeWallet {
    pub accounts: Mutex<Vec<Address>>,
    pub network_id: Mutex<u64>,
    /// `Err` simulates the user rejecting the access request.
    pub grant: std::result::Result<Vec<Address>, String>,
    /// When set, account and network lookups fail with this message.
    pub offline: Mutex<Option<String>>,
}

impl FakeWallet {
    pub fn connected(account: Address, network_id: u64) -> Arc<Self> {
        Arc::new(Self {
            accounts: Mutex::new(vec![account.clone()]),
            network_id: Mutex::new(network_id),
            grant: Ok(vec![account]),
            offline: Mutex::new(None),
        })
    }

    pub fn locked(grant: std::result::Result<Vec<Address>, String>, network_id: u64) -> Arc<Self> {
        Arc::new(Self {
            accounts: Mutex::new(Vec::new()),
            network_id: Mutex::new(network_id),
            grant,
            offline: Mutex::new(None),
        })
    }

    pub fn switch_account(&self, accounts: Vec<Address>) {
        *self.accounts.lock().expect("accounts") = accounts;
    }

    pub fn switch_network(&self, network_id: u64) {
        *self.network_id.lock().expect("network") = network_id;
    }

    pub fn go_offline(&self, message: &str) {
        *self.offline.lock().expect("offline") = Some(message.to_string());
    }

    fn reachable(&self) -> Result<()> {
        match self.offline.lock().expect("offline").as_ref() {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn accounts(&self) -> Result<Vec<Address>> {
        self.reachable()?;
        Ok(self.accounts.lock().expect("accounts").clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.grant.clone().map_err(|message| anyhow!(message))
    }

    async fn network_id(&self) -> Result<u64> {
        self.reachable()?;
        Ok(*self.network_id.lock().expect("network"))
    }
}

/// Answers confirmations and prompts from queues. An exhausted queue declines
/// or cancels.
#[derive(Default)]
pub struct ScriptedPrompter {
    confirms: Mutex<VecDeque<bool>>,
    answers: Mutex<VecDeque<Option<String>>>,
    pub asked: Mutex<Vec<(String, String)>>,
}

impl ScriptedPrompter {
    pub fn confirming(answer: bool) -> Self {
        let prompter = Self::default();
        prompter.confirms.lock().expect("confirms").push_back(answer);
        prompter
    }

    pub fn answering(answers: Vec<Option<&str>>) -> Self {
        let prompter = Self::default();
        *prompter.answers.lock().expect("answers") = answers
            .into_iter()
            .map(|a| a.map(str::to_string))
            .collect();
        prompter
    }

    pub fn asked(&self) -> Vec<(String, String)> {
        self.asked.lock().expect("asked").clone()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn confirm(&self, message: &str) -> bool {
        self.asked
            .lock()
            .expect("asked")
            .push((message.to_string(), String::new()));
        self.confirms
            .lock()
            .expect("confirms")
            .pop_front()
            .unwrap_or(false)
    }

    async fn prompt(&self, message: &str, default: &str) -> Option<String> {
        self.asked
            .lock()
            .expect("asked")
            .push((message.to_string(), default.to_string()));
        self.answers
            .lock()
            .expect("answers")
            .pop_front()
            .flatten()
    }
}
