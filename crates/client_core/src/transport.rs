//! JSON-RPC over HTTP. The wallet side uses the standard `eth_accounts`,
//! `eth_requestAccounts` and `net_version` methods; contract methods go through
//! a gateway that exposes `contract_call` for reads and `contract_send` for
//! submissions.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use shared::{
    domain::{Address, CourseRecord, Role, StudentId, StudentInfo, TeacherId, TeacherInfo},
    error::ContractError,
    protocol::{
        encode_score, ContractCallParams, ContractMethod, RawCourseListing, RawStudentInfo,
        RawTeacherInfo, RpcRequest, RpcResponse, Uint, CONTRACT_CALL_METHOD,
        CONTRACT_SEND_METHOD,
    },
    validation::{NewStudent, NewTeacher},
};
use tracing::debug;
use url::Url;

use crate::{
    contract::{ContractFactory, ContractService},
    wallet::WalletProvider,
};

pub struct JsonRpcClient {
    http: Client,
    endpoint: Url,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one request. A JSON-RPC error object becomes a
    /// [`ContractError`] carrying the remote message unchanged, even when it
    /// arrives with a non-success HTTP status.
    pub async fn request<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        let http_response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|err| ContractError::transport(err.to_string()))?;
        let status = http_response.status();
        let body = http_response
            .bytes()
            .await
            .map_err(|err| ContractError::transport(err.to_string()))?;
        let parsed = serde_json::from_slice::<RpcResponse>(&body);

        if let Ok(RpcResponse {
            error: Some(error), ..
        }) = parsed
        {
            debug!(method, code = error.code, %status, "rpc error response");
            return Err(ContractError::rejected(error.message).into());
        }
        if !status.is_success() {
            return Err(ContractError::transport(format!("{method} failed with HTTP {status}")).into());
        }
        let response = parsed
            .map_err(|err| ContractError::decode(format!("invalid {method} response: {err}")))?;
        let result = response.result.unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(|err| {
            anyhow::Error::from(ContractError::decode(format!(
                "unexpected {method} result: {err}"
            )))
        })
    }
}

fn parse_accounts(raw: Vec<String>) -> Result<Vec<Address>> {
    raw.iter()
        .map(|value| {
            Address::parse(value).map_err(|err| {
                anyhow::Error::from(ContractError::decode(format!("wallet returned {err}")))
            })
        })
        .collect()
}

pub struct RpcWallet {
    rpc: Arc<JsonRpcClient>,
}

impl RpcWallet {
    pub fn new(rpc: Arc<JsonRpcClient>) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn accounts(&self) -> Result<Vec<Address>> {
        let raw: Vec<String> = self.rpc.request("eth_accounts", Vec::<Value>::new()).await?;
        parse_accounts(raw)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let raw: Vec<String> = self
            .rpc
            .request("eth_requestAccounts", Vec::<Value>::new())
            .await?;
        parse_accounts(raw)
    }

    async fn network_id(&self) -> Result<u64> {
        let id: Uint = self.rpc.request("net_version", Vec::<Value>::new()).await?;
        Ok(id.0)
    }
}

/// Contract handle bound to one deployment and one calling account.
pub struct RpcContract {
    rpc: Arc<JsonRpcClient>,
    contract: Address,
    account: Address,
}

impl RpcContract {
    pub fn new(rpc: Arc<JsonRpcClient>, contract: Address, account: Address) -> Self {
        Self {
            rpc,
            contract,
            account,
        }
    }

    async fn invoke<R: DeserializeOwned>(
        &self,
        method: ContractMethod,
        args: Vec<Value>,
    ) -> Result<R> {
        let rpc_method = if method.is_mutation() {
            CONTRACT_SEND_METHOD
        } else {
            CONTRACT_CALL_METHOD
        };
        debug!(method = method.name(), rpc_method, "contract request");
        self.rpc
            .request(
                rpc_method,
                [ContractCallParams {
                    to: self.contract.clone(),
                    from: self.account.clone(),
                    method: method.name().to_string(),
                    args,
                }],
            )
            .await
    }

    async fn submit(&self, method: ContractMethod, args: Vec<Value>) -> Result<()> {
        let _receipt: Value = self.invoke(method, args).await?;
        Ok(())
    }

    async fn ids(&self, method: ContractMethod) -> Result<Vec<u64>> {
        let ids: Vec<Uint> = self.invoke(method, Vec::new()).await?;
        Ok(ids.into_iter().map(|id| id.0).collect())
    }

    async fn courses(&self, method: ContractMethod, args: Vec<Value>) -> Result<Vec<CourseRecord>> {
        let listing: RawCourseListing = self.invoke(method, args).await?;
        Ok(listing.into_records()?)
    }
}

fn course_args(student_id: StudentId, course: &CourseRecord) -> Vec<Value> {
    let scores = &course.scores;
    vec![
        json!(student_id.0),
        json!(course.name),
        json!(encode_score(scores.cie1)),
        json!(encode_score(scores.cie2)),
        json!(encode_score(scores.cie3)),
        json!(encode_score(scores.aat)),
        json!(encode_score(scores.lab)),
        json!(encode_score(scores.attendance)),
    ]
}

#[async_trait]
impl ContractService for RpcContract {
    async fn get_my_role(&self) -> Result<Role> {
        let raw: String = self.invoke(ContractMethod::GetMyRole, Vec::new()).await?;
        Ok(Role::from_contract(&raw))
    }

    async fn get_teacher_info(&self, teacher_id: Option<TeacherId>) -> Result<TeacherInfo> {
        let args = teacher_id.map(|id| vec![json!(id.0)]).unwrap_or_default();
        let raw: RawTeacherInfo = self.invoke(ContractMethod::GetTeacherInfo, args).await?;
        Ok(raw.into_domain()?)
    }

    async fn get_my_id(&self) -> Result<StudentId> {
        let id: Uint = self.invoke(ContractMethod::GetMyId, Vec::new()).await?;
        Ok(StudentId(id.0))
    }

    async fn get_student_info(&self, student_id: StudentId) -> Result<StudentInfo> {
        let raw: RawStudentInfo = self
            .invoke(ContractMethod::GetStudentInfo, vec![json!(student_id.0)])
            .await?;
        Ok(raw.into_domain()?)
    }

    async fn get_my_info(&self) -> Result<StudentInfo> {
        let raw: RawStudentInfo = self.invoke(ContractMethod::GetMyInfo, Vec::new()).await?;
        Ok(raw.into_domain()?)
    }

    async fn get_all_teachers(&self) -> Result<Vec<TeacherId>> {
        let ids = self.ids(ContractMethod::GetAllTeachers).await?;
        Ok(ids.into_iter().map(TeacherId).collect())
    }

    async fn get_all_students(&self) -> Result<Vec<StudentId>> {
        let ids = self.ids(ContractMethod::GetAllStudents).await?;
        Ok(ids.into_iter().map(StudentId).collect())
    }

    async fn add_teacher(&self, teacher: &NewTeacher) -> Result<()> {
        self.submit(
            ContractMethod::AddTeacher,
            vec![
                json!(teacher.name),
                json!(teacher.age),
                json!(teacher.address.as_str()),
            ],
        )
        .await
    }

    async fn add_student(&self, student: &NewStudent) -> Result<()> {
        self.submit(
            ContractMethod::AddStudent,
            vec![
                json!(student.name),
                json!(student.age),
                json!(student.semester),
                json!(student.email),
                json!(student.branch),
                json!(student.phone),
                json!(student.address.as_str()),
            ],
        )
        .await
    }

    async fn assign_student_to_teacher(
        &self,
        student_id: StudentId,
        teacher_id: TeacherId,
    ) -> Result<()> {
        self.submit(
            ContractMethod::AssignStudentToTeacher,
            vec![json!(student_id.0), json!(teacher_id.0)],
        )
        .await
    }

    async fn remove_student(&self, student_id: StudentId) -> Result<()> {
        self.submit(ContractMethod::RemoveStudent, vec![json!(student_id.0)])
            .await
    }

    async fn remove_teacher(&self, teacher_id: TeacherId) -> Result<()> {
        self.submit(ContractMethod::RemoveTeacher, vec![json!(teacher_id.0)])
            .await
    }

    async fn get_my_students(&self) -> Result<Vec<StudentId>> {
        let ids = self.ids(ContractMethod::GetMyStudents).await?;
        Ok(ids.into_iter().map(StudentId).collect())
    }

    async fn get_student_courses_added_by_me(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<CourseRecord>> {
        self.courses(
            ContractMethod::GetStudentCoursesAddedByMe,
            vec![json!(student_id.0)],
        )
        .await
    }

    async fn get_my_courses(&self) -> Result<Vec<CourseRecord>> {
        self.courses(ContractMethod::GetMyCourses, Vec::new()).await
    }

    async fn add_course_to_student(
        &self,
        student_id: StudentId,
        course: &CourseRecord,
    ) -> Result<()> {
        self.submit(
            ContractMethod::AddCourseToStudent,
            course_args(student_id, course),
        )
        .await
    }

    async fn update_course(&self, student_id: StudentId, course: &CourseRecord) -> Result<()> {
        self.submit(ContractMethod::UpdateCourse, course_args(student_id, course))
            .await
    }

    async fn remove_course(&self, student_id: StudentId, course_name: &str) -> Result<()> {
        self.submit(
            ContractMethod::RemoveCourse,
            vec![json!(student_id.0), json!(course_name)],
        )
        .await
    }
}

pub struct RpcContractFactory {
    rpc: Arc<JsonRpcClient>,
}

impl RpcContractFactory {
    pub fn new(rpc: Arc<JsonRpcClient>) -> Self {
        Self { rpc }
    }
}

impl ContractFactory for RpcContractFactory {
    fn connect(&self, contract: &Address, account: &Address) -> Result<Arc<dyn ContractService>> {
        Ok(Arc::new(RpcContract::new(
            Arc::clone(&self.rpc),
            contract.clone(),
            account.clone(),
        )))
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
