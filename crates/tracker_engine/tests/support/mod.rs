#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tracker_core::RecentEntry;
use tracker_engine::{
    AnalysisBackend, BackendError, Clock, CreateJobResponse, FailureKind, StatusResponse,
    SubmissionDescriptor,
};

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(tracker_logging::initialize_for_tests);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Status(String),
    Recent,
}

/// Backend answering from per-endpoint scripts and logging every call.
///
/// A status script repeats its last response once the queue is down to one.
/// Status answers can be held back by a fixed latency.
#[derive(Default)]
pub struct ScriptedBackend {
    creates: Mutex<VecDeque<Result<CreateJobResponse, BackendError>>>,
    statuses: Mutex<HashMap<String, VecDeque<Result<StatusResponse, BackendError>>>>,
    status_latency: Mutex<Duration>,
    recent: Mutex<Option<Result<Vec<RecentEntry>, BackendError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accept(&self, job_id: &str) {
        self.creates.lock().unwrap().push_back(Ok(accepted(job_id)));
    }

    pub fn script_create(&self, response: Result<CreateJobResponse, BackendError>) {
        self.creates.lock().unwrap().push_back(response);
    }

    pub fn script_status(&self, job_id: &str, response: Result<StatusResponse, BackendError>) {
        self.statuses
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn set_status_latency(&self, latency: Duration) {
        *self.status_latency.lock().unwrap() = latency;
    }

    pub fn script_recent(&self, response: Result<Vec<RecentEntry>, BackendError>) {
        *self.recent.lock().unwrap() = Some(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn status_calls(&self, job_id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Status(id) if id == job_id))
            .count()
    }
}

#[async_trait::async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn create_job(
        &self,
        descriptor: &SubmissionDescriptor,
    ) -> Result<CreateJobResponse, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Create(descriptor.label()));
        self.creates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("create")))
    }

    async fn job_status(&self, job_id: &str) -> Result<StatusResponse, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Status(job_id.to_string()));
        let latency = *self.status_latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut statuses = self.statuses.lock().unwrap();
        let Some(queue) = statuses.get_mut(job_id) else {
            return Err(unscripted("status"));
        };
        match queue.len() {
            0 => Err(unscripted("status")),
            1 => queue[0].clone(),
            _ => queue.pop_front().unwrap_or_else(|| Err(unscripted("status"))),
        }
    }

    async fn recent_analyses(&self) -> Result<Vec<RecentEntry>, BackendError> {
        self.calls.lock().unwrap().push(Call::Recent);
        self.recent
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(unscripted("recent")))
    }
}

fn unscripted(endpoint: &str) -> BackendError {
    BackendError::new(FailureKind::Network, format!("no scripted {endpoint} response"))
}

pub fn network_error() -> BackendError {
    BackendError::new(FailureKind::Network, "connection refused")
}

pub fn accepted(job_id: &str) -> CreateJobResponse {
    CreateJobResponse {
        success: serde_json::Value::Bool(true),
        process_id: Some(job_id.to_string()),
        ..Default::default()
    }
}

pub fn processing(progress: f64, message: &str) -> StatusResponse {
    StatusResponse {
        status: "processing".to_string(),
        progress: Some(progress),
        message: Some(message.to_string()),
        ..Default::default()
    }
}

pub fn completed(document_id: &str) -> StatusResponse {
    StatusResponse {
        status: "completed".to_string(),
        progress: Some(100.0),
        document_id: Some(document_id.to_string()),
        ..Default::default()
    }
}

pub fn failed(error: &str) -> StatusResponse {
    StatusResponse {
        status: "failed".to_string(),
        error: Some(error.to_string()),
        ..Default::default()
    }
}

pub fn pdf() -> SubmissionDescriptor {
    SubmissionDescriptor::file("report.pdf", b"%PDF-1.7".to_vec())
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn entry(id: &str, title: &str) -> RecentEntry {
    RecentEntry {
        id: id.to_string(),
        title: title.to_string(),
        category: "Uploaded report".to_string(),
        metrics_summary: "Analysis complete".to_string(),
        timestamp: fixed_time(),
    }
}
