use crate::{JobId, JobState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub job: Option<JobView>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobView {
    pub job_id: JobId,
    pub state: JobState,
    pub progress: u8,
    pub message: String,
    pub result_id: Option<String>,
    pub source_label: String,
}
