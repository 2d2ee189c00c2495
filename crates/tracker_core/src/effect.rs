use crate::{JobId, RecentEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace any running poll session with one for `job_id`.
    StartPolling { job_id: JobId },
    StopPolling,
    RecordHistory(RecentEntry),
    ScheduleHandoff { job_id: JobId, result_id: String },
    Redirect { target: String },
    SurfaceError { message: String },
}
