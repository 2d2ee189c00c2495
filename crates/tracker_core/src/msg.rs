use chrono::{DateTime, Utc};

use crate::{JobId, Origin, StatusReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The backend accepted a submission and assigned it a job id.
    SubmissionAccepted {
        job_id: JobId,
        origin: Origin,
        source_label: String,
    },
    /// The submission failed validation, transport, or protocol checks.
    SubmissionRejected { message: String },
    /// A status poll returned a well-formed report.
    StatusReceived {
        job_id: JobId,
        report: StatusReport,
        observed_at: DateTime<Utc>,
    },
    /// The post-completion delay elapsed.
    HandoffElapsed { job_id: JobId },
    /// User abandoned the current job.
    CancelRequested,
}
