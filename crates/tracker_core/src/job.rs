use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

pub type JobId = String;

/// Lower bound for the progress value shown while a job is being processed.
pub const PROGRESS_FLOOR: u8 = 10;
pub const PROGRESS_DONE: u8 = 100;

pub const SUBMITTED_MESSAGE: &str = "Waiting for analysis to start...";
pub const PROCESSING_FALLBACK_MESSAGE: &str = "Processing...";
pub const FAILED_FALLBACK_MESSAGE: &str = "Processing failed";
pub const MISSING_RESULT_MESSAGE: &str = "Analysis completed without a result identifier";
pub const COMPLETED_FALLBACK_SUMMARY: &str = "Analysis complete";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Submitted,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// How the analysed document reached the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Upload,
    Link,
}

impl Origin {
    /// Category recorded in the history for jobs of this origin.
    pub fn category(self) -> &'static str {
        match self {
            Origin::Upload => "Uploaded report",
            Origin::Link => "Linked report",
        }
    }
}

/// State tag of a status report. Only the exact lowercase `completed` and
/// `failed` tags end a job; every other tag counts as processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTag {
    #[default]
    Processing,
    Completed,
    Failed,
}

impl StatusTag {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "completed" => StatusTag::Completed,
            "failed" => StatusTag::Failed,
            _ => StatusTag::Processing,
        }
    }
}

/// One well-formed answer from the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReport {
    pub status: StatusTag,
    pub progress: Option<i64>,
    pub message: Option<String>,
    pub document_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub state: JobState,
    pub progress: u8,
    pub message: String,
    pub result_id: Option<String>,
    pub origin: Origin,
    pub source_label: String,
}

impl Job {
    pub(crate) fn submitted(id: JobId, origin: Origin, source_label: String) -> Self {
        Self {
            id,
            state: JobState::Submitted,
            progress: 0,
            message: SUBMITTED_MESSAGE.to_string(),
            result_id: None,
            origin,
            source_label,
        }
    }
}

/// Progress shown to the user: at least [`PROGRESS_FLOOR`], at most 100.
/// A missing value counts as 0.
pub fn display_progress(raw: Option<i64>) -> u8 {
    let clamped = raw
        .unwrap_or(0)
        .clamp(i64::from(PROGRESS_FLOOR), i64::from(PROGRESS_DONE));
    // In range after the clamp.
    clamped as u8
}

/// Escaped in a document id so it stays a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Whether `document_id` can name a results page. Dot-only ids would
/// resolve as relative path steps.
pub fn is_usable_result_id(document_id: &str) -> bool {
    !document_id.is_empty() && !document_id.chars().all(|c| c == '.')
}

/// Path of the results view for a finished document, with the id encoded
/// as one path segment.
pub fn results_path(document_id: &str) -> String {
    format!("/results/{}", utf8_percent_encode(document_id, SEGMENT))
}
