use std::sync::Arc;

use bytes::Bytes;
use tracker_core::Origin;
use tracker_logging::{tracker_info, tracker_warn};

use crate::{AnalysisBackend, BackendError, FailureKind, JobHandle};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
const OCTET_STREAM: &str = "application/octet-stream";

const NOT_A_PDF_MESSAGE: &str = "Please select a PDF file";
const EMPTY_URL_MESSAGE: &str = "Please enter a document URL";
const NO_JOB_ID_MESSAGE: &str = "Upload failed: no job id returned";
const UNREADABLE_RESPONSE_MESSAGE: &str = "Upload failed: unreadable server response";

/// What the user hands over for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionDescriptor {
    File {
        bytes: Bytes,
        name: String,
        media_type: String,
    },
    UrlReference(String),
}

impl SubmissionDescriptor {
    /// A file whose media type is inferred from its name.
    pub fn file(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let media_type = media_type_for(&name).to_string();
        SubmissionDescriptor::File {
            bytes: bytes.into(),
            name,
            media_type,
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        SubmissionDescriptor::UrlReference(url.into())
    }

    pub fn origin(&self) -> Origin {
        match self {
            SubmissionDescriptor::File { .. } => Origin::Upload,
            SubmissionDescriptor::UrlReference(_) => Origin::Link,
        }
    }

    /// File name or trimmed URL.
    pub fn label(&self) -> String {
        match self {
            SubmissionDescriptor::File { name, .. } => name.clone(),
            SubmissionDescriptor::UrlReference(url) => url.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), SubmissionError> {
        match self {
            SubmissionDescriptor::File { media_type, .. } if media_type != PDF_MEDIA_TYPE => {
                Err(SubmissionError::Validation(NOT_A_PDF_MESSAGE.to_string()))
            }
            SubmissionDescriptor::UrlReference(url) if url.trim().is_empty() => {
                Err(SubmissionError::Validation(EMPTY_URL_MESSAGE.to_string()))
            }
            _ => Ok(()),
        }
    }
}

pub fn media_type_for(name: &str) -> &'static str {
    let is_pdf = name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        PDF_MEDIA_TYPE
    } else {
        OCTET_STREAM
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// Rejected locally; no request was sent.
    #[error("{0}")]
    Validation(String),
    #[error("{}", transport_message(.status, .message))]
    Transport { status: Option<u16>, message: String },
    /// The backend answered but without a usable job id.
    #[error("{0}")]
    Protocol(String),
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Upload failed (HTTP {code})"),
        None => format!("Upload failed: {message}"),
    }
}

impl From<BackendError> for SubmissionError {
    fn from(err: BackendError) -> Self {
        match err.kind {
            FailureKind::HttpStatus(code) => SubmissionError::Transport {
                status: Some(code),
                message: err.message,
            },
            FailureKind::InvalidResponse => {
                tracker_warn!("Unreadable upload response: {}", err.message);
                SubmissionError::Protocol(UNREADABLE_RESPONSE_MESSAGE.to_string())
            }
            FailureKind::InvalidUrl | FailureKind::Timeout | FailureKind::Network => {
                SubmissionError::Transport {
                    status: None,
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Validates descriptors and issues the create-job request. Does not poll.
#[derive(Clone)]
pub struct SubmissionGateway {
    backend: Arc<dyn AnalysisBackend>,
}

impl SubmissionGateway {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    pub async fn submit(
        &self,
        descriptor: &SubmissionDescriptor,
    ) -> Result<JobHandle, SubmissionError> {
        descriptor.validate()?;

        let response = self.backend.create_job(descriptor).await?;
        let job_id = response
            .process_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        match job_id {
            Some(job_id) if response.succeeded() => {
                tracker_info!(
                    "Submission accepted job_id={} source={}",
                    job_id,
                    descriptor.label()
                );
                Ok(JobHandle {
                    job_id: job_id.to_string(),
                    origin: descriptor.origin(),
                    source_label: descriptor.label(),
                })
            }
            _ => {
                let message = response
                    .error
                    .or(response.message)
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| NO_JOB_ID_MESSAGE.to_string());
                Err(SubmissionError::Protocol(message))
            }
        }
    }
}
