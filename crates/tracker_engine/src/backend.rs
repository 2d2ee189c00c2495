use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracker_core::RecentEntry;
use url::Url;

use crate::submit::SubmissionDescriptor;
use crate::{BackendError, CreateJobResponse, FailureKind, StatusResponse};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl BackendSettings {
    /// Settings for `base_url` with the default transport timeouts.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP contract of the analysis backend.
#[async_trait::async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// `POST /upload`
    async fn create_job(
        &self,
        descriptor: &SubmissionDescriptor,
    ) -> Result<CreateJobResponse, BackendError>;

    /// `GET /api/status/{job_id}`
    async fn job_status(&self, job_id: &str) -> Result<StatusResponse, BackendError>;

    /// `GET /api/recent`
    async fn recent_analyses(&self) -> Result<Vec<RecentEntry>, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BackendError::new(FailureKind::InvalidUrl, "base url cannot carry a path")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| BackendError::new(FailureKind::InvalidResponse, err.to_string()))
    }
}

#[async_trait::async_trait]
impl AnalysisBackend for ReqwestBackend {
    async fn create_job(
        &self,
        descriptor: &SubmissionDescriptor,
    ) -> Result<CreateJobResponse, BackendError> {
        let form = match descriptor {
            SubmissionDescriptor::File {
                bytes,
                name,
                media_type,
            } => {
                let part = Part::bytes(bytes.to_vec())
                    .file_name(name.clone())
                    .mime_str(media_type)
                    .map_err(map_reqwest_error)?;
                Form::new().part("file", part)
            }
            SubmissionDescriptor::UrlReference(url) => {
                Form::new().text("url", url.trim().to_string())
            }
        };

        let url = self.endpoint(&["upload"])?;
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.read_json(response).await
    }

    async fn job_status(&self, job_id: &str) -> Result<StatusResponse, BackendError> {
        let url = self.endpoint(&["api", "status", job_id])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.read_json(response).await
    }

    async fn recent_analyses(&self) -> Result<Vec<RecentEntry>, BackendError> {
        let url = self.endpoint(&["api", "recent"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.read_json(response).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return BackendError::new(FailureKind::InvalidResponse, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
