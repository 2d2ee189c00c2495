use chrono::{DateTime, Utc};

use crate::job::{
    display_progress, Job, JobId, JobState, Origin, StatusReport, COMPLETED_FALLBACK_SUMMARY,
    PROCESSING_FALLBACK_MESSAGE, PROGRESS_DONE,
};
use crate::view_model::{AppViewModel, JobView};
use crate::RecentEntry;

/// Controller state: at most one tracked job plus the last surfaced error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    job: Option<Job>,
    last_error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            job: self.job.as_ref().map(|job| JobView {
                job_id: job.id.clone(),
                state: job.state,
                progress: job.progress,
                message: job.message.clone(),
                result_id: job.result_id.clone(),
                source_label: job.source_label.clone(),
            }),
            last_error: self.last_error.clone(),
        }
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job.as_ref().map(|job| job.id.as_str())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns whether the state changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// The tracked job, if `job_id` names it.
    pub(crate) fn current(&self, job_id: &str) -> Option<&Job> {
        self.job.as_ref().filter(|job| job.id == job_id)
    }

    pub(crate) fn begin_job(&mut self, job_id: JobId, origin: Origin, source_label: String) {
        self.job = Some(Job::submitted(job_id, origin, source_label));
        self.last_error = None;
        self.dirty = true;
    }

    pub(crate) fn apply_processing(&mut self, report: &StatusReport) {
        if let Some(job) = self.job.as_mut() {
            job.state = JobState::Processing;
            job.progress = display_progress(report.progress);
            job.message = report
                .message
                .clone()
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| PROCESSING_FALLBACK_MESSAGE.to_string());
            self.dirty = true;
        }
    }

    /// Marks the job completed and returns the history entry describing it.
    pub(crate) fn complete(
        &mut self,
        result_id: &str,
        report: &StatusReport,
        observed_at: DateTime<Utc>,
    ) -> Option<RecentEntry> {
        let job = self.job.as_mut()?;
        job.state = JobState::Completed;
        job.progress = PROGRESS_DONE;
        job.result_id = Some(result_id.to_string());
        job.message = report
            .message
            .clone()
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| COMPLETED_FALLBACK_SUMMARY.to_string());
        self.dirty = true;

        Some(RecentEntry {
            id: result_id.to_string(),
            title: job.source_label.clone(),
            category: job.origin.category().to_string(),
            metrics_summary: job.message.clone(),
            timestamp: observed_at,
        })
    }

    /// Drops the job and remembers `message` as the error to show.
    pub(crate) fn fail(&mut self, message: String) {
        self.job = None;
        self.last_error = Some(message);
        self.dirty = true;
    }

    /// Drops the job after a redirect or an explicit cancel.
    pub(crate) fn clear_job(&mut self) {
        if self.job.take().is_some() {
            self.dirty = true;
        }
    }
}
