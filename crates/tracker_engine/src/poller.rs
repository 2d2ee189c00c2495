use std::sync::Arc;
use std::time::Duration;

use tracker_core::{JobId, StatusReport};
use tracker_logging::{tracker_debug, tracker_warn};

use crate::schedule::{schedule_every, CancelHandle};
use crate::AnalysisBackend;

pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Receives well-formed status reports from the poller.
pub trait StatusSink: Send + Sync {
    fn deliver(&self, job_id: &str, report: StatusReport);
}

/// The live timer loop fetching one job's status.
#[derive(Debug)]
pub struct PollingSession {
    job_id: JobId,
    timer: CancelHandle,
}

impl PollingSession {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn is_active(&self) -> bool {
        !self.timer.is_cancelled()
    }
}

/// Owns at most one [`PollingSession`].
pub struct JobPoller {
    backend: Arc<dyn AnalysisBackend>,
    sink: Arc<dyn StatusSink>,
    interval: Duration,
    session: Option<PollingSession>,
}

impl JobPoller {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        sink: Arc<dyn StatusSink>,
        interval: Duration,
    ) -> Self {
        Self {
            backend,
            sink,
            interval,
            session: None,
        }
    }

    /// Cancels any running session, then fetches `job_id` now and on every tick.
    pub fn start(&mut self, job_id: &str) {
        self.stop();

        let backend = self.backend.clone();
        let sink = self.sink.clone();
        let owned_id = job_id.to_string();
        let timer = schedule_every(self.interval, move |signal| {
            let backend = backend.clone();
            let sink = sink.clone();
            let job_id = owned_id.clone();
            async move {
                match backend.job_status(&job_id).await {
                    Ok(response) if signal.is_cancelled() => {
                        tracker_debug!(
                            "Dropping status for stopped session job_id={} status={}",
                            job_id,
                            response.status
                        );
                    }
                    Ok(response) => sink.deliver(&job_id, response.into_report()),
                    // Treated as transient; the next tick retries.
                    Err(err) => tracker_warn!("Status poll failed job_id={}: {}", job_id, err),
                }
            }
        });

        tracker_debug!("Polling started job_id={} interval={:?}", job_id, self.interval);
        self.session = Some(PollingSession {
            job_id: job_id.to_string(),
            timer,
        });
    }

    /// Cancels the running session. No-op when idle.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            session.timer.cancel();
            tracker_debug!("Polling stopped job_id={}", session.job_id);
        }
    }

    pub fn session(&self) -> Option<&PollingSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(PollingSession::is_active)
    }
}
