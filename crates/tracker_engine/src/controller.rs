use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracker_core::{
    update, AppState, AppViewModel, Effect, JobId, JobView, Msg, RecentEntry, StatusReport,
};
use tracker_logging::{tracker_debug, tracker_error, tracker_info, tracker_warn};

use crate::history::RecentHistoryStore;
use crate::persist::KeyValueStore;
use crate::poller::{JobPoller, StatusSink, POLL_INTERVAL};
use crate::schedule::{schedule_once, CancelHandle};
use crate::submit::{SubmissionDescriptor, SubmissionError, SubmissionGateway};
use crate::{AnalysisBackend, JobHandle};

pub const HANDOFF_DELAY: Duration = Duration::from_millis(1500);

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub poll_interval: Duration,
    pub handoff_delay: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            handoff_delay: HANDOFF_DELAY,
        }
    }
}

/// What the presentation layer is told about the tracked job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Progress(JobView),
    Completed { job_id: JobId, result_id: String },
    Redirect { target: String },
    Failed { message: String },
}

enum Inbound {
    Status { job_id: JobId, report: StatusReport },
    HandoffDue { job_id: JobId },
}

struct ChannelStatusSink {
    tx: mpsc::UnboundedSender<Inbound>,
}

impl StatusSink for ChannelStatusSink {
    fn deliver(&self, job_id: &str, report: StatusReport) {
        let _ = self.tx.send(Inbound::Status {
            job_id: job_id.to_string(),
            report,
        });
    }
}

/// Drives one job at a time from submission to hand-off.
///
/// Poll results and timers arrive on an internal channel and are applied in
/// [`Controller::next_event`], so all state changes happen on the caller's task.
pub struct Controller {
    state: AppState,
    gateway: SubmissionGateway,
    poller: JobPoller,
    history: RecentHistoryStore,
    clock: Arc<dyn Clock>,
    settings: ControllerSettings,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    inbound_rx: mpsc::UnboundedReceiver<Inbound>,
    handoff: Option<CancelHandle>,
    pending: VecDeque<ControllerEvent>,
}

impl Controller {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        settings: ControllerSettings,
    ) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let sink = Arc::new(ChannelStatusSink {
            tx: inbound_tx.clone(),
        });
        Self {
            state: AppState::new(),
            gateway: SubmissionGateway::new(backend.clone()),
            poller: JobPoller::new(backend.clone(), sink, settings.poll_interval),
            history: RecentHistoryStore::new(backend, store),
            clock,
            settings,
            inbound_tx,
            inbound_rx,
            handoff: None,
            pending: VecDeque::new(),
        }
    }

    /// Submits a document. On success polling starts for the new job,
    /// replacing any earlier session; on failure the controller resets.
    pub async fn submit(
        &mut self,
        descriptor: &SubmissionDescriptor,
    ) -> Result<JobHandle, SubmissionError> {
        match self.gateway.submit(descriptor).await {
            Ok(handle) => {
                self.dispatch(Msg::SubmissionAccepted {
                    job_id: handle.job_id.clone(),
                    origin: handle.origin,
                    source_label: handle.source_label.clone(),
                });
                Ok(handle)
            }
            Err(err) => {
                tracker_warn!("Submission rejected: {}", err);
                self.dispatch(Msg::SubmissionRejected {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Waits for the next outward event. Returns `None` only if the internal
    /// channel closed, which cannot happen while the controller is alive.
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            let msg = match self.inbound_rx.recv().await? {
                Inbound::Status { job_id, report } => Msg::StatusReceived {
                    job_id,
                    report,
                    observed_at: self.clock.now(),
                },
                Inbound::HandoffDue { job_id } => Msg::HandoffElapsed { job_id },
            };
            self.dispatch(msg);
        }
    }

    /// Stops polling and forgets the current job.
    pub fn cancel(&mut self) {
        self.dispatch(Msg::CancelRequested);
        self.handoff = None;
        self.pending.clear();
    }

    pub async fn recent(&self) -> Vec<RecentEntry> {
        self.history.load().await
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let changed = state.consume_dirty();
        let view = state.view();
        self.state = state;

        if changed {
            if let Some(job) = view.job {
                self.pending.push_back(ControllerEvent::Progress(job));
            }
        }
        self.run_effects(effects);
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartPolling { job_id } => {
                    self.handoff = None;
                    self.poller.start(&job_id);
                }
                Effect::StopPolling => self.poller.stop(),
                Effect::RecordHistory(entry) => {
                    if let Err(err) = self.history.record(entry) {
                        tracker_error!("Failed to record history entry: {}", err);
                    }
                }
                Effect::ScheduleHandoff { job_id, result_id } => {
                    tracker_info!("Job completed job_id={} result_id={}", job_id, result_id);
                    let tx = self.inbound_tx.clone();
                    let due_id = job_id.clone();
                    self.handoff = Some(schedule_once(self.settings.handoff_delay, move || {
                        async move {
                            let _ = tx.send(Inbound::HandoffDue { job_id: due_id });
                        }
                    }));
                    self.pending
                        .push_back(ControllerEvent::Completed { job_id, result_id });
                }
                Effect::Redirect { target } => {
                    tracker_debug!("Handing off to {}", target);
                    self.handoff = None;
                    self.pending.push_back(ControllerEvent::Redirect { target });
                }
                Effect::SurfaceError { message } => {
                    tracker_info!("Job failed: {}", message);
                    self.pending.push_back(ControllerEvent::Failed { message });
                }
            }
        }
    }
}
