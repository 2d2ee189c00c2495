//! Tracker engine: backend IO, timers, persistence and the job controller.
mod backend;
mod controller;
mod history;
mod persist;
mod poller;
mod schedule;
mod submit;
mod types;

pub use backend::{AnalysisBackend, BackendSettings, ReqwestBackend};
pub use controller::{
    Clock, Controller, ControllerEvent, ControllerSettings, SystemClock, HANDOFF_DELAY,
};
pub use history::{HistoryError, RecentHistoryStore, RECENT_STORAGE_KEY};
pub use persist::{
    ensure_cache_dir, AtomicFileWriter, FileStore, KeyValueStore, MemoryStore, PersistError,
};
pub use poller::{JobPoller, PollingSession, StatusSink, POLL_INTERVAL};
pub use schedule::{schedule_every, schedule_once, CancelHandle, CancelSignal};
pub use submit::{
    media_type_for, SubmissionDescriptor, SubmissionError, SubmissionGateway, PDF_MEDIA_TYPE,
};
pub use types::{BackendError, CreateJobResponse, FailureKind, JobHandle, StatusResponse};
