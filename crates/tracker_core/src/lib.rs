//! Tracker core: pure job lifecycle state machine and view-model helpers.
mod effect;
mod history;
mod job;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use history::{prepend_capped, RecentEntry, RECENT_CAPACITY};
pub use job::{
    display_progress, is_usable_result_id, results_path, Job, JobId, JobState, Origin,
    StatusReport, StatusTag, FAILED_FALLBACK_MESSAGE, MISSING_RESULT_MESSAGE,
    PROCESSING_FALLBACK_MESSAGE, PROGRESS_FLOOR,
};
pub use msg::Msg;
pub use state::AppState;
pub use update::update;
pub use view_model::{AppViewModel, JobView};
