//! Plain-text projection of controller events.

use tracker_core::{JobState, JobView, RecentEntry};
use tracker_engine::JobHandle;

const BAR_WIDTH: usize = 20;

pub fn accepted_line(handle: &JobHandle) -> String {
    format!("Submitted {} (job {})", handle.source_label, handle.job_id)
}

pub fn progress_line(view: &JobView) -> String {
    format!(
        "{} {:>3}% {:<10} {}",
        progress_bar(view.progress),
        view.progress,
        state_label(view.state),
        view.message
    )
}

pub fn completed_line(result_id: &str) -> String {
    format!("Analysis ready: {result_id}")
}

pub fn recent_line(entry: &RecentEntry) -> String {
    let mut line = format!(
        "{}  {:<8} {} [{}]",
        entry.timestamp.format("%Y-%m-%d %H:%M"),
        entry.id,
        entry.title,
        entry.category
    );
    if !entry.metrics_summary.is_empty() {
        line.push_str(" - ");
        line.push_str(&entry.metrics_summary);
    }
    line
}

fn state_label(state: JobState) -> &'static str {
    match state {
        JobState::Submitted => "submitted",
        JobState::Processing => "processing",
        JobState::Completed => "completed",
        JobState::Failed => "failed",
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
