use chrono::{DateTime, Utc};

use crate::job::{
    is_usable_result_id, results_path, JobState, StatusReport, StatusTag, FAILED_FALLBACK_MESSAGE,
    MISSING_RESULT_MESSAGE,
};
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmissionAccepted {
            job_id,
            origin,
            source_label,
        } => {
            // A running session for an earlier job is superseded by StartPolling.
            state.begin_job(job_id.clone(), origin, source_label);
            vec![Effect::StartPolling { job_id }]
        }
        Msg::SubmissionRejected { message } => {
            state.fail(message);
            vec![Effect::StopPolling]
        }
        Msg::StatusReceived {
            job_id,
            report,
            observed_at,
        } => match state.current(&job_id).map(|job| job.state) {
            // Late result for a superseded job, or a job that already ended.
            None => Vec::new(),
            Some(job_state) if job_state.is_terminal() => Vec::new(),
            Some(_) => apply_status(&mut state, &job_id, report, observed_at),
        },
        Msg::HandoffElapsed { job_id } => {
            let target = state
                .current(&job_id)
                .filter(|job| job.state == JobState::Completed)
                .and_then(|job| job.result_id.as_deref())
                .map(results_path);
            match target {
                Some(target) => {
                    state.clear_job();
                    vec![Effect::Redirect { target }]
                }
                None => Vec::new(),
            }
        }
        Msg::CancelRequested => {
            if state.job().is_some() {
                state.clear_job();
                vec![Effect::StopPolling]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}

fn apply_status(
    state: &mut AppState,
    job_id: &str,
    report: StatusReport,
    observed_at: DateTime<Utc>,
) -> Vec<Effect> {
    match report.status {
        StatusTag::Processing => {
            state.apply_processing(&report);
            Vec::new()
        }
        StatusTag::Completed => {
            let result_id = report
                .document_id
                .as_deref()
                .map(str::trim)
                .filter(|id| is_usable_result_id(id))
                .map(ToOwned::to_owned);
            let Some(result_id) = result_id else {
                return fail_job(state, MISSING_RESULT_MESSAGE.to_string());
            };

            let mut effects = vec![Effect::StopPolling];
            if let Some(entry) = state.complete(&result_id, &report, observed_at) {
                effects.push(Effect::RecordHistory(entry));
            }
            effects.push(Effect::ScheduleHandoff {
                job_id: job_id.to_string(),
                result_id,
            });
            effects
        }
        StatusTag::Failed => {
            let message = report
                .error
                .filter(|error| !error.is_empty())
                .unwrap_or_else(|| FAILED_FALLBACK_MESSAGE.to_string());
            fail_job(state, message)
        }
    }
}

fn fail_job(state: &mut AppState, message: String) -> Vec<Effect> {
    state.fail(message.clone());
    vec![Effect::StopPolling, Effect::SurfaceError { message }]
}
