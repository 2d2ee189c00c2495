use tracker_core::{update, AppState, Msg};

#[test]
fn status_without_tracked_job_is_ignored() {
    let state = AppState::new();
    let (next, effects) = update(
        state.clone(),
        Msg::StatusReceived {
            job_id: "unknown".to_string(),
            report: Default::default(),
            observed_at: chrono::Utc::now(),
        },
    );

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn cancel_without_tracked_job_is_ignored() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::CancelRequested);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn handoff_without_tracked_job_is_ignored() {
    let state = AppState::new();
    let (next, effects) = update(
        state.clone(),
        Msg::HandoffElapsed {
            job_id: "p1".to_string(),
        },
    );

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
