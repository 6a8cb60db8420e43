mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{ScriptedExecutor, coding_question, essay_question};
use marker::error::MarkerError;
use marker::types::{AttemptSnapshot, GradeOptions, LearnerAnswer};
use marker::{
    AutoGrader, GradeStore, GradingState, InMemoryGradeStore, spawn_grading_job,
};

fn snapshot(id: &str) -> AttemptSnapshot {
    AttemptSnapshot {
        attempt_id: id.into(),
        questions: vec![coding_question("code"), essay_question("essay", 10.0)],
        answers: HashMap::from([(
            "code".to_string(),
            LearnerAnswer::code("print(1)", None),
        )]),
        manual_grades: HashMap::new(),
    }
}

#[tokio::test]
async fn completed_job_is_persisted_and_observable() {
    let grader = Arc::new(AutoGrader::new(
        ScriptedExecutor::passing(&["t1", "t2"]).with_delay(Duration::from_millis(50)),
    ));
    let store = Arc::new(InMemoryGradeStore::new());

    let handle = spawn_grading_job(
        grader,
        store.clone(),
        snapshot("attempt-7"),
        GradeOptions { partial: true },
    )
    .await
    .unwrap();

    assert!(matches!(handle.state(), GradingState::Pending { .. }));
    assert!(matches!(
        store.load("attempt-7").await.unwrap(),
        Some(GradingState::Pending { .. })
    ));

    let finished = handle.wait().await.unwrap();
    let GradingState::Completed { outcome, .. } = finished else {
        panic!("expected a completed grade, got {finished:?}");
    };
    assert_eq!(outcome.total_awarded, 10.0);
    assert!(outcome.requires_manual_review);

    assert!(matches!(
        store.load("attempt-7").await.unwrap(),
        Some(GradingState::Completed { .. })
    ));
}

#[tokio::test]
async fn engine_failure_is_recorded_as_failed() {
    let grader = Arc::new(AutoGrader::new(ScriptedExecutor::failing()));
    let store = Arc::new(InMemoryGradeStore::new());

    let handle = spawn_grading_job(grader, store.clone(), snapshot("a"), GradeOptions::default())
        .await
        .unwrap();

    let finished = handle.wait().await.unwrap();
    assert!(matches!(finished, GradingState::Failed { ref reason, .. } if reason.contains("sandbox root unavailable")));
    assert_eq!(store.load("a").await.unwrap(), Some(finished));
}

#[tokio::test]
async fn panicking_grade_is_recorded_as_failed() {
    let grader = Arc::new(AutoGrader::new(ScriptedExecutor::panicking()));
    let store = Arc::new(InMemoryGradeStore::new());

    let handle = spawn_grading_job(grader, store.clone(), snapshot("p"), GradeOptions::default())
        .await
        .unwrap();

    assert!(matches!(
        handle.wait().await.unwrap(),
        GradingState::Failed { .. }
    ));
    assert!(matches!(
        store.load("p").await.unwrap(),
        Some(GradingState::Failed { .. })
    ));
}

struct BrokenStore;

#[async_trait]
impl GradeStore for BrokenStore {
    async fn save(&self, _: &str, _: &GradingState) -> Result<(), MarkerError> {
        Err(MarkerError::Store("database offline".into()))
    }

    async fn load(&self, _: &str) -> Result<Option<GradingState>, MarkerError> {
        Ok(None)
    }
}

#[tokio::test]
async fn job_is_not_started_when_pending_state_cannot_be_saved() {
    let executor = ScriptedExecutor::passing(&[]);
    let grader = Arc::new(AutoGrader::new(executor));

    let err = spawn_grading_job(
        grader.clone(),
        Arc::new(BrokenStore),
        snapshot("x"),
        GradeOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MarkerError::Store(_)));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(grader_calls(&grader), 0);
}

fn grader_calls(grader: &AutoGrader<ScriptedExecutor>) -> usize {
    grader.executor().call_count()
}
