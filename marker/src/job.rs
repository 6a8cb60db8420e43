//! # Background Grading Jobs
//!
//! Post-submission grading runs detached from the request that triggered it.
//! Every job moves through [`GradingState`] and each transition is written to a
//! [`GradeStore`] before it is published, so a failed or panicking grade is
//! always recorded as [`GradingState::Failed`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, watch};
use tracing::{error, info, warn};

use crate::error::MarkerError;
use crate::grader::AutoGrader;
use crate::traits::executor::CodeExecutor;
use crate::types::{AttemptGradeOutcome, AttemptSnapshot, GradeOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GradingState {
    Pending {
        queued_at: DateTime<Utc>,
    },
    Completed {
        outcome: AttemptGradeOutcome,
        graded_at: DateTime<Utc>,
    },
    Failed {
        reason: String,
        failed_at: DateTime<Utc>,
    },
}

impl GradingState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, GradingState::Pending { .. })
    }
}

/// Persistence seam for grading state, keyed by attempt id.
#[async_trait]
pub trait GradeStore: Send + Sync {
    async fn save(&self, attempt_id: &str, state: &GradingState) -> Result<(), MarkerError>;
    async fn load(&self, attempt_id: &str) -> Result<Option<GradingState>, MarkerError>;
}

#[derive(Debug, Default)]
pub struct InMemoryGradeStore {
    states: RwLock<HashMap<String, GradingState>>,
}

impl InMemoryGradeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GradeStore for InMemoryGradeStore {
    async fn save(&self, attempt_id: &str, state: &GradingState) -> Result<(), MarkerError> {
        self.states
            .write()
            .await
            .insert(attempt_id.to_string(), state.clone());
        Ok(())
    }

    async fn load(&self, attempt_id: &str) -> Result<Option<GradingState>, MarkerError> {
        Ok(self.states.read().await.get(attempt_id).cloned())
    }
}

/// Observes a running job.
#[derive(Debug, Clone)]
pub struct GradingHandle {
    attempt_id: String,
    rx: watch::Receiver<GradingState>,
}

impl GradingHandle {
    pub fn attempt_id(&self) -> &str {
        &self.attempt_id
    }

    /// Latest published state.
    pub fn state(&self) -> GradingState {
        self.rx.borrow().clone()
    }

    /// Waits until the job completes or fails.
    ///
    /// # Errors
    /// [`MarkerError::JobAborted`] if the job's task went away without
    /// publishing a final state.
    pub async fn wait(mut self) -> Result<GradingState, MarkerError> {
        let state = self
            .rx
            .wait_for(GradingState::is_finished)
            .await
            .map_err(|_| MarkerError::JobAborted(self.attempt_id.clone()))?;
        Ok(state.clone())
    }
}

/// Persists a pending state for `attempt` and grades it on a background task.
///
/// # Errors
/// Only if the pending state cannot be persisted; nothing is spawned then.
pub async fn spawn_grading_job<E>(
    grader: Arc<AutoGrader<E>>,
    store: Arc<dyn GradeStore>,
    attempt: AttemptSnapshot,
    options: GradeOptions,
) -> Result<GradingHandle, MarkerError>
where
    E: CodeExecutor + 'static,
{
    let attempt_id = attempt.attempt_id.clone();
    let pending = GradingState::Pending {
        queued_at: Utc::now(),
    };
    store.save(&attempt_id, &pending).await?;

    let (tx, rx) = watch::channel(pending);
    info!(attempt_id = %attempt_id, partial = options.partial, "Queued grading job");

    let job_id = attempt_id.clone();
    tokio::spawn(async move {
        // Grading runs on its own task so a panic surfaces as a JoinError here.
        let graded =
            tokio::spawn(async move { grader.grade_attempt(&attempt, options).await }).await;

        let state = match graded {
            Ok(Ok(outcome)) => GradingState::Completed {
                outcome,
                graded_at: Utc::now(),
            },
            Ok(Err(err)) => GradingState::Failed {
                reason: err.to_string(),
                failed_at: Utc::now(),
            },
            Err(join_err) => GradingState::Failed {
                reason: format!("grading task aborted: {join_err}"),
                failed_at: Utc::now(),
            },
        };

        match &state {
            GradingState::Failed { reason, .. } => {
                error!(attempt_id = %job_id, %reason, "Grading job failed")
            }
            _ => info!(attempt_id = %job_id, "Grading job completed"),
        }

        if let Err(err) = store.save(&job_id, &state).await {
            warn!(attempt_id = %job_id, error = %err, "Failed to persist grading state");
        }
        tx.send_replace(state);
    });

    Ok(GradingHandle { attempt_id, rx })
}
