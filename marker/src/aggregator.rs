//! # Grading Aggregator
//!
//! Walks every question of an attempt in order, grades each one and folds the
//! outcomes into a single [`AttemptGradeOutcome`].
//!
//! In partial mode (used right after submission) manually graded questions are
//! left pending so a best-effort score exists before human review. Outside
//! partial mode a reviewer's [`ManualGrade`](crate::types::ManualGrade) is used
//! when one has been recorded.

use std::collections::HashSet;

use tracing::info;

use crate::error::MarkerError;
use crate::feedback;
use crate::grader::{AutoGrader, requires_manual_grading, round2, validate_question};
use crate::traits::executor::CodeExecutor;
use crate::types::{
    AttemptGradeOutcome, AttemptSnapshot, GradeOptions, GradeStatus, LearnerAnswer,
    QuestionGradeOutcome,
};

pub async fn grade_attempt<E: CodeExecutor>(
    grader: &AutoGrader<E>,
    attempt: &AttemptSnapshot,
    options: GradeOptions,
) -> Result<AttemptGradeOutcome, MarkerError> {
    validate_attempt(attempt)?;

    let empty = LearnerAnswer::default();
    let mut per_question = Vec::with_capacity(attempt.questions.len());

    for question in &attempt.questions {
        let outcome = if question.kind.is_manually_graded() {
            let pending = requires_manual_grading(question);
            if options.partial {
                QuestionGradeOutcome {
                    feedback: feedback::PENDING_MANUAL_GRADING.to_string(),
                    ..pending
                }
            } else {
                match attempt.manual_grades.get(&question.id) {
                    Some(manual) => QuestionGradeOutcome {
                        points_awarded: round2(manual.points.clamp(0.0, pending.max_points)),
                        passed: manual.points >= pending.max_points,
                        status: GradeStatus::Graded,
                        feedback: manual
                            .feedback
                            .clone()
                            .unwrap_or_else(|| feedback::MANUALLY_GRADED.to_string()),
                        ..pending
                    },
                    None => pending,
                }
            }
        } else {
            let answer = attempt.answers.get(&question.id).unwrap_or(&empty);
            grader.grade_question(question, answer).await?
        };
        per_question.push(outcome);
    }

    let total_max = round2(per_question.iter().map(|o| o.max_points).sum());
    let total_awarded = round2(per_question.iter().map(|o| o.points_awarded).sum()).min(total_max);
    let requires_manual_review = attempt
        .questions
        .iter()
        .any(|q| q.kind.is_manually_graded());

    info!(
        attempt_id = %attempt.attempt_id,
        partial = options.partial,
        questions = per_question.len(),
        total_awarded,
        total_max,
        requires_manual_review,
        "Graded attempt"
    );

    Ok(AttemptGradeOutcome {
        attempt_id: attempt.attempt_id.clone(),
        per_question,
        total_awarded,
        total_max,
        requires_manual_review,
    })
}

fn validate_attempt(attempt: &AttemptSnapshot) -> Result<(), MarkerError> {
    if attempt.attempt_id.trim().is_empty() {
        return Err(MarkerError::Validation("attempt id is required".into()));
    }
    let mut seen = HashSet::new();
    for question in &attempt.questions {
        validate_question(question)?;
        if !seen.insert(question.id.as_str()) {
            return Err(MarkerError::Validation(format!(
                "question '{}' appears more than once",
                question.id
            )));
        }
    }
    for (question_id, grade) in &attempt.manual_grades {
        if !grade.points.is_finite() || grade.points < 0.0 {
            return Err(MarkerError::Validation(format!(
                "manual grade for '{question_id}' has invalid points {}",
                grade.points
            )));
        }
    }
    Ok(())
}
