//! # Auto Grading Service
//!
//! Maps one question and the learner's answer to a [`QuestionGradeOutcome`].
//! Dispatch is an exhaustive match on [`QuestionKind`], so adding a kind is a
//! compile error until it has a grading rule.

use code_runner::types::TestCase;
use tracing::{debug, info};
use util::execution_config::ExecutionLimits;
use util::languages::Language;

use crate::aggregator;
use crate::comparators::choice_comparator::ChoiceComparator;
use crate::error::MarkerError;
use crate::feedback;
use crate::traits::comparator::AnswerComparator;
use crate::traits::executor::CodeExecutor;
use crate::types::{
    AttemptGradeOutcome, AttemptSnapshot, GradeOptions, GradeStatus, LearnerAnswer, Question,
    QuestionGradeOutcome, QuestionKind,
};

/// Round a float to two decimal places.
#[inline]
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub struct AutoGrader<E> {
    executor: E,
    limits: ExecutionLimits,
    comparator: Box<dyn AnswerComparator>,
}

impl<E: CodeExecutor> AutoGrader<E> {
    /// Grades coding questions with the fixed hidden-grading budget.
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            limits: ExecutionLimits::hidden_grading(),
            comparator: Box::new(ChoiceComparator),
        }
    }

    /// Overrides the budget used for coding questions.
    pub fn with_limits(mut self, limits: ExecutionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set a custom comparator strategy for choice questions.
    pub fn with_comparator<C: AnswerComparator + 'static>(mut self, comparator: C) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    pub fn limits(&self) -> ExecutionLimits {
        self.limits
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Grades one question.
    ///
    /// # Errors
    /// Only for malformed input ([`MarkerError::Validation`]) or an execution
    /// engine that could not run at all ([`MarkerError::Execution`]). Wrong,
    /// missing or crashing answers are zero-point outcomes.
    pub async fn grade_question(
        &self,
        question: &Question,
        answer: &LearnerAnswer,
    ) -> Result<QuestionGradeOutcome, MarkerError> {
        validate_question(question)?;

        let outcome = match &question.kind {
            QuestionKind::SingleChoice { correct_answer } => {
                self.grade_choice(question, std::slice::from_ref(correct_answer), answer)
            }
            QuestionKind::MultipleChoice { correct_answers } => {
                self.grade_choice(question, correct_answers, answer)
            }
            QuestionKind::Coding {
                language,
                test_cases,
            } => {
                self.grade_coding(question, *language, test_cases, answer)
                    .await?
            }
            QuestionKind::ShortText | QuestionKind::Essay | QuestionKind::FileUpload => {
                requires_manual_grading(question)
            }
        };

        debug!(
            question_id = %question.id,
            points_awarded = outcome.points_awarded,
            max_points = outcome.max_points,
            passed = outcome.passed,
            "Graded question"
        );
        Ok(outcome)
    }

    /// Grades every question of an attempt. See [`aggregator::grade_attempt`].
    pub async fn grade_attempt(
        &self,
        attempt: &AttemptSnapshot,
        options: GradeOptions,
    ) -> Result<AttemptGradeOutcome, MarkerError> {
        aggregator::grade_attempt(self, attempt, options).await
    }

    fn grade_choice(
        &self,
        question: &Question,
        expected: &[String],
        answer: &LearnerAnswer,
    ) -> QuestionGradeOutcome {
        let correct = self.comparator.matches(expected, &answer.selected);
        let max_points = question.max_points();
        QuestionGradeOutcome {
            question_id: question.id.clone(),
            points_awarded: if correct { max_points } else { 0.0 },
            max_points,
            passed: correct,
            status: GradeStatus::Graded,
            feedback: feedback::choice(correct).to_string(),
            test_case_results: None,
        }
    }

    async fn grade_coding(
        &self,
        question: &Question,
        default_language: Language,
        test_cases: &[TestCase],
        answer: &LearnerAnswer,
    ) -> Result<QuestionGradeOutcome, MarkerError> {
        let max_points = question.max_points();
        let zero = |feedback: String| QuestionGradeOutcome {
            question_id: question.id.clone(),
            points_awarded: 0.0,
            max_points,
            passed: false,
            status: GradeStatus::Graded,
            feedback,
            test_case_results: None,
        };

        let code = match answer.code.as_deref() {
            Some(code) if !code.trim().is_empty() => code,
            _ => return Ok(zero(feedback::NO_CODE_SUBMITTED.to_string())),
        };

        let language = match answer.language.as_deref().map(str::trim) {
            None | Some("") => default_language,
            Some(name) => match name.parse::<Language>() {
                Ok(language) => language,
                Err(_) => return Ok(zero(feedback::unsupported_language(name))),
            },
        };

        let results = self
            .executor
            .execute(code, language, test_cases, self.limits)
            .await?;

        if results.len() != test_cases.len() {
            return Err(MarkerError::Execution(format!(
                "expected {} test case results, got {}",
                test_cases.len(),
                results.len()
            )));
        }

        let passed_count = results.iter().filter(|r| r.passed).count();
        let earned: f64 = test_cases
            .iter()
            .zip(&results)
            .filter(|(_, result)| result.passed)
            .map(|(case, _)| case.points)
            .sum();
        let points_awarded = round2(earned.min(max_points));
        let all_passed = results.iter().all(|r| r.passed);

        info!(
            question_id = %question.id,
            %language,
            passed = passed_count,
            total = results.len(),
            points_awarded,
            "Graded coding question"
        );

        Ok(QuestionGradeOutcome {
            question_id: question.id.clone(),
            points_awarded,
            max_points,
            passed: all_passed,
            status: GradeStatus::Graded,
            feedback: feedback::coding_summary(
                passed_count,
                results.len(),
                points_awarded,
                max_points,
            ),
            test_case_results: Some(results),
        })
    }
}

pub(crate) fn requires_manual_grading(question: &Question) -> QuestionGradeOutcome {
    QuestionGradeOutcome {
        question_id: question.id.clone(),
        points_awarded: 0.0,
        max_points: question.max_points(),
        passed: false,
        status: GradeStatus::PendingManual,
        feedback: feedback::REQUIRES_MANUAL_GRADING.to_string(),
        test_case_results: None,
    }
}

pub(crate) fn validate_question(question: &Question) -> Result<(), MarkerError> {
    if question.id.trim().is_empty() {
        return Err(MarkerError::Validation("question id is required".into()));
    }
    if !question.points.is_finite() || question.points < 0.0 {
        return Err(MarkerError::Validation(format!(
            "question '{}' has invalid points {}",
            question.id, question.points
        )));
    }
    match &question.kind {
        QuestionKind::SingleChoice { correct_answer } if correct_answer.trim().is_empty() => {
            Err(MarkerError::Validation(format!(
                "question '{}' has no correct answer",
                question.id
            )))
        }
        QuestionKind::MultipleChoice { correct_answers } if correct_answers.is_empty() => {
            Err(MarkerError::Validation(format!(
                "question '{}' has no correct answers",
                question.id
            )))
        }
        _ => Ok(()),
    }
}
