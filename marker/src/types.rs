//! # Types Module
//!
//! Questions, learner answers and the graded outcomes produced for them.

use std::collections::HashMap;

use code_runner::types::{TestCase, TestCaseResult};
use serde::{Deserialize, Serialize};
use util::languages::Language;

fn default_language() -> Language {
    Language::Python
}

/// The closed set of question kinds. Each kind has exactly one grading strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice {
        correct_answer: String,
    },
    MultipleChoice {
        correct_answers: Vec<String>,
    },
    Coding {
        /// Used when the answer does not name a language.
        #[serde(default = "default_language")]
        language: Language,
        /// Visible and hidden cases together.
        #[serde(default)]
        test_cases: Vec<TestCase>,
    },
    ShortText,
    Essay,
    FileUpload,
}

impl QuestionKind {
    /// Free text, essays and uploads always need a human.
    pub fn is_manually_graded(&self) -> bool {
        match self {
            QuestionKind::ShortText | QuestionKind::Essay | QuestionKind::FileUpload => true,
            QuestionKind::SingleChoice { .. }
            | QuestionKind::MultipleChoice { .. }
            | QuestionKind::Coding { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub points: f64,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    pub fn new(id: impl Into<String>, points: f64, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            points,
            kind,
        }
    }

    /// Maximum attainable points. A coding question without its own value is
    /// worth the sum of its test cases.
    pub fn max_points(&self) -> f64 {
        match &self.kind {
            QuestionKind::Coding { test_cases, .. } if self.points <= 0.0 => {
                test_cases.iter().map(|tc| tc.points).sum()
            }
            _ => self.points,
        }
    }
}

/// Whatever the learner submitted. Which fields matter depends on the question kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnerAnswer {
    /// Selected choice id(s).
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl LearnerAnswer {
    pub fn choice(id: impl Into<String>) -> Self {
        Self {
            selected: vec![id.into()],
            ..Default::default()
        }
    }

    pub fn choices<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: ids.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn code(code: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            code: Some(code.into()),
            language: language.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeStatus {
    Graded,
    /// Awaiting a human grader; points are zero until then.
    PendingManual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionGradeOutcome {
    pub question_id: String,
    pub points_awarded: f64,
    pub max_points: f64,
    pub passed: bool,
    pub status: GradeStatus,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_case_results: Option<Vec<TestCaseResult>>,
}

impl QuestionGradeOutcome {
    /// Same outcome with hidden test-case details removed.
    pub fn learner_view(&self) -> QuestionGradeOutcome {
        QuestionGradeOutcome {
            test_case_results: self
                .test_case_results
                .as_ref()
                .map(|results| results.iter().map(TestCaseResult::learner_view).collect()),
            ..self.clone()
        }
    }
}

/// A grade entered by a reviewer for a manually graded question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualGrade {
    pub points: f64,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Everything needed to grade one attempt, captured at submission time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptSnapshot {
    pub attempt_id: String,
    pub questions: Vec<Question>,
    /// Keyed by question id. A missing entry is graded as an empty answer.
    #[serde(default)]
    pub answers: HashMap<String, LearnerAnswer>,
    /// Keyed by question id. Only consulted outside partial mode.
    #[serde(default)]
    pub manual_grades: HashMap<String, ManualGrade>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeOptions {
    /// Grade only auto-gradable questions and leave the rest pending.
    #[serde(default)]
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptGradeOutcome {
    pub attempt_id: String,
    pub per_question: Vec<QuestionGradeOutcome>,
    pub total_awarded: f64,
    pub total_max: f64,
    pub requires_manual_review: bool,
}

impl AttemptGradeOutcome {
    pub fn learner_view(&self) -> AttemptGradeOutcome {
        AttemptGradeOutcome {
            per_question: self
                .per_question
                .iter()
                .map(QuestionGradeOutcome::learner_view)
                .collect(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_kind_deserializes_from_type_tag() {
        let q: Question = serde_json::from_str(
            r#"{ "id": "q1", "points": 2, "type": "single_choice", "correct_answer": "c" }"#,
        )
        .unwrap();
        assert_eq!(
            q.kind,
            QuestionKind::SingleChoice {
                correct_answer: "c".into()
            }
        );

        let essay: Question =
            serde_json::from_str(r#"{ "id": "q2", "points": 10, "type": "essay" }"#).unwrap();
        assert!(essay.kind.is_manually_graded());
    }

    #[test]
    fn coding_question_defaults_to_python() {
        let q: Question =
            serde_json::from_str(r#"{ "id": "q3", "points": 5, "type": "coding" }"#).unwrap();
        assert!(matches!(
            q.kind,
            QuestionKind::Coding {
                language: Language::Python,
                ..
            }
        ));
    }

    #[test]
    fn coding_max_points_falls_back_to_test_case_sum() {
        let cases = vec![
            TestCase::new("a", "", "").worth(3.0),
            TestCase::new("b", "", "").worth(4.5),
        ];
        let q = Question::new(
            "q",
            0.0,
            QuestionKind::Coding {
                language: Language::Python,
                test_cases: cases,
            },
        );
        assert_eq!(q.max_points(), 7.5);
    }
}
