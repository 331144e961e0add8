//! Flashcards, assessments and submissions attached to a module.

use serde::{Deserialize, Serialize};

use super::Module;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub module_id: String,
    pub front: String,
    pub back: String,
    pub order: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Quiz,
    UnderstandingCheck,
}

impl AssessmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentKind::Quiz => "quiz",
            AssessmentKind::UnderstandingCheck => "understanding_check",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quiz" => Some(AssessmentKind::Quiz),
            "understanding_check" => Some(AssessmentKind::UnderstandingCheck),
            _ => None,
        }
    }
}

/// A multiple-choice item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A quiz (`questions`) or an understanding check (`prompt` + `rubric`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub module_id: String,
    pub kind: AssessmentKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<QuizQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubric: Option<String>,
    pub created_at: String,
}

/// Fields needed to persist a new assessment.
#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub module_id: String,
    pub kind: AssessmentKind,
    pub title: String,
    pub questions: Vec<QuizQuestion>,
    pub prompt: Option<String>,
    pub rubric: Option<String>,
}

/// A user's answer to an assessment and its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSubmission {
    pub id: String,
    pub assessment_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub score: i32,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub created_at: String,
}

/// An LLM-graded free-text explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderstandingCheck {
    pub id: String,
    pub user_id: String,
    pub module_id: String,
    pub assessment_id: String,
    pub response: String,
    pub score: i32,
    pub feedback: String,
    pub improvement_areas: Vec<String>,
    pub created_at: String,
}

/// Request body for `POST /api/assessments/{id}/submit`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssessmentRequest {
    #[serde(default)]
    pub answers: Option<Vec<usize>>,
    #[serde(default)]
    pub response: Option<String>,
}

/// Response of an assessment submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub submission: AssessmentSubmission,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub understanding_check: Option<UnderstandingCheck>,
}

/// A module together with its flashcards and assessments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDetail {
    #[serde(flatten)]
    pub module: Module,
    pub flashcards: Vec<Flashcard>,
    pub assessments: Vec<Assessment>,
}

/// Fields needed to persist a submission.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub assessment_id: String,
    pub user_id: String,
    pub answers: Option<Vec<usize>>,
    pub response: Option<String>,
    pub score: i32,
    pub passed: bool,
    pub feedback: Option<String>,
}

/// Fields needed to persist a graded explanation.
#[derive(Debug, Clone)]
pub struct NewUnderstandingCheck {
    pub user_id: String,
    pub module_id: String,
    pub assessment_id: String,
    pub response: String,
    pub score: i32,
    pub feedback: String,
    pub improvement_areas: Vec<String>,
}
