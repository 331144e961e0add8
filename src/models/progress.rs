//! Per-user learning state: progress, flashcard scheduling, interests, enrollments.

use serde::{Deserialize, Serialize};

use super::{CourseSummary, Flashcard};

/// Completion record for one (user, module) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub id: String,
    pub user_id: String,
    pub module_id: String,
    pub course_id: String,
    pub completed: bool,
    pub progress_percent: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress_percent: Option<i32>,
}

/// Aggregate completion of a course for one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course_id: String,
    pub total_modules: i64,
    pub completed_modules: i64,
    pub percent: i64,
}

/// Spaced-repetition state for one (user, flashcard) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardProgress {
    pub id: String,
    pub user_id: String,
    pub flashcard_id: String,
    pub ease_factor: f64,
    pub interval_days: i64,
    pub repetitions: i64,
    pub next_review_at: String,
    pub last_reviewed_at: String,
}

/// A card whose next review is due.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueFlashcard {
    pub flashcard: Flashcard,
    pub progress: FlashcardProgress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewFlashcardRequest {
    pub quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    pub id: String,
    pub user_id: String,
    pub topic: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddInterestsRequest {
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub enrolled_at: String,
}

/// Dashboard row: an enrolled course with the user's progress in it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    pub enrollment: Enrollment,
    pub course: CourseSummary,
    pub progress: CourseProgress,
}
