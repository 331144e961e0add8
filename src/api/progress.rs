//! Progress, flashcard review and dashboard endpoints.

use axum::extract::{Path, State};
use chrono::Utc;

use super::{ApiJson, ApiResult, success};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{
    DueFlashcard, EnrolledCourse, FlashcardProgress, Progress, ReviewFlashcardRequest,
    UpdateProgressRequest,
};
use crate::AppState;

/// GET /api/progress/module/{moduleId} - The caller's progress record, if any.
pub async fn get_module_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(module_id): Path<String>,
) -> ApiResult<Option<Progress>> {
    if state.repo.get_module(&module_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Module {} not found",
            module_id
        )));
    }
    success(state.repo.get_module_progress(&user.id, &module_id).await?)
}

/// POST /api/progress/module/{moduleId} - Record module progress.
pub async fn update_module_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(module_id): Path<String>,
    ApiJson(request): ApiJson<UpdateProgressRequest>,
) -> ApiResult<Progress> {
    success(
        state
            .workflow()
            .record_module_progress(&user, &module_id, &request)
            .await?,
    )
}

/// POST /api/progress/flashcard/{flashcardId} - Review a flashcard.
pub async fn review_flashcard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(flashcard_id): Path<String>,
    ApiJson(request): ApiJson<ReviewFlashcardRequest>,
) -> ApiResult<FlashcardProgress> {
    success(
        state
            .workflow()
            .review_flashcard(&user, &flashcard_id, request.quality)
            .await?,
    )
}

/// GET /api/progress/flashcards/due - Cards due for review now.
pub async fn due_flashcards(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<DueFlashcard>> {
    let now = Utc::now().to_rfc3339();
    success(state.repo.list_due_flashcards(&user.id, &now).await?)
}

/// GET /api/enrollments - Dashboard: enrolled courses with progress.
pub async fn list_enrollments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<EnrolledCourse>> {
    let enrollments = state.repo.list_enrollments(&user.id).await?;

    let mut courses = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        let Some(course) = state.repo.get_course_summary(&enrollment.course_id).await? else {
            tracing::warn!(
                "Enrollment {} points at missing course {}",
                enrollment.id,
                enrollment.course_id
            );
            continue;
        };
        let progress = state
            .repo
            .course_progress(&user.id, &enrollment.course_id)
            .await?;
        courses.push(EnrolledCourse {
            enrollment,
            course,
            progress,
        });
    }

    success(courses)
}
