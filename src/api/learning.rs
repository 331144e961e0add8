//! Module and assessment endpoints.

use axum::extract::{Path, State};

use super::{ApiJson, ApiResult, ensure_visible, success};
use crate::auth::{CurrentUser, MaybeUser};
use crate::errors::AppError;
use crate::models::{
    AssessmentSubmission, ModuleDetail, SubmissionResult, SubmitAssessmentRequest,
    UnderstandingCheck,
};
use crate::AppState;

/// GET /api/modules/{id} - Module content with flashcards and assessments.
pub async fn get_module(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<ModuleDetail> {
    let detail = state
        .repo
        .get_module_detail(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {} not found", id)))?;

    let course = state
        .repo
        .get_course(&detail.module.course_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Course {} not found", detail.module.course_id))
        })?;
    ensure_visible(&course, user.as_ref())?;

    success(detail)
}

/// POST /api/assessments/{id}/submit - Grade a quiz or an understanding check.
pub async fn submit_assessment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SubmitAssessmentRequest>,
) -> ApiResult<SubmissionResult> {
    let result = state
        .workflow()
        .submit_assessment(&user, &id, &request)
        .await?;
    tracing::debug!(
        "User {} scored {} on assessment {}",
        user.id,
        result.submission.score,
        id
    );
    success(result)
}

/// GET /api/assessments/{id}/submissions - The caller's attempts, newest first.
pub async fn list_submissions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<AssessmentSubmission>> {
    let assessment = state
        .repo
        .get_assessment(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assessment {} not found", id)))?;
    let module = state
        .repo
        .get_module(&assessment.module_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {} not found", assessment.module_id)))?;
    let course = state
        .repo
        .get_course(&module.course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {} not found", module.course_id)))?;
    ensure_visible(&course, Some(&user))?;

    success(state.repo.list_submissions(&user.id, &assessment.id).await?)
}

/// GET /api/modules/{id}/understanding-checks
pub async fn list_understanding_checks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<UnderstandingCheck>> {
    let module = state
        .repo
        .get_module(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {} not found", id)))?;
    let course = state
        .repo
        .get_course(&module.course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {} not found", module.course_id)))?;
    ensure_visible(&course, Some(&user))?;

    success(state.repo.list_understanding_checks(&user.id, &module.id).await?)
}
