//! Course API endpoints.

use axum::extract::{Path, State};

use super::{ApiJson, ApiResult, created_or_ok, ensure_visible, success};
use crate::auth::{require_role, CurrentUser, MaybeUser};
use crate::errors::AppError;
use crate::models::{
    CourseDetail, CourseProgress, CourseSummary, CreateCourseRequest, Enrollment,
    GenerateFromInterestsRequest, GeneratedCourse, NewCourse, TierLevel, TierWithModules,
    UserRole,
};
use crate::AppState;

/// GET /api/courses - Public catalog plus the caller's personalized courses.
pub async fn list_courses(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> ApiResult<Vec<CourseSummary>> {
    let viewer = user.as_ref().map(|u| u.id.as_str());
    success(state.repo.list_courses(viewer).await?)
}

/// POST /api/courses - Create a public course (educators only).
pub async fn create_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<CreateCourseRequest>,
) -> ApiResult<CourseDetail> {
    require_role(&user, UserRole::Educator)?;

    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let course = state
        .repo
        .create_course(&NewCourse {
            title: title.to_string(),
            description: request.description.unwrap_or_default(),
            content: request.content.unwrap_or_default(),
            owner_id: None,
            generation_status: None,
            topic_key: None,
        })
        .await?;
    tracing::info!("User {} created course {}", user.id, course.id);

    let detail = CourseDetail {
        course,
        tiers: Vec::new(),
    };
    if let Err(e) = state.search.index_course(&detail).await {
        tracing::warn!("Failed to index course: {}", e);
    }

    created_or_ok(detail, true)
}

/// GET /api/courses/{id} - Course with its tiers and modules.
pub async fn get_course(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<CourseDetail> {
    match state.repo.get_course_detail(&id).await? {
        Some(detail) => {
            ensure_visible(&detail.course, user.as_ref())?;
            success(detail)
        }
        None => Err(AppError::NotFound(format!("Course {} not found", id))),
    }
}

/// POST /api/courses/{id}/generate-tiers - Generate the tier structure.
pub async fn generate_tiers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<CourseDetail> {
    success(state.workflow().generate_tiers(&user, &id).await?)
}

/// POST /api/courses/generate-from-interests - Build a personalized course.
pub async fn generate_from_interests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<GenerateFromInterestsRequest>,
) -> ApiResult<GeneratedCourse> {
    let generated = state
        .workflow()
        .generate_from_interests(&user, &request.topics, request.goals.as_deref())
        .await?;
    let created = generated.created;
    created_or_ok(generated, created)
}

/// POST /api/courses/{id}/generate-tier/{tierLevel} - Generate one locked tier.
pub async fn generate_tier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, tier_level)): Path<(String, String)>,
) -> ApiResult<TierWithModules> {
    let level = TierLevel::parse(&tier_level).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown tier level '{}'; expected start, intermediate or advanced",
            tier_level
        ))
    })?;
    success(state.workflow().generate_tier(&user, &id, level).await?)
}

/// POST /api/courses/{id}/enroll - Enroll the caller. Idempotent.
pub async fn enroll(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Enrollment> {
    let course = state
        .repo
        .get_course(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))?;
    ensure_visible(&course, Some(&user))?;

    let (enrollment, created) = state.repo.enroll(&user.id, &course.id).await?;
    if created {
        tracing::info!("User {} enrolled in course {}", user.id, course.id);
    }
    created_or_ok(enrollment, created)
}

/// GET /api/courses/{id}/progress and GET /api/progress/course/{courseId}.
pub async fn get_course_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<CourseProgress> {
    let course = state
        .repo
        .get_course(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))?;
    ensure_visible(&course, Some(&user))?;

    success(state.repo.course_progress(&user.id, &course.id).await?)
}
