//! Account, settings and interest endpoints.

use axum::extract::{Path, State};

use super::{ApiJson, ApiResult, success};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{
    AddInterestsRequest, Interest, UpdateRoleRequest, UpdateSettingsRequest, User, UserRole,
    UserSettings,
};
use crate::workflow::clean_topics;
use crate::AppState;

/// GET /api/auth/user - The local user record of the caller.
pub async fn current_user(CurrentUser(user): CurrentUser) -> ApiResult<User> {
    success(user)
}

/// POST /api/auth/sync - Refresh the mirrored profile from the identity provider.
pub async fn sync_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<User> {
    let profile = state.identity.fetch_profile(&user.clerk_id).await?;
    let updated = state
        .repo
        .update_user_profile(&user.clerk_id, &profile)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;
    success(updated)
}

/// PUT /api/auth/role - Choose between student and educator.
pub async fn update_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<UpdateRoleRequest>,
) -> ApiResult<User> {
    let role = UserRole::parse(request.role.trim()).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown role '{}'; expected student or educator",
            request.role
        ))
    })?;
    let updated = state.repo.set_user_role(&user.id, role).await?;
    tracing::info!("User {} switched role to {}", user.id, role.as_str());
    success(updated)
}

/// POST /api/auth/onboarding - Mark onboarding as done.
pub async fn complete_onboarding(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<User> {
    success(state.repo.set_onboarding_completed(&user.id).await?)
}

/// GET /api/user/settings
pub async fn get_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<UserSettings> {
    success(state.repo.get_settings(&user.id).await?)
}

/// PUT /api/user/settings - Merge the provided fields.
pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<UpdateSettingsRequest>,
) -> ApiResult<UserSettings> {
    success(state.repo.upsert_settings(&user.id, &request).await?)
}

/// GET /api/user/interests
pub async fn list_interests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<Interest>> {
    success(state.repo.list_interests(&user.id).await?)
}

/// POST /api/user/interests - Add topics; known ones are kept as they are.
pub async fn add_interests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<AddInterestsRequest>,
) -> ApiResult<Vec<Interest>> {
    let topics = clean_topics(&request.topics);
    if topics.is_empty() {
        return Err(AppError::Validation(
            "At least one topic is required".to_string(),
        ));
    }
    success(state.repo.add_interests(&user.id, &topics).await?)
}

/// DELETE /api/user/interests/{id}
pub async fn remove_interest(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.remove_interest(&user.id, &id).await?;
    success(())
}
