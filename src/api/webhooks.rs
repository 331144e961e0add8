//! Identity provider webhooks.

use axum::{body::Bytes, extract::State, http::HeaderMap};
use serde::Serialize;

use super::{success, ApiResult};
use crate::auth::webhook::{WebhookEvent, WebhookVerifier};
use crate::auth::ClerkUser;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /api/webhooks/clerk - Mirror profile updates and user deletions.
pub async fn clerk_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<WebhookAck> {
    let secret = state.config.clerk_webhook_secret.as_deref().ok_or_else(|| {
        tracing::warn!("Rejecting webhook: no signing secret configured");
        AppError::Unauthorized("Webhook signing secret is not configured".to_string())
    })?;

    let verifier = WebhookVerifier::new(secret).map_err(|e| {
        tracing::error!("Invalid webhook signing secret: {}", e);
        AppError::Internal("Webhook verification is misconfigured".to_string())
    })?;
    verifier.verify(&headers, &body).map_err(|e| {
        tracing::warn!("Webhook signature rejected: {}", e);
        AppError::Unauthorized("Invalid webhook signature".to_string())
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {}", e)))?;

    match event.kind.as_str() {
        "user.updated" | "user.created" => {
            let clerk_user: ClerkUser = serde_json::from_value(event.data)
                .map_err(|e| AppError::BadRequest(format!("Malformed user payload: {}", e)))?;
            match state
                .repo
                .update_user_profile(&clerk_user.id, &clerk_user.profile())
                .await?
            {
                Some(user) => tracing::info!("Mirrored profile of user {}", user.id),
                None => tracing::debug!("Ignoring profile of unknown user {}", clerk_user.id),
            }
        }
        "user.deleted" => {
            let clerk_id = event
                .data
                .get("id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| AppError::BadRequest("user.deleted without id".to_string()))?;
            delete_user(&state, clerk_id).await?;
        }
        other => tracing::debug!("Ignoring webhook event {}", other),
    }

    success(WebhookAck { received: true })
}

async fn delete_user(state: &AppState, clerk_id: &str) -> Result<(), AppError> {
    let Some(user) = state.repo.get_user_by_clerk_id(clerk_id).await? else {
        tracing::debug!("Delete event for unknown user {}", clerk_id);
        return Ok(());
    };

    let owned: Vec<String> = state
        .repo
        .list_courses(Some(&user.id))
        .await?
        .into_iter()
        .filter(|c| c.course.owner_id.as_deref() == Some(user.id.as_str()))
        .map(|c| c.course.id)
        .collect();

    state.repo.delete_user_by_clerk_id(clerk_id).await?;

    for course_id in owned {
        if let Err(e) = state.search.remove_course(&course_id).await {
            tracing::warn!("Failed to remove course {} from index: {}", course_id, e);
        }
    }
    Ok(())
}
