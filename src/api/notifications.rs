//! Notification endpoints.

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::auth::CurrentUser;
use crate::models::{Notification, UnreadCount};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

/// GET /api/notifications - Newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Vec<Notification>> {
    success(
        state
            .repo
            .list_notifications(&user.id, query.unread_only)
            .await?,
    )
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<UnreadCount> {
    let count = state.repo.unread_count(&user.id).await?;
    success(UnreadCount { count })
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.mark_notification_read(&user.id, &id).await?;
    success(())
}

/// POST /api/notifications/mark-all-read
pub async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<MarkedRead> {
    let updated = state.repo.mark_all_notifications_read(&user.id).await?;
    success(MarkedRead { updated })
}
