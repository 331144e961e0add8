//! Per-user event notifications.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CourseCreated,
    TierUnlocked,
    TierGenerated,
    ModuleCompleted,
    CourseCompleted,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::CourseCreated => "course_created",
            NotificationKind::TierUnlocked => "tier_unlocked",
            NotificationKind::TierGenerated => "tier_generated",
            NotificationKind::ModuleCompleted => "module_completed",
            NotificationKind::CourseCompleted => "course_completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "course_created" => Some(NotificationKind::CourseCreated),
            "tier_unlocked" => Some(NotificationKind::TierUnlocked),
            "tier_generated" => Some(NotificationKind::TierGenerated),
            "module_completed" => Some(NotificationKind::ModuleCompleted),
            "course_completed" => Some(NotificationKind::CourseCompleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    pub read: bool,
    pub created_at: String,
}

/// Fields needed to emit a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub course_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}
