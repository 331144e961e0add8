//! Notification records.

use chrono::Utc;
use sqlx::Row;

use super::repository::parse_stored;
use super::Repository;
use crate::errors::AppError;
use crate::models::{NewNotification, Notification, NotificationKind};

impl Repository {
    pub async fn create_notification(
        &self,
        new: &NewNotification,
    ) -> Result<Notification, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO notifications (id, user_id, kind, title, message, course_id, is_read, created_at) VALUES (?, ?, ?, ?, ?, ?, 0, ?)"
        )
        .bind(&id)
        .bind(&new.user_id)
        .bind(new.kind.as_str())
        .bind(&new.title)
        .bind(&new.message)
        .bind(&new.course_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Notification {
            id,
            user_id: new.user_id.clone(),
            kind: new.kind,
            title: new.title.clone(),
            message: new.message.clone(),
            course_id: new.course_id.clone(),
            read: false,
            created_at: now,
        })
    }

    /// Whether the user already has a notification of `kind` for `course_id`,
    /// optionally narrowed to one title.
    pub async fn has_notification(
        &self,
        user_id: &str,
        kind: NotificationKind,
        course_id: &str,
        title: Option<&str>,
    ) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM notifications WHERE user_id = ? AND kind = ? AND course_id = ? AND (? IS NULL OR title = ?)",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(course_id)
        .bind(title)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        let n: i64 = row.get("n");
        Ok(n > 0)
    }

    /// Newest first, optionally only unread ones.
    pub async fn list_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, kind, title, message, course_id, is_read, created_at FROM notifications WHERE user_id = ? AND (? = 0 OR is_read = 0) ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(unread_only as i32)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(notification_from_row).collect())
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM notifications WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("n"))
    }

    /// Mark one of the user's notifications read.
    pub async fn mark_notification_read(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Notification {} not found", id)));
        }
        Ok(())
    }

    /// Mark every notification of the user read. Returns how many changed.
    pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn notification_from_row(row: &sqlx::sqlite::SqliteRow) -> Notification {
    let kind: String = row.get("kind");
    let read: i32 = row.get("is_read");
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind: parse_stored(
            "notification kind",
            &kind,
            NotificationKind::parse,
            NotificationKind::CourseCreated,
        ),
        title: row.get("title"),
        message: row.get("message"),
        course_id: row.get("course_id"),
        read: read != 0,
        created_at: row.get("created_at"),
    }
}
