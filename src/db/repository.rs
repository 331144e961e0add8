//! Database repository for CRUD operations.
//!
//! `Repository` is split across this module and its siblings by collection;
//! this file holds users and settings plus the shared row helpers.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{UpdateSettingsRequest, User, UserProfile, UserRole, UserSettings, THEMES};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
}

const USER_COLUMNS: &str = "id, clerk_id, email, first_name, last_name, image_url, role, onboarding_completed, created_at, updated_at";

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// Get a user by local ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Get a user by external identity ID.
    pub async fn get_user_by_clerk_id(&self, clerk_id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE clerk_id = ?",
            USER_COLUMNS
        ))
        .bind(clerk_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Create the local user for an external identity unless it already exists.
    ///
    /// Concurrent first logins race on the UNIQUE `clerk_id`; exactly one insert
    /// wins and every caller reads back the same row. Returns whether this call
    /// created the row.
    pub async fn ensure_local_user(
        &self,
        clerk_id: &str,
        profile: &UserProfile,
    ) -> Result<(User, bool), AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (id, clerk_id, email, first_name, last_name, image_url, role, onboarding_completed, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 'student', 0, ?, ?) ON CONFLICT(clerk_id) DO NOTHING"
        )
        .bind(&id)
        .bind(clerk_id)
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.image_url)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let created = result.rows_affected() == 1;
        let user = self
            .get_user_by_clerk_id(clerk_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("User {} vanished after upsert", clerk_id)))?;

        if created {
            tracing::info!(clerk_id = %clerk_id, user_id = %user.id, "Created local user");
        }
        Ok((user, created))
    }

    /// Overwrite the mirrored profile fields. Returns `None` for unknown users.
    pub async fn update_user_profile(
        &self,
        clerk_id: &str,
        profile: &UserProfile,
    ) -> Result<Option<User>, AppError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE users SET email = ?, first_name = ?, last_name = ?, image_url = ?, updated_at = ? WHERE clerk_id = ?"
        )
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.image_url)
        .bind(&now)
        .bind(clerk_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user_by_clerk_id(clerk_id).await
    }

    pub async fn set_user_role(&self, user_id: &str, role: UserRole) -> Result<User, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(&now)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    pub async fn set_onboarding_completed(&self, user_id: &str) -> Result<User, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE users SET onboarding_completed = 1, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Delete a user with every per-user record and personalized course they own.
    pub async fn delete_user_by_clerk_id(&self, clerk_id: &str) -> Result<bool, AppError> {
        let Some(user) = self.get_user_by_clerk_id(clerk_id).await? else {
            return Ok(false);
        };

        let mut tx = self.pool.begin().await?;

        // Personalized courses and their content
        let owned_modules = "SELECT m.id FROM modules m JOIN courses c ON c.id = m.course_id WHERE c.owner_id = ? AND c.is_personalized = 1";
        for statement in [
            format!("DELETE FROM flashcards WHERE module_id IN ({})", owned_modules),
            format!("DELETE FROM assessments WHERE module_id IN ({})", owned_modules),
            "DELETE FROM modules WHERE course_id IN (SELECT id FROM courses WHERE owner_id = ? AND is_personalized = 1)".to_string(),
            "DELETE FROM tiers WHERE course_id IN (SELECT id FROM courses WHERE owner_id = ? AND is_personalized = 1)".to_string(),
            "DELETE FROM enrollments WHERE course_id IN (SELECT id FROM courses WHERE owner_id = ? AND is_personalized = 1)".to_string(),
            "DELETE FROM courses WHERE owner_id = ? AND is_personalized = 1".to_string(),
        ] {
            sqlx::query(&statement)
                .bind(&user.id)
                .execute(&mut *tx)
                .await?;
        }

        for table in [
            "user_interests",
            "user_progress",
            "flashcard_progress",
            "understanding_checks",
            "assessment_submissions",
            "enrollments",
            "notifications",
            "user_settings",
        ] {
            sqlx::query(&format!("DELETE FROM {} WHERE user_id = ?", table))
                .bind(&user.id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(clerk_id = %clerk_id, user_id = %user.id, "Deleted user and owned records");
        Ok(true)
    }

    // ==================== SETTINGS OPERATIONS ====================

    /// Get a user's settings, falling back to defaults when none were saved.
    pub async fn get_settings(&self, user_id: &str) -> Result<UserSettings, AppError> {
        let row = sqlx::query(
            "SELECT user_id, email_notifications, daily_goal_minutes, theme, updated_at FROM user_settings WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .as_ref()
            .map(settings_from_row)
            .unwrap_or_else(|| UserSettings::defaults_for(user_id)))
    }

    /// Merge the provided fields into the stored settings.
    pub async fn upsert_settings(
        &self,
        user_id: &str,
        request: &UpdateSettingsRequest,
    ) -> Result<UserSettings, AppError> {
        let existing = self.get_settings(user_id).await?;

        let theme = request.theme.clone().unwrap_or(existing.theme);
        if !THEMES.contains(&theme.as_str()) {
            return Err(AppError::Validation(format!(
                "Theme must be one of {}",
                THEMES.join(", ")
            )));
        }
        let daily_goal_minutes = request
            .daily_goal_minutes
            .unwrap_or(existing.daily_goal_minutes);
        if !(1..=600).contains(&daily_goal_minutes) {
            return Err(AppError::Validation(
                "dailyGoalMinutes must be between 1 and 600".to_string(),
            ));
        }

        let settings = UserSettings {
            user_id: user_id.to_string(),
            email_notifications: request
                .email_notifications
                .unwrap_or(existing.email_notifications),
            daily_goal_minutes,
            theme,
            updated_at: Utc::now().to_rfc3339(),
        };

        sqlx::query(
            r#"INSERT INTO user_settings (user_id, email_notifications, daily_goal_minutes, theme, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET
                   email_notifications = excluded.email_notifications,
                   daily_goal_minutes = excluded.daily_goal_minutes,
                   theme = excluded.theme,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&settings.user_id)
        .bind(settings.email_notifications as i32)
        .bind(settings.daily_goal_minutes)
        .bind(&settings.theme)
        .bind(&settings.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(settings)
    }
}

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    let role: String = row.get("role");
    let onboarding_completed: i32 = row.get("onboarding_completed");
    User {
        id: row.get("id"),
        clerk_id: row.get("clerk_id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        image_url: row.get("image_url"),
        role: parse_stored("user role", &role, UserRole::parse, UserRole::default()),
        onboarding_completed: onboarding_completed != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn settings_from_row(row: &sqlx::sqlite::SqliteRow) -> UserSettings {
    let email_notifications: i32 = row.get("email_notifications");
    UserSettings {
        user_id: row.get("user_id"),
        email_notifications: email_notifications != 0,
        daily_goal_minutes: row.get("daily_goal_minutes"),
        theme: row.get("theme"),
        updated_at: row.get("updated_at"),
    }
}

/// Decode a stored enum column. Values this build does not know are logged
/// and replaced by `fallback` so one corrupt row cannot fail a whole listing.
pub(super) fn parse_stored<T>(
    column: &str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
    fallback: T,
) -> T {
    parse(value).unwrap_or_else(|| {
        tracing::warn!(
            "Unknown {} '{}' in stored row, reading it as the default",
            column,
            value
        );
        fallback
    })
}

pub(super) fn parse_json_array<T: serde::de::DeserializeOwned>(s: &str) -> Vec<T> {
    serde_json::from_str(s).unwrap_or_else(|e| {
        tracing::warn!("Unreadable JSON array column ({}), reading it as empty", e);
        Vec::new()
    })
}

pub(super) fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// A repository over a fresh database in a temp directory.
    pub async fn temp_repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = crate::db::init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::temp_repo;
    use super::*;

    fn profile(email: &str) -> UserProfile {
        UserProfile {
            email: Some(email.to_string()),
            first_name: Some("Ada".to_string()),
            last_name: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_ensure_local_user_is_idempotent() {
        let (repo, _dir) = temp_repo().await;

        let (first, created) = repo
            .ensure_local_user("user_1", &profile("ada@example.com"))
            .await
            .unwrap();
        assert!(created);
        assert_eq!(first.role, UserRole::Student);

        let (second, created_again) = repo
            .ensure_local_user("user_1", &profile("other@example.com"))
            .await
            .unwrap();
        assert!(!created_again);
        assert_eq!(first.id, second.id);
        assert_eq!(second.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_concurrent_first_logins_create_one_user() {
        let (repo, _dir) = temp_repo().await;

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.ensure_local_user("user_race", &UserProfile::default())
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut ids = Vec::new();
        let mut created = 0;
        for handle in handles {
            let (user, was_created) = handle.await.unwrap();
            ids.push(user.id);
            created += was_created as usize;
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_settings_defaults_and_merge() {
        let (repo, _dir) = temp_repo().await;

        let defaults = repo.get_settings("u1").await.unwrap();
        assert_eq!(defaults.theme, "system");
        assert!(defaults.email_notifications);

        let updated = repo
            .upsert_settings(
                "u1",
                &UpdateSettingsRequest {
                    email_notifications: None,
                    daily_goal_minutes: Some(45),
                    theme: Some("dark".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.theme, "dark");
        assert_eq!(updated.daily_goal_minutes, 45);
        assert!(updated.email_notifications);

        let reread = repo.get_settings("u1").await.unwrap();
        assert_eq!(reread, updated);
    }

    #[tokio::test]
    async fn test_settings_rejects_unknown_theme() {
        let (repo, _dir) = temp_repo().await;
        let result = repo
            .upsert_settings(
                "u1",
                &UpdateSettingsRequest {
                    email_notifications: None,
                    daily_goal_minutes: None,
                    theme: Some("neon".to_string()),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
