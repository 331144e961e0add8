//! Per-user learning records: submissions, understanding checks, module and
//! flashcard progress, interests and enrollments.
//!
//! Every (user, target) collection carries a UNIQUE index and is written with
//! `INSERT ... ON CONFLICT`, so concurrent requests cannot create duplicates.

use chrono::Utc;
use sqlx::Row;

use super::repository::{parse_json_array, to_json};
use super::Repository;
use crate::errors::AppError;
use crate::models::{
    AssessmentSubmission, CourseProgress, DueFlashcard, Enrollment, Flashcard, FlashcardProgress,
    Interest, Module, NewSubmission, NewUnderstandingCheck, Progress, UnderstandingCheck,
};
use crate::progress::course_percent;

const PROGRESS_COLUMNS: &str =
    "id, user_id, module_id, course_id, completed, progress_percent, completed_at, updated_at";
const FLASHCARD_PROGRESS_COLUMNS: &str = "id, user_id, flashcard_id, ease_factor, interval_days, repetitions, next_review_at, last_reviewed_at";

impl Repository {
    // ==================== SUBMISSION OPERATIONS ====================

    pub async fn create_submission(
        &self,
        new: &NewSubmission,
    ) -> Result<AssessmentSubmission, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let answers_json = new.answers.as_ref().map(to_json);

        sqlx::query(
            "INSERT INTO assessment_submissions (id, assessment_id, user_id, answers, response, score, passed, feedback, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&new.assessment_id)
        .bind(&new.user_id)
        .bind(&answers_json)
        .bind(&new.response)
        .bind(new.score)
        .bind(new.passed as i32)
        .bind(&new.feedback)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(AssessmentSubmission {
            id,
            assessment_id: new.assessment_id.clone(),
            user_id: new.user_id.clone(),
            answers: new.answers.clone(),
            response: new.response.clone(),
            score: new.score,
            passed: new.passed,
            feedback: new.feedback.clone(),
            created_at: now,
        })
    }

    pub async fn list_submissions(
        &self,
        user_id: &str,
        assessment_id: &str,
    ) -> Result<Vec<AssessmentSubmission>, AppError> {
        let rows = sqlx::query(
            "SELECT id, assessment_id, user_id, answers, response, score, passed, feedback, created_at FROM assessment_submissions WHERE user_id = ? AND assessment_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(assessment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(submission_from_row).collect())
    }

    pub async fn create_understanding_check(
        &self,
        new: &NewUnderstandingCheck,
    ) -> Result<UnderstandingCheck, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO understanding_checks (id, user_id, module_id, assessment_id, response, score, feedback, improvement_areas, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&new.user_id)
        .bind(&new.module_id)
        .bind(&new.assessment_id)
        .bind(&new.response)
        .bind(new.score)
        .bind(&new.feedback)
        .bind(to_json(&new.improvement_areas))
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(UnderstandingCheck {
            id,
            user_id: new.user_id.clone(),
            module_id: new.module_id.clone(),
            assessment_id: new.assessment_id.clone(),
            response: new.response.clone(),
            score: new.score,
            feedback: new.feedback.clone(),
            improvement_areas: new.improvement_areas.clone(),
            created_at: now,
        })
    }

    pub async fn list_understanding_checks(
        &self,
        user_id: &str,
        module_id: &str,
    ) -> Result<Vec<UnderstandingCheck>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, module_id, assessment_id, response, score, feedback, improvement_areas, created_at FROM understanding_checks WHERE user_id = ? AND module_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let areas: String = row.get("improvement_areas");
                UnderstandingCheck {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    module_id: row.get("module_id"),
                    assessment_id: row.get("assessment_id"),
                    response: row.get("response"),
                    score: row.get("score"),
                    feedback: row.get("feedback"),
                    improvement_areas: parse_json_array(&areas),
                    created_at: row.get("created_at"),
                }
            })
            .collect())
    }

    // ==================== MODULE PROGRESS OPERATIONS ====================

    /// Write the single progress record for (user, module). Last write wins;
    /// the first completion timestamp is kept across repeated completions.
    pub async fn upsert_module_progress(
        &self,
        user_id: &str,
        module: &Module,
        completed: bool,
        progress_percent: i32,
    ) -> Result<Progress, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let completed_at = completed.then(|| now.clone());

        sqlx::query(
            r#"INSERT INTO user_progress (id, user_id, module_id, course_id, completed, progress_percent, completed_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(user_id, module_id) DO UPDATE SET
                   completed = excluded.completed,
                   progress_percent = excluded.progress_percent,
                   completed_at = CASE WHEN excluded.completed = 1
                       THEN COALESCE(user_progress.completed_at, excluded.completed_at)
                       ELSE NULL END,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&module.id)
        .bind(&module.course_id)
        .bind(completed as i32)
        .bind(progress_percent)
        .bind(&completed_at)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_module_progress(user_id, &module.id)
            .await?
            .ok_or_else(|| AppError::Internal("Progress record missing after upsert".to_string()))
    }

    pub async fn get_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
    ) -> Result<Option<Progress>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_progress WHERE user_id = ? AND module_id = ?",
            PROGRESS_COLUMNS
        ))
        .bind(user_id)
        .bind(module_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(progress_from_row))
    }

    /// Completed modules over all modules of all tiers of the course.
    pub async fn course_progress(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<CourseProgress, AppError> {
        let row = sqlx::query(
            r#"SELECT
                   (SELECT COUNT(*) FROM modules m
                        JOIN tiers t ON t.id = m.tier_id
                        WHERE t.course_id = ?) AS total_modules,
                   (SELECT COUNT(*) FROM user_progress p
                        JOIN modules m ON m.id = p.module_id
                        JOIN tiers t ON t.id = m.tier_id
                        WHERE t.course_id = ? AND p.user_id = ? AND p.completed = 1) AS completed_modules"#,
        )
        .bind(course_id)
        .bind(course_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let total_modules: i64 = row.get("total_modules");
        let completed_modules: i64 = row.get("completed_modules");

        Ok(CourseProgress {
            course_id: course_id.to_string(),
            total_modules,
            completed_modules,
            percent: course_percent(completed_modules, total_modules),
        })
    }

    // ==================== FLASHCARD PROGRESS OPERATIONS ====================

    pub async fn get_flashcard_progress(
        &self,
        user_id: &str,
        flashcard_id: &str,
    ) -> Result<Option<FlashcardProgress>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM flashcard_progress WHERE user_id = ? AND flashcard_id = ?",
            FLASHCARD_PROGRESS_COLUMNS
        ))
        .bind(user_id)
        .bind(flashcard_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(flashcard_progress_from_row))
    }

    pub async fn upsert_flashcard_progress(
        &self,
        progress: &FlashcardProgress,
    ) -> Result<FlashcardProgress, AppError> {
        sqlx::query(
            r#"INSERT INTO flashcard_progress (id, user_id, flashcard_id, ease_factor, interval_days, repetitions, next_review_at, last_reviewed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(user_id, flashcard_id) DO UPDATE SET
                   ease_factor = excluded.ease_factor,
                   interval_days = excluded.interval_days,
                   repetitions = excluded.repetitions,
                   next_review_at = excluded.next_review_at,
                   last_reviewed_at = excluded.last_reviewed_at"#,
        )
        .bind(&progress.id)
        .bind(&progress.user_id)
        .bind(&progress.flashcard_id)
        .bind(progress.ease_factor)
        .bind(progress.interval_days)
        .bind(progress.repetitions)
        .bind(&progress.next_review_at)
        .bind(&progress.last_reviewed_at)
        .execute(&self.pool)
        .await?;

        self.get_flashcard_progress(&progress.user_id, &progress.flashcard_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal("Flashcard progress missing after upsert".to_string())
            })
    }

    /// Reviewed cards whose next review is at or before `now` (RFC3339, UTC).
    pub async fn list_due_flashcards(
        &self,
        user_id: &str,
        now: &str,
    ) -> Result<Vec<DueFlashcard>, AppError> {
        let rows = sqlx::query(
            r#"SELECT f.id AS card_id, f.module_id, f.front, f.back, f.card_order,
                      p.id, p.user_id, p.flashcard_id, p.ease_factor, p.interval_days,
                      p.repetitions, p.next_review_at, p.last_reviewed_at
               FROM flashcard_progress p
               JOIN flashcards f ON f.id = p.flashcard_id
               WHERE p.user_id = ? AND p.next_review_at <= ?
               ORDER BY p.next_review_at"#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| DueFlashcard {
                flashcard: Flashcard {
                    id: row.get("card_id"),
                    module_id: row.get("module_id"),
                    front: row.get("front"),
                    back: row.get("back"),
                    order: row.get("card_order"),
                },
                progress: flashcard_progress_from_row(row),
            })
            .collect())
    }

    // ==================== INTEREST OPERATIONS ====================

    /// Record topics for a user; already-known topics are left untouched.
    pub async fn add_interests(
        &self,
        user_id: &str,
        topics: &[String],
    ) -> Result<Vec<Interest>, AppError> {
        let now = Utc::now().to_rfc3339();
        for topic in topics {
            sqlx::query(
                "INSERT INTO user_interests (id, user_id, topic, created_at) VALUES (?, ?, ?, ?) ON CONFLICT(user_id, topic) DO NOTHING",
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(topic)
            .bind(&now)
            .execute(&self.pool)
            .await?;
        }
        self.list_interests(user_id).await
    }

    pub async fn list_interests(&self, user_id: &str) -> Result<Vec<Interest>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, topic, created_at FROM user_interests WHERE user_id = ? ORDER BY created_at, topic",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Interest {
                id: row.get("id"),
                user_id: row.get("user_id"),
                topic: row.get("topic"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    pub async fn remove_interest(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM user_interests WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Interest {} not found", id)));
        }
        Ok(())
    }

    // ==================== ENROLLMENT OPERATIONS ====================

    /// Enroll a user; enrolling twice returns the existing enrollment.
    pub async fn enroll(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<(Enrollment, bool), AppError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO enrollments (id, user_id, course_id, enrolled_at) VALUES (?, ?, ?, ?) ON CONFLICT(user_id, course_id) DO NOTHING",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(course_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let enrollment = self
            .get_enrollment(user_id, course_id)
            .await?
            .ok_or_else(|| AppError::Internal("Enrollment missing after upsert".to_string()))?;
        Ok((enrollment, result.rows_affected() == 1))
    }

    pub async fn get_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_id, course_id, enrolled_at FROM enrollments WHERE user_id = ? AND course_id = ?",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(enrollment_from_row))
    }

    pub async fn list_enrollments(&self, user_id: &str) -> Result<Vec<Enrollment>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, course_id, enrolled_at FROM enrollments WHERE user_id = ? ORDER BY enrolled_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(enrollment_from_row).collect())
    }
}

// Helper functions for row conversion

fn submission_from_row(row: &sqlx::sqlite::SqliteRow) -> AssessmentSubmission {
    let answers: Option<String> = row.get("answers");
    let passed: i32 = row.get("passed");
    AssessmentSubmission {
        id: row.get("id"),
        assessment_id: row.get("assessment_id"),
        user_id: row.get("user_id"),
        answers: answers.map(|s| parse_json_array(&s)),
        response: row.get("response"),
        score: row.get("score"),
        passed: passed != 0,
        feedback: row.get("feedback"),
        created_at: row.get("created_at"),
    }
}

fn progress_from_row(row: &sqlx::sqlite::SqliteRow) -> Progress {
    let completed: i32 = row.get("completed");
    Progress {
        id: row.get("id"),
        user_id: row.get("user_id"),
        module_id: row.get("module_id"),
        course_id: row.get("course_id"),
        completed: completed != 0,
        progress_percent: row.get("progress_percent"),
        completed_at: row.get("completed_at"),
        updated_at: row.get("updated_at"),
    }
}

fn flashcard_progress_from_row(row: &sqlx::sqlite::SqliteRow) -> FlashcardProgress {
    FlashcardProgress {
        id: row.get("id"),
        user_id: row.get("user_id"),
        flashcard_id: row.get("flashcard_id"),
        ease_factor: row.get("ease_factor"),
        interval_days: row.get("interval_days"),
        repetitions: row.get("repetitions"),
        next_review_at: row.get("next_review_at"),
        last_reviewed_at: row.get("last_reviewed_at"),
    }
}

fn enrollment_from_row(row: &sqlx::sqlite::SqliteRow) -> Enrollment {
    Enrollment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        course_id: row.get("course_id"),
        enrolled_at: row.get("enrolled_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::test_support::temp_repo;
    use super::*;
    use crate::models::{NewCourse, NewModule, NewTier, TierLevel, TierStatus};

    async fn course_with_modules(repo: &Repository, count: i32) -> (String, Vec<Module>) {
        let course = repo
            .create_course(&NewCourse {
                title: "Course".into(),
                description: String::new(),
                content: String::new(),
                owner_id: None,
                generation_status: None,
                topic_key: None,
            })
            .await
            .unwrap();
        let tier = repo
            .create_tier(&NewTier {
                course_id: course.id.clone(),
                level: TierLevel::Start,
                title: "Start".into(),
                description: String::new(),
                generation_status: TierStatus::Completed,
                planned_modules: Vec::new(),
            })
            .await
            .unwrap();
        let mut modules = Vec::new();
        for order in 0..count {
            modules.push(
                repo.create_module(&NewModule {
                    tier_id: tier.id.clone(),
                    course_id: course.id.clone(),
                    title: format!("M{}", order),
                    description: String::new(),
                    content: "x".into(),
                    order,
                    estimated_minutes: 5,
                })
                .await
                .unwrap(),
            );
        }
        (course.id, modules)
    }

    #[tokio::test]
    async fn test_course_progress_percentage() {
        let (repo, _dir) = temp_repo().await;
        let (course_id, modules) = course_with_modules(&repo, 3).await;

        repo.upsert_module_progress("u1", &modules[0], true, 100)
            .await
            .unwrap();
        repo.upsert_module_progress("u1", &modules[1], false, 50)
            .await
            .unwrap();

        let progress = repo.course_progress("u1", &course_id).await.unwrap();
        assert_eq!(progress.total_modules, 3);
        assert_eq!(progress.completed_modules, 1);
        assert_eq!(progress.percent, 33);

        let other_user = repo.course_progress("u2", &course_id).await.unwrap();
        assert_eq!(other_user.percent, 0);
    }

    #[tokio::test]
    async fn test_course_without_tiers_has_zero_progress() {
        let (repo, _dir) = temp_repo().await;
        let progress = repo.course_progress("u1", "empty-course").await.unwrap();
        assert_eq!(progress.total_modules, 0);
        assert_eq!(progress.percent, 0);
    }

    #[tokio::test]
    async fn test_completing_twice_is_idempotent() {
        let (repo, _dir) = temp_repo().await;
        let (_, modules) = course_with_modules(&repo, 1).await;

        let first = repo
            .upsert_module_progress("u1", &modules[0], true, 100)
            .await
            .unwrap();
        let second = repo
            .upsert_module_progress("u1", &modules[0], true, 100)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.completed, second.completed);
        assert_eq!(first.progress_percent, second.progress_percent);
        assert_eq!(first.completed_at, second.completed_at);
    }

    #[tokio::test]
    async fn test_enroll_twice_returns_existing() {
        let (repo, _dir) = temp_repo().await;
        let (first, created) = repo.enroll("u1", "c1").await.unwrap();
        let (second, created_again) = repo.enroll("u1", "c1").await.unwrap();

        assert!(created);
        assert!(!created_again);
        assert_eq!(first.id, second.id);
        assert_eq!(repo.list_enrollments("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_interests_are_unique_per_topic() {
        let (repo, _dir) = temp_repo().await;
        repo.add_interests("u1", &["Rust".to_string(), "Go".to_string()])
            .await
            .unwrap();
        let interests = repo
            .add_interests("u1", &["Rust".to_string()])
            .await
            .unwrap();
        assert_eq!(interests.len(), 2);
    }

    #[tokio::test]
    async fn test_due_flashcards() {
        let (repo, _dir) = temp_repo().await;
        let card = repo.create_flashcard("m1", "Q", "A", 0).await.unwrap();
        repo.upsert_flashcard_progress(&FlashcardProgress {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "u1".into(),
            flashcard_id: card.id.clone(),
            ease_factor: 2.5,
            interval_days: 1,
            repetitions: 1,
            next_review_at: "2024-01-02T00:00:00+00:00".into(),
            last_reviewed_at: "2024-01-01T00:00:00+00:00".into(),
        })
        .await
        .unwrap();

        let due = repo
            .list_due_flashcards("u1", "2024-01-03T00:00:00+00:00")
            .await
            .unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].flashcard.id, card.id);

        let not_yet = repo
            .list_due_flashcards("u1", "2024-01-01T12:00:00+00:00")
            .await
            .unwrap();
        assert!(not_yet.is_empty());
    }
}
