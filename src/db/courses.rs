//! Courses, tiers, modules, flashcards and assessments.

use chrono::Utc;
use sqlx::Row;

use super::repository::{parse_json_array, parse_stored, to_json};
use super::Repository;
use crate::errors::AppError;
use crate::models::{
    Assessment, AssessmentKind, Course, CourseDetail, CourseStatus, CourseSummary, Flashcard,
    Module, ModuleDetail, NewAssessment, NewCourse, NewModule, NewTier, Tier, TierLevel,
    TierStatus, TierWithModules,
};

const COURSE_COLUMNS: &str = "c.id, c.title, c.description, c.content, c.is_personalized, c.owner_id, c.generation_status, c.topic_key, c.created_at, c.updated_at";
const TIER_COLUMNS: &str =
    "id, course_id, level, title, description, generation_status, tier_order, planned_modules, created_at, updated_at";
const MODULE_COLUMNS: &str = "id, tier_id, course_id, title, description, content, module_order, estimated_minutes, created_at";

impl Repository {
    // ==================== COURSE OPERATIONS ====================

    pub async fn create_course(&self, new: &NewCourse) -> Result<Course, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let is_personalized = new.owner_id.is_some();

        sqlx::query(
            "INSERT INTO courses (id, title, description, content, is_personalized, owner_id, generation_status, topic_key, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.content)
        .bind(is_personalized as i32)
        .bind(&new.owner_id)
        .bind(new.generation_status.map(|s| s.as_str()))
        .bind(&new.topic_key)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Course {
            id,
            title: new.title.clone(),
            description: new.description.clone(),
            content: new.content.clone(),
            is_personalized,
            owner_id: new.owner_id.clone(),
            generation_status: new.generation_status,
            topic_key: new.topic_key.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn get_course(&self, id: &str) -> Result<Option<Course>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM courses c WHERE c.id = ?",
            COURSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(course_from_row))
    }

    /// Public courses plus the viewer's personalized ones, with tier and module counts.
    pub async fn list_courses(&self, viewer_id: Option<&str>) -> Result<Vec<CourseSummary>, AppError> {
        let rows = sqlx::query(&format!(
            r#"SELECT {},
                   (SELECT COUNT(*) FROM tiers t WHERE t.course_id = c.id) AS tier_count,
                   (SELECT COUNT(*) FROM modules m WHERE m.course_id = c.id) AS module_count
               FROM courses c
               WHERE c.is_personalized = 0 OR (? IS NOT NULL AND c.owner_id = ?)
               ORDER BY c.created_at DESC, c.title"#,
            COURSE_COLUMNS
        ))
        .bind(viewer_id)
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(course_summary_from_row).collect())
    }

    pub async fn get_course_summary(&self, id: &str) -> Result<Option<CourseSummary>, AppError> {
        let row = sqlx::query(&format!(
            r#"SELECT {},
                   (SELECT COUNT(*) FROM tiers t WHERE t.course_id = c.id) AS tier_count,
                   (SELECT COUNT(*) FROM modules m WHERE m.course_id = c.id) AS module_count
               FROM courses c WHERE c.id = ?"#,
            COURSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(course_summary_from_row))
    }

    /// Every course, public and personalized. Used to rebuild the search index.
    pub async fn list_all_courses(&self) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query(&format!("SELECT {} FROM courses c", COURSE_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(course_from_row).collect())
    }

    /// The completed personalized course a user already generated for the
    /// same topics. Unfinished attempts are not reused.
    pub async fn find_personalized_course(
        &self,
        owner_id: &str,
        topic_key: &str,
    ) -> Result<Option<Course>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM courses c WHERE c.is_personalized = 1 AND c.owner_id = ? AND c.topic_key = ? AND c.generation_status = 'completed' ORDER BY c.created_at LIMIT 1",
            COURSE_COLUMNS
        ))
        .bind(owner_id)
        .bind(topic_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(course_from_row))
    }

    pub async fn set_course_status(&self, id: &str, status: CourseStatus) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE courses SET generation_status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// A course with its ordered tiers and each tier's ordered modules.
    pub async fn get_course_detail(&self, id: &str) -> Result<Option<CourseDetail>, AppError> {
        let Some(course) = self.get_course(id).await? else {
            return Ok(None);
        };

        let tiers = self.list_tiers(id).await?;
        let modules = self.list_course_modules(id).await?;

        let tiers = tiers
            .into_iter()
            .map(|tier| {
                let modules = modules
                    .iter()
                    .filter(|m| m.tier_id == tier.id)
                    .cloned()
                    .collect();
                TierWithModules { tier, modules }
            })
            .collect();

        Ok(Some(CourseDetail { course, tiers }))
    }

    // ==================== TIER OPERATIONS ====================

    pub async fn create_tier(&self, new: &NewTier) -> Result<Tier, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO tiers (id, course_id, level, title, description, generation_status, tier_order, planned_modules, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&new.course_id)
        .bind(new.level.as_str())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.generation_status.as_str())
        .bind(new.level.order())
        .bind(to_json(&new.planned_modules))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Tier {
            id,
            course_id: new.course_id.clone(),
            level: new.level,
            title: new.title.clone(),
            description: new.description.clone(),
            generation_status: new.generation_status,
            order: new.level.order(),
            planned_modules: new.planned_modules.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn list_tiers(&self, course_id: &str) -> Result<Vec<Tier>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM tiers WHERE course_id = ? ORDER BY tier_order",
            TIER_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(tier_from_row).collect())
    }

    pub async fn get_tier_by_level(
        &self,
        course_id: &str,
        level: TierLevel,
    ) -> Result<Option<Tier>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM tiers WHERE course_id = ? AND level = ?",
            TIER_COLUMNS
        ))
        .bind(course_id)
        .bind(level.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(tier_from_row))
    }

    /// Atomically move a tier from `locked` to `generating`.
    ///
    /// Returns false when another request already claimed it.
    pub async fn claim_tier_for_generation(&self, tier_id: &str) -> Result<bool, AppError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE tiers SET generation_status = 'generating', updated_at = ? WHERE id = ? AND generation_status = 'locked'",
        )
        .bind(&now)
        .bind(tier_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn set_tier_status(&self, tier_id: &str, status: TierStatus) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE tiers SET generation_status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(&now)
            .bind(tier_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove every module of a tier along with its flashcards and assessments.
    pub async fn delete_tier_modules(&self, tier_id: &str) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        for statement in [
            "DELETE FROM flashcards WHERE module_id IN (SELECT id FROM modules WHERE tier_id = ?)",
            "DELETE FROM assessments WHERE module_id IN (SELECT id FROM modules WHERE tier_id = ?)",
        ] {
            sqlx::query(statement)
                .bind(tier_id)
                .execute(&mut *tx)
                .await?;
        }
        let result = sqlx::query("DELETE FROM modules WHERE tier_id = ?")
            .bind(tier_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    // ==================== MODULE OPERATIONS ====================

    pub async fn create_module(&self, new: &NewModule) -> Result<Module, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO modules (id, tier_id, course_id, title, description, content, module_order, estimated_minutes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&new.tier_id)
        .bind(&new.course_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.content)
        .bind(new.order)
        .bind(new.estimated_minutes)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Module {
            id,
            tier_id: new.tier_id.clone(),
            course_id: new.course_id.clone(),
            title: new.title.clone(),
            description: new.description.clone(),
            content: new.content.clone(),
            order: new.order,
            estimated_minutes: new.estimated_minutes,
            created_at: now,
        })
    }

    pub async fn get_module(&self, id: &str) -> Result<Option<Module>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM modules WHERE id = ?", MODULE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(module_from_row))
    }

    pub async fn list_modules(&self, tier_id: &str) -> Result<Vec<Module>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM modules WHERE tier_id = ? ORDER BY module_order",
            MODULE_COLUMNS
        ))
        .bind(tier_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(module_from_row).collect())
    }

    pub async fn list_course_modules(&self, course_id: &str) -> Result<Vec<Module>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM modules WHERE course_id = ? ORDER BY module_order",
            MODULE_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(module_from_row).collect())
    }

    pub async fn get_module_detail(&self, id: &str) -> Result<Option<ModuleDetail>, AppError> {
        let Some(module) = self.get_module(id).await? else {
            return Ok(None);
        };
        let flashcards = self.list_flashcards(id).await?;
        let assessments = self.list_assessments(id).await?;
        Ok(Some(ModuleDetail {
            module,
            flashcards,
            assessments,
        }))
    }

    // ==================== FLASHCARD OPERATIONS ====================

    pub async fn create_flashcard(
        &self,
        module_id: &str,
        front: &str,
        back: &str,
        order: i32,
    ) -> Result<Flashcard, AppError> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO flashcards (id, module_id, front, back, card_order) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(module_id)
        .bind(front)
        .bind(back)
        .bind(order)
        .execute(&self.pool)
        .await?;

        Ok(Flashcard {
            id,
            module_id: module_id.to_string(),
            front: front.to_string(),
            back: back.to_string(),
            order,
        })
    }

    pub async fn get_flashcard(&self, id: &str) -> Result<Option<Flashcard>, AppError> {
        let row = sqlx::query(
            "SELECT id, module_id, front, back, card_order FROM flashcards WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(flashcard_from_row))
    }

    pub async fn list_flashcards(&self, module_id: &str) -> Result<Vec<Flashcard>, AppError> {
        let rows = sqlx::query(
            "SELECT id, module_id, front, back, card_order FROM flashcards WHERE module_id = ? ORDER BY card_order",
        )
        .bind(module_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(flashcard_from_row).collect())
    }

    // ==================== ASSESSMENT OPERATIONS ====================

    pub async fn create_assessment(&self, new: &NewAssessment) -> Result<Assessment, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let questions_json = (!new.questions.is_empty()).then(|| to_json(&new.questions));

        sqlx::query(
            "INSERT INTO assessments (id, module_id, kind, title, questions, prompt, rubric, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&new.module_id)
        .bind(new.kind.as_str())
        .bind(&new.title)
        .bind(&questions_json)
        .bind(&new.prompt)
        .bind(&new.rubric)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Assessment {
            id,
            module_id: new.module_id.clone(),
            kind: new.kind,
            title: new.title.clone(),
            questions: new.questions.clone(),
            prompt: new.prompt.clone(),
            rubric: new.rubric.clone(),
            created_at: now,
        })
    }

    pub async fn get_assessment(&self, id: &str) -> Result<Option<Assessment>, AppError> {
        let row = sqlx::query(
            "SELECT id, module_id, kind, title, questions, prompt, rubric, created_at FROM assessments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(assessment_from_row))
    }

    pub async fn list_assessments(&self, module_id: &str) -> Result<Vec<Assessment>, AppError> {
        let rows = sqlx::query(
            "SELECT id, module_id, kind, title, questions, prompt, rubric, created_at FROM assessments WHERE module_id = ? ORDER BY created_at, kind DESC",
        )
        .bind(module_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(assessment_from_row).collect())
    }
}

// Helper functions for row conversion

fn course_from_row(row: &sqlx::sqlite::SqliteRow) -> Course {
    let is_personalized: i32 = row.get("is_personalized");
    let status: Option<String> = row.get("generation_status");
    Course {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        content: row.get("content"),
        is_personalized: is_personalized != 0,
        owner_id: row.get("owner_id"),
        generation_status: status.map(|s| {
            parse_stored("course status", &s, CourseStatus::parse, CourseStatus::Generating)
        }),
        topic_key: row.get("topic_key"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn course_summary_from_row(row: &sqlx::sqlite::SqliteRow) -> CourseSummary {
    CourseSummary {
        course: course_from_row(row),
        tier_count: row.get("tier_count"),
        module_count: row.get("module_count"),
    }
}

fn tier_from_row(row: &sqlx::sqlite::SqliteRow) -> Tier {
    let level: String = row.get("level");
    let status: String = row.get("generation_status");
    let planned: String = row.get("planned_modules");
    Tier {
        id: row.get("id"),
        course_id: row.get("course_id"),
        level: parse_stored("tier level", &level, TierLevel::parse, TierLevel::Start),
        title: row.get("title"),
        description: row.get("description"),
        generation_status: parse_stored(
            "tier status",
            &status,
            TierStatus::parse,
            TierStatus::Locked,
        ),
        order: row.get("tier_order"),
        planned_modules: parse_json_array(&planned),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn module_from_row(row: &sqlx::sqlite::SqliteRow) -> Module {
    Module {
        id: row.get("id"),
        tier_id: row.get("tier_id"),
        course_id: row.get("course_id"),
        title: row.get("title"),
        description: row.get("description"),
        content: row.get("content"),
        order: row.get("module_order"),
        estimated_minutes: row.get("estimated_minutes"),
        created_at: row.get("created_at"),
    }
}

fn flashcard_from_row(row: &sqlx::sqlite::SqliteRow) -> Flashcard {
    Flashcard {
        id: row.get("id"),
        module_id: row.get("module_id"),
        front: row.get("front"),
        back: row.get("back"),
        order: row.get("card_order"),
    }
}

fn assessment_from_row(row: &sqlx::sqlite::SqliteRow) -> Assessment {
    let kind: String = row.get("kind");
    let questions: Option<String> = row.get("questions");
    Assessment {
        id: row.get("id"),
        module_id: row.get("module_id"),
        kind: parse_stored(
            "assessment kind",
            &kind,
            AssessmentKind::parse,
            AssessmentKind::Quiz,
        ),
        title: row.get("title"),
        questions: questions.map(|s| parse_json_array(&s)).unwrap_or_default(),
        prompt: row.get("prompt"),
        rubric: row.get("rubric"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::test_support::temp_repo;
    use super::*;
    use crate::models::QuizQuestion;

    fn public_course(title: &str) -> NewCourse {
        NewCourse {
            title: title.to_string(),
            description: "desc".to_string(),
            content: "body".to_string(),
            owner_id: None,
            generation_status: None,
            topic_key: None,
        }
    }

    #[tokio::test]
    async fn test_course_round_trip_fields() {
        let (repo, _dir) = temp_repo().await;
        let created = repo.create_course(&public_course("Intro to Rust")).await.unwrap();

        let fetched = repo.get_course(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Intro to Rust");
        assert_eq!(fetched.description, "desc");
        assert_eq!(fetched.content, "body");
        assert!(!fetched.is_personalized);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_list_courses_counts_and_visibility() {
        let (repo, _dir) = temp_repo().await;
        let course = repo.create_course(&public_course("Public")).await.unwrap();
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
        for order in 0..2 {
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
            .unwrap();
        }

        let mut private = public_course("Mine");
        private.owner_id = Some("owner".into());
        repo.create_course(&private).await.unwrap();

        let anonymous = repo.list_courses(None).await.unwrap();
        assert_eq!(anonymous.len(), 1);
        assert_eq!(anonymous[0].tier_count, 1);
        assert_eq!(anonymous[0].module_count, 2);

        let owner = repo.list_courses(Some("owner")).await.unwrap();
        assert_eq!(owner.len(), 2);
        let stranger = repo.list_courses(Some("someone-else")).await.unwrap();
        assert_eq!(stranger.len(), 1);
    }

    #[tokio::test]
    async fn test_claim_tier_only_once() {
        let (repo, _dir) = temp_repo().await;
        let course = repo.create_course(&public_course("C")).await.unwrap();
        let tier = repo
            .create_tier(&NewTier {
                course_id: course.id.clone(),
                level: TierLevel::Intermediate,
                title: "Mid".into(),
                description: String::new(),
                generation_status: TierStatus::Locked,
                planned_modules: Vec::new(),
            })
            .await
            .unwrap();

        assert!(repo.claim_tier_for_generation(&tier.id).await.unwrap());
        assert!(!repo.claim_tier_for_generation(&tier.id).await.unwrap());

        let reread = repo
            .get_tier_by_level(&course.id, TierLevel::Intermediate)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reread.generation_status, TierStatus::Generating);
    }

    #[tokio::test]
    async fn test_assessment_questions_persist() {
        let (repo, _dir) = temp_repo().await;
        let questions = vec![QuizQuestion {
            question: "2 + 2?".into(),
            options: vec!["3".into(), "4".into()],
            correct_index: 1,
            explanation: None,
        }];
        let created = repo
            .create_assessment(&NewAssessment {
                module_id: "m1".into(),
                kind: AssessmentKind::Quiz,
                title: "Quiz".into(),
                questions: questions.clone(),
                prompt: None,
                rubric: None,
            })
            .await
            .unwrap();

        let fetched = repo.get_assessment(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.kind, AssessmentKind::Quiz);
        assert_eq!(fetched.questions, questions);
    }

    #[tokio::test]
    async fn test_delete_tier_modules_cascades() {
        let (repo, _dir) = temp_repo().await;
        let module = repo
            .create_module(&NewModule {
                tier_id: "t1".into(),
                course_id: "c1".into(),
                title: "M".into(),
                description: String::new(),
                content: "x".into(),
                order: 0,
                estimated_minutes: 5,
            })
            .await
            .unwrap();
        repo.create_flashcard(&module.id, "front", "back", 0)
            .await
            .unwrap();

        assert_eq!(repo.delete_tier_modules("t1").await.unwrap(), 1);
        assert!(repo.get_module(&module.id).await.unwrap().is_none());
        assert!(repo.list_flashcards(&module.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_stored_values_fall_back() {
        let (repo, _dir) = temp_repo().await;
        let course = repo.create_course(&public_course("C")).await.unwrap();
        repo.create_tier(&NewTier {
            course_id: course.id.clone(),
            level: TierLevel::Advanced,
            title: "Deep".into(),
            description: String::new(),
            generation_status: TierStatus::Completed,
            planned_modules: Vec::new(),
        })
        .await
        .unwrap();

        sqlx::query("UPDATE tiers SET generation_status = 'paused', planned_modules = 'not json'")
            .execute(&repo.pool)
            .await
            .unwrap();

        let tiers = repo.list_tiers(&course.id).await.unwrap();
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].level, TierLevel::Advanced);
        assert_eq!(tiers[0].generation_status, TierStatus::Locked);
        assert!(tiers[0].planned_modules.is_empty());
    }

    #[tokio::test]
    async fn test_only_completed_personalized_course_is_reused() {
        let (repo, _dir) = temp_repo().await;
        let course = repo
            .create_course(&NewCourse {
                title: "Biology Path".to_string(),
                description: String::new(),
                content: String::new(),
                owner_id: Some("u1".to_string()),
                generation_status: Some(CourseStatus::Generating),
                topic_key: Some("biology".to_string()),
            })
            .await
            .unwrap();

        assert!(repo
            .find_personalized_course("u1", "biology")
            .await
            .unwrap()
            .is_none());

        repo.set_course_status(&course.id, CourseStatus::Completed)
            .await
            .unwrap();
        let found = repo
            .find_personalized_course("u1", "biology")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, course.id);
        assert!(repo
            .find_personalized_course("u2", "biology")
            .await
            .unwrap()
            .is_none());
    }
}
