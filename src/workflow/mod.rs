//! Tiered course generation.
//!
//! A course is generated one tier at a time. The first tier is built together
//! with the course; later tiers keep their module outlines and are generated
//! on request once the previous tier is completed.

mod learning;

use crate::db::Repository;
use crate::errors::AppError;
use crate::generation::{ContentGenerator, CourseStructure, TierOutline};
use crate::models::{
    AssessmentKind, Course, CourseDetail, CourseStatus, GeneratedCourse, Module, NewAssessment,
    NewCourse, NewModule, NewNotification, NewTier, NotificationKind, Tier, TierLevel, TierStatus,
    TierWithModules, User, UserRole,
};
use crate::search::SearchIndex;

/// Trim topics, drop empty ones and case-insensitive duplicates.
pub fn clean_topics(topics: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    let mut cleaned = Vec::new();
    for topic in topics {
        let trimmed = topic.trim();
        if trimmed.is_empty() {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if seen.contains(&lower) {
            continue;
        }
        seen.push(lower);
        cleaned.push(trimmed.to_string());
    }
    cleaned
}

/// Order-insensitive key identifying a set of topics.
pub fn topic_key(topics: &[String]) -> String {
    let mut keys: Vec<String> = clean_topics(topics)
        .iter()
        .map(|t| t.to_lowercase())
        .collect();
    keys.sort();
    keys.join("|")
}

/// Generation and learning operations over one repository and generator.
pub struct CourseWorkflow<'a> {
    repo: &'a Repository,
    generator: &'a dyn ContentGenerator,
    search: &'a SearchIndex,
}

impl<'a> CourseWorkflow<'a> {
    pub fn new(
        repo: &'a Repository,
        generator: &'a dyn ContentGenerator,
        search: &'a SearchIndex,
    ) -> Self {
        Self {
            repo,
            generator,
            search,
        }
    }

    /// Create a personalized course for `user`, or return the one they
    /// already generated for the same topics.
    pub async fn generate_from_interests(
        &self,
        user: &User,
        topics: &[String],
        goals: Option<&str>,
    ) -> Result<GeneratedCourse, AppError> {
        let topics = clean_topics(topics);
        if topics.is_empty() {
            return Err(AppError::Validation(
                "At least one topic is required".to_string(),
            ));
        }
        let goals = goals.map(str::trim).filter(|g| !g.is_empty());
        let key = topic_key(&topics);

        if let Some(existing) = self.repo.find_personalized_course(&user.id, &key).await? {
            tracing::info!(
                "User {} already has course {} for topics '{}'",
                user.id,
                existing.id,
                key
            );
            let detail = self.load_detail(&existing.id).await?;
            return Ok(GeneratedCourse {
                detail,
                created: false,
            });
        }

        self.repo.add_interests(&user.id, &topics).await?;

        let result = self.build_personalized(user, &topics, goals, &key).await;
        match result {
            Ok(detail) => Ok(GeneratedCourse {
                detail,
                created: true,
            }),
            Err(e) => {
                tracing::error!(
                    "Course generation failed for user {} (topics '{}'): {}",
                    user.id,
                    key,
                    e
                );
                Err(e)
            }
        }
    }

    async fn build_personalized(
        &self,
        user: &User,
        topics: &[String],
        goals: Option<&str>,
        key: &str,
    ) -> Result<CourseDetail, AppError> {
        let structure = self.generator.course_structure(topics, goals).await?;

        let course = self
            .repo
            .create_course(&NewCourse {
                title: structure.title.clone(),
                description: structure.description.clone(),
                content: goals.unwrap_or_default().to_string(),
                owner_id: Some(user.id.clone()),
                generation_status: Some(CourseStatus::Generating),
                topic_key: Some(key.to_string()),
            })
            .await?;
        tracing::info!("Created personalized course {} for user {}", course.id, user.id);

        self.persist_tiers(&course, &structure).await?;
        self.repo
            .set_course_status(&course.id, CourseStatus::Completed)
            .await?;
        self.repo.enroll(&user.id, &course.id).await?;

        self.notify(NewNotification {
            user_id: user.id.clone(),
            kind: NotificationKind::CourseCreated,
            title: "Your course is ready".to_string(),
            message: format!("\"{}\" has been created for you.", course.title),
            course_id: Some(course.id.clone()),
        })
        .await;

        let detail = self.load_detail(&course.id).await?;
        self.reindex(&detail).await;
        Ok(detail)
    }

    /// Generate the tier structure of an existing course that has none.
    pub async fn generate_tiers(
        &self,
        user: &User,
        course_id: &str,
    ) -> Result<CourseDetail, AppError> {
        let course = self.course_for(user, course_id).await?;
        let is_owner = course.owner_id.as_deref() == Some(user.id.as_str());
        if user.role != UserRole::Educator && !is_owner {
            return Err(AppError::Forbidden(
                "Only educators or the course owner can generate tiers".to_string(),
            ));
        }
        if !self.repo.list_tiers(&course.id).await?.is_empty() {
            return Err(AppError::Conflict(format!(
                "Course {} already has tiers",
                course.id
            )));
        }

        let result = async {
            let structure = self.structure_for_course(&course).await?;
            self.persist_tiers(&course, &structure).await?;
            self.repo
                .set_course_status(&course.id, CourseStatus::Completed)
                .await?;
            self.load_detail(&course.id).await
        }
        .await;

        match result {
            Ok(detail) => {
                self.reindex(&detail).await;
                Ok(detail)
            }
            Err(e) => {
                tracing::error!("Tier generation failed for course {}: {}", course.id, e);
                Err(e)
            }
        }
    }

    /// Generate the modules of one locked tier.
    ///
    /// All preconditions are checked before anything is written. A failure
    /// inside the module loop removes this attempt's modules and returns the
    /// tier to `locked`.
    pub async fn generate_tier(
        &self,
        user: &User,
        course_id: &str,
        level: TierLevel,
    ) -> Result<TierWithModules, AppError> {
        let course = self.course_for(user, course_id).await?;

        let tier = self
            .repo
            .get_tier_by_level(&course.id, level)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Tier {} not found for course {}",
                    level.as_str(),
                    course.id
                ))
            })?;

        match tier.generation_status {
            TierStatus::Completed => {
                return Err(AppError::Conflict(format!(
                    "Tier {} is already generated",
                    level.as_str()
                )))
            }
            TierStatus::Generating => {
                return Err(AppError::Conflict(format!(
                    "Tier {} is already being generated",
                    level.as_str()
                )))
            }
            TierStatus::Locked => {}
        }

        if let Some(previous) = level.previous() {
            let unlocked = self
                .repo
                .get_tier_by_level(&course.id, previous)
                .await?
                .is_some_and(|t| t.generation_status == TierStatus::Completed);
            if !unlocked {
                return Err(AppError::BadRequest(format!(
                    "Tier {} must be completed before {}",
                    previous.as_str(),
                    level.as_str()
                )));
            }
        }

        if !self.repo.claim_tier_for_generation(&tier.id).await? {
            return Err(AppError::Conflict(format!(
                "Tier {} is already being generated",
                level.as_str()
            )));
        }
        tracing::info!(
            "Generating tier {} of course {} for user {}",
            level.as_str(),
            course.id,
            user.id
        );

        let modules = match self.generate_claimed_tier(&course, &tier).await {
            Ok(modules) => modules,
            Err(e) => {
                tracing::error!(
                    "Generation of tier {} for course {} failed: {}",
                    level.as_str(),
                    course.id,
                    e
                );
                self.release_tier(&tier).await;
                return Err(e);
            }
        };

        self.repo
            .set_tier_status(&tier.id, TierStatus::Completed)
            .await?;
        // A course whose first build failed is finished by this tier
        if course.generation_status == Some(CourseStatus::Generating) {
            self.repo
                .set_course_status(&course.id, CourseStatus::Completed)
                .await?;
        }

        self.notify(NewNotification {
            user_id: user.id.clone(),
            kind: NotificationKind::TierGenerated,
            title: format!("{} is ready", tier.title),
            message: format!(
                "{} new modules are available in \"{}\".",
                modules.len(),
                course.title
            ),
            course_id: Some(course.id.clone()),
        })
        .await;

        if let Some(detail) = self.repo.get_course_detail(&course.id).await? {
            self.reindex(&detail).await;
        }

        let tier = self
            .repo
            .get_tier_by_level(&course.id, level)
            .await?
            .ok_or_else(|| AppError::Internal("Tier disappeared after generation".to_string()))?;
        Ok(TierWithModules { tier, modules })
    }

    async fn generate_claimed_tier(
        &self,
        course: &Course,
        tier: &Tier,
    ) -> Result<Vec<Module>, AppError> {
        let outline = if tier.planned_modules.is_empty() {
            let structure = self.structure_for_course(course).await?;
            structure
                .tiers
                .into_iter()
                .find(|t| t.level == tier.level)
                .ok_or_else(|| {
                    AppError::Generation(format!(
                        "Generated structure has no {} tier",
                        tier.level.as_str()
                    ))
                })?
        } else {
            TierOutline {
                level: tier.level,
                title: tier.title.clone(),
                description: tier.description.clone(),
                modules: tier.planned_modules.clone(),
            }
        };
        self.build_modules(&course.title, tier, &outline).await
    }

    async fn release_tier(&self, tier: &Tier) {
        match self.repo.delete_tier_modules(&tier.id).await {
            Ok(removed) if removed > 0 => {
                tracing::info!("Removed {} partial modules from tier {}", removed, tier.id)
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to remove partial modules of tier {}: {}", tier.id, e),
        }
        if let Err(e) = self.repo.set_tier_status(&tier.id, TierStatus::Locked).await {
            tracing::warn!("Failed to reset tier {} to locked: {}", tier.id, e);
        }
    }

    async fn structure_for_course(&self, course: &Course) -> Result<CourseStructure, AppError> {
        let description = course.description.trim();
        let goals = (!description.is_empty()).then_some(description);
        Ok(self
            .generator
            .course_structure(&[course.title.clone()], goals)
            .await?)
    }

    /// Persist the three tiers; only the first gets modules now.
    ///
    /// Every tier is written before any module. If the first tier fails it is
    /// released back to `locked` with its plan kept, so `generate_tier` can
    /// finish it later.
    async fn persist_tiers(
        &self,
        course: &Course,
        structure: &CourseStructure,
    ) -> Result<(), AppError> {
        let mut first = None;
        for outline in &structure.tiers {
            let is_first = outline.level == TierLevel::Start;
            let tier = self
                .repo
                .create_tier(&NewTier {
                    course_id: course.id.clone(),
                    level: outline.level,
                    title: outline.title.clone(),
                    description: outline.description.clone(),
                    generation_status: if is_first {
                        TierStatus::Generating
                    } else {
                        TierStatus::Locked
                    },
                    planned_modules: outline.modules.clone(),
                })
                .await?;
            if is_first {
                first = Some((tier, outline));
            }
        }

        let Some((tier, outline)) = first else {
            return Err(AppError::Generation(
                "Generated structure has no start tier".to_string(),
            ));
        };
        if let Err(e) = self.build_modules(&course.title, &tier, outline).await {
            self.release_tier(&tier).await;
            return Err(e);
        }
        self.repo
            .set_tier_status(&tier.id, TierStatus::Completed)
            .await?;
        Ok(())
    }

    /// Sequentially generate every module of a tier with its flashcards,
    /// quiz and understanding check.
    async fn build_modules(
        &self,
        course_title: &str,
        tier: &Tier,
        outline: &TierOutline,
    ) -> Result<Vec<Module>, AppError> {
        let mut modules = Vec::with_capacity(outline.modules.len());

        for (order, module_outline) in outline.modules.iter().enumerate() {
            let generated = self
                .generator
                .module_content(course_title, outline, module_outline)
                .await?;

            let module = self
                .repo
                .create_module(&NewModule {
                    tier_id: tier.id.clone(),
                    course_id: tier.course_id.clone(),
                    title: module_outline.title.clone(),
                    description: module_outline.description.clone(),
                    content: generated.content,
                    order: order as i32,
                    estimated_minutes: generated.estimated_minutes,
                })
                .await?;

            for (card_order, card) in generated.flashcards.iter().enumerate() {
                self.repo
                    .create_flashcard(&module.id, &card.front, &card.back, card_order as i32)
                    .await?;
            }

            let questions = self.generator.quiz(&module.title, &module.content).await?;
            self.repo
                .create_assessment(&NewAssessment {
                    module_id: module.id.clone(),
                    kind: AssessmentKind::Quiz,
                    title: format!("{} quiz", module.title),
                    questions,
                    prompt: None,
                    rubric: None,
                })
                .await?;

            let check = self
                .generator
                .understanding_prompt(&module.title, &module.content)
                .await?;
            self.repo
                .create_assessment(&NewAssessment {
                    module_id: module.id.clone(),
                    kind: AssessmentKind::UnderstandingCheck,
                    title: format!("Explain {}", module.title),
                    questions: Vec::new(),
                    prompt: Some(check.prompt),
                    rubric: Some(check.rubric),
                })
                .await?;

            tracing::debug!("Generated module {} ({})", module.id, module.title);
            modules.push(module);
        }

        Ok(modules)
    }

    /// Load a course the user may see.
    async fn course_for(&self, user: &User, course_id: &str) -> Result<Course, AppError> {
        let course = self
            .repo
            .get_course(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))?;
        if !course.visible_to(Some(&user.id)) {
            return Err(AppError::Forbidden(
                "This course belongs to another user".to_string(),
            ));
        }
        Ok(course)
    }

    async fn load_detail(&self, course_id: &str) -> Result<CourseDetail, AppError> {
        self.repo
            .get_course_detail(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))
    }

    /// Side-effect notifications never fail the request.
    async fn notify(&self, notification: NewNotification) {
        if let Err(e) = self.repo.create_notification(&notification).await {
            tracing::warn!(
                "Failed to create {} notification for user {}: {}",
                notification.kind.as_str(),
                notification.user_id,
                e
            );
        }
    }

    async fn reindex(&self, detail: &CourseDetail) {
        if let Err(e) = self.search.index_course(detail).await {
            tracing::warn!("Failed to index course {}: {}", detail.course.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_repo;
    use crate::generation::fake::ScriptedGenerator;
    use crate::models::UserProfile;
    use tempfile::TempDir;

    async fn student(repo: &Repository, clerk_id: &str) -> User {
        repo.ensure_local_user(clerk_id, &UserProfile::default())
            .await
            .unwrap()
            .0
    }

    #[test]
    fn test_clean_topics() {
        let topics = vec![
            " Machine Learning ".to_string(),
            String::new(),
            "machine learning".to_string(),
            "Statistics".to_string(),
        ];
        assert_eq!(clean_topics(&topics), vec!["Machine Learning", "Statistics"]);
    }

    #[test]
    fn test_topic_key_ignores_order_and_case() {
        let a = topic_key(&["Statistics".to_string(), "Machine Learning".to_string()]);
        let b = topic_key(&["machine learning ".to_string(), "STATISTICS".to_string()]);
        assert_eq!(a, b);
        assert_eq!(a, "machine learning|statistics");
    }

    #[tokio::test]
    async fn test_generate_from_interests_builds_first_tier() {
        let (repo, _dir) = temp_repo().await;
        let index_dir = TempDir::new().unwrap();
        let search = SearchIndex::open(index_dir.path()).unwrap();
        let generator = ScriptedGenerator::new(2);
        let workflow = CourseWorkflow::new(&repo, &generator, &search);
        let user = student(&repo, "user_ml").await;

        let generated = workflow
            .generate_from_interests(&user, &["Machine Learning".to_string()], None)
            .await
            .unwrap();
        assert!(generated.created);

        let detail = generated.detail;
        assert!(detail.course.is_personalized);
        assert_eq!(detail.course.generation_status, Some(CourseStatus::Completed));
        assert_eq!(detail.tiers.len(), 3);
        assert_eq!(detail.tiers[0].tier.generation_status, TierStatus::Completed);
        assert_eq!(detail.tiers[0].modules.len(), 2);
        assert!(detail.tiers[1..]
            .iter()
            .all(|t| t.tier.generation_status == TierStatus::Locked && t.modules.is_empty()));
        assert_eq!(detail.tiers[1].tier.planned_modules.len(), 2);

        let module = &detail.tiers[0].modules[0];
        let assessments = repo.list_assessments(&module.id).await.unwrap();
        assert_eq!(assessments.len(), 2);
        assert_eq!(repo.list_flashcards(&module.id).await.unwrap().len(), 2);

        assert!(repo.get_enrollment(&user.id, &detail.course.id).await.unwrap().is_some());
        assert!(repo
            .has_notification(
                &user.id,
                NotificationKind::CourseCreated,
                &detail.course.id,
                None
            )
            .await
            .unwrap());

        let again = workflow
            .generate_from_interests(&user, &[" machine learning".to_string()], None)
            .await
            .unwrap();
        assert!(!again.created);
        assert_eq!(again.detail.course.id, detail.course.id);
    }

    #[tokio::test]
    async fn test_generate_tier_requires_previous_tier() {
        let (repo, _dir) = temp_repo().await;
        let index_dir = TempDir::new().unwrap();
        let search = SearchIndex::open(index_dir.path()).unwrap();
        let generator = ScriptedGenerator::new(2);
        let workflow = CourseWorkflow::new(&repo, &generator, &search);
        let user = student(&repo, "user_order").await;

        let course = workflow
            .generate_from_interests(&user, &["Rust".to_string()], None)
            .await
            .unwrap()
            .detail
            .course;

        let err = workflow
            .generate_tier(&user, &course.id, TierLevel::Advanced)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let advanced = repo
            .get_tier_by_level(&course.id, TierLevel::Advanced)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(advanced.generation_status, TierStatus::Locked);
        assert!(repo.list_modules(&advanced.id).await.unwrap().is_empty());

        let generated = workflow
            .generate_tier(&user, &course.id, TierLevel::Intermediate)
            .await
            .unwrap();
        assert_eq!(generated.tier.generation_status, TierStatus::Completed);
        assert_eq!(generated.modules.len(), 2);

        let err = workflow
            .generate_tier(&user, &course.id, TierLevel::Intermediate)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_failed_tier_generation_is_rolled_back() {
        let (repo, _dir) = temp_repo().await;
        let index_dir = TempDir::new().unwrap();
        let search = SearchIndex::open(index_dir.path()).unwrap();
        let generator = ScriptedGenerator::new(3);
        let workflow = CourseWorkflow::new(&repo, &generator, &search);
        let user = student(&repo, "user_fail").await;

        let course = workflow
            .generate_from_interests(&user, &["Chemistry".to_string()], None)
            .await
            .unwrap()
            .detail
            .course;

        generator.fail_module_in(2);
        let err = workflow
            .generate_tier(&user, &course.id, TierLevel::Intermediate)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));

        let tier = repo
            .get_tier_by_level(&course.id, TierLevel::Intermediate)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tier.generation_status, TierStatus::Locked);
        assert!(repo.list_modules(&tier.id).await.unwrap().is_empty());

        let retried = workflow
            .generate_tier(&user, &course.id, TierLevel::Intermediate)
            .await
            .unwrap();
        assert_eq!(retried.modules.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_course_generation_can_be_retried() {
        let (repo, _dir) = temp_repo().await;
        let index_dir = TempDir::new().unwrap();
        let search = SearchIndex::open(index_dir.path()).unwrap();
        let generator = ScriptedGenerator::new(2);
        let workflow = CourseWorkflow::new(&repo, &generator, &search);
        let user = student(&repo, "user_retry").await;
        let topics = ["Biology".to_string()];

        generator.fail_module_in(2);
        let err = workflow
            .generate_from_interests(&user, &topics, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
        assert_eq!(generator.module_calls(), 2);

        // The attempt stays behind as an unfinished course
        let courses = repo.list_courses(Some(&user.id)).await.unwrap();
        assert_eq!(courses.len(), 1);
        let stale = courses[0].course.clone();
        assert_eq!(stale.generation_status, Some(CourseStatus::Generating));
        let tiers = repo.list_tiers(&stale.id).await.unwrap();
        assert_eq!(tiers.len(), 3);
        assert!(tiers.iter().all(|t| t.generation_status == TierStatus::Locked));
        assert_eq!(tiers[0].planned_modules.len(), 2);
        assert!(repo.list_modules(&tiers[0].id).await.unwrap().is_empty());

        // Retrying the same topics builds a fresh course
        let retried = workflow
            .generate_from_interests(&user, &topics, None)
            .await
            .unwrap();
        assert!(retried.created);
        assert_ne!(retried.detail.course.id, stale.id);
        assert_eq!(
            retried.detail.course.generation_status,
            Some(CourseStatus::Completed)
        );
        assert_eq!(retried.detail.tiers[0].modules.len(), 2);

        let again = workflow
            .generate_from_interests(&user, &topics, None)
            .await
            .unwrap();
        assert!(!again.created);
        assert_eq!(again.detail.course.id, retried.detail.course.id);

        // The unfinished course can still be completed tier by tier
        let start = workflow
            .generate_tier(&user, &stale.id, TierLevel::Start)
            .await
            .unwrap();
        assert_eq!(start.modules.len(), 2);
        let stale = repo.get_course(&stale.id).await.unwrap().unwrap();
        assert_eq!(stale.generation_status, Some(CourseStatus::Completed));
    }

    #[tokio::test]
    async fn test_failed_generate_tiers_leaves_start_tier_retryable() {
        let (repo, _dir) = temp_repo().await;
        let index_dir = TempDir::new().unwrap();
        let search = SearchIndex::open(index_dir.path()).unwrap();
        let generator = ScriptedGenerator::new(2);
        let workflow = CourseWorkflow::new(&repo, &generator, &search);
        let educator = student(&repo, "user_educator").await;
        let educator = repo
            .set_user_role(&educator.id, UserRole::Educator)
            .await
            .unwrap();

        let course = repo
            .create_course(&NewCourse {
                title: "Geology".to_string(),
                description: "Rocks and minerals".to_string(),
                content: String::new(),
                owner_id: None,
                generation_status: None,
                topic_key: None,
            })
            .await
            .unwrap();

        generator.fail_module_in(1);
        let err = workflow
            .generate_tiers(&educator, &course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));

        let tiers = repo.list_tiers(&course.id).await.unwrap();
        assert_eq!(tiers.len(), 3);
        assert!(tiers.iter().all(|t| t.generation_status == TierStatus::Locked));
        for tier in &tiers {
            assert!(repo.list_modules(&tier.id).await.unwrap().is_empty());
        }

        let err = workflow
            .generate_tiers(&educator, &course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let start = workflow
            .generate_tier(&educator, &course.id, TierLevel::Start)
            .await
            .unwrap();
        assert_eq!(start.tier.generation_status, TierStatus::Completed);
        assert_eq!(start.modules.len(), 2);
        assert_eq!(generator.module_calls(), 3);
    }

    #[tokio::test]
    async fn test_personalized_course_is_private() {
        let (repo, _dir) = temp_repo().await;
        let index_dir = TempDir::new().unwrap();
        let search = SearchIndex::open(index_dir.path()).unwrap();
        let generator = ScriptedGenerator::new(1);
        let workflow = CourseWorkflow::new(&repo, &generator, &search);
        let owner = student(&repo, "user_owner").await;
        let other = student(&repo, "user_other").await;

        let course = workflow
            .generate_from_interests(&owner, &["Poetry".to_string()], None)
            .await
            .unwrap()
            .detail
            .course;

        let err = workflow
            .generate_tier(&other, &course.id, TierLevel::Intermediate)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
