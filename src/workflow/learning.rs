//! Assessment grading, module progress and flashcard reviews.

use chrono::Utc;

use super::CourseWorkflow;
use crate::errors::AppError;
use crate::models::{
    Assessment, AssessmentKind, Course, FlashcardProgress, Module, NewNotification,
    NewSubmission, NewUnderstandingCheck, NotificationKind, Progress, SubmissionResult,
    SubmitAssessmentRequest, TierStatus, UpdateProgressRequest, User,
};
use crate::progress::{normalize_progress, ReviewState};

/// Minimum score that passes a quiz or understanding check.
pub const QUIZ_PASS_SCORE: i32 = 70;

/// Outcome of a locally scored quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
    pub score: i32,
    pub passed: bool,
}

/// Score a quiz locally: `round(100 * correct / total)`.
pub fn score_quiz(assessment: &Assessment, answers: &[usize]) -> Result<QuizScore, AppError> {
    if assessment.kind != AssessmentKind::Quiz {
        return Err(AppError::BadRequest(format!(
            "Assessment {} is not a quiz",
            assessment.id
        )));
    }
    let total = assessment.questions.len();
    if total == 0 {
        return Err(AppError::BadRequest(format!(
            "Assessment {} has no questions",
            assessment.id
        )));
    }
    if answers.len() != total {
        return Err(AppError::Validation(format!(
            "Expected {} answers, got {}",
            total,
            answers.len()
        )));
    }

    let correct = assessment
        .questions
        .iter()
        .zip(answers)
        .filter(|(q, a)| q.correct_index == **a)
        .count();
    let score = ((correct as f64 * 100.0) / total as f64).round() as i32;
    Ok(QuizScore {
        correct,
        total,
        score,
        passed: score >= QUIZ_PASS_SCORE,
    })
}

impl CourseWorkflow<'_> {
    /// Grade a quiz or an understanding check and store the submission.
    pub async fn submit_assessment(
        &self,
        user: &User,
        assessment_id: &str,
        req: &SubmitAssessmentRequest,
    ) -> Result<SubmissionResult, AppError> {
        let assessment = self
            .repo
            .get_assessment(assessment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Assessment {} not found", assessment_id))
            })?;
        let (module, _) = self.module_for(user, &assessment.module_id).await?;

        match assessment.kind {
            AssessmentKind::Quiz => {
                let answers = req.answers.as_deref().ok_or_else(|| {
                    AppError::Validation("answers are required for a quiz".to_string())
                })?;
                let result = score_quiz(&assessment, answers)?;
                let submission = self
                    .repo
                    .create_submission(&NewSubmission {
                        assessment_id: assessment.id.clone(),
                        user_id: user.id.clone(),
                        answers: Some(answers.to_vec()),
                        response: None,
                        score: result.score,
                        passed: result.passed,
                        feedback: Some(format!("{} of {} correct", result.correct, result.total)),
                    })
                    .await?;
                Ok(SubmissionResult {
                    submission,
                    understanding_check: None,
                })
            }
            AssessmentKind::UnderstandingCheck => {
                let response = req
                    .response
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| {
                        AppError::Validation(
                            "response is required for an understanding check".to_string(),
                        )
                    })?;
                let prompt = assessment.prompt.as_deref().unwrap_or(&assessment.title);

                let evaluation = self
                    .generator
                    .evaluate_understanding(prompt, response)
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            "Understanding evaluation failed for assessment {}: {}",
                            assessment.id,
                            e
                        );
                        AppError::from(e)
                    })?
                    .normalized();

                let check = self
                    .repo
                    .create_understanding_check(&NewUnderstandingCheck {
                        user_id: user.id.clone(),
                        module_id: module.id.clone(),
                        assessment_id: assessment.id.clone(),
                        response: response.to_string(),
                        score: evaluation.score,
                        feedback: evaluation.feedback.clone(),
                        improvement_areas: evaluation.improvement_areas.clone(),
                    })
                    .await?;
                let submission = self
                    .repo
                    .create_submission(&NewSubmission {
                        assessment_id: assessment.id.clone(),
                        user_id: user.id.clone(),
                        answers: None,
                        response: Some(response.to_string()),
                        score: evaluation.score,
                        passed: evaluation.score >= QUIZ_PASS_SCORE,
                        feedback: Some(evaluation.feedback),
                    })
                    .await?;
                Ok(SubmissionResult {
                    submission,
                    understanding_check: Some(check),
                })
            }
        }
    }

    /// Write the user's progress on a module.
    ///
    /// The first completion may emit `tier_unlocked` and `course_completed`
    /// notifications, each at most once.
    pub async fn record_module_progress(
        &self,
        user: &User,
        module_id: &str,
        req: &UpdateProgressRequest,
    ) -> Result<Progress, AppError> {
        let (module, course) = self.module_for(user, module_id).await?;
        let was_completed = self
            .repo
            .get_module_progress(&user.id, &module.id)
            .await?
            .is_some_and(|p| p.completed);

        let percent = normalize_progress(req.completed, req.progress_percent);
        let progress = self
            .repo
            .upsert_module_progress(&user.id, &module, req.completed, percent)
            .await?;

        if req.completed && !was_completed {
            if let Err(e) = self.after_module_completed(user, &module, &course).await {
                tracing::warn!(
                    "Completion follow-up failed for module {} and user {}: {}",
                    module.id,
                    user.id,
                    e
                );
            }
        }

        Ok(progress)
    }

    async fn after_module_completed(
        &self,
        user: &User,
        module: &Module,
        course: &Course,
    ) -> Result<(), AppError> {
        let tier_modules = self.repo.list_modules(&module.tier_id).await?;
        let mut tier_done = true;
        for m in &tier_modules {
            let done = self
                .repo
                .get_module_progress(&user.id, &m.id)
                .await?
                .is_some_and(|p| p.completed);
            if !done {
                tier_done = false;
                break;
            }
        }

        if tier_done {
            let tiers = self.repo.list_tiers(&course.id).await?;
            let next = tiers
                .iter()
                .find(|t| t.id == module.tier_id)
                .and_then(|t| t.level.next())
                .and_then(|level| tiers.iter().find(|t| t.level == level));
            if let Some(next) = next.filter(|t| t.generation_status == TierStatus::Locked) {
                let title = format!("{} unlocked", next.title);
                let seen = self
                    .repo
                    .has_notification(
                        &user.id,
                        NotificationKind::TierUnlocked,
                        &course.id,
                        Some(&title),
                    )
                    .await?;
                if !seen {
                    self.notify(NewNotification {
                        user_id: user.id.clone(),
                        kind: NotificationKind::TierUnlocked,
                        title,
                        message: format!(
                            "You can now generate the {} tier of \"{}\".",
                            next.level.as_str(),
                            course.title
                        ),
                        course_id: Some(course.id.clone()),
                    })
                    .await;
                }
            }
        }

        let course_progress = self.repo.course_progress(&user.id, &course.id).await?;
        if course_progress.total_modules > 0
            && course_progress.completed_modules == course_progress.total_modules
            && !self
                .repo
                .has_notification(&user.id, NotificationKind::CourseCompleted, &course.id, None)
                .await?
        {
            self.notify(NewNotification {
                user_id: user.id.clone(),
                kind: NotificationKind::CourseCompleted,
                title: "Course completed".to_string(),
                message: format!("You finished every module of \"{}\".", course.title),
                course_id: Some(course.id.clone()),
            })
            .await;
        }

        Ok(())
    }

    /// Apply one SM-2 review to the user's schedule for a flashcard.
    pub async fn review_flashcard(
        &self,
        user: &User,
        flashcard_id: &str,
        quality: u8,
    ) -> Result<FlashcardProgress, AppError> {
        if quality > 5 {
            return Err(AppError::Validation(
                "quality must be between 0 and 5".to_string(),
            ));
        }
        let flashcard = self
            .repo
            .get_flashcard(flashcard_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flashcard {} not found", flashcard_id)))?;
        self.module_for(user, &flashcard.module_id).await?;

        let previous = self
            .repo
            .get_flashcard_progress(&user.id, &flashcard.id)
            .await?;
        let state = previous
            .as_ref()
            .map(|p| ReviewState {
                ease_factor: p.ease_factor,
                interval_days: p.interval_days,
                repetitions: p.repetitions,
            })
            .unwrap_or_default()
            .review(quality);

        let now = Utc::now();
        self.repo
            .upsert_flashcard_progress(&FlashcardProgress {
                id: previous
                    .map(|p| p.id)
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                user_id: user.id.clone(),
                flashcard_id: flashcard.id,
                ease_factor: state.ease_factor,
                interval_days: state.interval_days,
                repetitions: state.repetitions,
                next_review_at: state.next_review_at(now).to_rfc3339(),
                last_reviewed_at: now.to_rfc3339(),
            })
            .await
    }

    /// Load a module and its course, checking the user may see the course.
    pub(super) async fn module_for(
        &self,
        user: &User,
        module_id: &str,
    ) -> Result<(Module, Course), AppError> {
        let module = self
            .repo
            .get_module(module_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Module {} not found", module_id)))?;
        let course = self.course_for(user, &module.course_id).await?;
        Ok((module, course))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuizQuestion;

    fn quiz(correct: &[usize]) -> Assessment {
        Assessment {
            id: "a1".into(),
            module_id: "m1".into(),
            kind: AssessmentKind::Quiz,
            title: "Quiz".into(),
            questions: correct
                .iter()
                .map(|&c| QuizQuestion {
                    question: "?".into(),
                    options: vec!["a".into(), "b".into(), "c".into()],
                    correct_index: c,
                    explanation: None,
                })
                .collect(),
            prompt: None,
            rubric: None,
            created_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_score_quiz_rounds_and_passes() {
        let assessment = quiz(&[0, 1, 2]);
        let partial = score_quiz(&assessment, &[0, 1, 0]).unwrap();
        assert_eq!((partial.correct, partial.score, partial.passed), (2, 67, false));
        let full = score_quiz(&assessment, &[0, 1, 2]).unwrap();
        assert_eq!((full.score, full.passed), (100, true));
    }

    #[test]
    fn test_score_quiz_pass_threshold() {
        let assessment = quiz(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let answers = [0, 0, 0, 0, 0, 0, 0, 1, 1, 1];
        let result = score_quiz(&assessment, &answers).unwrap();
        assert_eq!((result.score, result.passed), (70, true));
    }

    #[test]
    fn test_score_quiz_length_mismatch() {
        let assessment = quiz(&[0, 1]);
        let err = score_quiz(&assessment, &[0]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_score_quiz_rejects_understanding_check() {
        let mut assessment = quiz(&[0]);
        assessment.kind = AssessmentKind::UnderstandingCheck;
        assert!(matches!(
            score_quiz(&assessment, &[0]),
            Err(AppError::BadRequest(_))
        ));
    }
}
