//! Deterministic generator for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{
    ContentGenerator, CourseStructure, GeneratedFlashcard, GeneratedModule, GenerationError,
    ModuleOutline, TierOutline, UnderstandingEvaluation, UnderstandingPrompt,
};
use crate::models::{QuizQuestion, TierLevel};

pub struct ScriptedGenerator {
    modules_per_tier: usize,
    module_calls: AtomicUsize,
    /// 1-based `module_content` call that fails; 0 never fails.
    fail_on_module_call: AtomicUsize,
    pub evaluation_score: i32,
}

impl ScriptedGenerator {
    pub fn new(modules_per_tier: usize) -> Self {
        Self {
            modules_per_tier,
            module_calls: AtomicUsize::new(0),
            fail_on_module_call: AtomicUsize::new(0),
            evaluation_score: 85,
        }
    }

    /// Make the `n`-th module generation from now fail.
    pub fn fail_module_in(&self, n: usize) {
        let done = self.module_calls.load(Ordering::SeqCst);
        self.fail_on_module_call.store(done + n, Ordering::SeqCst);
    }

    pub fn module_calls(&self) -> usize {
        self.module_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn course_structure(
        &self,
        topics: &[String],
        _goals: Option<&str>,
    ) -> Result<CourseStructure, GenerationError> {
        let subject = topics.join(" & ");
        let tiers = TierLevel::ALL
            .iter()
            .map(|&level| TierOutline {
                level,
                title: format!("{} {}", subject, level.as_str()),
                description: format!("{} material", level.as_str()),
                modules: (1..=self.modules_per_tier)
                    .map(|i| ModuleOutline {
                        title: format!("{} {} part {}", subject, level.as_str(), i),
                        description: format!("Part {}", i),
                    })
                    .collect(),
            })
            .collect();
        CourseStructure {
            title: format!("{} Path", subject),
            description: format!("A learning path for {}", subject),
            tiers,
        }
        .normalized()
    }

    async fn module_content(
        &self,
        _course_title: &str,
        _tier: &TierOutline,
        module: &ModuleOutline,
    ) -> Result<GeneratedModule, GenerationError> {
        let call = self.module_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_module_call.load(Ordering::SeqCst) {
            return Err(GenerationError::Api {
                status: 500,
                body: "scripted failure".to_string(),
            });
        }
        Ok(GeneratedModule {
            content: format!("# {}\n\nContent.", module.title),
            estimated_minutes: 12,
            flashcards: vec![
                GeneratedFlashcard {
                    front: format!("What is {}?", module.title),
                    back: "An answer".to_string(),
                },
                GeneratedFlashcard {
                    front: "Why?".to_string(),
                    back: "Because".to_string(),
                },
            ],
        })
    }

    async fn quiz(
        &self,
        module_title: &str,
        _content: &str,
    ) -> Result<Vec<QuizQuestion>, GenerationError> {
        Ok((0..3)
            .map(|i| QuizQuestion {
                question: format!("{} question {}", module_title, i + 1),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_index: i,
                explanation: None,
            })
            .collect())
    }

    async fn understanding_prompt(
        &self,
        module_title: &str,
        _content: &str,
    ) -> Result<UnderstandingPrompt, GenerationError> {
        Ok(UnderstandingPrompt {
            prompt: format!("Explain {} in your own words.", module_title),
            rubric: "Mentions the key idea".to_string(),
        })
    }

    async fn evaluate_understanding(
        &self,
        _prompt: &str,
        _response: &str,
    ) -> Result<UnderstandingEvaluation, GenerationError> {
        Ok(UnderstandingEvaluation {
            score: self.evaluation_score,
            feedback: "Good explanation".to_string(),
            improvement_areas: vec!["Add an example".to_string()],
        })
    }
}
