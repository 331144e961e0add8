//! Content generation service.
//!
//! `ContentGenerator` is the seam between the course workflow and the LLM.
//! Prompts ask for strict JSON; responses are parsed after stripping any
//! Markdown code fences the model wraps around them.

#[cfg(test)]
pub(crate) mod fake;
mod gemini;
mod prompts;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::models::ModuleOutline;
use crate::models::{QuizQuestion, TierLevel};

/// Generation client errors
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse generated content: {0}")]
    Parse(String),

    #[error("Generation service returned no content")]
    EmptyResponse,

    #[error("Generation service is not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TierOutline {
    pub level: TierLevel,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub modules: Vec<ModuleOutline>,
}

/// A three-tier learning path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseStructure {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub tiers: Vec<TierOutline>,
}

impl CourseStructure {
    /// Sort tiers into the fixed order and require exactly one of each level.
    pub fn normalized(mut self) -> Result<Self, GenerationError> {
        if self.title.trim().is_empty() {
            return Err(GenerationError::Parse("course title is empty".to_string()));
        }
        self.tiers.sort_by_key(|t| t.level);
        let levels: Vec<TierLevel> = self.tiers.iter().map(|t| t.level).collect();
        if levels != TierLevel::ALL {
            return Err(GenerationError::Parse(format!(
                "expected tiers start, intermediate, advanced; got {:?}",
                levels
            )));
        }
        for tier in &mut self.tiers {
            tier.modules.retain(|m| !m.title.trim().is_empty());
        }
        if self.tiers[0].modules.is_empty() {
            return Err(GenerationError::Parse(
                "first tier has no modules".to_string(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedFlashcard {
    pub front: String,
    pub back: String,
}

/// Full content of a module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedModule {
    pub content: String,
    #[serde(default)]
    pub estimated_minutes: i32,
    #[serde(default)]
    pub flashcards: Vec<GeneratedFlashcard>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnderstandingPrompt {
    pub prompt: String,
    #[serde(default)]
    pub rubric: String,
}

/// LLM grading of a free-text explanation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnderstandingEvaluation {
    pub score: i32,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub improvement_areas: Vec<String>,
}

/// Structured content generation backed by an LLM.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn course_structure(
        &self,
        topics: &[String],
        goals: Option<&str>,
    ) -> Result<CourseStructure, GenerationError>;

    async fn module_content(
        &self,
        course_title: &str,
        tier: &TierOutline,
        module: &ModuleOutline,
    ) -> Result<GeneratedModule, GenerationError>;

    async fn quiz(
        &self,
        module_title: &str,
        content: &str,
    ) -> Result<Vec<QuizQuestion>, GenerationError>;

    async fn understanding_prompt(
        &self,
        module_title: &str,
        content: &str,
    ) -> Result<UnderstandingPrompt, GenerationError>;

    async fn evaluate_understanding(
        &self,
        prompt: &str,
        response: &str,
    ) -> Result<UnderstandingEvaluation, GenerationError>;
}

/// Strip Markdown code fences and any prose around the outermost JSON value.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // drop the info string (e.g. `json`) up to the first newline
        text = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        text = text.trim_end();
        text = text.strip_suffix("```").unwrap_or(text).trim();
    }

    let start = text.find(['{', '[']);
    let end = text.rfind(['}', ']']);
    match (start, end) {
        (Some(s), Some(e)) if e >= s => &text[s..=e],
        _ => text,
    }
}

/// Parse model output as JSON of type `T`.
pub fn parse_json_response<T: DeserializeOwned>(raw: &str) -> Result<T, GenerationError> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    serde_json::from_str(body).map_err(|e| GenerationError::Parse(e.to_string()))
}

/// Reject malformed quiz items.
pub fn validate_quiz(questions: Vec<QuizQuestion>) -> Result<Vec<QuizQuestion>, GenerationError> {
    if questions.is_empty() {
        return Err(GenerationError::Parse("quiz has no questions".to_string()));
    }
    for (i, q) in questions.iter().enumerate() {
        if q.options.len() < 2 || q.correct_index >= q.options.len() {
            return Err(GenerationError::Parse(format!(
                "quiz question {} has invalid options or correctIndex",
                i + 1
            )));
        }
    }
    Ok(questions)
}

impl GeneratedModule {
    pub fn normalized(mut self) -> Result<Self, GenerationError> {
        if self.content.trim().is_empty() {
            return Err(GenerationError::Parse("module content is empty".to_string()));
        }
        self.estimated_minutes = self.estimated_minutes.max(1);
        self.flashcards
            .retain(|c| !c.front.trim().is_empty() && !c.back.trim().is_empty());
        Ok(self)
    }
}

impl UnderstandingEvaluation {
    pub fn normalized(mut self) -> Self {
        self.score = self.score.clamp(0, 100);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences_json_block() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fences_with_prose() {
        let raw = "Here is your course:\n{\"a\": [1, 2]}\nEnjoy!";
        assert_eq!(strip_code_fences(raw), "{\"a\": [1, 2]}");
    }

    #[test]
    fn test_parse_json_response_malformed() {
        let result: Result<UnderstandingEvaluation, _> = parse_json_response("```json\n{oops\n```");
        assert!(matches!(result, Err(GenerationError::Parse(_))));
    }

    #[test]
    fn test_parse_json_response_empty() {
        let result: Result<UnderstandingEvaluation, _> = parse_json_response("```\n```");
        assert!(matches!(result, Err(GenerationError::EmptyResponse)));
    }

    fn tier(level: TierLevel, modules: usize) -> TierOutline {
        TierOutline {
            level,
            title: level.as_str().to_string(),
            description: String::new(),
            modules: (0..modules)
                .map(|i| ModuleOutline {
                    title: format!("Module {}", i + 1),
                    description: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_structure_sorts_tiers() {
        let structure = CourseStructure {
            title: "ML".into(),
            description: String::new(),
            tiers: vec![
                tier(TierLevel::Advanced, 2),
                tier(TierLevel::Start, 3),
                tier(TierLevel::Intermediate, 2),
            ],
        }
        .normalized()
        .unwrap();
        assert_eq!(structure.tiers[0].level, TierLevel::Start);
        assert_eq!(structure.tiers[2].level, TierLevel::Advanced);
    }

    #[test]
    fn test_structure_requires_all_levels() {
        let result = CourseStructure {
            title: "ML".into(),
            description: String::new(),
            tiers: vec![tier(TierLevel::Start, 3), tier(TierLevel::Start, 2)],
        }
        .normalized();
        assert!(matches!(result, Err(GenerationError::Parse(_))));
    }

    #[test]
    fn test_validate_quiz_rejects_bad_index() {
        let questions = vec![QuizQuestion {
            question: "?".into(),
            options: vec!["a".into(), "b".into()],
            correct_index: 2,
            explanation: None,
        }];
        assert!(validate_quiz(questions).is_err());
    }

    #[test]
    fn test_evaluation_score_clamped() {
        let eval = UnderstandingEvaluation {
            score: 140,
            feedback: String::new(),
            improvement_areas: vec![],
        }
        .normalized();
        assert_eq!(eval.score, 100);
    }
}
