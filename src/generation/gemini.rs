//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    parse_json_response, prompts, validate_quiz, ContentGenerator, CourseStructure,
    GeneratedModule, GenerationError, ModuleOutline, TierOutline, UnderstandingEvaluation,
    UnderstandingPrompt,
};
use crate::config::Config;
use crate::models::QuizQuestion;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        Self::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
            config.generation_timeout,
        )
    }

    /// Send one prompt and return the concatenated text of the first candidate.
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::NotConfigured)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.7,
            },
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Calling Gemini");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn course_structure(
        &self,
        topics: &[String],
        goals: Option<&str>,
    ) -> Result<CourseStructure, GenerationError> {
        let raw = self
            .generate_text(&prompts::course_structure(topics, goals))
            .await?;
        parse_json_response::<CourseStructure>(&raw)?.normalized()
    }

    async fn module_content(
        &self,
        course_title: &str,
        tier: &TierOutline,
        module: &ModuleOutline,
    ) -> Result<GeneratedModule, GenerationError> {
        let raw = self
            .generate_text(&prompts::module_content(course_title, tier, module))
            .await?;
        parse_json_response::<GeneratedModule>(&raw)?.normalized()
    }

    async fn quiz(
        &self,
        module_title: &str,
        content: &str,
    ) -> Result<Vec<QuizQuestion>, GenerationError> {
        let raw = self
            .generate_text(&prompts::quiz(module_title, content))
            .await?;
        validate_quiz(parse_json_response(&raw)?)
    }

    async fn understanding_prompt(
        &self,
        module_title: &str,
        content: &str,
    ) -> Result<UnderstandingPrompt, GenerationError> {
        let raw = self
            .generate_text(&prompts::understanding_prompt(module_title, content))
            .await?;
        parse_json_response(&raw)
    }

    async fn evaluate_understanding(
        &self,
        prompt: &str,
        response: &str,
    ) -> Result<UnderstandingEvaluation, GenerationError> {
        let raw = self
            .generate_text(&prompts::evaluate_understanding(prompt, response))
            .await?;
        Ok(parse_json_response::<UnderstandingEvaluation>(&raw)?.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_is_not_configured() {
        let client = GeminiClient::new(
            None,
            "gemini-1.5-flash",
            "http://127.0.0.1:9",
            Duration::from_secs(1),
        )
        .unwrap();

        let result = client.evaluate_understanding("q", "a").await;
        assert!(matches!(result, Err(GenerationError::NotConfigured)));
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.7,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }
}
