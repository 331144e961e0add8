//! Prompt templates. Each asks for a single JSON value and spells out its shape.

use super::{ModuleOutline, TierOutline};

pub fn course_structure(topics: &[String], goals: Option<&str>) -> String {
    let goals = goals
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or("No specific goals given.");
    format!(
        r#"You are an expert curriculum designer. Design a personalized learning path.

Topics: {topics}
Learner goals: {goals}

Return ONLY a JSON object with this exact shape:
{{
  "title": "string",
  "description": "string",
  "tiers": [
    {{
      "level": "start" | "intermediate" | "advanced",
      "title": "string",
      "description": "string",
      "modules": [{{ "title": "string", "description": "string" }}]
    }}
  ]
}}

There must be exactly three tiers, one per level, each with 3 to 5 modules."#,
        topics = topics.join(", "),
        goals = goals,
    )
}

pub fn module_content(course_title: &str, tier: &TierOutline, module: &ModuleOutline) -> String {
    format!(
        r#"Write a lesson for the course "{course}" ({level} tier: {tier_title}).

Module: {title}
Summary: {description}

Return ONLY a JSON object with this exact shape:
{{
  "content": "the full lesson in Markdown, with headings and examples",
  "estimatedMinutes": number,
  "flashcards": [{{ "front": "string", "back": "string" }}]
}}

Include 4 to 8 flashcards covering the key ideas."#,
        course = course_title,
        level = tier.level.as_str(),
        tier_title = tier.title,
        title = module.title,
        description = module.description,
    )
}

pub fn quiz(module_title: &str, content: &str) -> String {
    format!(
        r#"Create a multiple-choice quiz for the lesson "{title}".

Lesson:
{content}

Return ONLY a JSON array of 5 questions with this exact shape:
[{{ "question": "string", "options": ["string", "string", "string", "string"], "correctIndex": number, "explanation": "string" }}]

correctIndex is the zero-based index of the correct option."#,
        title = module_title,
        content = content,
    )
}

pub fn understanding_prompt(module_title: &str, content: &str) -> String {
    format!(
        r#"Write one open-ended question that checks whether a learner understood the lesson "{title}".

Lesson:
{content}

Return ONLY a JSON object with this exact shape:
{{ "prompt": "the question to ask", "rubric": "what a complete answer covers" }}"#,
        title = module_title,
        content = content,
    )
}

pub fn evaluate_understanding(prompt: &str, response: &str) -> String {
    format!(
        r#"Evaluate a learner's explanation.

Question: {prompt}
Learner's answer: {response}

Return ONLY a JSON object with this exact shape:
{{ "score": number from 0 to 100, "feedback": "string", "improvementAreas": ["string"] }}"#,
        prompt = prompt,
        response = response,
    )
}
