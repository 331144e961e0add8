//! Course, tier and module models.

use serde::{Deserialize, Serialize};

/// Generation status of a personalized course.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Generating,
    Completed,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Generating => "generating",
            CourseStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "generating" => Some(CourseStatus::Generating),
            "completed" => Some(CourseStatus::Completed),
            _ => None,
        }
    }
}

/// One of the three fixed difficulty bands of a course, in learning order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TierLevel {
    Start,
    Intermediate,
    Advanced,
}

impl TierLevel {
    pub const ALL: [TierLevel; 3] = [TierLevel::Start, TierLevel::Intermediate, TierLevel::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            TierLevel::Start => "start",
            TierLevel::Intermediate => "intermediate",
            TierLevel::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Some(TierLevel::Start),
            "intermediate" => Some(TierLevel::Intermediate),
            "advanced" => Some(TierLevel::Advanced),
            _ => None,
        }
    }

    /// Zero-based position in the fixed ordering.
    pub fn order(&self) -> i32 {
        match self {
            TierLevel::Start => 0,
            TierLevel::Intermediate => 1,
            TierLevel::Advanced => 2,
        }
    }

    /// The tier that must be completed before this one may be generated.
    pub fn previous(&self) -> Option<TierLevel> {
        match self {
            TierLevel::Start => None,
            TierLevel::Intermediate => Some(TierLevel::Start),
            TierLevel::Advanced => Some(TierLevel::Intermediate),
        }
    }

    pub fn next(&self) -> Option<TierLevel> {
        match self {
            TierLevel::Start => Some(TierLevel::Intermediate),
            TierLevel::Intermediate => Some(TierLevel::Advanced),
            TierLevel::Advanced => None,
        }
    }
}

/// Tier lifecycle: `locked -> generating -> completed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TierStatus {
    Locked,
    Generating,
    Completed,
}

impl TierStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierStatus::Locked => "locked",
            TierStatus::Generating => "generating",
            TierStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "locked" => Some(TierStatus::Locked),
            "generating" => Some(TierStatus::Generating),
            "completed" => Some(TierStatus::Completed),
            _ => None,
        }
    }
}

/// A course in the catalog, public or personalized for a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub is_personalized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_status: Option<CourseStatus>,
    /// Normalized topic list a personalized course was generated from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_key: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Course {
    /// Whether `user_id` may read this course.
    pub fn visible_to(&self, user_id: Option<&str>) -> bool {
        !self.is_personalized || (self.owner_id.is_some() && self.owner_id.as_deref() == user_id)
    }
}

/// Catalog entry: a course with counts computed from its tiers and modules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    pub tier_count: i64,
    pub module_count: i64,
}

/// Title and summary of a module that has not been generated yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOutline {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub id: String,
    pub course_id: String,
    pub level: TierLevel,
    pub title: String,
    pub description: String,
    pub generation_status: TierStatus,
    pub order: i32,
    /// Module outlines kept until the tier is generated.
    #[serde(default)]
    pub planned_modules: Vec<ModuleOutline>,
    pub created_at: String,
    pub updated_at: String,
}

/// A single content unit within a tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub tier_id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    /// Markdown body
    pub content: String,
    pub order: i32,
    pub estimated_minutes: i32,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierWithModules {
    #[serde(flatten)]
    pub tier: Tier,
    pub modules: Vec<Module>,
}

/// A course with its tiers and their modules, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub tiers: Vec<TierWithModules>,
}

/// Fields needed to persist a new course.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub content: String,
    pub owner_id: Option<String>,
    pub generation_status: Option<CourseStatus>,
    pub topic_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTier {
    pub course_id: String,
    pub level: TierLevel,
    pub title: String,
    pub description: String,
    pub generation_status: TierStatus,
    pub planned_modules: Vec<ModuleOutline>,
}

#[derive(Debug, Clone)]
pub struct NewModule {
    pub tier_id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub order: i32,
    pub estimated_minutes: i32,
}

/// Request body for creating a catalog course.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Input of the personalized-path workflow.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFromInterestsRequest {
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub goals: Option<String>,
}

/// Result of a generation workflow run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCourse {
    #[serde(flatten)]
    pub detail: CourseDetail,
    /// False when an existing course for the same topics was returned
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_level_ordering() {
        assert!(TierLevel::Start < TierLevel::Intermediate);
        assert!(TierLevel::Intermediate < TierLevel::Advanced);
        assert_eq!(TierLevel::Start.previous(), None);
        assert_eq!(TierLevel::Advanced.previous(), Some(TierLevel::Intermediate));
        assert_eq!(TierLevel::Intermediate.next(), Some(TierLevel::Advanced));
    }

    #[test]
    fn test_tier_level_parse_is_case_insensitive() {
        assert_eq!(TierLevel::parse("Intermediate"), Some(TierLevel::Intermediate));
        assert_eq!(TierLevel::parse("expert"), None);
    }

    #[test]
    fn test_personalized_course_visibility() {
        let mut course = Course {
            id: "c1".into(),
            title: "Rust".into(),
            description: String::new(),
            content: String::new(),
            is_personalized: false,
            owner_id: None,
            generation_status: None,
            topic_key: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(course.visible_to(None));

        course.is_personalized = true;
        course.owner_id = Some("u1".into());
        assert!(course.visible_to(Some("u1")));
        assert!(!course.visible_to(Some("u2")));
        assert!(!course.visible_to(None));
    }
}
