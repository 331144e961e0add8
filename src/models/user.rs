//! User model mirrored from the identity provider.

use serde::{Deserialize, Serialize};

/// Role of a local user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Educator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Educator => "educator",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(UserRole::Student),
            "educator" => Some(UserRole::Educator),
            _ => None,
        }
    }
}

/// A local user record keyed by the external (Clerk) identity id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub clerk_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub role: UserRole,
    pub onboarding_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile fields copied from the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

/// Request body for `PUT /api/auth/role`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}
