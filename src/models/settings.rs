//! User settings model.

use serde::{Deserialize, Serialize};

pub const THEMES: [&str; 3] = ["system", "light", "dark"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub user_id: String,
    pub email_notifications: bool,
    pub daily_goal_minutes: i32,
    pub theme: String,
    pub updated_at: String,
}

impl UserSettings {
    /// Settings reported for a user who never saved any.
    pub fn defaults_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            email_notifications: true,
            daily_goal_minutes: 30,
            theme: "system".to_string(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub email_notifications: Option<bool>,
    #[serde(default)]
    pub daily_goal_minutes: Option<i32>,
    #[serde(default)]
    pub theme: Option<String>,
}
