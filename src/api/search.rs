//! Search API endpoints.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::auth::MaybeUser;
use crate::models::CourseSummary;
use crate::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search query string.
    #[serde(default)]
    pub q: String,
    /// Maximum number of results (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// Search result with courses and metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Single search result item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub course: CourseSummary,
    pub score: f32,
}

/// Maximum number of search results allowed.
const MAX_SEARCH_LIMIT: usize = 100;

/// GET /api/search - Search the courses visible to the caller.
pub async fn search_courses(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchResponse> {
    let limit = params.limit.min(MAX_SEARCH_LIMIT);
    let viewer = user.as_ref().map(|u| u.id.as_str());

    let search_results = state.search.search(&params.q, limit, params.offset)?;

    // Fetch course data and drop other users' personalized courses
    let mut results = Vec::new();
    for sr in search_results {
        match state.repo.get_course_summary(&sr.course_id).await {
            Ok(Some(course)) if course.course.visible_to(viewer) => {
                results.push(SearchResultItem {
                    course,
                    score: sr.score,
                });
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to load search hit {}: {}", sr.course_id, e),
        }
    }

    let total = results.len();

    success(SearchResponse {
        results,
        total,
        limit,
        offset: params.offset,
    })
}
