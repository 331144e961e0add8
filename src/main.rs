//! Learnpath Backend
//!
//! REST backend for a tiered e-learning platform: SQLite persistence, Tantivy
//! course search, Clerk authentication and Gemini content generation.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod generation;
mod models;
mod progress;
mod search;
mod workflow;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{ClerkIdentity, IdentityProvider};
use config::Config;
use db::Repository;
use generation::{ContentGenerator, GeminiClient};
use search::SearchIndex;
use workflow::CourseWorkflow;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub generator: Arc<dyn ContentGenerator>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn workflow(&self) -> CourseWorkflow<'_> {
        CourseWorkflow::new(&self.repo, self.generator.as_ref(), &self.search)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Learnpath Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Index path: {:?}", config.index_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.gemini_api_key.is_none() {
        tracing::warn!(
            "No Gemini API key configured (LEARNPATH_GEMINI_API_KEY). Generation endpoints will answer 503!"
        );
    }
    if config.clerk_jwt_key.is_none() {
        tracing::warn!(
            "No Clerk JWT key configured (LEARNPATH_CLERK_JWT_KEY). Authenticated endpoints will answer 401!"
        );
    }
    if config.clerk_secret_key.is_none() {
        tracing::warn!("No Clerk secret key configured (LEARNPATH_CLERK_SECRET_KEY). Profiles will not be synced.");
    }
    if config.clerk_webhook_secret.is_none() {
        tracing::warn!("No Clerk webhook secret configured (LEARNPATH_CLERK_WEBHOOK_SECRET). Webhooks will be rejected.");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    if config.seed_catalog {
        let seeded = repo.seed_catalog().await?;
        if seeded > 0 {
            tracing::info!("Inserted {} starter courses", seeded);
        }
    }

    // Initialize search index
    let search = Arc::new(SearchIndex::open(&config.index_path)?);

    // Build initial search index from database
    tracing::info!("Building search index...");
    let mut courses = Vec::new();
    for course in repo.list_all_courses().await? {
        if let Some(detail) = repo.get_course_detail(&course.id).await? {
            courses.push(detail);
        }
    }
    search.rebuild(&courses).await?;

    let generator: Arc<dyn ContentGenerator> = Arc::new(GeminiClient::from_config(&config)?);
    let identity: Arc<dyn IdentityProvider> = Arc::new(ClerkIdentity::from_config(&config)?);

    // Create application state
    let state = AppState {
        repo,
        search,
        generator,
        identity,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Readable anonymously; the caller is attached when a token is present.
    // POST /courses still requires a user through its extractor.
    let public_routes = Router::new()
        .route(
            "/courses",
            get(api::list_courses).post(api::create_course),
        )
        .route("/courses/{id}", get(api::get_course))
        .route("/modules/{id}", get(api::get_module))
        .route("/search", get(api::search_courses))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::optional_auth,
        ));

    let protected_routes = Router::new()
        // Courses
        .route(
            "/courses/generate-from-interests",
            post(api::generate_from_interests),
        )
        .route("/courses/{id}/generate-tiers", post(api::generate_tiers))
        .route(
            "/courses/{id}/generate-tier/{tier_level}",
            post(api::generate_tier),
        )
        .route("/courses/{id}/enroll", post(api::enroll))
        .route("/courses/{id}/progress", get(api::get_course_progress))
        // Assessments
        .route("/assessments/{id}/submit", post(api::submit_assessment))
        .route("/assessments/{id}/submissions", get(api::list_submissions))
        .route(
            "/modules/{id}/understanding-checks",
            get(api::list_understanding_checks),
        )
        // Progress
        .route(
            "/progress/module/{module_id}",
            get(api::get_module_progress).post(api::update_module_progress),
        )
        .route("/progress/course/{course_id}", get(api::get_course_progress))
        .route(
            "/progress/flashcard/{flashcard_id}",
            post(api::review_flashcard),
        )
        .route("/progress/flashcards/due", get(api::due_flashcards))
        // Dashboard
        .route("/enrollments", get(api::list_enrollments))
        // Notifications
        .route("/notifications", get(api::list_notifications))
        .route("/notifications/unread-count", get(api::unread_count))
        .route("/notifications/mark-all-read", post(api::mark_all_read))
        .route("/notifications/{id}/read", post(api::mark_read))
        // User
        .route(
            "/user/settings",
            get(api::get_settings).put(api::update_settings),
        )
        .route(
            "/user/interests",
            get(api::list_interests).post(api::add_interests),
        )
        .route("/user/interests/{id}", delete(api::remove_interest))
        // Auth
        .route("/auth/user", get(api::current_user))
        .route("/auth/sync", post(api::sync_user))
        .route("/auth/role", put(api::update_role))
        .route("/auth/onboarding", post(api::complete_onboarding))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    // Signed by the identity provider, not by a user session
    let webhook_routes = Router::new().route("/webhooks/clerk", post(api::clerk_webhook));

    let api_routes = public_routes
        .merge(protected_routes)
        .merge(webhook_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
