//! Session authentication.
//!
//! Requests carry the identity provider's session token as a bearer token.
//! The middleware verifies it, resolves the local user record (creating it
//! on first sight) and stores it in the request extensions, where the
//! `CurrentUser` and `MaybeUser` extractors pick it up.

mod clerk;
pub mod webhook;

pub use clerk::{ClerkIdentity, ClerkUser};

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use thiserror::Error;

use crate::errors::AppError;
use crate::models::{User, UserProfile, UserRole};
use crate::AppState;

/// Identity provider errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Identity provider is not configured")]
    NotConfigured,

    #[error("User {0} not found at identity provider")]
    UserNotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse identity provider response: {0}")]
    Parse(String),
}

/// A verified external identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub external_id: String,
}

/// Verifies session tokens and looks up user profiles.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<ExternalIdentity, IdentityError>;

    async fn fetch_profile(&self, external_id: &str) -> Result<UserProfile, IdentityError>;
}

/// The authenticated local user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The local user when the request was authenticated.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts.extensions.get::<CurrentUser>().map(|u| u.0.clone()),
        ))
    }
}

/// Reject requests without a valid session token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
    let user = resolve_user(&state, &token).await?;
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Attach the user when a valid token is present; continue anonymously otherwise.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&request) {
        match resolve_user(&state, &token).await {
            Ok(user) => {
                request.extensions_mut().insert(CurrentUser(user));
            }
            Err(e) => tracing::debug!("Ignoring invalid optional token: {}", e),
        }
    }
    next.run(request).await
}

/// Authenticate, then make sure a local user record exists.
///
/// The profile is fetched from the provider only on first sight; a failed
/// lookup still creates the user with an empty profile.
pub async fn resolve_user(state: &AppState, token: &str) -> Result<User, AppError> {
    let identity = state.identity.authenticate(token).await?;

    if let Some(user) = state.repo.get_user_by_clerk_id(&identity.external_id).await? {
        return Ok(user);
    }

    let profile = match state.identity.fetch_profile(&identity.external_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(
                "Could not fetch profile for {}: {}",
                identity.external_id,
                e
            );
            UserProfile::default()
        }
    };

    let (user, _) = state
        .repo
        .ensure_local_user(&identity.external_id, &profile)
        .await?;
    Ok(user)
}

pub fn require_role(user: &User, role: UserRole) -> Result<(), AppError> {
    if user.role == role {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "This action requires the {} role",
            role.as_str()
        )))
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn user(role: UserRole) -> User {
        User {
            id: "u1".into(),
            clerk_id: "user_1".into(),
            email: None,
            first_name: None,
            last_name: None,
            image_url: None,
            role,
            onboarding_completed: false,
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&user(UserRole::Educator), UserRole::Educator).is_ok());
        let err = require_role(&user(UserRole::Student), UserRole::Educator).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_bearer_token_extraction() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc.def")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request).as_deref(), Some("abc.def"));

        let request = Request::builder()
            .header(header::AUTHORIZATION, "Basic abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request), None);

        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer   ")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request), None);
    }
}
