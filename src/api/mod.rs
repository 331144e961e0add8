//! REST API module.
//!
//! Contains all API routes and handlers of the browser client contract.

mod courses;
mod learning;
mod notifications;
mod progress;
mod search;
mod users;
mod webhooks;

pub use courses::*;
pub use learning::*;
pub use notifications::*;
pub use progress::*;
pub use search::*;
pub use users::*;
pub use webhooks::*;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Course, User};

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            status: StatusCode::OK,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// JSON request body whose rejection is answered with the error envelope.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// 201 when `created`, 200 otherwise.
pub fn created_or_ok<T: Serialize>(data: T, created: bool) -> ApiResult<T> {
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok(ApiResponse::new(data).with_status(status))
}

/// Personalized courses are readable only by their owner.
pub(crate) fn ensure_visible(course: &Course, viewer: Option<&User>) -> Result<(), AppError> {
    if course.visible_to(viewer.map(|u| u.id.as_str())) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "This course belongs to another user".to_string(),
        ))
    }
}
