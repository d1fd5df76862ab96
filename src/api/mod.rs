//! REST API module.
//!
//! Every resource kind gets the same four routes, served by the generic
//! handlers in [`resources`].

mod resources;

pub use resources::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::Resource;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response carrying data.
pub fn success<T: Serialize>(message: impl Into<String>, data: T) -> ApiResult<T> {
    Ok(ApiResponse {
        success: true,
        message: message.into(),
        data: Some(data),
    })
}

/// Create a successful API response with only a message.
pub fn done(message: impl Into<String>) -> ApiResult<()> {
    Ok(ApiResponse {
        success: true,
        message: message.into(),
        data: None,
    })
}

/// Routes for one resource kind:
///
/// - `GET    /{kind}/{scopeId}` list
/// - `POST   /{kind}` create
/// - `PUT    /{kind}/{id}` update
/// - `DELETE /{kind}/{id}?adminID=` delete
pub fn resource_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route(&format!("/{}", R::KIND), post(create_record::<R>))
        .route(
            &format!("/{}/{{key}}", R::KIND),
            get(list_records::<R>)
                .put(update_record::<R>)
                .delete(delete_record::<R>),
        )
}
