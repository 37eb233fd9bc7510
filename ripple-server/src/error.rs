//! Maps `ripple::Error` onto an HTTP status code per error kind. The core
//! crates never construct an HTTP response themselves — this is the only
//! place that conversion happens.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }
}

impl From<ripple::Error> for ApiError {
    fn from(err: ripple::Error) -> Self {
        let status = match &err {
            ripple::Error::NoWorkspaceLoaded | ripple::Error::NodeNotFound(_) | ripple::Error::ActionNotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            ripple::Error::UnknownSample(_) => StatusCode::BAD_REQUEST,
            ripple::Error::WorkspaceInvalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ripple::Error::Graph(_) | ripple::Error::Engine(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
