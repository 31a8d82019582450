//! Error types for the web surface
//!
//! Every handler failure becomes a `WebError` rejection; `handle_rejection`
//! turns it into a status code and a JSON body.

use pony_core::{NavigationError, PonyId, ServiceError};
use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

/// Web surface error
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// No rendered pony with this id
    #[error("pony not found: {0}")]
    NotFound(PonyId),

    /// Request URL does not map to a location
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// Backend call failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Template rendering failed
    #[error("render failed: {0}")]
    Render(String),

    /// Location could not be turned into a redirect target
    #[error("invalid redirect target: {0}")]
    Redirect(String),
}

impl WebError {
    /// Status code this error maps to
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Navigation(NavigationError::UnknownRoute(_)) => StatusCode::NOT_FOUND,
            Self::Navigation(NavigationError::InvalidUrl { .. }) => StatusCode::BAD_REQUEST,
            Self::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Service(ServiceError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
            Self::Render(_) | Self::Redirect(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<minijinja::Error> for WebError {
    fn from(err: minijinja::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl warp::reject::Reject for WebError {}

/// Shorthand for rejecting with a `WebError`
pub(crate) fn reject(err: impl Into<WebError>) -> Rejection {
    warp::reject::custom(err.into())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    error: String,
}

/// Map rejections to JSON error responses
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(web) = err.find::<WebError>() {
        (web.status(), web.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else if let Some(body) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, body.to_string())
    } else {
        tracing::error!(rejection = ?err, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    };

    if status.is_server_error() {
        tracing::error!(%status, %message, "request failed");
    } else {
        tracing::debug!(%status, %message, "request rejected");
    }

    let body = ErrorBody {
        status: status.as_u16(),
        error: message,
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
