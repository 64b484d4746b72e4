use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use super::pages;
use crate::plot::PlotError;

/// Errors returned from handlers, rendered as HTML pages.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                "An internal error occurred".to_string()
            }
            ApiError::BadRequest(msg) => {
                tracing::debug!(error = %self, "client error");
                msg.clone()
            }
        };
        (status, Html(pages::error_page(&message))).into_response()
    }
}

impl From<PlotError> for ApiError {
    fn from(error: PlotError) -> Self {
        match error {
            PlotError::Render(_) => ApiError::Internal(error.to_string()),
            _ => ApiError::BadRequest(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn plot_errors_map_by_kind() {
        let e = ApiError::from(PlotError::UnknownColumn("foo".to_string()));
        assert!(matches!(e, ApiError::BadRequest(ref m) if m == "unknown column \"foo\""));
        let e = ApiError::from(PlotError::Render("backend".to_string()));
        assert!(matches!(e, ApiError::Internal(_)));
    }
}
