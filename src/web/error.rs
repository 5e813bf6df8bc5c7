//! JSON error bodies for the HTTP boundary

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::time::Duration;

use crate::features::rate_limiting::SecurityDenial;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
}

impl ErrorBody {
    fn new(error: &'static str, message: String) -> Self {
        Self {
            success: false,
            error,
            message,
        }
    }
}

/// Whole seconds for a `Retry-After` value; never zero
fn retry_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

impl IntoResponse for SecurityDenial {
    fn into_response(self) -> Response {
        match self {
            Self::RateLimited { retry_after } => {
                let secs = retry_secs(retry_after);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, secs.to_string())],
                    Json(ErrorBody::new(
                        "Too many requests",
                        format!("Rate limit exceeded. Try again in {secs} seconds."),
                    )),
                )
                    .into_response()
            }
            // The reason stays in the block table; clients only learn they are blocked
            Self::Blocked { .. } => (
                StatusCode::FORBIDDEN,
                Json(ErrorBody::new(
                    "Forbidden",
                    "Access from this address is blocked.".to_string(),
                )),
            )
                .into_response(),
        }
    }
}
