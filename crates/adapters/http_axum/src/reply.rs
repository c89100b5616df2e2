//! Mapping of dispatcher responses onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use zonealarm_app::dispatcher::{Outcome, Response as ProtocolResponse};

/// A protocol response sent as JSON with a status code derived from its outcome.
pub struct Reply(pub ProtocolResponse);

/// Status code for a dispatcher [`Outcome`].
#[must_use]
pub fn status_for(outcome: Outcome) -> StatusCode {
    match outcome {
        Outcome::Ok => StatusCode::OK,
        Outcome::Rejected => StatusCode::BAD_REQUEST,
        Outcome::NotFound => StatusCode::NOT_FOUND,
        Outcome::Conflict => StatusCode::CONFLICT,
        Outcome::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Outcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = status_for(self.0.outcome);
        if status.is_server_error() {
            tracing::error!(message = ?self.0.message, "request failed");
        }
        (status, Json(self.0)).into_response()
    }
}
