use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use links_core::CoreError;

pub fn core_error_response(err: CoreError, operation: &str) -> Response {
    let status = match &err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Storage(_)
        | CoreError::Resolver(_)
        | CoreError::Io(_)
        | CoreError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!(operation, error = %err, "Request failed");
    } else {
        tracing::debug!(operation, error = %err, "Request rejected");
    }

    (status, err.to_string()).into_response()
}
