use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// JSON error body shared by all routers.
pub fn respond_error(status: StatusCode, message: String) -> Response {
    let message = if status.is_server_error() {
        // Don't leak internal error detail to client
        "Internal server error".to_string()
    } else {
        message
    };

    let body = Json(ErrorResponse {
        code: status.as_u16(),
        message,
    });

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_hide_their_detail() {
        let response = respond_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "connection pool exhausted".to_string(),
        );

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_errors_keep_their_message() {
        let response = respond_error(StatusCode::BAD_REQUEST, "invoice_number is required".to_string());

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
