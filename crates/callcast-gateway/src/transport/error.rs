use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use callcast_core::error::{CallcastError, ClientCode};

/// HTTP status for each client-facing code.
pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ClientCode::PermissionDenied => StatusCode::FORBIDDEN,
        ClientCode::InvalidArgument => StatusCode::BAD_REQUEST,
        ClientCode::NotFound => StatusCode::NOT_FOUND,
        ClientCode::Delivery
        | ClientCode::Config
        | ClientCode::UnsupportedVersion
        | ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `CallcastError` rendered as a JSON HTTP response.
#[derive(Debug)]
pub struct HttpError(pub CallcastError);

impl From<CallcastError> for HttpError {
    fn from(e: CallcastError) -> Self {
        Self(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let body = Json(json!({
            "error": code.as_str(),
            "message": self.0.to_string(),
        }));
        (status_for(code), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_statuses() {
        let r = HttpError(CallcastError::Unauthenticated("x".into())).into_response();
        assert_eq!(r.status(), StatusCode::UNAUTHORIZED);

        let r = HttpError(CallcastError::PermissionDenied("x".into())).into_response();
        assert_eq!(r.status(), StatusCode::FORBIDDEN);

        let r = HttpError(CallcastError::InvalidArgument("x".into())).into_response();
        assert_eq!(r.status(), StatusCode::BAD_REQUEST);
    }
}
