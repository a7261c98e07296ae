use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use skysense_api::restful::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Device does not belong to this user")]
    Forbidden,

    #[error("Device not found")]
    DeviceNotFound,

    #[error("Device has not reported yet")]
    NoTelemetry,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::DeviceNotFound => StatusCode::NOT_FOUND,
            ApiError::NoTelemetry => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(status.as_u16(), self.to_string()));

        (status, body).into_response()
    }
}
