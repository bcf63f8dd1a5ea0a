use crate::greeter::GreeterError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

/// A [`GreeterError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub GreeterError);

impl From<GreeterError> for ApiError {
    fn from(e: GreeterError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GreeterError::Unsupported(_) => StatusCode::NOT_FOUND,
            GreeterError::MissingName => StatusCode::BAD_REQUEST,
            GreeterError::ActorCommunicationError(_) => StatusCode::SERVICE_UNAVAILABLE,
            GreeterError::Storage(_)
            | GreeterError::Stream(_)
            | GreeterError::UnexpectedReply(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, %status, "Request failed");
        } else {
            warn!(error = %self.0, %status, "Request rejected");
        }
        (status, self.0.to_string()).into_response()
    }
}
