use axum::http::StatusCode;
use thiserror::Error;

/// Failure talking to the remote records API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote API answered {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Formato inesperado recebido da API.")]
    UnexpectedFormat,
}

impl ApiError {
    /// Text shown to the user: the server's own body when it sent one, the
    /// format message for a malformed list, `fallback` otherwise.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected { body, .. } if !body.trim().is_empty() => body.clone(),
            Self::UnexpectedFormat => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// A required field is missing or not a number; nothing was sent.
    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
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

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        Self::bad_request(format!("invalid date, expected YYYY-MM-DD: {err}"))
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
