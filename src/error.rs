use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication failed, please login again")]
    Auth,

    #[error("Upstream error {status}: {body}")]
    Transient { status: u16, body: String },

    #[error("Failed to fetch file {file_id} for '{context}': {message}")]
    FileFetch {
        context: String,
        file_id: String,
        message: String,
    },

    #[error("Failed to upload {file_name} for '{context}': {message}")]
    FileUpload {
        context: String,
        file_name: String,
        message: String,
    },

    #[error("{operation} failed for class {class_id} ({}): {cause}", .entity_id.as_deref().unwrap_or("-"))]
    DestinationWrite {
        operation: &'static str,
        class_id: String,
        entity_id: Option<String>,
        #[source]
        cause: Box<AppError>,
    },

    #[error("Unsupported material type: {mime_type}")]
    UnsupportedMaterial { mime_type: String },

    #[error("Unexpected resources folder url: {0}")]
    InvalidFolderUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    /// Turns a non-2xx response into `Auth` or `Transient`, keeping the raw body.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return AppError::Auth;
        }
        let body = response.text().await.unwrap_or_default();
        AppError::Transient {
            status: status.as_u16(),
            body,
        }
    }

    pub fn destination_write(
        operation: &'static str,
        class_id: &str,
        entity_id: Option<&str>,
        cause: AppError,
    ) -> Self {
        match cause {
            AppError::Auth => AppError::Auth,
            cause => AppError::DestinationWrite {
                operation,
                class_id: class_id.to_string(),
                entity_id: entity_id.map(str::to_string),
                cause: Box::new(cause),
            },
        }
    }

    pub fn file_fetch(context: &str, file_id: &str, cause: AppError) -> Self {
        match cause {
            AppError::Auth => AppError::Auth,
            cause => AppError::FileFetch {
                context: context.to_string(),
                file_id: file_id.to_string(),
                message: cause.to_string(),
            },
        }
    }

    pub fn file_upload(context: &str, file_name: &str, cause: AppError) -> Self {
        match cause {
            AppError::Auth => AppError::Auth,
            cause => AppError::FileUpload {
                context: context.to_string(),
                file_name: file_name.to_string(),
                message: cause.to_string(),
            },
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Auth)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Auth => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Config(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Transient { .. }
            | AppError::Http(_)
            | AppError::FileFetch { .. }
            | AppError::FileUpload { .. }
            | AppError::DestinationWrite { .. } => {
                error!("upstream error: {}", self);
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::Json(e) => {
                error!("failed to decode upstream payload: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Unexpected upstream payload".to_string(),
                )
            }
            AppError::UnsupportedMaterial { .. } | AppError::InvalidFolderUrl(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
