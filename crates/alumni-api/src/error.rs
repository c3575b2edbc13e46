use std::{borrow::Cow, future::Future};

use alumni_common::api::FieldError;
use alumni_common::db::{DbPoolError, EventStorageError, MigrationError, ProfileFetchError};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

tokio::task_local! {
    static REQUEST_ID: String;
}

const MAX_PUBLIC_MESSAGE_CHARS: usize = 240;

/// Strips control characters and anything that looks like a URL or a
/// filesystem path before a message is echoed back to a client.
fn sanitize_message(message: &str) -> String {
    let cleaned = message
        .split_whitespace()
        .map(|token| token.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|token| !token.is_empty())
        .map(|token| {
            let (base, query) = match token.split_once('?') {
                Some((base, _)) => (base, true),
                None => (token.as_str(), false),
            };

            if token.contains("://") {
                "[redacted-url]".to_string()
            } else if base.starts_with('/') || base.contains('\\') {
                "[redacted-path]".to_string()
            } else if base.is_empty() && query {
                "[redacted-query]".to_string()
            } else if query {
                format!("{base}?[redacted]")
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        return "unexpected error".to_string();
    }

    if cleaned.chars().count() > MAX_PUBLIC_MESSAGE_CHARS {
        let mut truncated: String = cleaned.chars().take(MAX_PUBLIC_MESSAGE_CHARS).collect();
        truncated.push('…');
        return truncated;
    }

    cleaned
}

pub async fn with_request_id<Fut, T>(request_id: Option<String>, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    match request_id {
        Some(request_id) => REQUEST_ID.scope(request_id, fut).await,
        None => fut.await,
    }
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|value| value.clone()).ok()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("too many requests: {0}")]
    TooManyRequests(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
    request_id: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = self.code();
        let request_id = current_request_id();

        error!(
            code,
            status = %status,
            request_id = request_id.as_deref().unwrap_or(""),
            error = %self,
            "api_error"
        );

        let body = Json(ErrorResponse {
            code,
            message: self.public_message().into_owned(),
            request_id,
        });

        (status, body).into_response()
    }
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::TooManyRequests(_) => "too_many_requests",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Database(_) => "database_error",
            ApiError::Config(_) | ApiError::Internal(_) => "internal_error",
        }
    }

    fn public_message(&self) -> Cow<'static, str> {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => {
                Cow::Owned(sanitize_message(msg))
            }
            ApiError::Unauthorized(_) => Cow::Borrowed("unauthorized"),
            ApiError::Forbidden(_) => Cow::Borrowed("forbidden"),
            ApiError::TooManyRequests(_) => Cow::Borrowed("too many requests"),
            ApiError::ServiceUnavailable(_) => Cow::Borrowed("service unavailable"),
            ApiError::Database(_) | ApiError::Config(_) | ApiError::Internal(_) => {
                Cow::Borrowed("internal server error")
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Config(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ProfileFetchError> for ApiError {
    fn from(value: ProfileFetchError) -> Self {
        ApiError::Database(value.to_string())
    }
}

impl From<EventStorageError> for ApiError {
    fn from(value: EventStorageError) -> Self {
        ApiError::Database(value.to_string())
    }
}

impl From<FieldError> for ApiError {
    fn from(value: FieldError) -> Self {
        ApiError::BadRequest(value.to_string())
    }
}

impl From<DbPoolError> for ApiError {
    fn from(value: DbPoolError) -> Self {
        match value {
            DbPoolError::InvalidConfig(msg) => ApiError::Config(msg),
            other => ApiError::Database(format!("failed to create pool: {other}")),
        }
    }
}

impl From<MigrationError> for ApiError {
    fn from(value: MigrationError) -> Self {
        ApiError::Database(format!("failed to run migrations: {value}"))
    }
}
