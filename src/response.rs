use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// One validation message. `field` is `None` for errors that belong to the
/// whole payload rather than a single input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            field: field.map(str::to_owned),
            message: message.into(),
        }
    }
}

/// Result of a service operation: either a payload or the collected messages,
/// each carrying the HTTP status it should be answered with.
#[derive(Debug)]
pub enum Outcome<T> {
    Success { payload: T, status: StatusCode },
    Error { errors: Vec<FieldError>, status: StatusCode },
}

impl<T> Outcome<T> {
    pub fn created(payload: T) -> Self {
        Outcome::Success {
            payload,
            status: StatusCode::CREATED,
        }
    }

    pub fn bad_request(errors: Vec<FieldError>) -> Self {
        Outcome::Error {
            errors,
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Success { status, .. } | Outcome::Error { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success { payload, status } => Outcome::Success {
                payload: f(payload),
                status,
            },
            Outcome::Error { errors, status } => Outcome::Error { errors, status },
        }
    }
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        match self {
            Outcome::Success { payload, status } => (status, Json(payload)).into_response(),
            Outcome::Error { errors, status } => (
                status,
                Json(json!({ "status": status.as_u16(), "errors": errors })),
            )
                .into_response(),
        }
    }
}
