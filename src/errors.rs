use std::collections::BTreeMap;

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::de::DeserializeOwned;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;
use validator::{ValidationError, ValidationErrors};

use crate::auth::Principal;
use crate::schemas::ErrorResponse;

/// Every handler path terminates in a success response or one of these.
/// All four client-facing kinds are expected outcomes of normal operation,
/// never panics.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or constraint-violating input, keyed by field name.
    #[error("validation failed")]
    Validation(BTreeMap<String, Vec<String>>),
    /// The endpoint requires a credential and none (or an invalid one) was sent.
    #[error("authentication credentials were not provided")]
    Unauthenticated,
    /// Authenticated, but the permission predicates deny the operation.
    #[error("you do not have permission to perform this action")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("internal server error")]
    Database(#[from] DbErr),
}

impl ApiError {
    /// A validation failure on a single field.
    pub fn field(field: &str, message: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), vec![message.to_string()]);
        ApiError::Validation(fields)
    }

    /// The denial a failed permission predicate maps to: the anonymous case
    /// and the authenticated-but-unauthorized case are one deny outcome at
    /// the predicate layer, the status code is chosen here.
    pub fn deny(principal: &Principal) -> Self {
        if principal.is_authenticated() {
            ApiError::Forbidden
        } else {
            ApiError::Unauthenticated
        }
    }

    /// Whether a database error is a uniqueness-constraint violation, which
    /// callers translate into a field-level validation error.
    pub fn is_unique_violation(err: &DbErr) -> bool {
        let message = err.to_string().to_lowercase();
        message.contains("unique") || message.contains("duplicate")
    }
}

/// Serde reports an absent required field as ``missing field `name` ...``;
/// pull the name out so the failure can be keyed like any other field error.
fn missing_field_name(detail: &str) -> Option<&str> {
    detail
        .split_once("missing field `")
        .and_then(|(_, rest)| rest.split('`').next())
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        match missing_field_name(&detail) {
            Some(field) => ApiError::field(field, "this field is required"),
            None => ApiError::field("non_field_errors", &detail),
        }
    }
}

/// A `Json` body whose rejection is an [`ApiError`], so malformed and
/// incomplete bodies produce the same validation envelope as the field
/// validators instead of axum's plain-text rejection.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        for (field, errors) in errors.field_errors() {
            let messages = errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("invalid value ({})", e.code),
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        ApiError::Validation(fields)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.to_string();
        let (status, code, fields) = match self {
            ApiError::Validation(fields) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", Some(fields))
            }
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED", None),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "PERMISSION_DENIED", None),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", None),
            ApiError::Database(db_error) => {
                error!("Database error: {}", db_error);
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", None)
            }
        };

        let body = ErrorResponse {
            error,
            code: code.to_string(),
            success: false,
            fields,
        };

        (status, Json(body)).into_response()
    }
}

/// Build a `ValidationError` with a human-readable message.
pub fn validation_error(code: &'static str, message: impl Into<String>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into().into());
    err
}
