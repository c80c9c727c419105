//! # Error Handling
//!
//! Translation has three ways to fail, all described by [`TranslateError`]. Everything
//! else (unknown keys, non-queryable fields, unresolvable embed paths) is either dropped
//! silently or reported as a [`Diagnostic`](crate::Diagnostic) next to a usable plan.
//!
//! Handlers that want an HTTP response convert the error into [`ApiError`]:
//!
//! ```rust,ignore
//! use embedquery::{ApiError, QueryParams, QueryTranslator};
//!
//! async fn list_boats(
//!     State(schema): State<Arc<Schema>>,
//!     RawQuery(query): RawQuery,
//! ) -> Result<Json<QueryPlan>, ApiError> {
//!     let mut params = QueryParams::parse(query.as_deref().unwrap_or(""));
//!     let translation = QueryTranslator::new(&schema).translate("boat", &mut params)?;
//!     Ok(Json(translation.plan))
//! }
//! ```
//!
//! Internal details are logged with `tracing` and never sent to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Hard errors that abort a translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// The model the caller asked for is not in the schema registry
    UnknownModel { model: String },
    /// A sort token with an empty field or association name, e.g. `owner.` or `-`
    InvalidSortToken { token: String },
    /// A sort token walks through an association that the model does not declare
    UnknownSortAssociation {
        /// The full sort token as given, e.g. `-owner.marina.name`
        token: String,
        /// The hop that failed to resolve
        association: String,
        /// The model the hop was looked up on
        model: String,
    },
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownModel { model } => write!(f, "model '{model}' is not registered"),
            Self::InvalidSortToken { token } => {
                write!(f, "cannot sort by '{token}': empty field or association name")
            }
            Self::UnknownSortAssociation {
                token,
                association,
                model,
            } => write!(
                f,
                "cannot sort by '{token}': '{model}' has no association '{association}'"
            ),
        }
    }
}

impl std::error::Error for TranslateError {}

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - the client asked for something the query language can't express
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 500 Internal Server Error - details logged, not exposed
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::BadRequest { message } | Self::Internal { message, .. } => message,
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = ErrorResponse {
            error: self.user_message().to_string(),
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// Convert translation failures to `ApiError`
///
/// - `InvalidSortToken`, `UnknownSortAssociation` → 400, the message names the offending token
/// - `UnknownModel` → 500, the route was wired to a model the registry doesn't know
impl From<TranslateError> for ApiError {
    fn from(err: TranslateError) -> Self {
        match &err {
            TranslateError::InvalidSortToken { .. }
            | TranslateError::UnknownSortAssociation { .. } => Self::bad_request(err.to_string()),
            TranslateError::UnknownModel { .. } => {
                Self::internal("Failed to build query", Some(err.to_string()))
            }
        }
    }
}
