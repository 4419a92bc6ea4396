//! Unified error handling.
//!
//! Handlers return `Result<T, AppError>`. Errors render as `{"message": ...}`,
//! field validation failures as `{"errors": [{"path", "msg"}]}`, and the
//! `Enveloped` wrapper renders `{"success": false, "message": ...}` for the
//! endpoints that answer in that shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::domain::aggregates::{CartError, OrderError, ProductError, SupportQueryError, TransitionRejected};
use crate::middleware::auth::AuthError;
use crate::payment::{GatewayError, SignatureError};
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum AppError {
    /// No verified identity, or no profile for it.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    /// Field-level validation failures.
    #[error("Validation failed: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    /// Well-formed request rejected by the order lifecycle.
    #[error(transparent)]
    Guard(#[from] TransitionRejected),

    #[error("Payment gateway error: {0}")]
    Upstream(#[from] GatewayError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Invalid(_) | Self::Guard(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) | Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server-side failures never expose their details.
    pub fn public_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Upstream(_) => "Internal Server Error. Failed to create Razorpay order.".to_string(),
            Self::Invalid(_) => "Validation failed".to_string(),
            _ => self.to_string(),
        }
    }

    fn log(&self) {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "Request error");
        }
    }
}

#[derive(Serialize)]
struct FieldError {
    path: String,
    msg: String,
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_field_errors(errors, None, &mut out);
    out
}

fn collect_field_errors(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => camel_case(field),
        };
        match kind {
            ValidationErrorsKind::Field(list) => out.extend(list.iter().map(|e| FieldError {
                path: path.clone(),
                msg: e.message.as_ref().map_or_else(|| format!("Invalid {path}"), ToString::to_string),
            })),
            ValidationErrorsKind::Struct(nested) => collect_field_errors(nested, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(nested, Some(&format!("{path}[{index}]")), out);
                }
            }
        }
    }
}

/// Field names go out the way clients sent them.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        match &self {
            Self::Invalid(errors) => (status, Json(json!({ "errors": field_errors(errors) }))).into_response(),
            _ => (status, Json(json!({ "message": self.public_message() }))).into_response(),
        }
    }
}

/// Renders an `AppError` as `{"success": false, "message": ...}`.
#[derive(Debug)]
pub struct Enveloped(pub AppError);

macro_rules! enveloped_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for Enveloped {
                fn from(err: $source) -> Self {
                    Self(err.into())
                }
            }
        )*
    };
}

enveloped_from!(AppError, StorageError, GatewayError, SignatureError, SupportQueryError, ValidationErrors);

impl IntoResponse for Enveloped {
    fn into_response(self) -> Response {
        self.0.log();
        let mut body = json!({ "success": false, "message": self.0.public_message() });
        if let AppError::Invalid(errors) = &self.0 {
            body["errors"] = json!(field_errors(errors));
        }
        (self.0.status(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// =============================================================================
// Domain error conversions
// =============================================================================

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound | CartError::CartNotFound => Self::NotFound(err.to_string()),
            CartError::ItemNotFound | CartError::InvalidQuantity => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound => Self::NotFound(err.to_string()),
            OrderError::Rejected(rejected) => Self::Guard(rejected),
            OrderError::InvalidShippingAddress(errors) => Self::Invalid(errors),
            OrderError::UnknownStatus(_) | OrderError::UnknownPaymentMethod(_) => Self::Internal(err.to_string()),
            _ => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<SupportQueryError> for AppError {
    fn from(err: SupportQueryError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<SignatureError> for AppError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::MissingDetails | SignatureError::Mismatch => Self::BadRequest(err.to_string()),
            SignatureError::Key(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        tracing::debug!(error = %err, "Rejected credentials");
        Self::Unauthorized
    }
}
