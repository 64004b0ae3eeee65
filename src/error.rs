//! Basket engine error taxonomy.
//!
//! Every expected failure of the registry, a basket, or the config parser is
//! a `BasketError`. Each variant maps onto exactly one HTTP status so the
//! handlers can return it directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Errors returned by basket operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BasketError {
    /// No basket is registered under this name.
    #[error("basket '{0}' not found")]
    NotFound(String),

    /// The provided token does not match the basket token.
    #[error("invalid basket token")]
    Unauthorized,

    /// A basket with this name already exists.
    #[error("basket '{0}' already exists")]
    Conflict(String),

    /// Malformed config body, invalid forward URL or invalid basket name.
    #[error("{0}")]
    Validation(String),
}

impl BasketError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            BasketError::NotFound(_) => StatusCode::NOT_FOUND,
            BasketError::Unauthorized => StatusCode::UNAUTHORIZED,
            BasketError::Conflict(_) => StatusCode::CONFLICT,
            BasketError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for BasketError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type BasketResult<T> = Result<T, BasketError>;
