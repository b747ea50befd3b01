//! Custom error types for the catalogue service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

/// Custom error type for the catalogue service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Unknown product
    #[error("Produit non trouvé")]
    NotFound,

    /// Malformed input
    #[error("{0}")]
    BadRequest(String),

    /// Per-field validation failures, all collected
    #[error("Erreurs de validation")]
    Validation(HashMap<String, String>),

    /// Unexpected internal failure; detail stays in the server logs
    #[error("Une erreur interne est survenue")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = json!({
            "success": false,
            "message": self.to_string(),
        });

        if let ApiError::Validation(erreurs) = &self {
            body["erreurs"] = json!(erreurs);
        }

        (status, Json(body)).into_response()
    }
}

/// Type alias for catalogue results
pub type ApiResult<T> = Result<T, ApiError>;
