// ABOUTME: axum IntoResponse implementation for AppError
// ABOUTME: Logs server-side failures and renders the JSON error body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorResponse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            match &self.source {
                Some(source) => {
                    tracing::error!(code = ?self.code, error = %self, source = %source, "Request failed");
                }
                None => tracing::error!(code = ?self.code, error = %self, "Request failed"),
            }
        }

        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let response = AppError::internal("database handle poisoned").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Server error");
        assert_eq!(json["code"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_not_found_status() {
        let response = AppError::new(ErrorCode::ResourceNotFound, "Dish not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
