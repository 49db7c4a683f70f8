//! # API 统一错误处理
//!
//! 将下层各 crate 的错误类型统一映射到 HTTP 状态码与 JSON 响应体。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use refdata_core::common::error::ValidationError;
use refdata_core::store::error::StoreError;
use refdata_registry::error::RegistryError;
use thiserror::Error;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 资源未找到 (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 主键冲突 (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 请求体校验失败 (422)
    #[error("Unprocessable request: {0}")]
    Unprocessable(String),

    /// 尚未支持的操作 (501)
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// 下层存储错误 (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotImplemented(msg) => (StatusCode::NOT_IMPLEMENTED, msg),
            ApiError::Internal(msg) => {
                // 内部错误只记录日志，不向客户端透传细节
                tracing::error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ApiErrorResponse::from_msg(message));
        (status, body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Unprocessable(err.to_string())
    }
}

/// 从 `RegistryError` 转换
impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Validation(e) => e.into(),
            RegistryError::Store(StoreError::Duplicate(key)) => {
                ApiError::Conflict(format!("Record already exists: {}", key))
            }
            RegistryError::Store(e) => ApiError::Internal(e.to_string()),
            RegistryError::Unsupported(op) => {
                ApiError::NotImplemented(format!("{} is not supported yet", op))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_errors_map_to_status() {
        let cases = [
            (
                RegistryError::Validation(ValidationError::EmptyBatch),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                RegistryError::Store(StoreError::Duplicate("k".into())),
                StatusCode::CONFLICT,
            ),
            (
                RegistryError::Store(StoreError::Database("disk full".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RegistryError::Unsupported("editing"),
                StatusCode::NOT_IMPLEMENTED,
            ),
        ];
        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
