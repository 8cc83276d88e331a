use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::ServiceError;

use super::types::OperationResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
/// - ドメイン上の拒否 → 404（リソース不在）または422、`{ok:false, reason}`
/// - リポジトリ障害 → 500、理由コードなしの一般的なボディ
#[derive(Debug)]
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            ServiceError::Rejected(reason) => {
                let status = if reason.is_not_found() {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::UNPROCESSABLE_ENTITY
                };
                (status, Json(OperationResponse::rejected(reason.as_str()))).into_response()
            }
            // 内部エラーの詳細はログに記録し、クライアントには一般的なボディのみを返す
            ServiceError::Repository(e) => {
                tracing::error!("Repository error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(OperationResponse::failed()),
                )
                    .into_response()
            }
        }
    }
}
