use thiserror::Error;

use crate::domain::errors::RejectReason;

/// アプリケーション層のエラー
///
/// ドメイン上の拒否（`Rejected`）と、ストレージ障害などのシステムエラー
/// （`Repository`）を区別する。拒否は理由コードとしてワイヤに現れ、
/// システムエラーはHTTP境界で5xxになる。
#[derive(Debug, Error)]
pub enum ServiceError {
    /// ドメインルールによる拒否
    #[error("Operation rejected: {0}")]
    Rejected(RejectReason),

    /// リポジトリのエラー
    #[error("Repository error")]
    Repository(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ServiceError {
    /// 拒否理由コード（システムエラーの場合はNone）
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            ServiceError::Rejected(reason) => Some(*reason),
            ServiceError::Repository(_) => None,
        }
    }
}

impl From<RejectReason> for ServiceError {
    fn from(reason: RejectReason) -> Self {
        ServiceError::Rejected(reason)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ServiceError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ServiceError::Repository(err)
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ServiceError>;
