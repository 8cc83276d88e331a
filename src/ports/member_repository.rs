use async_trait::async_trait;

use crate::domain::member::Member;
use crate::domain::value_objects::MemberId;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 会員リポジトリポート
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_id(&self, member_id: &MemberId) -> Result<Option<Member>>;

    async fn exists_by_id(&self, member_id: &MemberId) -> Result<bool>;

    /// 会員の現在状態を保存する（新規はINSERT、既存はUPDATE）
    async fn save(&self, member: Member) -> Result<()>;

    async fn delete(&self, member_id: &MemberId) -> Result<()>;

    async fn find_all(&self) -> Result<Vec<Member>>;
}
