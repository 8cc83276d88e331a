use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::book::Book;
use crate::domain::value_objects::{BookId, MemberId};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍リポジトリポート
///
/// 永続化された書籍エンティティを排他的に所有する。エンジンは1操作の中で
/// 読み込み・変更・書き戻しを行い、エンティティを操作間で共有しない。
/// 実装はスレッドセーフであること。
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn find_by_id(&self, book_id: &BookId) -> Result<Option<Book>>;

    async fn exists_by_id(&self, book_id: &BookId) -> Result<bool>;

    /// 書籍の現在状態を保存する（新規はINSERT、既存はUPDATE）
    async fn save(&self, book: Book) -> Result<()>;

    async fn delete(&self, book_id: &BookId) -> Result<()>;

    async fn find_all(&self) -> Result<Vec<Book>>;

    /// 会員が現在借りている冊数
    ///
    /// 貸出上限（会員ごと最大5冊）の確認に使用される。
    async fn count_by_loaned_to(&self, member_id: &MemberId) -> Result<usize>;

    /// 会員が現在借りている書籍
    async fn find_by_loaned_to(&self, member_id: &MemberId) -> Result<Vec<Book>>;

    /// 返却期限が指定日より前の貸出中の書籍（延滞検索用）
    async fn find_by_due_date_before(&self, date: NaiveDate) -> Result<Vec<Book>>;

    /// 予約キューに会員が並んでいる書籍
    async fn find_by_reservation_queue_containing(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<Book>>;

    /// 貸出されていない書籍
    async fn find_by_loaned_to_is_null(&self) -> Result<Vec<Book>>;

    /// 会員が1冊でも借りているか
    async fn exists_by_loaned_to(&self, member_id: &MemberId) -> Result<bool>;

    /// タイトルの部分一致検索（大文字小文字を区別しない）
    async fn find_by_title_containing_ignore_case(&self, fragment: &str) -> Result<Vec<Book>>;
}
