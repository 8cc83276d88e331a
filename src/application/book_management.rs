use crate::domain::book::Book;
use crate::domain::errors::RejectReason;
use crate::domain::value_objects::BookId;

use super::ServiceDependencies;
use super::errors::{Result, ServiceError};

/// 書籍を登録する
///
/// ビジネスルール：
/// - IDとタイトルは必須（空白のみは不可）
/// - 同じIDの書籍が存在しないこと
///
/// 新規の書籍は空の予約キューを持ち、貸出されていない状態で保存される。
pub async fn create_book(deps: &ServiceDependencies, book_id: BookId, title: &str) -> Result<()> {
    // 1. 必須フィールド確認
    if book_id.as_str().trim().is_empty() || title.trim().is_empty() {
        return Err(RejectReason::InvalidRequest.into());
    }

    let _guard = deps.book_locks.acquire(book_id.as_str()).await;

    // 2. ID衝突確認
    if deps.book_repo.exists_by_id(&book_id).await? {
        return Err(RejectReason::BookAlreadyExists.into());
    }

    // 3. 保存
    deps.book_repo.save(Book::new(book_id, title)).await?;
    Ok(())
}

/// 書籍のタイトルを更新する
pub async fn update_book(deps: &ServiceDependencies, book_id: &BookId, title: &str) -> Result<()> {
    let _guard = deps.book_locks.acquire(book_id.as_str()).await;

    // 1. 書籍の存在確認
    let mut book = deps
        .book_repo
        .find_by_id(book_id)
        .await?
        .ok_or(ServiceError::Rejected(RejectReason::BookNotFound))?;

    // 2. 必須フィールド確認
    if title.trim().is_empty() {
        return Err(RejectReason::InvalidRequest.into());
    }

    // 3. タイトルを上書きして保存
    book.title = title.to_string();
    deps.book_repo.save(book).await?;
    Ok(())
}

/// 書籍を削除する
///
/// ビジネスルール：
/// - 貸出中の書籍は削除不可
/// - 予約キューが空でない書籍は削除不可
pub async fn delete_book(deps: &ServiceDependencies, book_id: &BookId) -> Result<()> {
    let _guard = deps.book_locks.acquire(book_id.as_str()).await;

    // 1. 書籍の存在確認
    let book = deps
        .book_repo
        .find_by_id(book_id)
        .await?
        .ok_or(ServiceError::Rejected(RejectReason::BookNotFound))?;

    // 2. 貸出中の確認
    if book.is_loaned() {
        return Err(RejectReason::BookLoaned.into());
    }

    // 3. 予約の確認
    if !book.queue.is_empty() {
        return Err(RejectReason::BookReserved.into());
    }

    // 4. 削除
    deps.book_repo.delete(book_id).await?;
    Ok(())
}
