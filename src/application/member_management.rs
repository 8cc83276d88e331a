use crate::domain::errors::RejectReason;
use crate::domain::member::Member;
use crate::domain::value_objects::MemberId;

use super::ServiceDependencies;
use super::errors::{Result, ServiceError};

/// 会員を登録する
///
/// ビジネスルール：
/// - IDと名前は必須（空白のみは不可）
/// - 同じIDの会員が存在しないこと
pub async fn create_member(
    deps: &ServiceDependencies,
    member_id: MemberId,
    name: &str,
) -> Result<()> {
    // 1. 必須フィールド確認
    if member_id.as_str().trim().is_empty() || name.trim().is_empty() {
        return Err(RejectReason::InvalidRequest.into());
    }

    let _guard = deps.member_locks.acquire(member_id.as_str()).await;

    // 2. ID衝突確認
    if deps.member_repo.exists_by_id(&member_id).await? {
        return Err(RejectReason::MemberAlreadyExists.into());
    }

    // 3. 保存
    deps.member_repo.save(Member::new(member_id, name)).await?;
    Ok(())
}

/// 会員の名前を更新する
pub async fn update_member(
    deps: &ServiceDependencies,
    member_id: &MemberId,
    name: &str,
) -> Result<()> {
    let _guard = deps.member_locks.acquire(member_id.as_str()).await;

    // 1. 会員の存在確認
    let mut member = deps
        .member_repo
        .find_by_id(member_id)
        .await?
        .ok_or(ServiceError::Rejected(RejectReason::MemberNotFound))?;

    // 2. 必須フィールド確認
    if name.trim().is_empty() {
        return Err(RejectReason::InvalidRequest.into());
    }

    // 3. 名前を上書きして保存
    member.name = name.to_string();
    deps.member_repo.save(member).await?;
    Ok(())
}

/// 会員を削除する
///
/// ビジネスルール：
/// - 1冊でも借りている会員は削除不可
/// - 削除時、会員が並んでいるすべての予約キューから取り除く
///
/// キューの浄化は、対象の全書籍のロックをID順（正規順）で取得して行う。
/// ロック取得とスキャンの間に予約が入る可能性があるため、
/// 浄化対象が見つからなくなるまで再スキャンする。
pub async fn delete_member(deps: &ServiceDependencies, member_id: &MemberId) -> Result<()> {
    let _guard = deps.member_locks.acquire(member_id.as_str()).await;

    // 1. 会員の存在確認
    if !deps.member_repo.exists_by_id(member_id).await? {
        return Err(RejectReason::MemberNotFound.into());
    }

    // 2. 貸出中の確認
    if deps.book_repo.exists_by_loaned_to(member_id).await? {
        return Err(RejectReason::MemberHasLoans.into());
    }

    // 3. 予約キューの浄化
    loop {
        let affected = deps
            .book_repo
            .find_by_reservation_queue_containing(member_id)
            .await?;
        if affected.is_empty() {
            break;
        }

        let book_ids: Vec<String> = affected
            .iter()
            .map(|b| b.id.as_str().to_string())
            .collect();
        let _book_guards = deps.book_locks.acquire_many(&book_ids).await;

        // ロック取得後に読み直してから書き戻す
        for book in &affected {
            let Some(mut book) = deps.book_repo.find_by_id(&book.id).await? else {
                continue;
            };
            if book.queue.remove(member_id) {
                deps.book_repo.save(book).await?;
            }
        }
    }

    // 4. 会員を削除
    deps.member_repo.delete(member_id).await?;
    Ok(())
}
