use crate::domain::book::{MAX_LOANS, ReservationQueue};
use crate::domain::commands::{BorrowBook, CancelReservation, ExtendLoan, ReserveBook, ReturnBook};
use crate::domain::errors::RejectReason;
use crate::domain::value_objects::MemberId;

use super::ServiceDependencies;
use super::errors::{Result, ServiceError};

/// 返却操作の結果
///
/// 返却の拒否は理由コードを持たない（現行の契約）。
/// 成功時はハンドオフで次に貸し出された会員を運ぶ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// 返却は受理されなかった
    Rejected,
    /// 返却成功。ハンドオフ先の会員（いなければNone）
    Returned { next: Option<MemberId> },
}

/// 書籍を借りる
///
/// エラーの優先順位（最初に該当したものが返る）：
/// 1. BOOK_NOT_FOUND
/// 2. MEMBER_NOT_FOUND
/// 3. BORROW_LIMIT - 貸出中の冊数が上限（5冊）
/// 4. ALREADY_BORROWED / BOOK_UNAVAILABLE - 既に貸出中
/// 5. RESERVED - 予約キューの先頭が別の会員
///
/// 成功時：キューの先頭が本人なら取り除き、貸出を開始して保存する。
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<()> {
    let _guard = deps.book_locks.acquire(cmd.book_id.as_str()).await;

    // 1. 書籍の存在確認
    let mut book = deps
        .book_repo
        .find_by_id(&cmd.book_id)
        .await?
        .ok_or(ServiceError::Rejected(RejectReason::BookNotFound))?;

    // 2. 会員の存在確認
    if !deps.member_repo.exists_by_id(&cmd.member_id).await? {
        return Err(RejectReason::MemberNotFound.into());
    }

    // 3. 貸出上限確認
    if deps.book_repo.count_by_loaned_to(&cmd.member_id).await? >= MAX_LOANS {
        return Err(RejectReason::BorrowLimit.into());
    }

    // 4. 貸出中の確認
    if let Some(borrower) = book.loan.borrower() {
        let reason = if borrower == &cmd.member_id {
            RejectReason::AlreadyBorrowed
        } else {
            RejectReason::BookUnavailable
        };
        return Err(reason.into());
    }

    // 5. 予約キューの先頭確認
    if let Some(head) = book.queue.head() {
        if head != &cmd.member_id {
            return Err(RejectReason::Reserved.into());
        }
    }

    // 6. 貸出開始（先頭に並んでいた本人はキューから外れる）
    book.start_loan(cmd.member_id, cmd.today);
    deps.book_repo.save(book).await?;
    Ok(())
}

/// 書籍を返却する
///
/// 失敗条件（いずれも理由コードなしのRejected）：
/// - 書籍が存在しない
/// - 書籍が貸出中でない
/// - 会員が存在しない
/// - 返却者が借り手でない
///
/// 成功時は貸出を終了し、ハンドオフプロトコルを実行する。ハンドオフ先が
/// 選出された場合、その会員への新しい貸出が返却と同時に（1回の保存で）
/// 開始される。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<ReturnOutcome> {
    let _guard = deps.book_locks.acquire(cmd.book_id.as_str()).await;

    let Some(mut book) = deps.book_repo.find_by_id(&cmd.book_id).await? else {
        return Ok(ReturnOutcome::Rejected);
    };
    if !deps.member_repo.exists_by_id(&cmd.member_id).await? {
        return Ok(ReturnOutcome::Rejected);
    }
    // 借り手でない（未貸出を含む）場合は拒否
    if !book.is_loaned_to(&cmd.member_id) {
        return Ok(ReturnOutcome::Rejected);
    }

    book.end_loan();

    // ハンドオフ：適格な会員がいればそのまま新しい貸出を開始する
    let next = elect_next(deps, &mut book.queue).await?;
    if let Some(next_member) = &next {
        book.start_loan(next_member.clone(), cmd.today);
    }

    deps.book_repo.save(book).await?;
    Ok(ReturnOutcome::Returned { next })
}

/// ハンドオフプロトコル：キューの先頭から適格な会員を走査する
///
/// 不適格な先頭（存在しない会員、または貸出上限に達した会員）は
/// 恒久的にキューから取り除かれる。これにより走査は必ず前進し、
/// 適格な会員の間ではFIFO順が保たれる。
async fn elect_next(
    deps: &ServiceDependencies,
    queue: &mut ReservationQueue,
) -> Result<Option<MemberId>> {
    while let Some(candidate) = queue.pop_head() {
        if deps.member_repo.exists_by_id(&candidate).await?
            && deps.book_repo.count_by_loaned_to(&candidate).await? < MAX_LOANS
        {
            return Ok(Some(candidate));
        }
        // 不適格な先頭は捨てて走査を続ける
    }
    Ok(None)
}

/// 書籍を予約する
///
/// エラーの優先順位：
/// 1. BOOK_NOT_FOUND
/// 2. MEMBER_NOT_FOUND
/// 3. ALREADY_BORROWED - 自分が借りている書籍は予約不可
/// 4. ALREADY_RESERVED - 既に並んでいる
///
/// 成功時：書籍が空きでかつ貸出上限に達していなければ即時貸出
/// （キューには触れない）。そうでなければキューの末尾に追加する。
pub async fn reserve_book(deps: &ServiceDependencies, cmd: ReserveBook) -> Result<()> {
    let _guard = deps.book_locks.acquire(cmd.book_id.as_str()).await;

    // 1. 書籍の存在確認
    let mut book = deps
        .book_repo
        .find_by_id(&cmd.book_id)
        .await?
        .ok_or(ServiceError::Rejected(RejectReason::BookNotFound))?;

    // 2. 会員の存在確認
    if !deps.member_repo.exists_by_id(&cmd.member_id).await? {
        return Err(RejectReason::MemberNotFound.into());
    }

    // 3. 自分の貸出確認
    if book.is_loaned_to(&cmd.member_id) {
        return Err(RejectReason::AlreadyBorrowed.into());
    }

    // 4. 重複予約確認
    if book.queue.contains(&cmd.member_id) {
        return Err(RejectReason::AlreadyReserved.into());
    }

    // 5. 即時貸出、またはキューに追加
    if book.loan.is_free() && deps.book_repo.count_by_loaned_to(&cmd.member_id).await? < MAX_LOANS
    {
        book.start_loan(cmd.member_id, cmd.today);
    } else {
        book.queue.push_back(cmd.member_id);
    }

    deps.book_repo.save(book).await?;
    Ok(())
}

/// 予約を取り消す
///
/// エラー：BOOK_NOT_FOUND、MEMBER_NOT_FOUND、NOT_RESERVED（並んでいない）
pub async fn cancel_reservation(
    deps: &ServiceDependencies,
    cmd: CancelReservation,
) -> Result<()> {
    let _guard = deps.book_locks.acquire(cmd.book_id.as_str()).await;

    // 1. 書籍の存在確認
    let mut book = deps
        .book_repo
        .find_by_id(&cmd.book_id)
        .await?
        .ok_or(ServiceError::Rejected(RejectReason::BookNotFound))?;

    // 2. 会員の存在確認
    if !deps.member_repo.exists_by_id(&cmd.member_id).await? {
        return Err(RejectReason::MemberNotFound.into());
    }

    // 3. キューから取り除く
    if !book.queue.remove(&cmd.member_id) {
        return Err(RejectReason::NotReserved.into());
    }

    deps.book_repo.save(book).await?;
    Ok(())
}

/// 貸出を延長する
///
/// エラーの優先順位：
/// 1. INVALID_EXTENSION - 日数が0
/// 2. BOOK_NOT_FOUND
/// 3. MEMBER_NOT_FOUND
/// 4. NOT_LOANED - 貸出されていない
/// 5. NOT_BORROWER - 借り手でない
/// 6. RESERVATION_EXISTS - 予約キューが空でない
/// 7. MAX_EXTENSION_REACHED - 初回返却期限から90日を超える、または初回返却期限を下回る
///
/// 負の日数（短縮）は、最終的な期限が初回返却期限以上に留まる限り許容される。
pub async fn extend_loan(deps: &ServiceDependencies, cmd: ExtendLoan) -> Result<()> {
    // 1. 日数の確認（書籍の照会より先）
    if cmd.days == 0 {
        return Err(RejectReason::InvalidExtension.into());
    }

    let _guard = deps.book_locks.acquire(cmd.book_id.as_str()).await;

    // 2. 書籍の存在確認
    let mut book = deps
        .book_repo
        .find_by_id(&cmd.book_id)
        .await?
        .ok_or(ServiceError::Rejected(RejectReason::BookNotFound))?;

    // 3. 会員の存在確認
    if !deps.member_repo.exists_by_id(&cmd.member_id).await? {
        return Err(RejectReason::MemberNotFound.into());
    }

    // 4. 貸出状態と借り手の確認
    match book.loan.borrower() {
        None => return Err(RejectReason::NotLoaned.into()),
        Some(borrower) if borrower != &cmd.member_id => {
            return Err(RejectReason::NotBorrower.into());
        }
        Some(_) => {}
    }

    // 5. 予約の確認
    if !book.queue.is_empty() {
        return Err(RejectReason::ReservationExists.into());
    }

    // 6. 期限を延長して保存
    book.extend_due(cmd.days).map_err(ServiceError::Rejected)?;
    deps.book_repo.save(book).await?;
    Ok(())
}

/// 会員が今すぐ借りられるか
///
/// 会員が存在し、かつ貸出中の冊数が上限未満であること。
pub async fn can_member_borrow(deps: &ServiceDependencies, member_id: &MemberId) -> Result<bool> {
    Ok(deps.member_repo.exists_by_id(member_id).await?
        && deps.book_repo.count_by_loaned_to(member_id).await? < MAX_LOANS)
}
