use chrono::NaiveDate;

use crate::domain::book::Book;
use crate::domain::errors::RejectReason;
use crate::domain::member::Member;
use crate::domain::value_objects::{BookId, MemberId};

use super::ServiceDependencies;
use super::errors::{Result, ServiceError};

/// 書籍検索の条件
#[derive(Debug, Clone, Default)]
pub struct BookSearch {
    /// タイトルの部分一致（大文字小文字を区別しない）
    pub title_contains: Option<String>,
    /// true: 空きのみ / false: 貸出中のみ / None: すべて
    pub available_only: Option<bool>,
    /// 指定した会員が借りている書籍のみ
    pub loaned_to: Option<MemberId>,
}

/// 会員の予約の1エントリ（書籍と0始まりの待ち位置）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationEntry {
    pub book_id: BookId,
    pub position: usize,
}

/// 会員ごとのサマリ
#[derive(Debug, Clone)]
pub struct MemberSummary {
    pub member: Member,
    pub loans: Vec<Book>,
    pub reservations: Vec<ReservationEntry>,
}

/// 書籍を検索する
///
/// `loaned_to`が最優先、次に`available_only`、最後にタイトルフィルタを適用する。
/// タイトルのみの検索はリポジトリ側の部分一致クエリに委譲する。
pub async fn search_books(deps: &ServiceDependencies, search: BookSearch) -> Result<Vec<Book>> {
    let mut books = if let Some(member_id) = &search.loaned_to {
        deps.book_repo.find_by_loaned_to(member_id).await?
    } else {
        match (search.available_only, &search.title_contains) {
            (Some(true), _) => deps.book_repo.find_by_loaned_to_is_null().await?,
            (Some(false), _) => {
                let mut all = deps.book_repo.find_all().await?;
                all.retain(|b| b.is_loaned());
                all
            }
            (None, Some(fragment)) => {
                return Ok(deps
                    .book_repo
                    .find_by_title_containing_ignore_case(fragment)
                    .await?);
            }
            (None, None) => deps.book_repo.find_all().await?,
        }
    };

    if let Some(fragment) = &search.title_contains {
        let needle = fragment.to_lowercase();
        books.retain(|b| b.title.to_lowercase().contains(&needle));
    }

    Ok(books)
}

/// 延滞中の書籍（返却期限が指定日より前）
pub async fn overdue_books(deps: &ServiceDependencies, today: NaiveDate) -> Result<Vec<Book>> {
    Ok(deps.book_repo.find_by_due_date_before(today).await?)
}

/// 会員のサマリ：貸出中の書籍と、並んでいる予約キューでの位置
pub async fn member_summary(
    deps: &ServiceDependencies,
    member_id: &MemberId,
) -> Result<MemberSummary> {
    let member = deps
        .member_repo
        .find_by_id(member_id)
        .await?
        .ok_or(ServiceError::Rejected(RejectReason::MemberNotFound))?;

    let loans = deps.book_repo.find_by_loaned_to(member_id).await?;

    let reservations = deps
        .book_repo
        .find_by_reservation_queue_containing(member_id)
        .await?
        .into_iter()
        .filter_map(|book| {
            book.queue.position(member_id).map(|position| ReservationEntry {
                book_id: book.id,
                position,
            })
        })
        .collect();

    Ok(MemberSummary {
        member,
        loans,
        reservations,
    })
}

pub async fn find_book(deps: &ServiceDependencies, book_id: &BookId) -> Result<Option<Book>> {
    Ok(deps.book_repo.find_by_id(book_id).await?)
}

pub async fn all_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    Ok(deps.book_repo.find_all().await?)
}

pub async fn all_members(deps: &ServiceDependencies) -> Result<Vec<Member>> {
    Ok(deps.member_repo.find_all().await?)
}
