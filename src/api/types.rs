use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::query_service::MemberSummary;
use crate::domain::book::Book;
use crate::domain::member::Member;

/// 書籍のレスポンス表現
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: String,
    pub title: String,
    pub loaned_to: Option<String>,
    pub reservation_queue: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        let loan = book.loan.as_loan();
        Self {
            id: book.id.as_str().to_string(),
            title: book.title.clone(),
            loaned_to: loan.map(|l| l.borrower.as_str().to_string()),
            due_date: loan.map(|l| l.due_date),
            reservation_queue: book
                .queue
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
        }
    }
}

/// 会員のレスポンス表現
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    pub id: String,
    pub name: String,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id.into_string(),
            name: member.name,
        }
    }
}

/// 一覧レスポンスの共通ラッパー
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

/// 変更系操作の共通レスポンス：`{ok, reason?}`
///
/// `reason`は閉じたエラーコード集合の文字列表現。
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl OperationResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }

    pub fn failed() -> Self {
        Self {
            ok: false,
            reason: None,
        }
    }
}

/// 返却操作のレスポンス：`{ok, nextMemberId?}`
///
/// 返却の失敗は理由コードを運ばない（現行契約の維持）。
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_member_id: Option<String>,
}

/// 書籍の作成・更新リクエスト
#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertBookRequest {
    pub id: String,
    pub title: String,
}

/// 会員の作成・更新リクエスト
#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertMemberRequest {
    pub id: String,
    pub name: String,
}

/// 削除リクエスト（書籍・会員共通）
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub id: String,
}

/// 貸出・返却・予約・取消のリクエスト
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanActionRequest {
    pub book_id: String,
    pub member_id: String,
}

/// 延長リクエスト
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendRequest {
    pub book_id: String,
    pub member_id: String,
    pub days: i64,
}

/// 書籍一覧のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    /// タイトルの部分一致
    pub title: Option<String>,
    /// true: 空きのみ / false: 貸出中のみ
    pub available: Option<bool>,
    /// 会員が借りている書籍のみ
    pub member: Option<String>,
}

/// 会員サマリの予約エントリ
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationEntryResponse {
    pub book_id: String,
    pub position: usize,
}

/// 会員サマリのレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberSummaryResponse {
    pub member: MemberResponse,
    pub loans: Vec<BookResponse>,
    pub reservations: Vec<ReservationEntryResponse>,
}

impl From<MemberSummary> for MemberSummaryResponse {
    fn from(summary: MemberSummary) -> Self {
        Self {
            member: summary.member.into(),
            loans: summary.loans.into_iter().map(BookResponse::from).collect(),
            reservations: summary
                .reservations
                .into_iter()
                .map(|entry| ReservationEntryResponse {
                    book_id: entry.book_id.into_string(),
                    position: entry.position,
                })
                .collect(),
        }
    }
}

/// ヘルスチェックのレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
