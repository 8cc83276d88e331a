use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::application::LibraryFacade;
use crate::application::loan_engine::ReturnOutcome;
use crate::application::query_service::BookSearch;
use crate::domain::commands::{BorrowBook, CancelReservation, ExtendLoan, ReserveBook, ReturnBook};
use crate::domain::value_objects::{BookId, MemberId};

use super::error::ApiError;
use super::types::{
    BookResponse, DeleteRequest, ExtendRequest, HealthResponse, ItemsResponse, ListBooksQuery,
    LoanActionRequest, MemberResponse, MemberSummaryResponse, OperationResponse,
    ReturnResponse, UpsertBookRequest, UpsertMemberRequest,
};

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub facade: LibraryFacade,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ============================================================================
// 書籍・会員の管理（POST / PUT / DELETE）
// ============================================================================

/// POST /api/books - 書籍を登録
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpsertBookRequest>,
) -> Result<(StatusCode, Json<OperationResponse>), ApiError> {
    state
        .facade
        .create_book(BookId::new(req.id), &req.title)
        .await?;
    Ok((StatusCode::CREATED, Json(OperationResponse::ok())))
}

/// PUT /api/books - 書籍タイトルを更新
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpsertBookRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    state
        .facade
        .update_book(&BookId::new(req.id), &req.title)
        .await?;
    Ok(Json(OperationResponse::ok()))
}

/// DELETE /api/books - 書籍を削除
///
/// 貸出中（BOOK_LOANED）または予約あり（BOOK_RESERVED）の書籍は削除できない。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    state.facade.delete_book(&BookId::new(req.id)).await?;
    Ok(Json(OperationResponse::ok()))
}

/// POST /api/members - 会員を登録
pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpsertMemberRequest>,
) -> Result<(StatusCode, Json<OperationResponse>), ApiError> {
    state
        .facade
        .create_member(MemberId::new(req.id), &req.name)
        .await?;
    Ok((StatusCode::CREATED, Json(OperationResponse::ok())))
}

/// PUT /api/members - 会員名を更新
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpsertMemberRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    state
        .facade
        .update_member(&MemberId::new(req.id), &req.name)
        .await?;
    Ok(Json(OperationResponse::ok()))
}

/// DELETE /api/members - 会員を削除
///
/// 貸出中の書籍を持つ会員は削除できない（MEMBER_HAS_LOANS）。
/// 削除時、すべての予約キューから会員が取り除かれる。
pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    state.facade.delete_member(&MemberId::new(req.id)).await?;
    Ok(Json(OperationResponse::ok()))
}

// ============================================================================
// 貸出ライフサイクル（POST）
// ============================================================================

/// POST /api/borrow - 書籍を借りる
pub async fn borrow(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoanActionRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    state
        .facade
        .borrow_book(BorrowBook {
            book_id: BookId::new(req.book_id),
            member_id: MemberId::new(req.member_id),
            today: today(),
        })
        .await?;
    Ok(Json(OperationResponse::ok()))
}

/// POST /api/return - 書籍を返却する
///
/// 成功時、ハンドオフで次に貸し出された会員を`nextMemberId`で返す。
/// 拒否は理由コードなしの`{ok:false}`。
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoanActionRequest>,
) -> Result<(StatusCode, Json<ReturnResponse>), ApiError> {
    let outcome = state
        .facade
        .return_book(ReturnBook {
            book_id: BookId::new(req.book_id),
            member_id: MemberId::new(req.member_id),
            today: today(),
        })
        .await?;

    match outcome {
        ReturnOutcome::Returned { next } => Ok((
            StatusCode::OK,
            Json(ReturnResponse {
                ok: true,
                next_member_id: next.map(MemberId::into_string),
            }),
        )),
        ReturnOutcome::Rejected => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ReturnResponse {
                ok: false,
                next_member_id: None,
            }),
        )),
    }
}

/// POST /api/reserve - 書籍を予約する
pub async fn reserve(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoanActionRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    state
        .facade
        .reserve_book(ReserveBook {
            book_id: BookId::new(req.book_id),
            member_id: MemberId::new(req.member_id),
            today: today(),
        })
        .await?;
    Ok(Json(OperationResponse::ok()))
}

/// POST /api/cancel-reservation - 予約を取り消す
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoanActionRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    state
        .facade
        .cancel_reservation(CancelReservation {
            book_id: BookId::new(req.book_id),
            member_id: MemberId::new(req.member_id),
        })
        .await?;
    Ok(Json(OperationResponse::ok()))
}

/// POST /api/extend - 貸出を延長する
pub async fn extend(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtendRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    state
        .facade
        .extend_loan(ExtendLoan {
            book_id: BookId::new(req.book_id),
            member_id: MemberId::new(req.member_id),
            days: req.days,
        })
        .await?;
    Ok(Json(OperationResponse::ok()))
}

// ============================================================================
// クエリ（GET）
// ============================================================================

/// GET /api/books - 書籍一覧・検索
///
/// クエリパラメータ:
/// - title: タイトルの部分一致（大文字小文字を区別しない）
/// - available: true=空きのみ / false=貸出中のみ
/// - member: 会員が借りている書籍のみ
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<ItemsResponse<BookResponse>>, ApiError> {
    let books = state
        .facade
        .search_books(BookSearch {
            title_contains: query.title,
            available_only: query.available,
            loaned_to: query.member.map(MemberId::new),
        })
        .await?;

    Ok(Json(ItemsResponse {
        items: books.into_iter().map(BookResponse::from).collect(),
    }))
}

/// GET /api/books/overdue - 延滞中の書籍一覧
pub async fn list_overdue_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ItemsResponse<BookResponse>>, ApiError> {
    let books = state.facade.overdue_books(today()).await?;
    Ok(Json(ItemsResponse {
        items: books.into_iter().map(BookResponse::from).collect(),
    }))
}

/// GET /api/members - 会員一覧
pub async fn list_members(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ItemsResponse<MemberResponse>>, ApiError> {
    let members = state.facade.all_members().await?;
    Ok(Json(ItemsResponse {
        items: members.into_iter().map(MemberResponse::from).collect(),
    }))
}

/// GET /api/members/:id/summary - 会員の貸出・予約サマリ
pub async fn member_summary(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<String>,
) -> Result<Json<MemberSummaryResponse>, ApiError> {
    let summary = state
        .facade
        .member_summary(&MemberId::new(member_id))
        .await?;
    Ok(Json(MemberSummaryResponse::from(summary)))
}

/// GET /api/health - ヘルスチェック
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
