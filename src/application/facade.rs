use chrono::NaiveDate;

use crate::domain::book::Book;
use crate::domain::commands::{BorrowBook, CancelReservation, ExtendLoan, ReserveBook, ReturnBook};
use crate::domain::member::Member;
use crate::domain::value_objects::{BookId, MemberId};

use super::errors::Result;
use super::loan_engine::ReturnOutcome;
use super::query_service::{BookSearch, MemberSummary};
use super::{ServiceDependencies, book_management, loan_engine, member_management, query_service};

/// 図書館サービスのファサード
///
/// 4つのサービス（書籍管理・会員管理・貸出エンジン・クエリ）を
/// 1つのエントリポイントに束ねる。追加のロジックは持たない。
#[derive(Clone)]
pub struct LibraryFacade {
    deps: ServiceDependencies,
}

impl LibraryFacade {
    pub fn new(deps: ServiceDependencies) -> Self {
        Self { deps }
    }

    // 書籍管理

    pub async fn create_book(&self, book_id: BookId, title: &str) -> Result<()> {
        book_management::create_book(&self.deps, book_id, title).await
    }

    pub async fn update_book(&self, book_id: &BookId, title: &str) -> Result<()> {
        book_management::update_book(&self.deps, book_id, title).await
    }

    pub async fn delete_book(&self, book_id: &BookId) -> Result<()> {
        book_management::delete_book(&self.deps, book_id).await
    }

    // 会員管理

    pub async fn create_member(&self, member_id: MemberId, name: &str) -> Result<()> {
        member_management::create_member(&self.deps, member_id, name).await
    }

    pub async fn update_member(&self, member_id: &MemberId, name: &str) -> Result<()> {
        member_management::update_member(&self.deps, member_id, name).await
    }

    pub async fn delete_member(&self, member_id: &MemberId) -> Result<()> {
        member_management::delete_member(&self.deps, member_id).await
    }

    // 貸出エンジン

    pub async fn borrow_book(&self, cmd: BorrowBook) -> Result<()> {
        loan_engine::borrow_book(&self.deps, cmd).await
    }

    pub async fn return_book(&self, cmd: ReturnBook) -> Result<ReturnOutcome> {
        loan_engine::return_book(&self.deps, cmd).await
    }

    pub async fn reserve_book(&self, cmd: ReserveBook) -> Result<()> {
        loan_engine::reserve_book(&self.deps, cmd).await
    }

    pub async fn cancel_reservation(&self, cmd: CancelReservation) -> Result<()> {
        loan_engine::cancel_reservation(&self.deps, cmd).await
    }

    pub async fn extend_loan(&self, cmd: ExtendLoan) -> Result<()> {
        loan_engine::extend_loan(&self.deps, cmd).await
    }

    pub async fn can_member_borrow(&self, member_id: &MemberId) -> Result<bool> {
        loan_engine::can_member_borrow(&self.deps, member_id).await
    }

    // クエリ

    pub async fn search_books(&self, search: BookSearch) -> Result<Vec<Book>> {
        query_service::search_books(&self.deps, search).await
    }

    pub async fn overdue_books(&self, today: NaiveDate) -> Result<Vec<Book>> {
        query_service::overdue_books(&self.deps, today).await
    }

    pub async fn member_summary(&self, member_id: &MemberId) -> Result<MemberSummary> {
        query_service::member_summary(&self.deps, member_id).await
    }

    pub async fn find_book(&self, book_id: &BookId) -> Result<Option<Book>> {
        query_service::find_book(&self.deps, book_id).await
    }

    pub async fn all_books(&self) -> Result<Vec<Book>> {
        query_service::all_books(&self.deps).await
    }

    pub async fn all_members(&self) -> Result<Vec<Member>> {
        query_service::all_members(&self.deps).await
    }
}
