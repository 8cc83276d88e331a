#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use rusty_lending::adapters::memory::{InMemoryBookRepository, InMemoryMemberRepository};
use rusty_lending::application::{LibraryFacade, ServiceDependencies};
use rusty_lending::domain::book::{
    ActiveLoan, Book, LoanState, MAX_EXTENSION_DAYS, MAX_LOANS, ReservationQueue,
};
use rusty_lending::domain::member::Member;
use rusty_lending::domain::value_objects::{BookId, MemberId};

/// インメモリアダプターで組んだサービス依存関係
pub fn setup_deps() -> ServiceDependencies {
    ServiceDependencies::new(
        Arc::new(InMemoryBookRepository::new()),
        Arc::new(InMemoryMemberRepository::new()),
    )
}

pub fn setup_facade() -> LibraryFacade {
    LibraryFacade::new(setup_deps())
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// テストの基準日
pub fn today() -> NaiveDate {
    date(2025, 6, 1)
}

pub async fn seed_member(deps: &ServiceDependencies, id: &str) {
    deps.member_repo
        .save(Member::new(MemberId::new(id), format!("Member {}", id)))
        .await
        .unwrap();
}

pub async fn seed_book(deps: &ServiceDependencies, id: &str) {
    deps.book_repo
        .save(Book::new(BookId::new(id), format!("Book {}", id)))
        .await
        .unwrap();
}

/// 指定した状態の書籍を直接保存する
pub async fn seed_book_with_state(
    deps: &ServiceDependencies,
    id: &str,
    loan: LoanState,
    queue: &[&str],
) {
    let book = Book {
        id: BookId::new(id),
        title: format!("Book {}", id),
        loan,
        queue: ReservationQueue::from_members(queue.iter().map(|m| MemberId::new(*m)).collect()),
    };
    deps.book_repo.save(book).await.unwrap();
}

/// 会員に貸出中の書籍をn冊持たせる（書籍IDは`{prefix}-0`..）
pub async fn seed_loans_for_member(deps: &ServiceDependencies, member_id: &str, n: usize) {
    for i in 0..n {
        seed_book_with_state(
            deps,
            &format!("{}-loan-{}", member_id, i),
            LoanState::Loaned(ActiveLoan::start(MemberId::new(member_id), today())),
            &[],
        )
        .await;
    }
}

pub async fn fetch_book(deps: &ServiceDependencies, id: &str) -> Book {
    deps.book_repo
        .find_by_id(&BookId::new(id))
        .await
        .unwrap()
        .expect("book should exist")
}

/// 全到達可能状態で成り立つべき不変条件を検証する
///
/// - 借り手は自分の書籍の予約キューに現れない
/// - 予約キューの会員IDは重複しない
/// - どの会員も貸出中の書籍は最大5冊
/// - 初回返却期限 <= 返却期限 <= 初回返却期限 + 90日
///
/// （「貸出フィールドは揃って存在する」はLoanStateの直和型が
/// 構造的に保証するため検査対象にならない）
pub async fn assert_invariants(deps: &ServiceDependencies) {
    let books = deps.book_repo.find_all().await.unwrap();
    let mut loans_per_member: std::collections::HashMap<MemberId, usize> =
        std::collections::HashMap::new();

    for book in &books {
        let mut seen = std::collections::HashSet::new();
        for member in book.queue.iter() {
            assert!(
                seen.insert(member.clone()),
                "duplicate {} in queue of {}",
                member,
                book.id
            );
        }

        if let LoanState::Loaned(loan) = &book.loan {
            assert!(
                !book.queue.contains(&loan.borrower),
                "borrower {} queued on own book {}",
                loan.borrower,
                book.id
            );
            assert!(
                loan.first_due_date <= loan.due_date,
                "due date of {} precedes its first due date",
                book.id
            );
            assert!(
                (loan.due_date - loan.first_due_date).num_days() <= MAX_EXTENSION_DAYS,
                "due date of {} is past the extension window",
                book.id
            );
            *loans_per_member.entry(loan.borrower.clone()).or_default() += 1;
        }
    }

    for (member, count) in loans_per_member {
        assert!(
            count <= MAX_LOANS,
            "{} has {} active loans",
            member,
            count
        );
    }
}
