use chrono::Duration;
use rusty_lending::application::book_management::{create_book, delete_book, update_book};
use rusty_lending::application::member_management::{create_member, delete_member, update_member};
use rusty_lending::application::query_service::{
    BookSearch, ReservationEntry, member_summary, overdue_books, search_books,
};
use rusty_lending::domain::book::{ActiveLoan, LoanState};
use rusty_lending::domain::errors::RejectReason;
use rusty_lending::domain::value_objects::{BookId, MemberId};

mod common;
use common::*;

// ============================================================================
// 書籍管理のテスト
// ============================================================================

#[tokio::test]
async fn test_create_book_and_duplicate() {
    let deps = setup_deps();

    create_book(&deps, BookId::new("b1"), "Refactoring")
        .await
        .unwrap();

    let book = fetch_book(&deps, "b1").await;
    assert_eq!(book.title, "Refactoring");
    assert!(book.loan.is_free());
    assert!(book.queue.is_empty());

    let err = create_book(&deps, BookId::new("b1"), "Another title")
        .await
        .unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::BookAlreadyExists));
}

#[tokio::test]
async fn test_create_book_requires_id_and_title() {
    let deps = setup_deps();

    let err = create_book(&deps, BookId::new("  "), "Title")
        .await
        .unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::InvalidRequest));

    let err = create_book(&deps, BookId::new("b1"), "   ")
        .await
        .unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::InvalidRequest));
}

#[tokio::test]
async fn test_update_book() {
    let deps = setup_deps();
    seed_book(&deps, "b1").await;

    update_book(&deps, &BookId::new("b1"), "New title")
        .await
        .unwrap();
    assert_eq!(fetch_book(&deps, "b1").await.title, "New title");

    // 存在確認が必須フィールド確認より先
    let err = update_book(&deps, &BookId::new("nope"), "  ")
        .await
        .unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::BookNotFound));

    let err = update_book(&deps, &BookId::new("b1"), "  ")
        .await
        .unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::InvalidRequest));
}

#[tokio::test]
async fn test_delete_book_blocked_by_loan_then_reservation() {
    let deps = setup_deps();

    let err = delete_book(&deps, &BookId::new("nope")).await.unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::BookNotFound));

    // 貸出中かつ予約ありの場合はBOOK_LOANEDが勝つ
    seed_book_with_state(
        &deps,
        "b1",
        LoanState::Loaned(ActiveLoan::start(MemberId::new("m1"), today())),
        &["m2"],
    )
    .await;
    let err = delete_book(&deps, &BookId::new("b1")).await.unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::BookLoaned));

    // 空きだが予約が残っている場合はBOOK_RESERVED
    seed_book_with_state(&deps, "b2", LoanState::Free, &["m2"]).await;
    let err = delete_book(&deps, &BookId::new("b2")).await.unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::BookReserved));

    // 空きで予約なしなら削除できる
    seed_book(&deps, "b3").await;
    delete_book(&deps, &BookId::new("b3")).await.unwrap();
    assert!(
        deps.book_repo
            .find_by_id(&BookId::new("b3"))
            .await
            .unwrap()
            .is_none()
    );
}

// ============================================================================
// 会員管理のテスト
// ============================================================================

#[tokio::test]
async fn test_create_and_update_member() {
    let deps = setup_deps();

    create_member(&deps, MemberId::new("m1"), "Alice")
        .await
        .unwrap();

    let err = create_member(&deps, MemberId::new("m1"), "Bob")
        .await
        .unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::MemberAlreadyExists));

    let err = create_member(&deps, MemberId::new("m2"), "  ")
        .await
        .unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::InvalidRequest));

    update_member(&deps, &MemberId::new("m1"), "Alice Smith")
        .await
        .unwrap();
    let member = deps
        .member_repo
        .find_by_id(&MemberId::new("m1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.name, "Alice Smith");

    let err = update_member(&deps, &MemberId::new("ghost"), "Name")
        .await
        .unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::MemberNotFound));
}

#[tokio::test]
async fn test_delete_member_blocked_while_loans_exist() {
    let deps = setup_deps();
    seed_member(&deps, "m1").await;
    seed_loans_for_member(&deps, "m1", 1).await;

    let err = delete_member(&deps, &MemberId::new("m1")).await.unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::MemberHasLoans));

    // 会員は残っている
    assert!(
        deps.member_repo
            .exists_by_id(&MemberId::new("m1"))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_delete_member_purges_reservation_queues() {
    let deps = setup_deps();
    seed_member(&deps, "m1").await;
    seed_member(&deps, "m3").await;

    // m1はb1とb2のキューに並んでいる
    seed_book_with_state(&deps, "b1", LoanState::Free, &["m1", "m3"]).await;
    seed_book_with_state(&deps, "b2", LoanState::Free, &["m1"]).await;

    delete_member(&deps, &MemberId::new("m1")).await.unwrap();

    // m1だけが取り除かれ、他の並び順は保たれる
    assert_eq!(
        fetch_book(&deps, "b1").await.queue.as_slice(),
        &[MemberId::new("m3")]
    );
    assert!(fetch_book(&deps, "b2").await.queue.is_empty());
    assert!(
        !deps
            .member_repo
            .exists_by_id(&MemberId::new("m1"))
            .await
            .unwrap()
    );
    assert_invariants(&deps).await;
}

#[tokio::test]
async fn test_delete_member_not_found() {
    let deps = setup_deps();
    let err = delete_member(&deps, &MemberId::new("ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::MemberNotFound));
}

// ============================================================================
// クエリサービスのテスト
// ============================================================================

#[tokio::test]
async fn test_search_books_filters() {
    let deps = setup_deps();
    seed_book_with_state(
        &deps,
        "b1",
        LoanState::Loaned(ActiveLoan::start(MemberId::new("m1"), today())),
        &[],
    )
    .await;
    seed_book(&deps, "b2").await;
    deps.book_repo
        .save(rusty_lending::domain::book::Book::new(
            BookId::new("b3"),
            "Domain-Driven Design",
        ))
        .await
        .unwrap();

    // フィルタなしは全件
    let all = search_books(&deps, BookSearch::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    // 空きのみ
    let free = search_books(
        &deps,
        BookSearch {
            available_only: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(
        free.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
        vec!["b2", "b3"]
    );

    // 貸出中のみ
    let loaned = search_books(
        &deps,
        BookSearch {
            available_only: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(loaned.len(), 1);
    assert_eq!(loaned[0].id, BookId::new("b1"));

    // 会員指定が最優先
    let by_member = search_books(
        &deps,
        BookSearch {
            loaned_to: Some(MemberId::new("m1")),
            available_only: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_member.len(), 1);
    assert_eq!(by_member[0].id, BookId::new("b1"));

    // タイトル部分一致（大文字小文字を区別しない）
    let by_title = search_books(
        &deps,
        BookSearch {
            title_contains: Some("domain-driven".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].id, BookId::new("b3"));
}

#[tokio::test]
async fn test_overdue_books_strictly_before_today() {
    let deps = setup_deps();
    // 期限が昨日 → 延滞
    seed_book_with_state(
        &deps,
        "late",
        LoanState::Loaned(ActiveLoan {
            borrower: MemberId::new("m1"),
            due_date: today() - Duration::days(1),
            first_due_date: today() - Duration::days(1),
        }),
        &[],
    )
    .await;
    // 期限が今日ちょうど → まだ延滞ではない
    seed_book_with_state(
        &deps,
        "due-today",
        LoanState::Loaned(ActiveLoan {
            borrower: MemberId::new("m2"),
            due_date: today(),
            first_due_date: today(),
        }),
        &[],
    )
    .await;
    seed_book(&deps, "free").await;

    let overdue = overdue_books(&deps, today()).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, BookId::new("late"));
}

#[tokio::test]
async fn test_member_summary() {
    let deps = setup_deps();
    seed_member(&deps, "m1").await;
    seed_member(&deps, "m2").await;
    seed_loans_for_member(&deps, "m1", 2).await;
    seed_book_with_state(&deps, "b1", LoanState::Free, &["m2", "m1"]).await;

    let summary = member_summary(&deps, &MemberId::new("m1")).await.unwrap();
    assert_eq!(summary.member.id, MemberId::new("m1"));
    assert_eq!(summary.loans.len(), 2);
    assert_eq!(
        summary.reservations,
        vec![ReservationEntry {
            book_id: BookId::new("b1"),
            position: 1,
        }]
    );

    let err = member_summary(&deps, &MemberId::new("ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.reject_reason(), Some(RejectReason::MemberNotFound));
}
